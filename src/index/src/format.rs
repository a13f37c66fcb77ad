// Copyright 2023 Greptime Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::Bytes;

pub mod header;

/// Artifact version the reader understands.
pub const FORMAT_VERSION: u32 = 1;

/// Size of the fixed artifact header in bytes.
pub const HEADER_LENGTH: u64 = 32;

/// Separator between segments of a flattened key path.
pub const KEY_SEPARATOR: char = '.';

/// Reserved byte between a key path and its stringified value in a
/// key-value token. Also the dictionary padding byte.
pub const KEY_VALUE_SEPARATOR: u8 = 0x00;

/// Marker segment for array positions, e.g. `tags.$index=2`.
pub const ARRAY_INDEX_KEY: &str = "$index";

/// Assembles the key-value token for `key` = `value`.
///
/// Returns `None` for the empty value: its token would be the key followed
/// by the separator alone, which pads to the same fixed-width dictionary
/// entry as the bare key token, so the format cannot represent it. The
/// builder never emits such a token and lookups treat it as absent.
pub fn key_value_token(key: &str, value: &str) -> Option<Bytes> {
    if value.is_empty() {
        return None;
    }
    let mut token = Vec::with_capacity(key.len() + 1 + value.len());
    token.extend_from_slice(key.as_bytes());
    token.push(KEY_VALUE_SEPARATOR);
    token.extend_from_slice(value.as_bytes());
    Some(token)
}
