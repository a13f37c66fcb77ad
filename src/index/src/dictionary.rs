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

use std::cmp::Ordering;

use snafu::ensure;

use crate::error::{Result, UnexpectedDictionarySizeSnafu};
use crate::format::KEY_VALUE_SEPARATOR;

/// `TokenDictionary` is the sorted token dictionary of the artifact.
///
/// Tokens are stored as fixed-width entries of `max_token_length` bytes,
/// padded with 0x00 and sorted lexicographically by their padded bytes, so a
/// lookup is a binary search over `size / width` entries.
pub struct TokenDictionary<'a> {
    bytes: &'a [u8],
    token_width: usize,
    len: u32,
}

impl<'a> TokenDictionary<'a> {
    pub fn new(bytes: &'a [u8], max_token_length: u32) -> Result<TokenDictionary<'a>> {
        let token_width = max_token_length as usize;
        ensure!(
            (token_width == 0 && bytes.is_empty())
                || (token_width > 0 && bytes.len() % token_width == 0),
            UnexpectedDictionarySizeSnafu {
                dictionary_bytes: bytes.len() as u64,
                max_token_length,
            }
        );

        let len = if token_width == 0 {
            0
        } else {
            (bytes.len() / token_width) as u32
        };
        Ok(TokenDictionary {
            bytes,
            token_width,
            len,
        })
    }

    /// Returns the number of tokens in the dictionary.
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the dense id of `token`, or `None` if it is absent.
    ///
    /// Tokens longer than the entry width cannot be stored and are absent by
    /// definition.
    pub fn index_of(&self, token: &[u8]) -> Option<u32> {
        if token.len() > self.token_width {
            return None;
        }

        let mut lo = 0usize;
        let mut hi = self.len as usize;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let entry = &self.bytes[mid * self.token_width..(mid + 1) * self.token_width];
            match compare_padded(entry, token) {
                Ordering::Less => lo = mid + 1,
                Ordering::Greater => hi = mid,
                Ordering::Equal => return Some(mid as u32),
            }
        }
        None
    }
}

/// Compares a fixed-width entry against an unpadded token, treating the token
/// as if padded with 0x00 to the entry width.
///
/// The padding byte equals the key/value separator, so a key-value token with
/// an empty value would pad identically to its bare key token; the format
/// never stores one (`format::key_value_token` refuses to build it).
fn compare_padded(entry: &[u8], token: &[u8]) -> Ordering {
    match entry[..token.len()].cmp(token) {
        Ordering::Equal => {
            if entry[token.len()..].iter().all(|b| *b == KEY_VALUE_SEPARATOR) {
                Ordering::Equal
            } else {
                Ordering::Greater
            }
        }
        ordering => ordering,
    }
}
