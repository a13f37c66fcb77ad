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

use snafu::{ensure, OptionExt};

use crate::error::{InvalidArrayIndexSnafu, MissingRightBracketSnafu, Result};
use crate::format::{ARRAY_INDEX_KEY, KEY_SEPARATOR};

/// Result of rewriting a raw key with array indices.
///
/// E.g. `foo[0].bar[1].foobar` resolves to the constraint tokens
/// `foo.$index=0` and `foo.bar.$index=1` plus the residual key
/// `foo.bar.foobar` usable for value comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedKeyPath {
    /// Constraint tokens in encounter order, each pinning one array slot.
    pub constraint_tokens: Vec<String>,
    /// The key with all bracketed indices removed.
    pub key: String,
}

/// Rewrites array indices within `raw_key` into constraint tokens.
///
/// A bracket at position 0 has no left prefix to constrain and is kept as a
/// literal key byte.
pub fn resolve_key_path(raw_key: &str) -> Result<ResolvedKeyPath> {
    let mut key = raw_key.to_string();
    let mut constraint_tokens = Vec::new();

    loop {
        let left_bracket = match key.find('[') {
            Some(position) if position > 0 => position,
            _ => break,
        };
        let right_bracket = key[left_bracket..]
            .find(']')
            .map(|position| left_bracket + position)
            .context(MissingRightBracketSnafu { key: raw_key })?;

        let index = &key[left_bracket + 1..right_bracket];
        ensure!(
            !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()),
            InvalidArrayIndexSnafu { key: raw_key }
        );
        let array_index: u32 = index
            .parse()
            .ok()
            .context(InvalidArrayIndexSnafu { key: raw_key })?;

        let left = &key[..left_bracket];
        constraint_tokens.push(format!(
            "{left}{KEY_SEPARATOR}{ARRAY_INDEX_KEY}={array_index}"
        ));
        key = format!("{left}{}", &key[right_bracket + 1..]);
    }

    Ok(ResolvedKeyPath {
        constraint_tokens,
        key,
    })
}
