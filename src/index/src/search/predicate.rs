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

/// Predicate over one JSON key path.
///
/// Keys may navigate array elements with bracketed indices, e.g.
/// `foo[0].bar[1].baz`. Values are compared byte-for-byte against the
/// builder's canonical stringification; the reader performs no value parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Eq { key: String, value: String },
    NotEq { key: String, value: String },
    In { key: String, values: Vec<String> },
    NotIn { key: String, values: Vec<String> },
    IsNull { key: String },
    IsNotNull { key: String },
}

impl Predicate {
    /// Returns the key path the predicate applies to.
    pub fn key(&self) -> &str {
        match self {
            Predicate::Eq { key, .. }
            | Predicate::NotEq { key, .. }
            | Predicate::In { key, .. }
            | Predicate::NotIn { key, .. }
            | Predicate::IsNull { key }
            | Predicate::IsNotNull { key } => key,
        }
    }

    /// Returns whether the predicate is exclusive.
    ///
    /// An exclusive predicate holds for a source doc only if none of its
    /// flattened expansions match the inclusive form, so it is evaluated
    /// inclusively and flipped once at the filter root, never inside a
    /// composite node.
    pub fn is_exclusive(&self) -> bool {
        matches!(
            self,
            Predicate::NotEq { .. } | Predicate::NotIn { .. } | Predicate::IsNull { .. }
        )
    }
}

/// Filter tree handed over by the query engine. Leaves carry predicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterNode {
    And(Vec<FilterNode>),
    Or(Vec<FilterNode>),
    Predicate(Predicate),
}
