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

//! Immutable, memory-mapped JSON inverted index.
//!
//! Given a binary artifact built offline from a column of JSON documents, the
//! reader resolves structured predicates (equality, set membership, null
//! checks, boolean combinations, and indexed array-element navigation) into a
//! bitmap of matching document ids. See [`JsonIndexReader`].

pub mod buffer;
pub mod dictionary;
pub mod doc_id_mapping;
pub mod error;
pub mod format;
pub mod postings;
pub mod reader;
pub mod search;

#[cfg(test)]
pub(crate) mod test_util;

pub use crate::reader::JsonIndexReader;
pub use crate::search::predicate::{FilterNode, Predicate};

/// Raw byte sequence of a dictionary token.
pub type Bytes = Vec<u8>;
