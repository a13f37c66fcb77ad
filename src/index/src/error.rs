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

use std::io::Error as IoError;

use snafu::{Location, Snafu};

use crate::search::predicate::Predicate;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Unsupported json index version: {version}"))]
    UnsupportedVersion { version: u32, location: Location },

    #[snafu(display("Unexpected json index region sizes, dictionary: {dictionary_bytes}, postings: {posting_bytes}, mapping: {mapping_bytes}, artifact: {artifact_size}"))]
    UnexpectedRegionSize {
        dictionary_bytes: u64,
        posting_bytes: u64,
        mapping_bytes: u64,
        artifact_size: u64,
        location: Location,
    },

    #[snafu(display(
        "Unexpected dictionary region size: {dictionary_bytes}, token width: {max_token_length}"
    ))]
    UnexpectedDictionarySize {
        dictionary_bytes: u64,
        max_token_length: u32,
        location: Location,
    },

    #[snafu(display("Unexpected doc id mapping region size: {mapping_bytes}"))]
    UnexpectedMappingSize { mapping_bytes: u64, location: Location },

    #[snafu(display("Offset out of bounds, offset: {offset}, size: {size}, buffer size: {buffer_size}"))]
    OutOfBounds {
        offset: u64,
        size: u64,
        buffer_size: u64,
        location: Location,
    },

    #[snafu(display("Posting id out of range, dict id: {dict_id}, postings: {num_postings}"))]
    PostingIdOutOfRange {
        dict_id: u32,
        num_postings: u32,
        location: Location,
    },

    #[snafu(display("Unexpected posting offsets, dict id: {dict_id}, start: {start}, end: {end}, region size: {region_size}"))]
    UnexpectedPostingOffset {
        dict_id: u32,
        start: u64,
        end: u64,
        region_size: u64,
        location: Location,
    },

    #[snafu(display("Failed to decode posting bitmap, dict id: {dict_id}"))]
    DecodePosting {
        dict_id: u32,
        #[snafu(source)]
        error: IoError,
        location: Location,
    },

    #[snafu(display("Invalid doc id mapping, flattened doc id: {flattened_doc_id}, doc id: {doc_id}, docs: {num_docs}"))]
    InvalidDocIdMapping {
        flattened_doc_id: u32,
        doc_id: u32,
        num_docs: u32,
        location: Location,
    },

    #[snafu(display("Missing right bracket in key: {key}"))]
    MissingRightBracket { key: String, location: Location },

    #[snafu(display("Invalid array index in key: {key}"))]
    InvalidArrayIndex { key: String, location: Location },

    #[snafu(display("Exclusive predicate cannot be nested: {predicate:?}"))]
    NestedExclusive {
        predicate: Predicate,
        location: Location,
    },

    #[snafu(display("Unexpected empty filter node"))]
    EmptyFilter { location: Location },

    #[snafu(display("Query cancelled"))]
    Cancelled { location: Location },
}

pub type Result<T> = std::result::Result<T, Error>;
