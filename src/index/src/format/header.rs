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

use snafu::ensure;

use crate::buffer::IndexBuffer;
use crate::error::{
    Result, UnexpectedMappingSizeSnafu, UnexpectedRegionSizeSnafu, UnsupportedVersionSnafu,
};
use crate::format::{FORMAT_VERSION, HEADER_LENGTH};

/// Decoded fixed header of the artifact.
///
/// All fields are big-endian on disk. The three region sizes carve the rest
/// of the artifact into the dictionary, posting, and doc id mapping regions,
/// in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexHeader {
    pub version: u32,
    pub max_token_length: u32,
    pub dictionary_bytes: u64,
    pub posting_bytes: u64,
    pub mapping_bytes: u64,
}

impl IndexHeader {
    /// Decodes and validates the header at the start of the buffer.
    pub fn decode(buffer: &IndexBuffer<'_>) -> Result<IndexHeader> {
        let version = buffer.read_u32_be(0)?;
        ensure!(
            version == FORMAT_VERSION,
            UnsupportedVersionSnafu { version }
        );

        let header = IndexHeader {
            version,
            max_token_length: buffer.read_u32_be(4)?,
            dictionary_bytes: buffer.read_u64_be(8)?,
            posting_bytes: buffer.read_u64_be(16)?,
            mapping_bytes: buffer.read_u64_be(24)?,
        };
        header.validate_regions(buffer.size())?;

        Ok(header)
    }

    /// Checks that the region sizes are consistent with the artifact size.
    fn validate_regions(&self, artifact_size: u64) -> Result<()> {
        let regions = self
            .dictionary_bytes
            .checked_add(self.posting_bytes)
            .and_then(|sum| sum.checked_add(self.mapping_bytes));
        ensure!(
            regions == Some(artifact_size - HEADER_LENGTH),
            UnexpectedRegionSizeSnafu {
                dictionary_bytes: self.dictionary_bytes,
                posting_bytes: self.posting_bytes,
                mapping_bytes: self.mapping_bytes,
                artifact_size,
            }
        );

        ensure!(
            self.mapping_bytes % 4 == 0,
            UnexpectedMappingSizeSnafu {
                mapping_bytes: self.mapping_bytes,
            }
        );

        Ok(())
    }
}
