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

use snafu::OptionExt;

use crate::error::{OutOfBoundsSnafu, Result};

/// `IndexBuffer` is a typed, bounds-checked window onto the mapped artifact.
///
/// Integer fields of the artifact are big-endian except the doc id mapping,
/// which is little-endian to match the builder's writer.
#[derive(Clone, Copy)]
pub struct IndexBuffer<'a> {
    bytes: &'a [u8],
}

impl<'a> IndexBuffer<'a> {
    pub fn new(bytes: &'a [u8]) -> IndexBuffer<'a> {
        IndexBuffer { bytes }
    }

    /// Returns the size of the window in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Carves `size` bytes at `offset` out of the window.
    pub fn slice(&self, offset: u64, size: u64) -> Result<&'a [u8]> {
        let end = offset
            .checked_add(size)
            .filter(|end| *end <= self.size())
            .context(OutOfBoundsSnafu {
                offset,
                size,
                buffer_size: self.size(),
            })?;
        Ok(&self.bytes[offset as usize..end as usize])
    }

    pub fn read_u32_be(&self, offset: u64) -> Result<u32> {
        let bytes = self.slice(offset, 4)?;
        Ok(u32::from_be_bytes(bytes.try_into().unwrap()))
    }

    pub fn read_u64_be(&self, offset: u64) -> Result<u64> {
        let bytes = self.slice(offset, 8)?;
        Ok(u64::from_be_bytes(bytes.try_into().unwrap()))
    }

    pub fn read_u32_le(&self, offset: u64) -> Result<u32> {
        let bytes = self.slice(offset, 4)?;
        Ok(u32::from_le_bytes(bytes.try_into().unwrap()))
    }
}
