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

use crate::buffer::IndexBuffer;
use crate::error::Result;

/// `DocIdMapping` translates flattened doc ids back to source doc ids.
///
/// One little-endian u32 per flattened doc id; the array is non-decreasing
/// because flattening preserves document order.
pub struct DocIdMapping<'a> {
    buffer: IndexBuffer<'a>,
}

impl<'a> DocIdMapping<'a> {
    pub fn new(bytes: &'a [u8]) -> DocIdMapping<'a> {
        DocIdMapping {
            buffer: IndexBuffer::new(bytes),
        }
    }

    /// Returns the number of flattened doc ids covered by the mapping.
    pub fn num_flattened_docs(&self) -> u32 {
        (self.buffer.size() / 4) as u32
    }

    /// Returns the source doc id of `flattened_doc_id`.
    pub fn to_source(&self, flattened_doc_id: u32) -> Result<u32> {
        self.buffer.read_u32_le(flattened_doc_id as u64 * 4)
    }
}
