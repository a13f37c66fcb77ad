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

use roaring::RoaringBitmap;
use snafu::{ensure, ResultExt};

use crate::buffer::IndexBuffer;
use crate::error::{
    DecodePostingSnafu, PostingIdOutOfRangeSnafu, Result, UnexpectedPostingOffsetSnafu,
};

/// `PostingStore` maps dictionary ids to their posting bitmaps.
///
/// The region opens with `len + 1` big-endian u32 offsets relative to the
/// region start; posting `i` is serialized in `[offset[i], offset[i + 1])` in
/// the portable roaring format.
pub struct PostingStore<'a> {
    buffer: IndexBuffer<'a>,
    len: u32,
}

impl<'a> PostingStore<'a> {
    pub fn new(bytes: &'a [u8], num_postings: u32) -> Result<PostingStore<'a>> {
        let buffer = IndexBuffer::new(bytes);
        // The offsets table must fit before any posting can be resolved.
        buffer.slice(0, (num_postings as u64 + 1) * 4)?;
        Ok(PostingStore {
            buffer,
            len: num_postings,
        })
    }

    /// Returns a read-only view of the posting for `dict_id`.
    pub fn postings(&self, dict_id: u32) -> Result<PostingList<'a>> {
        ensure!(
            dict_id < self.len,
            PostingIdOutOfRangeSnafu {
                dict_id,
                num_postings: self.len,
            }
        );

        let start = self.buffer.read_u32_be(dict_id as u64 * 4)? as u64;
        let end = self.buffer.read_u32_be((dict_id as u64 + 1) * 4)? as u64;
        ensure!(
            start <= end && end <= self.buffer.size(),
            UnexpectedPostingOffsetSnafu {
                dict_id,
                start,
                end,
                region_size: self.buffer.size(),
            }
        );

        Ok(PostingList {
            dict_id,
            bytes: self.buffer.slice(start, end - start)?,
        })
    }
}

/// A borrowed, immutable view of one serialized posting.
///
/// Callers must not assume anything about the backing bytes; converting to a
/// mutable bitmap is explicit and allocates.
pub struct PostingList<'a> {
    dict_id: u32,
    bytes: &'a [u8],
}

impl PostingList<'_> {
    /// Deserializes the posting into an owned bitmap.
    pub fn to_bitmap(&self) -> Result<RoaringBitmap> {
        RoaringBitmap::deserialize_from(self.bytes).context(DecodePostingSnafu {
            dict_id: self.dict_id,
        })
    }
}
