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
use snafu::{ensure, OptionExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::buffer::IndexBuffer;
use crate::dictionary::TokenDictionary;
use crate::doc_id_mapping::DocIdMapping;
use crate::error::{
    CancelledSnafu, EmptyFilterSnafu, InvalidDocIdMappingSnafu, NestedExclusiveSnafu, Result,
};
use crate::format::header::IndexHeader;
use crate::format::{self, HEADER_LENGTH};
use crate::postings::PostingStore;
use crate::search::key_path::resolve_key_path;
use crate::search::predicate::{FilterNode, Predicate};

/// Reader for the JSON inverted index.
///
/// The reader borrows the artifact's byte region and holds no heap bitmaps of
/// its own; each query allocates transient bitmaps. All queries take `&self`,
/// so one reader is shareable across concurrent queries.
pub struct JsonIndexReader<'a> {
    num_docs: u32,
    dictionary: TokenDictionary<'a>,
    postings: PostingStore<'a>,
    doc_id_mapping: DocIdMapping<'a>,
}

impl<'a> JsonIndexReader<'a> {
    /// Opens the reader over an artifact byte region covering `num_docs`
    /// source documents.
    pub fn new(data: &'a [u8], num_docs: u32) -> Result<JsonIndexReader<'a>> {
        let buffer = IndexBuffer::new(data);
        let header = IndexHeader::decode(&buffer)?;

        let mut offset = HEADER_LENGTH;
        let dictionary = TokenDictionary::new(
            buffer.slice(offset, header.dictionary_bytes)?,
            header.max_token_length,
        )?;
        offset += header.dictionary_bytes;
        let postings =
            PostingStore::new(buffer.slice(offset, header.posting_bytes)?, dictionary.len())?;
        offset += header.posting_bytes;
        let doc_id_mapping = DocIdMapping::new(buffer.slice(offset, header.mapping_bytes)?);

        debug!(
            num_docs,
            num_flattened_docs = doc_id_mapping.num_flattened_docs(),
            num_tokens = dictionary.len(),
            "Opened json index"
        );

        Ok(JsonIndexReader {
            num_docs,
            dictionary,
            postings,
            doc_id_mapping,
        })
    }

    /// Returns the number of source documents in the column.
    pub fn num_docs(&self) -> u32 {
        self.num_docs
    }

    /// Returns the number of flattened expansions in the artifact.
    pub fn num_flattened_docs(&self) -> u32 {
        self.doc_id_mapping.num_flattened_docs()
    }

    /// Returns the source doc ids matching the given filter.
    pub fn matching_doc_ids(&self, filter: &FilterNode) -> Result<RoaringBitmap> {
        self.matching_doc_ids_cancellable(filter, &CancellationToken::new())
    }

    /// Returns the source doc ids matching the given filter, checking
    /// `cancellation` after each child result is folded in at AND/OR fan-in.
    pub fn matching_doc_ids_cancellable(
        &self,
        filter: &FilterNode,
        cancellation: &CancellationToken,
    ) -> Result<RoaringBitmap> {
        match filter {
            FilterNode::Predicate(predicate) if predicate.is_exclusive() => {
                // The flip can only be applied to unflattened doc ids: a
                // source doc belongs to the negation iff none of its
                // flattened expansions match the inclusive form.
                let flattened = self.flattened_doc_ids_predicate(predicate)?;
                let matching = self.unflatten(&flattened)?;
                let mut doc_ids = RoaringBitmap::new();
                doc_ids.insert_range(0..self.num_docs);
                doc_ids -= matching;
                Ok(doc_ids)
            }
            _ => {
                let flattened = self.flattened_doc_ids_filter(filter, cancellation)?;
                self.unflatten(&flattened)
            }
        }
    }

    /// Releases the reader.
    ///
    /// NOTE: the underlying byte region is owned and tracked by the caller
    /// and might be reused later, so it is left untouched. Dropping the
    /// reader is equivalent; queries after close are ruled out by ownership.
    pub fn close(self) {}

    /// Evaluates a filter tree to flattened doc ids.
    fn flattened_doc_ids_filter(
        &self,
        filter: &FilterNode,
        cancellation: &CancellationToken,
    ) -> Result<RoaringBitmap> {
        match filter {
            FilterNode::And(children) => {
                let (first, rest) = children.split_first().context(EmptyFilterSnafu)?;
                let mut matching = self.flattened_doc_ids_filter(first, cancellation)?;
                ensure_not_cancelled(cancellation)?;
                for child in rest {
                    if matching.is_empty() {
                        break;
                    }
                    matching &= self.flattened_doc_ids_filter(child, cancellation)?;
                    ensure_not_cancelled(cancellation)?;
                }
                Ok(matching)
            }
            FilterNode::Or(children) => {
                let (first, rest) = children.split_first().context(EmptyFilterSnafu)?;
                let mut matching = self.flattened_doc_ids_filter(first, cancellation)?;
                ensure_not_cancelled(cancellation)?;
                for child in rest {
                    matching |= self.flattened_doc_ids_filter(child, cancellation)?;
                    ensure_not_cancelled(cancellation)?;
                }
                Ok(matching)
            }
            FilterNode::Predicate(predicate) => {
                ensure!(
                    !predicate.is_exclusive(),
                    NestedExclusiveSnafu {
                        predicate: predicate.clone(),
                    }
                );
                self.flattened_doc_ids_predicate(predicate)
            }
        }
    }

    /// Evaluates a single predicate to flattened doc ids.
    ///
    /// Exclusive predicates are handled as their inclusive form; the caller
    /// flips the unflattened doc ids to get the exclusive result.
    fn flattened_doc_ids_predicate(&self, predicate: &Predicate) -> Result<RoaringBitmap> {
        let resolved = resolve_key_path(predicate.key())?;

        // Every array-slot constraint must be present, or nothing matches.
        let mut matching = None;
        for token in &resolved.constraint_tokens {
            let Some(dict_id) = self.dictionary.index_of(token.as_bytes()) else {
                return Ok(RoaringBitmap::new());
            };
            let postings = self.postings.postings(dict_id)?.to_bitmap()?;
            matching = Some(fold_intersect(matching, postings));
        }

        let key = &resolved.key;
        match predicate {
            Predicate::Eq { value, .. } | Predicate::NotEq { value, .. } => {
                let dict_id = format::key_value_token(key, value)
                    .and_then(|token| self.dictionary.index_of(&token));
                match dict_id {
                    Some(dict_id) => {
                        let postings = self.postings.postings(dict_id)?.to_bitmap()?;
                        Ok(fold_intersect(matching, postings))
                    }
                    None => Ok(RoaringBitmap::new()),
                }
            }
            Predicate::In { values, .. } | Predicate::NotIn { values, .. } => {
                // Absent values contribute nothing; an empty value list
                // degenerates to the empty union.
                let mut value_doc_ids = RoaringBitmap::new();
                for value in values {
                    let dict_id = format::key_value_token(key, value)
                        .and_then(|token| self.dictionary.index_of(&token));
                    if let Some(dict_id) = dict_id {
                        value_doc_ids |= self.postings.postings(dict_id)?.to_bitmap()?;
                    }
                }
                Ok(fold_intersect(matching, value_doc_ids))
            }
            Predicate::IsNull { .. } | Predicate::IsNotNull { .. } => {
                match self.dictionary.index_of(key.as_bytes()) {
                    Some(dict_id) => {
                        let postings = self.postings.postings(dict_id)?.to_bitmap()?;
                        Ok(fold_intersect(matching, postings))
                    }
                    None => Ok(RoaringBitmap::new()),
                }
            }
        }
    }

    /// Projects flattened doc ids to source doc ids.
    fn unflatten(&self, flattened_doc_ids: &RoaringBitmap) -> Result<RoaringBitmap> {
        let mut doc_ids = RoaringBitmap::new();
        for flattened_doc_id in flattened_doc_ids {
            let doc_id = self.doc_id_mapping.to_source(flattened_doc_id)?;
            ensure!(
                doc_id < self.num_docs,
                InvalidDocIdMappingSnafu {
                    flattened_doc_id,
                    doc_id,
                    num_docs: self.num_docs,
                }
            );
            doc_ids.insert(doc_id);
        }
        Ok(doc_ids)
    }
}

/// Folds `postings` into the optional accumulator, `None` acting as the
/// identity.
fn fold_intersect(matching: Option<RoaringBitmap>, postings: RoaringBitmap) -> RoaringBitmap {
    match matching {
        Some(mut matching) => {
            matching &= postings;
            matching
        }
        None => postings,
    }
}

fn ensure_not_cancelled(cancellation: &CancellationToken) -> Result<()> {
    ensure!(!cancellation.is_cancelled(), CancelledSnafu);
    Ok(())
}
