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

//! Test-only artifact construction: a combination-model JSON flattener plus a
//! byte-level writer for the on-disk layout, so reader tests run against real
//! artifacts.

use std::collections::{BTreeMap, BTreeSet};

use roaring::RoaringBitmap;
use serde_json::Value;

use crate::format::{self, ARRAY_INDEX_KEY, FORMAT_VERSION, KEY_SEPARATOR};
use crate::Bytes;

/// One flattened record of a document: leaf values keyed by dotted path plus
/// the array slots taken to reach them. Every document yields at least one
/// record.
#[derive(Debug, Default, Clone)]
pub(crate) struct FlattenedRecord {
    pub values: BTreeMap<String, String>,
    pub array_indices: BTreeSet<(String, u32)>,
}

/// Expands a document into one record per combination of array elements.
pub(crate) fn flatten_document(document: &Value) -> Vec<FlattenedRecord> {
    let mut records = vec![FlattenedRecord::default()];
    flatten_into(&mut records, document, "");
    records
}

fn flatten_into(records: &mut Vec<FlattenedRecord>, value: &Value, path: &str) {
    match value {
        Value::Null => {}
        Value::Object(fields) => {
            for (name, child) in fields {
                let child_path = join_path(path, name);
                flatten_into(records, child, &child_path);
            }
        }
        Value::Array(elements) => {
            if elements.is_empty() {
                return;
            }
            let base = std::mem::take(records);
            for (index, element) in elements.iter().enumerate() {
                let mut expanded = base.clone();
                for record in &mut expanded {
                    record.array_indices.insert((path.to_string(), index as u32));
                }
                flatten_into(&mut expanded, element, path);
                records.extend(expanded);
            }
        }
        scalar => {
            let text = stringify(scalar);
            for record in records.iter_mut() {
                record.values.insert(path.to_string(), text.clone());
            }
        }
    }
}

fn join_path(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}{KEY_SEPARATOR}{name}")
    }
}

fn stringify(scalar: &Value) -> String {
    match scalar {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => unreachable!("flattened scalars are string, number, or bool"),
    }
}

/// Builds an artifact over the given documents, assigning flattened doc ids
/// in document order.
pub(crate) fn build_artifact(documents: &[Value]) -> Vec<u8> {
    let mut postings: BTreeMap<Bytes, RoaringBitmap> = BTreeMap::new();
    let mut mapping = Vec::new();

    for (doc_id, document) in documents.iter().enumerate() {
        for record in flatten_document(document) {
            let flattened_doc_id = mapping.len() as u32;
            mapping.push(doc_id as u32);

            let mut tokens: BTreeSet<Bytes> = BTreeSet::new();
            for (path, value) in &record.values {
                // Empty values have no representable key-value token; the
                // bare key tokens still record the key's presence.
                if let Some(token) = format::key_value_token(path, value) {
                    tokens.insert(token);
                }
                for prefix in key_prefixes(path) {
                    tokens.insert(prefix.into_bytes());
                }
            }
            for (path, index) in &record.array_indices {
                tokens.insert(format!("{path}{KEY_SEPARATOR}{ARRAY_INDEX_KEY}={index}").into_bytes());
                for prefix in key_prefixes(path) {
                    tokens.insert(prefix.into_bytes());
                }
            }
            for token in tokens {
                postings.entry(token).or_default().insert(flattened_doc_id);
            }
        }
    }

    build_artifact_from_parts(&postings, &mapping)
}

/// Every dotted prefix of a key path, e.g. `user.city` -> `user`,
/// `user.city`.
fn key_prefixes(path: &str) -> Vec<String> {
    let mut prefixes = Vec::new();
    for (offset, _) in path.match_indices(KEY_SEPARATOR) {
        prefixes.push(path[..offset].to_string());
    }
    prefixes.push(path.to_string());
    prefixes
}

/// Serializes pre-assembled postings and a doc id mapping into the binary
/// layout: 32-byte big-endian header, fixed-width 0x00-padded sorted token
/// dictionary, offset-indexed portable roaring bitmaps, little-endian
/// mapping.
pub(crate) fn build_artifact_from_parts(
    postings: &BTreeMap<Bytes, RoaringBitmap>,
    mapping: &[u32],
) -> Vec<u8> {
    let max_token_length = postings.keys().map(|token| token.len()).max().unwrap_or(0);

    let mut dictionary = Vec::with_capacity(max_token_length * postings.len());
    for token in postings.keys() {
        dictionary.extend_from_slice(token);
        dictionary.resize(dictionary.len() + max_token_length - token.len(), 0);
    }

    let table_size = 4 * (postings.len() as u32 + 1);
    let mut offsets = vec![table_size];
    let mut serialized = Vec::new();
    for bitmap in postings.values() {
        bitmap.serialize_into(&mut serialized).unwrap();
        offsets.push(table_size + serialized.len() as u32);
    }
    let mut posting_region = Vec::with_capacity(table_size as usize + serialized.len());
    for offset in offsets {
        posting_region.extend_from_slice(&offset.to_be_bytes());
    }
    posting_region.extend_from_slice(&serialized);

    let mut artifact = Vec::new();
    artifact.extend_from_slice(&FORMAT_VERSION.to_be_bytes());
    artifact.extend_from_slice(&(max_token_length as u32).to_be_bytes());
    artifact.extend_from_slice(&(dictionary.len() as u64).to_be_bytes());
    artifact.extend_from_slice(&(posting_region.len() as u64).to_be_bytes());
    artifact.extend_from_slice(&(mapping.len() as u64 * 4).to_be_bytes());
    artifact.extend_from_slice(&dictionary);
    artifact.extend_from_slice(&posting_region);
    for doc_id in mapping {
        artifact.extend_from_slice(&doc_id.to_le_bytes());
    }
    artifact
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_flatten_plain_document() {
        let records = flatten_document(&json!({"user": {"city": "NYC"}, "n": 1}));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].values["user.city"], "NYC");
        assert_eq!(records[0].values["n"], "1");
        assert!(records[0].array_indices.is_empty());
    }

    #[test]
    fn test_flatten_array_combinations() {
        let records = flatten_document(&json!({"city": "NYC", "tags": ["x", "y"]}));
        assert_eq!(records.len(), 2);
        for (index, record) in records.iter().enumerate() {
            assert_eq!(record.values["city"], "NYC");
            assert_eq!(record.values["tags"], ["x", "y"][index]);
            assert!(record
                .array_indices
                .contains(&("tags".to_string(), index as u32)));
        }
    }

    #[test]
    fn test_flatten_null_and_empty_array_leave_no_trace() {
        let records = flatten_document(&json!({"a": null, "b": [], "c": "v"}));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].values.len(), 1);
        assert_eq!(records[0].values["c"], "v");
    }

    #[test]
    fn test_flatten_array_of_objects() {
        let records =
            flatten_document(&json!({"addresses": [{"country": "us"}, {"country": "ca"}]}));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].values["addresses.country"], "us");
        assert_eq!(records[1].values["addresses.country"], "ca");
        assert!(records[1]
            .array_indices
            .contains(&("addresses".to_string(), 1)));
    }

    #[test]
    fn test_key_prefixes() {
        assert_eq!(key_prefixes("a"), ["a"]);
        assert_eq!(key_prefixes("a.b.c"), ["a", "a.b", "a.b.c"]);
    }

    #[test]
    fn test_built_artifact_layout() {
        let mut postings = BTreeMap::new();
        postings.insert(b"k".to_vec(), RoaringBitmap::from_iter([0u32]));
        postings.insert(b"k\0v".to_vec(), RoaringBitmap::from_iter([0u32]));
        let artifact = build_artifact_from_parts(&postings, &[0]);

        // version, max token length
        assert_eq!(&artifact[0..4], &1u32.to_be_bytes());
        assert_eq!(&artifact[4..8], &3u32.to_be_bytes());
        // dictionary region: two entries, three bytes wide, "k" before "k\0v"
        assert_eq!(&artifact[32..38], b"k\0\0k\0v");
        // mapping region: little-endian u32 at the tail
        assert_eq!(&artifact[artifact.len() - 4..], &0u32.to_le_bytes());
    }
}
