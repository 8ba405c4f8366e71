use std::sync::Mutex;

use super::*;
use crate::context::ActivityContext;
use crate::document::DocumentBatch;
use crate::error::TransformError;
use crate::store::{
    DataRef, DocumentStore, MemoryStore, SCHEMA_DOCUMENTS, StoreError, load_documents,
    store_documents,
};

fn doc(id: &str, source: &str) -> Document {
    Document {
        id: id.to_string(),
        source: source.to_string(),
        ..Default::default()
    }
}

fn ids(docs: &[Document]) -> Vec<&str> {
    docs.iter().map(|d| d.id.as_str()).collect()
}

#[test]
fn test_merge_document_lists() {
    let docs1 = vec![doc("1", "source1"), doc("2", "source1")];
    let docs2 = vec![doc("3", "source2")];
    let docs3 = vec![doc("4", "source3"), doc("5", "source3")];

    let merged = merge_document_lists(&[docs1, docs2, docs3]);

    assert_eq!(merged.len(), 5);
    assert_eq!(ids(&merged), vec!["1", "2", "3", "4", "5"]);
}

#[test]
fn test_merge_document_lists_empty_inputs() {
    let none: [Vec<Document>; 0] = [];
    assert!(merge_document_lists(&none).is_empty());

    let merged = merge_document_lists(&[vec![], vec![doc("a", "s")], vec![]]);
    assert_eq!(ids(&merged), vec!["a"]);
}

#[test]
fn test_merge_keeps_duplicates() {
    let merged = merge_document_lists(&[vec![doc("x", "a")], vec![doc("x", "b")]]);
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].source, "a");
    assert_eq!(merged[1].source, "b");
}

#[test]
fn test_merge_sources_mixed_types() {
    let list = vec![doc("1", "raw"), doc("2", "raw")];
    let batch = DocumentBatch::new("jira", vec![doc("3", "jira")]).with_cursor("next");
    let chunked = chunk_documents(&[doc("4", "wiki")], &ChunkOptions::default());

    let sources: [&dyn DocumentSource; 3] = [&list, &batch, &chunked];
    let merged = merge_sources(&sources);

    assert_eq!(ids(&merged), vec!["1", "2", "3", "4"]);
    // inputs are untouched
    assert_eq!(list.len(), 2);
    assert_eq!(batch.len(), 1);
}

#[test]
fn test_merge_sources_homogeneous_batches() {
    let batches = vec![
        DocumentBatch::new("a", vec![doc("a1", "a"), doc("a2", "a")]),
        DocumentBatch::default(),
        DocumentBatch::new("b", vec![doc("b1", "b")]),
    ];
    let merged = merge_sources(&batches);
    assert_eq!(ids(&merged), vec!["a1", "a2", "b1"]);
}

#[test]
fn test_merge_and_chunk() {
    let long = Document {
        content: "one two three four five six seven".to_string(),
        ..doc("long", "s")
    };
    let short = Document {
        content: "tiny".to_string(),
        ..doc("short", "s")
    };
    let first = vec![short.clone()];
    let second = vec![long, doc("empty", "s")];

    let out = merge_and_chunk(&[first, second], &ChunkOptions::new(3, 1));

    // long: 7 tokens, window 3, step 2 -> windows at 0, 2, 4
    assert_eq!(
        ids(&out),
        vec!["short", "long#0", "long#1", "long#2", "empty"]
    );
    assert_eq!(out[0], short);
    assert_eq!(out[3].content, "five six seven");
}

// ========================================================================
// Merge by reference
// ========================================================================

/// Store wrapper that records calls and can fail loads for a given key
struct RecordingStore {
    inner: MemoryStore,
    fail_key: Option<String>,
    puts: Mutex<usize>,
    gets: Mutex<Vec<String>>,
}

impl RecordingStore {
    fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_key: None,
            puts: Mutex::new(0),
            gets: Mutex::new(Vec::new()),
        }
    }

    fn puts(&self) -> usize {
        *self.puts.lock().unwrap()
    }
}

impl DocumentStore for RecordingStore {
    fn put(
        &self,
        ctx: &ActivityContext,
        schema: &str,
        count: usize,
        payload: Vec<u8>,
    ) -> Result<DataRef, StoreError> {
        *self.puts.lock().unwrap() += 1;
        self.inner.put(ctx, schema, count, payload)
    }

    fn get(&self, ctx: &ActivityContext, data_ref: &DataRef) -> Result<Vec<u8>, StoreError> {
        self.gets.lock().unwrap().push(data_ref.key.clone());
        if self.fail_key.as_deref() == Some(data_ref.key.as_str()) {
            return Err(StoreError::NotFound(data_ref.key.clone()));
        }
        self.inner.get(ctx, data_ref)
    }
}

#[test]
fn test_merge_by_reference() {
    let ctx = ActivityContext::new("transform.MergeRefs");
    let store = MemoryStore::new();

    let a = store_documents(&ctx, &store, &[doc("1", "a"), doc("2", "a")]).unwrap();
    let b = store_documents(&ctx, &store, &[doc("3", "b")]).unwrap();
    let c = store_documents(&ctx, &store, &[]).unwrap();

    let out = merge_by_reference(&ctx, &store, &[a, b, c]).unwrap();
    assert_eq!(out.count, 3);
    assert_eq!(out.data_ref.count, 3);
    assert_eq!(out.data_ref.schema, SCHEMA_DOCUMENTS);

    let merged = load_documents(&ctx, &store, &out.data_ref).unwrap();
    assert_eq!(ids(&merged), vec!["1", "2", "3"]);
}

#[test]
fn test_merge_by_reference_no_refs_stores_empty() {
    let ctx = ActivityContext::new("t");
    let store = MemoryStore::new();
    let out = merge_by_reference(&ctx, &store, &[]).unwrap();
    assert_eq!(out.count, 0);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_merge_by_reference_fails_fast_on_load_error() {
    let ctx = ActivityContext::new("t");
    let mut store = RecordingStore::new();

    let a = store_documents(&ctx, &store, &[doc("1", "a")]).unwrap();
    let b = store_documents(&ctx, &store, &[doc("2", "b")]).unwrap();
    let c = store_documents(&ctx, &store, &[doc("3", "c")]).unwrap();
    store.fail_key = Some(b.key.clone());
    let puts_before = store.puts();

    let err = merge_by_reference(&ctx, &store, &[a.clone(), b.clone(), c]).unwrap_err();

    match &err {
        TransformError::Load { index, key, .. } => {
            assert_eq!(*index, 1);
            assert_eq!(key, &b.key);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.puts(), puts_before, "store must not be called");
    assert_eq!(*store.gets.lock().unwrap(), vec![a.key, b.key]);
}

#[test]
fn test_merge_by_reference_schema_mismatch() {
    let ctx = ActivityContext::new("t");
    let store = RecordingStore::new();

    let good = store_documents(&ctx, &store, &[doc("1", "a")]).unwrap();
    let mut foreign = store_documents(&ctx, &store, &[doc("2", "b")]).unwrap();
    foreign.schema = "resolute.issues.v1".to_string();

    let err = merge_by_reference(&ctx, &store, &[good, foreign]).unwrap_err();
    assert!(err.is_schema_mismatch());
    assert_eq!(store.puts(), 2);
    // schema is checked before the backend is asked for the payload
    assert_eq!(store.gets.lock().unwrap().len(), 1);
}
