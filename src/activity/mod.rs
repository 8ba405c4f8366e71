//! Transforms in runner shape: `(context, input) -> Result<output, error>`.
//!
//! Each activity takes a typed input and returns a typed output so a task
//! runner can register and invoke it as an independent named unit.

mod provider;


use serde::{Deserialize, Serialize};
use tracing::info;

use crate::chunker::{ChunkOptions, chunk_documents};
use crate::context::ActivityContext;
use crate::document::{Document, DocumentSource};
use crate::error::TransformError;
use crate::merge::{MergeRefsOutput, merge_by_reference, merge_sources};
use crate::store::{DataRef, DocumentStore};

pub use provider::{Provider, PROVIDER_NAME, PROVIDER_VERSION};

pub const MERGE: &str = "transform.Merge";
pub const MERGE_REFS: &str = "transform.MergeRefs";
pub const CHUNK: &str = "transform.Chunk";
pub const MERGE_AND_CHUNK: &str = "transform.MergeAndChunk";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeInput<S> {
    pub sources: Vec<S>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergeOutput {
    pub documents: Vec<Document>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeRefsInput {
    pub refs: Vec<DataRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkInput {
    pub documents: Vec<Document>,
    #[serde(default)]
    pub options: ChunkOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkOutput {
    pub documents: Vec<Document>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeAndChunkInput<S> {
    pub sources: Vec<S>,
    #[serde(default)]
    pub options: ChunkOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergeAndChunkOutput {
    pub documents: Vec<Document>,
    pub count: usize,
}

impl DocumentSource for MergeOutput {
    fn documents(&self) -> &[Document] {
        &self.documents
    }
}

impl DocumentSource for ChunkOutput {
    fn documents(&self) -> &[Document] {
        &self.documents
    }
}

impl DocumentSource for MergeAndChunkOutput {
    fn documents(&self) -> &[Document] {
        &self.documents
    }
}

/// Combine several document sources into one list
pub fn merge_activity<S: DocumentSource>(
    ctx: &ActivityContext,
    input: MergeInput<S>,
) -> Result<MergeOutput, TransformError> {
    let documents = merge_sources(&input.sources);
    let count = documents.len();

    info!(activity = ctx.label(), sources = input.sources.len(), count, "merged sources");
    Ok(MergeOutput { documents, count })
}

/// Merge persisted collections into one new collection
pub fn merge_refs_activity(
    ctx: &ActivityContext,
    store: &(impl DocumentStore + ?Sized),
    input: MergeRefsInput,
) -> Result<MergeRefsOutput, TransformError> {
    let output = merge_by_reference(ctx, store, &input.refs)?;

    info!(
        activity = ctx.label(),
        refs = input.refs.len(),
        count = output.count,
        key = %output.data_ref.key,
        "merged references"
    );
    Ok(output)
}

/// Split large documents into overlapping chunks
pub fn chunk_activity(
    ctx: &ActivityContext,
    input: ChunkInput,
) -> Result<ChunkOutput, TransformError> {
    let documents = chunk_documents(&input.documents, &input.options);
    let count = documents.len();

    info!(activity = ctx.label(), input = input.documents.len(), count, "chunked documents");
    Ok(ChunkOutput { documents, count })
}

/// Merge the sources and chunk the result in one step
pub fn merge_and_chunk_activity<S: DocumentSource>(
    ctx: &ActivityContext,
    input: MergeAndChunkInput<S>,
) -> Result<MergeAndChunkOutput, TransformError> {
    let merged = merge_sources(&input.sources);
    let documents = chunk_documents(&merged, &input.options);
    let count = documents.len();

    info!(
        activity = ctx.label(),
        sources = input.sources.len(),
        merged = merged.len(),
        count,
        "merged and chunked"
    );
    Ok(MergeAndChunkOutput { documents, count })
}
