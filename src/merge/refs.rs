use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::ActivityContext;
use crate::document::Document;
use crate::error::TransformError;
use crate::store::{DataRef, DocumentStore, load_documents, store_documents};

/// Result of merging persisted collections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRefsOutput {
    #[serde(rename = "ref")]
    pub data_ref: DataRef,
    pub count: usize,
}

/// Load every reference in order, concatenate, and store the result as one
/// new collection.
///
/// Stops at the first reference that fails to load; nothing is stored in
/// that case.
pub fn merge_by_reference(
    ctx: &ActivityContext,
    store: &(impl DocumentStore + ?Sized),
    refs: &[DataRef],
) -> Result<MergeRefsOutput, TransformError> {
    let mut all_docs: Vec<Document> = Vec::new();

    for (index, data_ref) in refs.iter().enumerate() {
        let docs = load_documents(ctx, store, data_ref).map_err(|source| TransformError::Load {
            index,
            key: data_ref.key.clone(),
            source,
        })?;
        debug!(index, key = %data_ref.key, count = docs.len(), "loaded reference for merge");
        all_docs.extend(docs);
    }

    let data_ref = store_documents(ctx, store, &all_docs).map_err(TransformError::Store)?;

    Ok(MergeRefsOutput {
        count: all_docs.len(),
        data_ref,
    })
}
