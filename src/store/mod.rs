mod error;
mod memory;
mod sqlite;


use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::context::ActivityContext;
use crate::document::Document;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use sqlite::{SqliteStore, StoreStats};

/// Schema tag for persisted document collections
pub const SCHEMA_DOCUMENTS: &str = "resolute.documents.v1";

/// Handle to a persisted collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataRef {
    /// Backend key of the payload
    pub key: String,
    /// Schema tag of the payload
    pub schema: String,
    /// Number of records in the payload
    pub count: usize,
    /// SHA-256 of the payload, hex encoded. Empty means unverified.
    #[serde(default)]
    pub checksum: String,
}

/// Payload-level persistence backend.
///
/// Backends only move bytes. Serialization, schema checks and checksums
/// live in [`store_documents`] / [`load_documents`].
pub trait DocumentStore: Send + Sync {
    /// Persist `payload` and return a reference to it, checksum included
    fn put(
        &self,
        ctx: &ActivityContext,
        schema: &str,
        count: usize,
        payload: Vec<u8>,
    ) -> Result<DataRef, StoreError>;

    /// Fetch the payload behind `data_ref`
    fn get(&self, ctx: &ActivityContext, data_ref: &DataRef) -> Result<Vec<u8>, StoreError>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for std::sync::Arc<S> {
    fn put(
        &self,
        ctx: &ActivityContext,
        schema: &str,
        count: usize,
        payload: Vec<u8>,
    ) -> Result<DataRef, StoreError> {
        (**self).put(ctx, schema, count, payload)
    }

    fn get(&self, ctx: &ActivityContext, data_ref: &DataRef) -> Result<Vec<u8>, StoreError> {
        (**self).get(ctx, data_ref)
    }
}

/// Compute SHA256 hash of a payload
pub fn checksum(payload: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload);
    hex::encode(hasher.finalize())
}

/// Serialize documents and persist them as one collection
pub fn store_documents(
    ctx: &ActivityContext,
    store: &(impl DocumentStore + ?Sized),
    docs: &[Document],
) -> Result<DataRef, StoreError> {
    let payload = serde_json::to_vec(docs)?;
    let data_ref = store.put(ctx, SCHEMA_DOCUMENTS, docs.len(), payload)?;

    debug!(key = %data_ref.key, count = data_ref.count, "stored documents");
    Ok(data_ref)
}

/// Load the documents behind `data_ref`.
///
/// The schema tag is checked before the backend is touched.
pub fn load_documents(
    ctx: &ActivityContext,
    store: &(impl DocumentStore + ?Sized),
    data_ref: &DataRef,
) -> Result<Vec<Document>, StoreError> {
    if data_ref.schema != SCHEMA_DOCUMENTS {
        return Err(StoreError::SchemaMismatch {
            expected: SCHEMA_DOCUMENTS.to_string(),
            got: data_ref.schema.clone(),
        });
    }

    let payload = store.get(ctx, data_ref)?;

    if !data_ref.checksum.is_empty() && checksum(&payload) != data_ref.checksum {
        warn!(key = %data_ref.key, "payload checksum does not match reference");
        return Err(StoreError::ChecksumMismatch {
            key: data_ref.key.clone(),
        });
    }

    let docs: Vec<Document> = serde_json::from_slice(&payload)?;
    debug!(key = %data_ref.key, count = docs.len(), "loaded documents");
    Ok(docs)
}
