use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

use super::{DataRef, DocumentStore, StoreError, checksum};
use crate::context::ActivityContext;

/// Process-local store, mostly for tests and one-shot pipelines
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, (DataRef, Vec<u8>)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored payloads
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DocumentStore for MemoryStore {
    fn put(
        &self,
        ctx: &ActivityContext,
        schema: &str,
        count: usize,
        payload: Vec<u8>,
    ) -> Result<DataRef, StoreError> {
        ctx.ensure_active()?;

        let data_ref = DataRef {
            key: Uuid::new_v4().to_string(),
            schema: schema.to_string(),
            count,
            checksum: checksum(&payload),
        };

        self.entries
            .write()
            .map_err(|_| StoreError::Poisoned)?
            .insert(data_ref.key.clone(), (data_ref.clone(), payload));

        Ok(data_ref)
    }

    fn get(&self, ctx: &ActivityContext, data_ref: &DataRef) -> Result<Vec<u8>, StoreError> {
        ctx.ensure_active()?;

        self.entries
            .read()
            .map_err(|_| StoreError::Poisoned)?
            .get(&data_ref.key)
            .map(|(_, payload)| payload.clone())
            .ok_or_else(|| StoreError::NotFound(data_ref.key.clone()))
    }
}
