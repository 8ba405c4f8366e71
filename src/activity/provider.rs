use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{
    CHUNK, ChunkInput, MERGE, MERGE_AND_CHUNK, MERGE_REFS, MergeAndChunkInput, MergeInput,
    MergeRefsInput, chunk_activity, merge_activity, merge_and_chunk_activity, merge_refs_activity,
};
use crate::context::ActivityContext;
use crate::document::DocumentBatch;
use crate::error::TransformError;
use crate::store::DocumentStore;

pub const PROVIDER_NAME: &str = "resolute-transform";
pub const PROVIDER_VERSION: &str = "1.0.0";

type Handler = Box<dyn Fn(&ActivityContext, Value) -> Result<Value, TransformError> + Send + Sync>;

/// Name -> activity dispatch table with JSON input and output
pub struct Provider {
    name: String,
    version: String,
    activities: HashMap<String, Handler>,
}

impl Provider {
    /// Create an empty provider
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            activities: HashMap::new(),
        }
    }

    /// Provider with every transform activity registered.
    ///
    /// `MergeRefs` persists through `store`.
    pub fn transform(store: Arc<dyn DocumentStore>) -> Self {
        Self::new(PROVIDER_NAME, PROVIDER_VERSION)
            .add_activity(MERGE, |ctx, input: MergeInput<DocumentBatch>| {
                merge_activity(ctx, input)
            })
            .add_activity(MERGE_REFS, move |ctx, input: MergeRefsInput| {
                merge_refs_activity(ctx, store.as_ref(), input)
            })
            .add_activity(CHUNK, chunk_activity)
            .add_activity(MERGE_AND_CHUNK, |ctx, input: MergeAndChunkInput<DocumentBatch>| {
                merge_and_chunk_activity(ctx, input)
            })
    }

    /// Register a typed activity under `name`
    ///
    /// # Example
    /// ```ignore
    /// provider.add_activity("transform.Chunk", chunk_activity);
    /// ```
    pub fn add_activity<I, O, F>(mut self, name: impl Into<String>, activity: F) -> Self
    where
        I: DeserializeOwned + 'static,
        O: Serialize + 'static,
        F: Fn(&ActivityContext, I) -> Result<O, TransformError> + Send + Sync + 'static,
    {
        let handler: Handler = Box::new(move |ctx: &ActivityContext, payload: Value| {
            let input: I = serde_json::from_value(payload)?;
            let output = activity(ctx, input)?;
            Ok(serde_json::to_value(output)?)
        });
        self.activities.insert(name.into(), handler);
        self
    }

    /// Run the activity registered under `name`
    pub fn invoke(
        &self,
        name: &str,
        ctx: &ActivityContext,
        input: Value,
    ) -> Result<Value, TransformError> {
        let handler = self
            .activities
            .get(name)
            .ok_or_else(|| TransformError::UnknownActivity(name.to_string()))?;
        handler(ctx, input)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Get the number of registered activities
    pub fn activity_count(&self) -> usize {
        self.activities.len()
    }

    /// List all registered activity names, sorted
    pub fn activity_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.activities.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}
