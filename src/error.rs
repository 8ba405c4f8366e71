use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("load documents from reference {index} ({key}): {source}")]
    Load {
        index: usize,
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("store documents: {0}")]
    Store(#[source] StoreError),

    #[error("unknown activity: {0}")]
    UnknownActivity(String),

    #[error("invalid activity payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

impl TransformError {
    /// True if the failure came from a schema tag mismatch on load
    pub fn is_schema_mismatch(&self) -> bool {
        matches!(
            self,
            TransformError::Load {
                source: StoreError::SchemaMismatch { .. },
                ..
            }
        )
    }
}
