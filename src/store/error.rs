use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("schema mismatch: expected {expected}, got {got}")]
    SchemaMismatch { expected: String, got: String },

    #[error("checksum mismatch for reference {key}")]
    ChecksumMismatch { key: String },

    #[error("reference not found: {0}")]
    NotFound(String),

    #[error("marshal documents: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("sqlite: {0}")]
    Backend(#[from] rusqlite::Error),

    #[error("operation cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("store lock poisoned")]
    Poisoned,
}
