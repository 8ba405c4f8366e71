// Public API exports
pub mod activity;
pub mod chunker;
pub mod config;
pub mod context;
pub mod document;
pub mod error;
pub mod merge;
pub mod store;

// Re-export main types for convenience
pub use document::{Document, DocumentBatch, DocumentSource, DocumentWithEmbedding, Metadata};

pub use chunker::{
    ChunkOptions, DEFAULT_MAX_TOKENS, DEFAULT_OVERLAP, DEFAULT_SEPARATOR, chunk_document,
    chunk_documents, estimate_tokens, tokenize,
};

pub use merge::{
    MergeRefsOutput, merge_and_chunk, merge_by_reference, merge_document_lists, merge_sources,
};

pub use store::{
    DataRef, DocumentStore, MemoryStore, SCHEMA_DOCUMENTS, SqliteStore, StoreError, StoreStats,
    load_documents, store_documents,
};

pub use activity::{PROVIDER_NAME, PROVIDER_VERSION, Provider};
pub use config::{Overrides, PipelineConfig, StoreConfig};
pub use context::ActivityContext;
pub use error::TransformError;
