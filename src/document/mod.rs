mod source;
mod types;


pub use source::{DocumentBatch, DocumentSource};
pub use types::{Document, DocumentWithEmbedding, Metadata, chunk_id};
