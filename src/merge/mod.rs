//! Combining documents from several producers into one ordered list.
//!
//! Sources are visited in the order given and each source's documents keep
//! their order. Nothing is deduplicated, re-sorted or mutated.

mod refs;

#[cfg(test)]
mod tests;

use crate::chunker::{ChunkOptions, chunk_documents};
use crate::document::{Document, DocumentSource};

pub use refs::{MergeRefsOutput, merge_by_reference};

/// Merge any number of document sources into a single list
pub fn merge_sources<S: DocumentSource>(sources: &[S]) -> Vec<Document> {
    let total = sources.iter().map(|s| s.document_count()).sum();
    let mut docs = Vec::with_capacity(total);
    for source in sources {
        docs.extend_from_slice(source.documents());
    }
    docs
}

/// Merge already materialized document lists
pub fn merge_document_lists<L: AsRef<[Document]>>(lists: &[L]) -> Vec<Document> {
    let total = lists.iter().map(|l| l.as_ref().len()).sum();
    let mut docs = Vec::with_capacity(total);
    for list in lists {
        docs.extend_from_slice(list.as_ref());
    }
    docs
}

/// Merge the sources, then chunk every resulting document in merge order
pub fn merge_and_chunk<S: DocumentSource>(sources: &[S], options: &ChunkOptions) -> Vec<Document> {
    chunk_documents(&merge_sources(sources), options)
}
