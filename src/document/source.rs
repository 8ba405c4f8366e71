use serde::{Deserialize, Serialize};

use super::Document;

/// Anything that can hand over an ordered list of documents.
///
/// Object safe, so sources of different concrete types can be merged
/// together through `&dyn DocumentSource`.
pub trait DocumentSource {
    /// Documents in the order the source produced them
    fn documents(&self) -> &[Document];

    /// Number of documents this source yields
    fn document_count(&self) -> usize {
        self.documents().len()
    }
}

impl DocumentSource for Vec<Document> {
    fn documents(&self) -> &[Document] {
        self
    }
}

impl DocumentSource for [Document] {
    fn documents(&self) -> &[Document] {
        self
    }
}

impl<T: DocumentSource + ?Sized> DocumentSource for &T {
    fn documents(&self) -> &[Document] {
        (**self).documents()
    }
}

/// A page of documents fetched from one provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentBatch {
    pub documents: Vec<Document>,
    /// Provider the batch came from
    #[serde(default)]
    pub source: String,
    /// Opaque position for fetching the next batch
    #[serde(default)]
    pub cursor: String,
}

impl DocumentBatch {
    pub fn new(source: impl Into<String>, documents: Vec<Document>) -> Self {
        Self {
            documents,
            source: source.into(),
            cursor: String::new(),
        }
    }

    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = cursor.into();
        self
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DocumentSource for DocumentBatch {
    fn documents(&self) -> &[Document] {
        &self.documents
    }
}
