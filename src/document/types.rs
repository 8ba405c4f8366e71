use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Free-form string attributes attached to a document
pub type Metadata = HashMap<String, String>;

/// Standard record flowing through the merge/chunk pipeline.
///
/// Every upstream provider maps its data onto this shape. A document whose
/// `parent_id` is non-empty is a chunk of the document with that id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    /// `None` and an empty map are kept distinct through copies and storage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub chunk_index: usize,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub parent_id: String,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

/// Id of chunk `index` derived from `parent_id`, e.g. `doc-7#12`
pub fn chunk_id(parent_id: &str, index: usize) -> String {
    format!("{}#{}", parent_id, index)
}

impl Document {
    /// Create a document with the required fields, an empty metadata map and
    /// `updated_at` set to now
    pub fn new(id: impl Into<String>, content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            source: source.into(),
            metadata: Some(Metadata::new()),
            updated_at: Utc::now(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Add a metadata entry, creating the map if the document has none
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata
            .get_or_insert_with(Metadata::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = updated_at;
        self
    }

    /// Mark this document as chunk `index` of `parent_id`
    pub fn as_chunk(mut self, parent_id: impl Into<String>, index: usize) -> Self {
        self.parent_id = parent_id.into();
        self.chunk_index = index;
        self.id = chunk_id(&self.parent_id, index);
        self
    }

    /// True if this document was split out of a larger one
    pub fn is_chunk(&self) -> bool {
        !self.parent_id.is_empty()
    }
}

/// A document paired with its vector embedding, as handed to an index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentWithEmbedding {
    pub document: Document,
    pub embedding: Vec<f32>,
}

impl DocumentWithEmbedding {
    pub fn new(document: Document, embedding: Vec<f32>) -> Self {
        Self {
            document,
            embedding,
        }
    }

    pub fn dimensions(&self) -> usize {
        self.embedding.len()
    }
}
