mod splitter;
mod tokenizer;


use serde::{Deserialize, Serialize};

pub use splitter::{chunk_document, chunk_documents};
pub use tokenizer::{estimate_tokens, tokenize};

/// Maximum tokens per chunk when none is configured
pub const DEFAULT_MAX_TOKENS: usize = 512;

/// Tokens repeated between consecutive chunks by default
pub const DEFAULT_OVERLAP: usize = 50;

/// Preferred paragraph boundary
pub const DEFAULT_SEPARATOR: &str = "\n\n";

/// Chunking configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkOptions {
    /// Maximum tokens per chunk. Tokens are approximated as words.
    pub max_tokens: usize,
    /// Trailing tokens of a chunk repeated at the start of the next one
    pub overlap: usize,
    /// Paragraph separator the tokenizer splits on first
    pub separator: String,
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            overlap: DEFAULT_OVERLAP,
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

impl ChunkOptions {
    pub fn new(max_tokens: usize, overlap: usize) -> Self {
        Self {
            max_tokens,
            overlap,
            ..Default::default()
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Options actually used for chunking.
    ///
    /// A zero `max_tokens` means "not configured" and swaps in the whole
    /// default set, not just the missing field.
    pub fn resolved(&self) -> ChunkOptions {
        if self.max_tokens == 0 {
            ChunkOptions::default()
        } else {
            self.clone()
        }
    }

    /// Distance the window moves between chunks, never less than one token
    pub fn step(&self) -> usize {
        self.max_tokens.saturating_sub(self.overlap).max(1)
    }
}
