use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chunker::ChunkOptions;

/// Pipeline configuration loaded from a TOML file.
///
/// ```toml
/// [chunk]
/// max_tokens = 256
/// overlap = 32
///
/// [store]
/// path = "chunkmerge.db"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub chunk: ChunkOptions,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file. `None` keeps the store in memory.
    pub path: Option<PathBuf>,
}

/// Values given on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub max_tokens: Option<usize>,
    pub overlap: Option<usize>,
    pub separator: Option<String>,
    pub store: Option<PathBuf>,
}

impl PipelineConfig {
    /// Parse a config from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("failed to parse config")
    }

    /// Load config from `path`, or the defaults when no path is given.
    ///
    /// A path that was given but does not exist is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            debug!("no config file given, using defaults");
            return Ok(Self::default());
        };

        debug!(config_path = %path.display(), "loading config");
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Apply command-line values on top of the file values
    pub fn apply(mut self, overrides: Overrides) -> Self {
        if let Some(max_tokens) = overrides.max_tokens {
            self.chunk.max_tokens = max_tokens;
        }
        if let Some(overlap) = overrides.overlap {
            self.chunk.overlap = overlap;
        }
        if let Some(separator) = overrides.separator {
            self.chunk.separator = separator;
        }
        if overrides.store.is_some() {
            self.store.path = overrides.store;
        }
        self
    }
}
