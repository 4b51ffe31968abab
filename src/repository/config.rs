//! Repository configuration.
//!
//! [`RepositoryConfig`] fixes the base directory of a repository and its
//! [`FlushMode`]. It is serde-serializable so it can live next to the rest
//! of a node's configuration as JSON.

use super::error::LogError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Durability policy applied by [`append`](crate::LogRepository::append).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlushMode {
    /// Force the payload, then the index record, to stable storage before
    /// `append` returns (default). An index record never becomes durable
    /// before the payload it points at. Required for consensus logs.
    #[default]
    SyncEveryAppend,

    /// Leave both files in the OS page cache. The caller decides when to
    /// reach a durability point with [`sync`](crate::LogRepository::sync).
    Buffered,
}

impl std::fmt::Display for FlushMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlushMode::SyncEveryAppend => f.pad("SyncEveryAppend"),
            FlushMode::Buffered => f.pad("Buffered"),
        }
    }
}

impl FlushMode {
    /// Returns `true` if every append is a durability point.
    #[must_use]
    #[inline]
    pub fn syncs_every_append(self) -> bool {
        self == FlushMode::SyncEveryAppend
    }
}

/// Configuration of a [`LogRepository`](crate::LogRepository).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Directory holding the segment files. Created if missing.
    pub base_dir: PathBuf,

    /// Durability policy for appends.
    #[serde(default)]
    pub flush_mode: FlushMode,
}

impl RepositoryConfig {
    /// Configuration for `base_dir` with the default flush mode.
    #[must_use]
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            flush_mode: FlushMode::default(),
        }
    }

    /// Replace the flush mode.
    #[must_use]
    pub fn with_flush_mode(mut self, flush_mode: FlushMode) -> Self {
        self.flush_mode = flush_mode;
        self
    }

    /// Parse a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Config`] if the document is not valid.
    pub fn from_json(json: &str) -> Result<Self, LogError> {
        serde_json::from_str(json).map_err(|e| LogError::Config {
            message: e.to_string(),
        })
    }

    /// Serialize the configuration to JSON.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Config`] if serialization fails.
    pub fn to_json(&self) -> Result<String, LogError> {
        serde_json::to_string(self).map_err(|e| LogError::Config {
            message: e.to_string(),
        })
    }
}
