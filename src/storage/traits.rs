//! Storage traits and error types
//!
//! This module defines the trait interface for tree store backends and
//! associated error types.

use crate::tree::SiteTree;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Corrupt store: {0}")]
    Corrupt(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for tree store backends
///
/// A store holds exactly one [`SiteTree`]. It is read as a whole at the start
/// of a run and overwritten as a whole at the end; there is no incremental
/// merge on disk.
pub trait TreeStore {
    /// Loads the stored tree, or an empty tree if nothing was stored yet
    fn load(&self) -> StorageResult<SiteTree>;

    /// Replaces the stored tree with `tree`
    fn save(&mut self, tree: &SiteTree) -> StorageResult<()>;
}
