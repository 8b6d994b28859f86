//! JSON document store
//!
//! The whole [`SiteTree`] lives in one pretty-printed JSON file. Saving writes
//! a sibling temporary file first and renames it over the target, so an
//! interrupted save never leaves a truncated document behind.

use crate::storage::traits::{StorageError, StorageResult, TreeStore};
use crate::tree::SiteTree;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Tree store backed by a single JSON file
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl TreeStore for JsonStore {
    fn load(&self) -> StorageResult<SiteTree> {
        if !self.path.exists() {
            tracing::debug!("No tree at {}, starting empty", self.path.display());
            return Ok(SiteTree::new());
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        if content.trim().is_empty() {
            return Ok(SiteTree::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    fn save(&mut self, tree: &SiteTree) -> StorageResult<()> {
        let json = serde_json::to_string_pretty(tree)?;
        let temp = self.temp_path();

        std::fs::write(&temp, json).map_err(|e| self.io_error(e))?;
        std::fs::rename(&temp, &self.path).map_err(|e| self.io_error(e))?;

        tracing::debug!("Wrote tree to {}", self.path.display());
        Ok(())
    }
}
