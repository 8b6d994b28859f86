//! Storage module for persisting the category tree
//!
//! This module handles loading the [`SiteTree`](crate::tree::SiteTree) at the
//! start of a run and overwriting it at the end, either as a JSON document or
//! in a SQLite database.

mod json;
mod schema;
mod sqlite;
mod traits;

pub use json::JsonStore;
pub use sqlite::SqliteStore;
pub use traits::{StorageError, StorageResult, TreeStore};

use crate::config::{OutputConfig, StoreFormat};
use std::path::Path;

/// Opens the store described by the output configuration
///
/// # Arguments
///
/// * `output` - The output configuration naming the path and backend
///
/// # Returns
///
/// * `Ok(Box<dyn TreeStore + Send>)` - Store ready for loading and saving
/// * `Err(StorageError)` - Failed to open the backend
pub fn open_store(output: &OutputConfig) -> StorageResult<Box<dyn TreeStore + Send>> {
    let path = Path::new(&output.data_path);
    match output.format {
        StoreFormat::Json => Ok(Box::new(JsonStore::new(path))),
        StoreFormat::Sqlite => Ok(Box::new(SqliteStore::new(path)?)),
    }
}
