//! SQLite tree store
//!
//! This module provides a SQLite-based implementation of the [`TreeStore`]
//! trait. Categories and products are stored as rows; a save replaces every
//! row inside one transaction.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{StorageError, StorageResult, TreeStore};
use crate::tree::{NodeId, ProductEntry, SiteTree};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
}

/// A `categories` row as read back from the database
struct CategoryRow {
    id: i64,
    site: String,
    parent_id: Option<i64>,
    name: String,
    url: Option<String>,
    crawled_at: Option<String>,
}

impl SqliteStore {
    /// Opens or creates the database at `path`
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn load_categories(&self) -> StorageResult<Vec<CategoryRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, site, parent_id, name, url, crawled_at FROM categories ORDER BY id",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(CategoryRow {
                    id: row.get(0)?,
                    site: row.get(1)?,
                    parent_id: row.get(2)?,
                    name: row.get(3)?,
                    url: row.get(4)?,
                    crawled_at: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}

fn parse_timestamp(raw: &str) -> StorageResult<DateTime<Utc>> {
    crate::tree::parse_timestamp(raw)
        .map_err(|e| StorageError::Corrupt(format!("invalid crawled_at '{}': {}", raw, e)))
}

impl TreeStore for SqliteStore {
    fn load(&self) -> StorageResult<SiteTree> {
        let mut data = SiteTree::new();
        let mut handles: HashMap<i64, (String, NodeId)> = HashMap::new();

        // Rows are written parents-first, so ordering by id sees every parent
        // before its children
        for row in self.load_categories()? {
            let tree = data.site_mut(&row.site);
            let id = match row.parent_id {
                None => tree.register_root(&row.name, row.url),
                Some(parent_id) => {
                    let parent = match handles.get(&parent_id) {
                        Some((site, parent)) if *site == row.site => *parent,
                        _ => {
                            return Err(StorageError::Corrupt(format!(
                                "category {} references unknown parent {}",
                                row.id, parent_id
                            )))
                        }
                    };
                    tree.register_child(parent, &row.name, row.url)
                }
            };

            if let Some(raw) = row.crawled_at.as_deref() {
                tree.mark_crawled(id, parse_timestamp(raw)?);
            }
            handles.insert(row.id, (row.site, id));
        }

        let mut stmt = self
            .conn
            .prepare("SELECT category_id, name, url FROM products ORDER BY category_id, position")?;
        let products = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                ProductEntry {
                    name: row.get(1)?,
                    url: row.get(2)?,
                },
            ))
        })?;

        for product in products {
            let (category_id, entry) = product?;
            let (site, id) = handles.get(&category_id).ok_or_else(|| {
                StorageError::Corrupt(format!(
                    "product references unknown category {}",
                    category_id
                ))
            })?;
            data.site_mut(site).push_product(*id, entry);
        }

        Ok(data)
    }

    fn save(&mut self, tree: &SiteTree) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM products", [])?;
        tx.execute("DELETE FROM categories", [])?;

        let mut next_id: i64 = 1;
        for (site, categories) in tree.sites() {
            let mut row_ids: HashMap<NodeId, i64> = HashMap::new();

            // Arena order registers parents before children
            for (node_id, node) in categories.iter() {
                let parent_id = node.parent().and_then(|p| row_ids.get(&p).copied());
                tx.execute(
                    "INSERT INTO categories (id, site, parent_id, name, url, crawled_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        next_id,
                        site,
                        parent_id,
                        node.name,
                        node.url,
                        node.crawled_at.map(|at| at.to_rfc3339())
                    ],
                )?;

                for (position, product) in node.products.iter().enumerate() {
                    tx.execute(
                        "INSERT INTO products (category_id, position, name, url) VALUES (?1, ?2, ?3, ?4)",
                        params![next_id, position as i64, product.name, product.url],
                    )?;
                }

                row_ids.insert(node_id, next_id);
                next_id += 1;
            }
        }

        tx.commit()?;
        tracing::debug!("Wrote {} categories to SQLite store", next_id - 1);
        Ok(())
    }
}
