//! Database schema definitions
//!
//! This module contains the SQL schema of the SQLite tree store.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per category node; parent_id is NULL for top-level categories
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY,
    site TEXT NOT NULL,
    parent_id INTEGER REFERENCES categories(id),
    name TEXT NOT NULL,
    url TEXT,
    crawled_at TEXT
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_categories_sibling
    ON categories(site, IFNULL(parent_id, 0), name);
CREATE INDEX IF NOT EXISTS idx_categories_parent ON categories(parent_id);

-- Products in append order per category
CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    category_id INTEGER NOT NULL REFERENCES categories(id),
    position INTEGER NOT NULL,
    name TEXT NOT NULL,
    url TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_products_category ON products(category_id);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
