//! ecomm-crawler: a category-tree crawler for e-commerce sites
//!
//! This crate walks a site's category hierarchy starting from configured
//! top-level categories, descends into subcategories up to a depth limit,
//! paginates through product listings of leaf categories and persists the
//! discovered tree between runs.

pub mod config;
pub mod crawler;
pub mod output;
pub mod storage;
pub mod tree;
pub mod url;

use thiserror::Error;

/// Main error type for crawler operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Category tree error: {0}")]
    Tree(#[from] tree::TreeError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Run deadline of {seconds}s exceeded")]
    Deadline { seconds: u64 },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Unknown site '{0}'")]
    UnknownSite(String),

    #[error("Site '{site}' is missing required selector '{role}'")]
    MissingSelector { site: String, role: String },

    #[error("Site '{site}' has invalid selector '{role}': {message}")]
    InvalidSelector {
        site: String,
        role: String,
        message: String,
    },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to resolve '{href}' against {base}: {source}")]
    Join {
        href: String,
        base: String,
        source: ::url::ParseError,
    },
}

/// Result type alias for crawler operations
pub type Result<T> = std::result::Result<T, CrawlError>;

// Re-export commonly used types
pub use config::{Config, SiteProfile};
pub use crawler::{run_crawl, Coordinator, RunStats};
pub use tree::{CategoryNode, CategoryPath, CategoryTree, NodeId, ProductEntry, SiteTree};
