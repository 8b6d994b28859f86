//! Configuration module
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and resolving one configured site into a [`SiteProfile`] ready for
//! crawling.
//!
//! # Example
//!
//! ```no_run
//! use ecomm_crawler::config::{load_config, SiteProfile};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("ecomm_config.toml")).unwrap();
//! let site = SiteProfile::from_config(&config, "demo").unwrap();
//! println!("Crawling {} from {}", site.id, site.base_url);
//! ```

mod parser;
mod selectors;
mod site;
mod types;
mod validation;

pub use types::{
    CategoryEntry, Config, CrawlerConfig, OutputConfig, SiteConfig, StoreFormat, UserAgentConfig,
};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use selectors::{SelectorRole, SelectorSet};
pub use site::SiteProfile;
