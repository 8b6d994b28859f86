//! Crawler module for category traversal and product extraction
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching
//! - HTML extraction of subcategories, products and pagination controls
//! - Depth-bounded category traversal and listing pagination

mod coordinator;
mod fetcher;
mod parser;

pub use coordinator::{run_crawl, Coordinator, RunStats};
pub use fetcher::{build_http_client, fetch_page, FetchError};
pub use parser::{
    parse_category_page, parse_listing_page, CategoryPage, ListingContents, ListingPage,
    NextPage, ProductLink, StructureError, SubcategoryLink,
};
