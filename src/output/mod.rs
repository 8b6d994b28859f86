//! Output module for reporting on the stored category tree
//!
//! This module handles:
//! - Computing and printing tree statistics
//! - Generating markdown summaries of crawl results

mod markdown;
pub mod stats;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{load_statistics, print_statistics, TreeStatistics};
