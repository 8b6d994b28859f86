//! Statistics over a stored category tree
//!
//! This module provides functionality for summarizing a site's category tree
//! and displaying the figures.

use crate::tree::{CategoryTree, SiteTree};

/// Summary of one site's category tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeStatistics {
    /// Site identifier
    pub site: String,

    /// Number of top-level categories
    pub top_level: usize,

    /// Number of nodes at every level
    pub total_categories: usize,

    /// Nodes without subcategories
    pub leaf_categories: usize,

    /// Leaves that went through at least one listing pass
    pub crawled_leaves: usize,

    /// Product entries across all nodes, duplicates included
    pub total_products: usize,

    /// Deepest level reached (top level is 0)
    pub max_depth: usize,

    /// Most recent crawl timestamp, RFC 3339
    pub last_crawled_at: Option<String>,
}

impl TreeStatistics {
    /// Computes statistics for one site's tree
    pub fn from_tree(site: &str, tree: &CategoryTree) -> Self {
        let mut stats = TreeStatistics {
            site: site.to_string(),
            top_level: tree.roots().len(),
            total_categories: tree.len(),
            total_products: tree.product_count(),
            ..Default::default()
        };

        let mut last = None;
        for (id, node) in tree.iter() {
            if node.is_leaf() {
                stats.leaf_categories += 1;
                if node.crawled_at.is_some() {
                    stats.crawled_leaves += 1;
                }
            }
            stats.max_depth = stats.max_depth.max(tree.path_of(id).depth());
            last = last.max(node.crawled_at);
        }
        stats.last_crawled_at = last.map(|at| at.to_rfc3339());

        stats
    }
}

/// Computes statistics for every site in the stored tree
pub fn load_statistics(data: &SiteTree) -> Vec<TreeStatistics> {
    data.sites()
        .map(|(site, tree)| TreeStatistics::from_tree(site, tree))
        .collect()
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &[TreeStatistics]) {
    println!("=== Category Tree Statistics ===\n");

    if stats.is_empty() {
        println!("No sites crawled yet");
        return;
    }

    for site in stats {
        println!("Site: {}", site.site);
        println!("  Top-level categories: {}", site.top_level);
        println!("  Categories (all levels): {}", site.total_categories);
        println!("  Deepest level: {}", site.max_depth);

        let coverage = if site.leaf_categories > 0 {
            (site.crawled_leaves as f64 / site.leaf_categories as f64) * 100.0
        } else {
            0.0
        };
        println!(
            "  Leaves crawled: {} / {} ({:.1}%)",
            site.crawled_leaves, site.leaf_categories, coverage
        );
        println!("  Products: {}", site.total_products);
        match &site.last_crawled_at {
            Some(at) => println!("  Last crawled: {}", at),
            None => println!("  Last crawled: never"),
        }
        println!();
    }
}
