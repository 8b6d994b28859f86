//! Markdown summary generation
//!
//! Renders the stored category tree as a nested markdown outline: one section
//! per site, one bullet per category, product counts and crawl times inline.

use crate::output::stats::TreeStatistics;
use crate::tree::{CategoryTree, NodeId, SiteTree};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown summary of `data` to `output_path`
pub fn generate_markdown_summary(data: &SiteTree, output_path: &Path) -> std::io::Result<()> {
    let markdown = format_markdown_summary(data);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats the whole tree as markdown
pub fn format_markdown_summary(data: &SiteTree) -> String {
    let mut md = String::new();

    md.push_str("# Category Crawl Summary\n\n");

    if data.is_empty() {
        md.push_str("_No sites crawled yet._\n");
        return md;
    }

    for (site, tree) in data.sites() {
        let stats = TreeStatistics::from_tree(site, tree);

        md.push_str(&format!("## {}\n\n", site));
        md.push_str(&format!(
            "- **Categories**: {} ({} leaves, {} crawled)\n",
            stats.total_categories, stats.leaf_categories, stats.crawled_leaves
        ));
        md.push_str(&format!("- **Products**: {}\n", stats.total_products));
        if let Some(at) = &stats.last_crawled_at {
            md.push_str(&format!("- **Last crawled**: {}\n", at));
        }
        md.push('\n');

        md.push_str("### Categories\n\n");
        for &root in tree.roots().values() {
            format_node(&mut md, tree, root, 0);
        }
        md.push('\n');
    }

    md
}

fn format_node(md: &mut String, tree: &CategoryTree, id: NodeId, indent: usize) {
    let node = tree.node(id);
    let pad = "  ".repeat(indent);

    let label = match &node.url {
        Some(url) => format!("[{}]({})", node.name, url),
        None => node.name.clone(),
    };

    md.push_str(&format!("{}- {}", pad, label));
    if !node.products.is_empty() {
        md.push_str(&format!(" ({} products)", node.products.len()));
    }
    if let Some(at) = node.crawled_at {
        md.push_str(&format!(", crawled {}", at.to_rfc3339()));
    }
    md.push('\n');

    for &child in node.subcategories().values() {
        format_node(md, tree, child, indent + 1);
    }
}
