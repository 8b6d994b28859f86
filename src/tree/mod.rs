//! In-memory category tree
//!
//! Each site owns a [`CategoryTree`]: an arena of [`CategoryNode`]s addressed
//! either by stable [`NodeId`] handles (returned by the registration calls) or
//! by [`CategoryPath`]. Registration is create-if-absent; product appends are
//! never deduplicated.

mod path;
mod record;

pub use path::{CategoryPath, PATH_SEPARATOR};
pub use record::{parse_timestamp, NodeRecord};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised by path-addressed tree operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    /// A path segment was never registered
    #[error("Category path '{path}' is not registered (missing segment '{missing}')")]
    PathIntegrity { path: String, missing: String },

    #[error("Category path is empty")]
    EmptyPath,
}

/// Stable handle to a node inside one [`CategoryTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A product listed under a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductEntry {
    pub name: String,
    pub url: String,
}

/// One category or subcategory
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryNode {
    pub name: String,
    pub url: Option<String>,
    pub products: Vec<ProductEntry>,
    pub crawled_at: Option<DateTime<Utc>>,
    parent: Option<NodeId>,
    children: BTreeMap<String, NodeId>,
}

impl CategoryNode {
    fn new(name: &str, url: Option<String>, parent: Option<NodeId>) -> Self {
        Self {
            name: name.to_string(),
            url,
            products: Vec::new(),
            crawled_at: None,
            parent,
            children: BTreeMap::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children keyed by name
    pub fn subcategories(&self) -> &BTreeMap<String, NodeId> {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Category hierarchy of one site
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryTree {
    nodes: Vec<CategoryNode>,
    roots: BTreeMap<String, NodeId>,
}

impl CategoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Top-level categories keyed by name
    pub fn roots(&self) -> &BTreeMap<String, NodeId> {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> &CategoryNode {
        &self.nodes[id.0]
    }

    /// Total number of nodes at every level
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over all nodes in registration order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &CategoryNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Registers a top-level category, returning the existing node if present
    ///
    /// An existing node keeps its URL; a missing URL is filled in.
    pub fn register_root(&mut self, name: &str, url: Option<String>) -> NodeId {
        if let Some(&id) = self.roots.get(name) {
            self.fill_url(id, url);
            return id;
        }

        let id = self.push(CategoryNode::new(name, url, None));
        self.roots.insert(name.to_string(), id);
        id
    }

    /// Registers `name` under `parent`, returning the existing node if present
    ///
    /// An existing node keeps its URL; a missing URL is filled in.
    pub fn register_child(&mut self, parent: NodeId, name: &str, url: Option<String>) -> NodeId {
        if let Some(&id) = self.nodes[parent.0].children.get(name) {
            self.fill_url(id, url);
            return id;
        }

        let id = self.push(CategoryNode::new(name, url, Some(parent)));
        self.nodes[parent.0].children.insert(name.to_string(), id);
        id
    }

    /// Registers the node at `path`, creating missing ancestors without URL
    pub fn insert_path(&mut self, path: &CategoryPath, url: Option<String>) -> Result<NodeId, TreeError> {
        let (last, ancestors) = path.segments().split_last().ok_or(TreeError::EmptyPath)?;

        let mut parent: Option<NodeId> = None;
        for segment in ancestors {
            parent = Some(match parent {
                None => self.register_root(segment, None),
                Some(p) => self.register_child(p, segment, None),
            });
        }

        Ok(match parent {
            None => self.register_root(last, url),
            Some(p) => self.register_child(p, last, url),
        })
    }

    /// Looks up the node at `path` by walking one segment at a time
    pub fn resolve(&self, path: &CategoryPath) -> Result<NodeId, TreeError> {
        let mut segments = path.segments().iter();
        let first = segments.next().ok_or(TreeError::EmptyPath)?;

        let missing = |segment: &str| TreeError::PathIntegrity {
            path: path.to_string(),
            missing: segment.to_string(),
        };

        let mut current = *self.roots.get(first).ok_or_else(|| missing(first))?;
        for segment in segments {
            current = *self.nodes[current.0]
                .children
                .get(segment)
                .ok_or_else(|| missing(segment))?;
        }
        Ok(current)
    }

    /// Rebuilds the path of a node from its ancestors
    pub fn path_of(&self, id: NodeId) -> CategoryPath {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = &self.nodes[node_id.0];
            names.push(node.name.clone());
            current = node.parent;
        }
        names.reverse();
        CategoryPath::from_segments(names)
    }

    /// Appends a product to the node at `path`
    ///
    /// Every segment of the path must already be registered.
    pub fn append_product(&mut self, path: &CategoryPath, product: ProductEntry) -> Result<NodeId, TreeError> {
        let id = self.resolve(path)?;
        self.push_product(id, product);
        Ok(id)
    }

    /// Appends a product to the node behind a handle
    pub fn push_product(&mut self, id: NodeId, product: ProductEntry) {
        self.nodes[id.0].products.push(product);
    }

    /// Records a product-extraction pass over a node
    pub fn mark_crawled(&mut self, id: NodeId, at: DateTime<Utc>) {
        self.nodes[id.0].crawled_at = Some(at);
    }

    /// Total number of product entries across all nodes
    pub fn product_count(&self) -> usize {
        self.nodes.iter().map(|n| n.products.len()).sum()
    }

    fn push(&mut self, node: CategoryNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn fill_url(&mut self, id: NodeId, url: Option<String>) {
        let node = &mut self.nodes[id.0];
        if node.url.is_none() {
            node.url = url;
        }
    }
}

/// Category trees of every crawled site, keyed by site identifier
///
/// This is the unit that is loaded at the start of a run and written back
/// as a whole at the end.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteTree {
    sites: BTreeMap<String, CategoryTree>,
}

impl SiteTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn site(&self, id: &str) -> Option<&CategoryTree> {
        self.sites.get(id)
    }

    /// Tree of a site, created empty on first access
    pub fn site_mut(&mut self, id: &str) -> &mut CategoryTree {
        self.sites.entry(id.to_string()).or_default()
    }

    pub fn sites(&self) -> impl Iterator<Item = (&str, &CategoryTree)> {
        self.sites.iter().map(|(id, tree)| (id.as_str(), tree))
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub(crate) fn insert_site(&mut self, id: String, tree: CategoryTree) {
        self.sites.insert(id, tree);
    }
}
