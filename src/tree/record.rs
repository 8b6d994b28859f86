//! Nested serialized form of the category tree
//!
//! Persisted as `site -> category name -> {url, sub_categories, products,
//! crawled_at}`, recursively, with `crawled_at` as an RFC 3339 timestamp or
//! null. Timestamps without an offset are read as UTC.

use crate::tree::{CategoryTree, NodeId, ProductEntry, SiteTree};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Serialized form of one node and its subtree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub sub_categories: BTreeMap<String, NodeRecord>,
    #[serde(default)]
    pub products: Vec<ProductEntry>,
    #[serde(default, deserialize_with = "deserialize_crawled_at")]
    pub crawled_at: Option<DateTime<Utc>>,
}

/// Parses an ISO-8601 timestamp, with or without a UTC offset
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(rfc3339_error) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| Utc.from_utc_datetime(&naive))
            .map_err(|_| rfc3339_error),
    }
}

fn deserialize_crawled_at<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid crawled_at '{}': {}", raw, e))),
        None => Ok(None),
    }
}

impl CategoryTree {
    /// Converts the arena into nested records keyed by top-level name
    pub fn to_records(&self) -> BTreeMap<String, NodeRecord> {
        self.roots()
            .iter()
            .map(|(name, &id)| (name.clone(), self.record_of(id)))
            .collect()
    }

    /// Rebuilds an arena from nested records
    pub fn from_records(records: BTreeMap<String, NodeRecord>) -> Self {
        let mut tree = CategoryTree::new();
        for (name, record) in records {
            let id = tree.register_root(&name, None);
            tree.load_record(id, record);
        }
        tree
    }

    fn record_of(&self, id: NodeId) -> NodeRecord {
        let node = self.node(id);
        NodeRecord {
            url: node.url.clone(),
            sub_categories: node
                .subcategories()
                .iter()
                .map(|(name, &child)| (name.clone(), self.record_of(child)))
                .collect(),
            products: node.products.clone(),
            crawled_at: node.crawled_at,
        }
    }

    fn load_record(&mut self, id: NodeId, record: NodeRecord) {
        self.fill_url(id, record.url);
        for product in record.products {
            self.push_product(id, product);
        }
        if let Some(at) = record.crawled_at {
            self.mark_crawled(id, at);
        }
        for (name, child) in record.sub_categories {
            let child_id = self.register_child(id, &name, None);
            self.load_record(child_id, child);
        }
    }
}

impl Serialize for SiteTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let nested: BTreeMap<&str, BTreeMap<String, NodeRecord>> = self
            .sites()
            .map(|(id, tree)| (id, tree.to_records()))
            .collect();
        nested.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SiteTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let nested = BTreeMap::<String, BTreeMap<String, NodeRecord>>::deserialize(deserializer)?;
        let mut data = SiteTree::new();
        for (id, records) in nested {
            data.insert_site(id, CategoryTree::from_records(records));
        }
        Ok(data)
    }
}
