use crate::config::selectors::SelectorSet;
use crate::config::types::Config;
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Immutable, fully resolved view of one configured site
///
/// Built from the raw [`Config`] before any page is fetched, so a crawl never
/// starts with a missing selector or an unparsable base URL.
#[derive(Debug, Clone)]
pub struct SiteProfile {
    /// Site identifier (the key under `[sites]`)
    pub id: String,
    pub base_url: Url,
    pub selectors: SelectorSet,
    /// Top-level categories as (name, url) pairs
    pub categories: Vec<(String, String)>,
    pub max_subcategory_depth: u32,
    pub max_pages_per_category: u32,
    pub ignore_classes: HashSet<String>,
}

impl SiteProfile {
    /// Resolves the site `site_id` from the configuration
    pub fn from_config(config: &Config, site_id: &str) -> Result<Self, ConfigError> {
        let site = config
            .sites
            .get(site_id)
            .ok_or_else(|| ConfigError::UnknownSite(site_id.to_string()))?;

        let base_url = Url::parse(&site.base_url).map_err(|e| {
            ConfigError::InvalidUrl(format!(
                "Invalid base_url '{}' for site '{}': {}",
                site.base_url, site_id, e
            ))
        })?;

        let selectors = SelectorSet::compile(site_id, &site.selectors)?;

        Ok(Self {
            id: site_id.to_string(),
            base_url,
            selectors,
            categories: site
                .categories
                .iter()
                .map(|(name, entry)| (name.clone(), entry.url.clone()))
                .collect(),
            max_subcategory_depth: site.max_subcategory_depth,
            max_pages_per_category: site.max_pages_per_category,
            ignore_classes: site.ignore_classes.iter().cloned().collect(),
        })
    }

    /// Returns true if any of the given class tokens is an ignore class
    pub fn is_ignored<'a>(&self, mut classes: impl Iterator<Item = &'a str>) -> bool {
        classes.any(|class| self.ignore_classes.contains(class))
    }
}
