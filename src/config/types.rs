use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub sites: BTreeMap<String, SiteConfig>,
}

/// Crawler behavior configuration shared by all sites
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Pause between successive listing pages of one category (milliseconds)
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,

    /// Timeout for a single HTTP request (seconds)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Deadline for a whole crawl run (seconds), unbounded when absent
    #[serde(default)]
    pub run_timeout_secs: Option<u64>,

    /// Log and skip a category branch whose page fails to fetch instead of
    /// aborting the run
    #[serde(default)]
    pub skip_failed_branches: bool,
}

impl CrawlerConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            page_delay_ms: default_page_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            run_timeout_secs: None,
            skip_failed_branches: false,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: String,

    /// Email address for crawler-related contact
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the user agent as `CrawlerName/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Backend used to persist the category tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreFormat {
    #[default]
    Json,
    Sqlite,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the persisted category tree
    #[serde(default = "default_data_path")]
    pub data_path: String,

    /// Storage backend for the category tree
    #[serde(default)]
    pub format: StoreFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            format: StoreFormat::default(),
        }
    }
}

/// Per-site crawl configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Base URL every category and product href is resolved against
    pub base_url: String,

    /// Top-level categories keyed by name
    #[serde(default)]
    pub categories: BTreeMap<String, CategoryEntry>,

    /// CSS selectors keyed by role name
    #[serde(default)]
    pub selectors: BTreeMap<String, String>,

    /// Deepest subcategory level that is still fetched (top level is 0)
    #[serde(default = "default_max_subcategory_depth")]
    pub max_subcategory_depth: u32,

    /// Upper bound on listing pages fetched per leaf category
    #[serde(default = "default_max_pages_per_category")]
    pub max_pages_per_category: u32,

    /// Class tokens marking listing items that must not be extracted
    #[serde(default)]
    pub ignore_classes: Vec<String>,
}

/// A configured top-level category
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryEntry {
    pub url: String,
}

fn default_page_delay_ms() -> u64 {
    1000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_data_path() -> String {
    "ecomm_data.json".to_string()
}

fn default_max_subcategory_depth() -> u32 {
    5
}

fn default_max_pages_per_category() -> u32 {
    10
}
