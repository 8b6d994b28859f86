//! Crawler coordinator - category traversal and pagination
//!
//! The coordinator walks one site depth-first:
//! - each configured top-level category is registered and visited at depth 0
//! - a page with a category container registers its subcategories and
//!   recurses into them one level deeper
//! - a page without one is a product listing and is paginated
//!
//! The tree being filled is passed in explicitly; the coordinator itself only
//! holds the immutable site profile and the HTTP client.

use crate::config::{Config, SiteProfile};
use crate::crawler::fetcher::{build_http_client, fetch_page, FetchError};
use crate::crawler::parser::{parse_category_page, parse_listing_page, CategoryPage, NextPage};
use crate::storage::open_store;
use crate::tree::{CategoryPath, CategoryTree, NodeId, ProductEntry};
use crate::url::{listing_page_url, resolve};
use crate::CrawlError;
use chrono::Utc;
use reqwest::Client;
use std::time::{Duration, Instant};
use url::Url;

/// Counters collected during one crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Category pages fetched (top-level and subcategories)
    pub categories_visited: usize,
    /// Subcategories not visited because they lie below the depth limit
    pub depth_truncated: usize,
    /// HTTP requests issued
    pub pages_fetched: usize,
    /// Listing pages inspected for products
    pub listing_pages: usize,
    pub products_appended: usize,
    /// Listing items dropped for carrying an ignore class
    pub items_ignored: usize,
    /// Items skipped because they lacked a link, an href or a name
    pub items_skipped: usize,
    /// Listing items without a product link
    pub items_unlinked: usize,
    /// Branches abandoned after a fetch error
    pub branches_failed: usize,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    site: SiteProfile,
    client: Client,
    page_delay: Duration,
    skip_failed_branches: bool,
    stats: RunStats,
}

impl Coordinator {
    /// Creates a coordinator for the site `site_id`
    ///
    /// Fails with a configuration error, before anything is fetched, if the
    /// site is unknown or its selectors are incomplete.
    pub fn new(config: &Config, site_id: &str) -> Result<Self, CrawlError> {
        let site = SiteProfile::from_config(config, site_id)?;
        let client = build_http_client(&config.user_agent, config.crawler.request_timeout())?;

        Ok(Self {
            site,
            client,
            page_delay: config.crawler.page_delay(),
            skip_failed_branches: config.crawler.skip_failed_branches,
            stats: RunStats::default(),
        })
    }

    /// Crawls every configured top-level category into `tree`
    pub async fn crawl(&mut self, tree: &mut CategoryTree) -> crate::Result<RunStats> {
        self.stats = RunStats::default();

        let categories = self.site.categories.clone();
        for (name, href) in categories {
            tracing::info!("Crawling top-level category '{}'", name);
            let root = tree.register_root(&name, Some(href.clone()));
            self.crawl_category(tree, root, &href, 0).await?;
        }

        Ok(self.stats.clone())
    }

    /// Visits one category page and descends into it
    async fn crawl_category(
        &mut self,
        tree: &mut CategoryTree,
        node: NodeId,
        href: &str,
        depth: u32,
    ) -> Result<(), CrawlError> {
        let path = tree.path_of(node);

        if depth > self.site.max_subcategory_depth {
            tracing::debug!(
                "Not visiting '{}': depth {} exceeds limit {}",
                path,
                depth,
                self.site.max_subcategory_depth
            );
            self.stats.depth_truncated += 1;
            return Ok(());
        }

        let url = resolve(&self.site.base_url, href)?;
        let body = match self.fetch(&url).await {
            Ok(body) => body,
            Err(e) => return self.abandon_branch(&path, e),
        };
        self.stats.categories_visited += 1;

        let items = match parse_category_page(&body, &self.site.selectors) {
            CategoryPage::Subcategories(items) => items,
            CategoryPage::Listing => {
                tracing::debug!("'{}' has no subcategories, reading listing", path);
                return self.crawl_products(tree, node, &path, &url, body).await;
            }
        };

        tracing::debug!("'{}' lists {} subcategories", path, items.len());

        for item in items {
            let link = match item {
                Ok(link) => link,
                Err(e) => {
                    tracing::warn!("Skipping subcategory item under '{}': {}", path, e);
                    self.stats.items_skipped += 1;
                    continue;
                }
            };

            if let Err(e) = resolve(&self.site.base_url, &link.href) {
                tracing::warn!("Skipping subcategory '{}' under '{}': {}", link.name, path, e);
                self.stats.items_skipped += 1;
                continue;
            }

            let child = tree.register_child(node, &link.name, Some(link.href.clone()));
            Box::pin(self.crawl_category(tree, child, &link.href, depth + 1)).await?;
        }

        Ok(())
    }

    /// Paginates through the listing of a leaf category
    ///
    /// `first_page` is the already fetched body of the listing URL itself.
    async fn crawl_products(
        &mut self,
        tree: &mut CategoryTree,
        node: NodeId,
        path: &CategoryPath,
        listing: &Url,
        first_page: String,
    ) -> Result<(), CrawlError> {
        let max_pages = self.site.max_pages_per_category;
        let mut page: u32 = 1;
        let mut body = first_page;

        loop {
            let parsed = parse_listing_page(&body, &self.site);
            self.stats.listing_pages += 1;

            let contents = match parsed.contents {
                Some(contents) => contents,
                None => {
                    tracing::debug!("No product container on page {} of '{}'", page, path);
                    break;
                }
            };

            self.stats.items_ignored += contents.ignored;
            self.stats.items_unlinked += contents.unlinked;
            if contents.unlinked > 0 {
                tracing::debug!(
                    "{} items without a product link on page {} of '{}'",
                    contents.unlinked,
                    page,
                    path
                );
            }
            for e in &contents.malformed {
                tracing::warn!("Skipping product on page {} of '{}': {}", page, path, e);
                self.stats.items_skipped += 1;
            }

            let mut appended = 0;
            for product in contents.products {
                match resolve(&self.site.base_url, &product.href) {
                    Ok(url) => {
                        tree.push_product(
                            node,
                            ProductEntry {
                                name: product.name,
                                url: url.to_string(),
                            },
                        );
                        appended += 1;
                    }
                    Err(e) => {
                        tracing::warn!("Skipping product '{}' of '{}': {}", product.name, path, e);
                        self.stats.items_skipped += 1;
                    }
                }
            }
            self.stats.products_appended += appended;
            tree.mark_crawled(node, Utc::now());

            tracing::debug!("Page {} of '{}': {} products", page, path, appended);

            if parsed.next_page != NextPage::Available {
                tracing::debug!("Pagination of '{}' ends at page {}", path, page);
                break;
            }

            if page >= max_pages {
                tracing::debug!("Page limit {} reached for '{}'", max_pages, path);
                break;
            }

            page += 1;
            tokio::time::sleep(self.page_delay).await;

            let url = listing_page_url(listing, page)?;
            body = match self.fetch(&url).await {
                Ok(body) => body,
                Err(e) => return self.abandon_branch(path, e),
            };
        }

        Ok(())
    }

    async fn fetch(&mut self, url: &Url) -> Result<String, FetchError> {
        self.stats.pages_fetched += 1;
        fetch_page(&self.client, url).await
    }

    /// Applies the fetch error policy to a failed branch
    fn abandon_branch(&mut self, path: &CategoryPath, error: FetchError) -> Result<(), CrawlError> {
        if !self.skip_failed_branches {
            return Err(error.into());
        }

        tracing::warn!("Skipping branch '{}': {}", path, error);
        self.stats.branches_failed += 1;
        Ok(())
    }
}

/// Runs a complete crawl of one configured site
///
/// This function orchestrates the entire run:
///
/// 1. Resolve the site profile (fails before any fetch on bad config)
/// 2. Load the stored tree, or start empty
/// 3. Traverse the site into the site's subtree, within the run deadline
/// 4. Overwrite the store with the whole tree
///
/// Nothing is written if the traversal fails or the deadline passes.
///
/// # Example
///
/// ```no_run
/// use ecomm_crawler::config::load_config;
/// use ecomm_crawler::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("ecomm_config.toml"))?;
/// let stats = run_crawl(&config, "demo").await?;
/// println!("{} products", stats.products_appended);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config, site_id: &str) -> crate::Result<RunStats> {
    let mut coordinator = Coordinator::new(config, site_id)?;

    let mut store = open_store(&config.output)?;
    let mut data = store.load()?;

    let start_time = Instant::now();
    let tree = data.site_mut(site_id);
    let stats = match config.crawler.run_timeout() {
        Some(limit) => tokio::time::timeout(limit, coordinator.crawl(tree))
            .await
            .map_err(|_| CrawlError::Deadline {
                seconds: limit.as_secs(),
            })??,
        None => coordinator.crawl(tree).await?,
    };

    store.save(&data)?;

    tracing::info!(
        "Crawl of '{}' completed in {:?}: {} categories, {} pages fetched, {} products",
        site_id,
        start_time.elapsed(),
        stats.categories_visited,
        stats.pages_fetched,
        stats.products_appended
    );

    Ok(stats)
}
