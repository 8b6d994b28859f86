//! URL resolution helpers
//!
//! Category and product hrefs found on pages are resolved against the site's
//! base URL, and listing pages beyond the first are derived from the first
//! page's URL of a category.

use crate::UrlError;
use url::Url;

/// Resolves an href (relative or absolute) against a base URL
///
/// # Examples
///
/// ```
/// use ecomm_crawler::url::resolve;
/// use url::Url;
///
/// let base = Url::parse("https://shop.example.com/").unwrap();
/// let url = resolve(&base, "/shoes/running").unwrap();
/// assert_eq!(url.as_str(), "https://shop.example.com/shoes/running");
/// ```
pub fn resolve(base: &Url, href: &str) -> Result<Url, UrlError> {
    base.join(href.trim()).map_err(|source| UrlError::Join {
        href: href.to_string(),
        base: base.to_string(),
        source,
    })
}

/// Builds the URL of listing page `page` for a category
///
/// Page 1 is the listing URL itself. Later pages join `?page={n}` against the
/// listing URL, never against the previous page. An existing query on the
/// listing URL is replaced.
///
/// # Examples
///
/// ```
/// use ecomm_crawler::url::listing_page_url;
/// use url::Url;
///
/// let listing = Url::parse("https://shop.example.com/c/cat").unwrap();
/// let page2 = listing_page_url(&listing, 2).unwrap();
/// assert_eq!(page2.as_str(), "https://shop.example.com/c/cat?page=2");
/// ```
pub fn listing_page_url(listing: &Url, page: u32) -> Result<Url, UrlError> {
    if page <= 1 {
        return Ok(listing.clone());
    }
    resolve(listing, &format!("?page={}", page))
}
