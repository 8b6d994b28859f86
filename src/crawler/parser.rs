//! HTML extraction for category and listing pages
//!
//! Pages are parsed with `scraper` and reduced to owned values right away, so
//! no parsed document is held across an await point. Hrefs are returned as
//! found on the page; resolving them is up to the caller.

use crate::config::{SelectorSet, SiteProfile};
use scraper::{ElementRef, Html};
use thiserror::Error;

/// An item that matched a selector but lacks the data it must carry
///
/// Such items are skipped individually; they never abort a crawl.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    #[error("subcategory item '{item}' contains no anchor")]
    MissingAnchor { item: String },

    #[error("anchor of '{item}' has no href")]
    MissingHref { item: String },

    #[error("subcategory item linking to '{href}' has no text")]
    EmptyName { href: String },

    #[error("product link '{name}' has no href")]
    ProductWithoutHref { name: String },
}

/// A subcategory link found inside the category container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubcategoryLink {
    pub name: String,
    pub href: String,
}

/// What a category page turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryPage {
    /// The category container is present; one entry per subcategory item
    Subcategories(Vec<Result<SubcategoryLink, StructureError>>),
    /// No category container; the page lists products
    Listing,
}

/// A product link found inside a listing item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductLink {
    pub name: String,
    pub href: String,
}

/// Products extracted from one listing page with a product container
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingContents {
    pub products: Vec<ProductLink>,
    /// Items skipped because they carry an ignore class
    pub ignored: usize,
    /// Items without a product link
    pub unlinked: usize,
    pub malformed: Vec<StructureError>,
}

/// State of the pagination control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextPage {
    Absent,
    Disabled,
    Available,
}

/// One parsed listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    /// `None` when the product container is missing
    pub contents: Option<ListingContents>,
    pub next_page: NextPage,
}

/// Class token marking a pagination control that leads nowhere
const DISABLED_CLASS: &str = "disabled";

/// Decides whether a page is a category page and extracts its subcategories
pub fn parse_category_page(html: &str, selectors: &SelectorSet) -> CategoryPage {
    let document = Html::parse_document(html);

    let container = match document.select(&selectors.category_container).next() {
        Some(container) => container,
        None => return CategoryPage::Listing,
    };

    CategoryPage::Subcategories(
        container
            .select(&selectors.subcategory_items)
            .map(extract_subcategory)
            .collect(),
    )
}

/// Extracts products and the pagination state from a listing page
pub fn parse_listing_page(html: &str, site: &SiteProfile) -> ListingPage {
    let document = Html::parse_document(html);
    let selectors = &site.selectors;

    let contents = document
        .select(&selectors.product_container)
        .next()
        .map(|container| {
            let mut contents = ListingContents::default();

            for item in container.select(&selectors.product_item) {
                if site.is_ignored(item.value().classes()) {
                    contents.ignored += 1;
                    continue;
                }

                match item.select(&selectors.product_link).next() {
                    Some(link) => match extract_product(link) {
                        Ok(product) => contents.products.push(product),
                        Err(e) => contents.malformed.push(e),
                    },
                    None => contents.unlinked += 1,
                }
            }

            contents
        });

    let next_page = match document.select(&selectors.next_page).next() {
        None => NextPage::Absent,
        Some(next) if next.value().classes().any(|c| c == DISABLED_CLASS) => NextPage::Disabled,
        Some(_) => NextPage::Available,
    };

    ListingPage {
        contents,
        next_page,
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Name is the item's whole text; the URL comes from the item itself when it
/// is an anchor, otherwise from its first descendant anchor
fn extract_subcategory(item: ElementRef<'_>) -> Result<SubcategoryLink, StructureError> {
    let name = element_text(item);

    let anchor = item
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "a")
        .ok_or_else(|| StructureError::MissingAnchor { item: name.clone() })?;

    let href = anchor
        .value()
        .attr("href")
        .ok_or_else(|| StructureError::MissingHref { item: name.clone() })?;

    if name.is_empty() {
        return Err(StructureError::EmptyName {
            href: href.to_string(),
        });
    }

    Ok(SubcategoryLink {
        name,
        href: href.to_string(),
    })
}

fn extract_product(link: ElementRef<'_>) -> Result<ProductLink, StructureError> {
    let name = element_text(link);
    match link.value().attr("href") {
        Some(href) => Ok(ProductLink {
            name,
            href: href.to_string(),
        }),
        None => Err(StructureError::ProductWithoutHref { name }),
    }
}
