//! Selector roles and their compiled CSS selectors
//!
//! Every site must configure one selector per [`SelectorRole`]. The set is
//! compiled once at configuration time so the crawler never looks selectors up
//! by string name.

use crate::ConfigError;
use scraper::Selector;
use std::collections::BTreeMap;
use std::fmt;

/// The fixed set of selector roles a site configuration must provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorRole {
    /// Wrapper around subcategory links; its presence marks a category page
    CategoryContainer,
    /// Subcategory entries inside the category container
    SubcategoryItems,
    /// Wrapper around the product listing
    ProductContainer,
    /// Product entries inside the product container
    ProductItem,
    /// Link inside a product entry
    ProductLink,
    /// Pagination control leading to the next listing page
    NextPage,
}

impl SelectorRole {
    pub const ALL: [SelectorRole; 6] = [
        Self::CategoryContainer,
        Self::SubcategoryItems,
        Self::ProductContainer,
        Self::ProductItem,
        Self::ProductLink,
        Self::NextPage,
    ];

    /// Key used for this role in the configuration file
    pub fn key(&self) -> &'static str {
        match self {
            Self::CategoryContainer => "category_container",
            Self::SubcategoryItems => "subcategory_items",
            Self::ProductContainer => "product_container",
            Self::ProductItem => "product_item",
            Self::ProductLink => "product_link",
            Self::NextPage => "next_page",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.key() == key)
    }
}

impl fmt::Display for SelectorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Compiled selectors for all roles of one site
#[derive(Debug, Clone)]
pub struct SelectorSet {
    pub category_container: Selector,
    pub subcategory_items: Selector,
    pub product_container: Selector,
    pub product_item: Selector,
    pub product_link: Selector,
    pub next_page: Selector,
}

impl SelectorSet {
    /// Compiles the raw selector table of a site
    ///
    /// Fails if a role is missing, a key names no known role, or a selector
    /// does not parse.
    pub fn compile(site: &str, raw: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        if let Some(unknown) = raw.keys().find(|key| SelectorRole::from_key(key).is_none()) {
            return Err(ConfigError::Validation(format!(
                "Site '{}' has unknown selector role '{}'",
                site, unknown
            )));
        }

        let compile_role = |role: SelectorRole| -> Result<Selector, ConfigError> {
            let source = raw
                .get(role.key())
                .ok_or_else(|| ConfigError::MissingSelector {
                    site: site.to_string(),
                    role: role.key().to_string(),
                })?;

            Selector::parse(source).map_err(|e| ConfigError::InvalidSelector {
                site: site.to_string(),
                role: role.key().to_string(),
                message: e.to_string(),
            })
        };

        Ok(Self {
            category_container: compile_role(SelectorRole::CategoryContainer)?,
            subcategory_items: compile_role(SelectorRole::SubcategoryItems)?,
            product_container: compile_role(SelectorRole::ProductContainer)?,
            product_item: compile_role(SelectorRole::ProductItem)?,
            product_link: compile_role(SelectorRole::ProductLink)?,
            next_page: compile_role(SelectorRole::NextPage)?,
        })
    }
}
