//! Listing filters.
//!
//! Search text and category selection are mutually exclusive on the product
//! listing. [`ProductFilter`] makes that a property of the type: only one of
//! them can be held at a time.

use super::id::CategoryId;

/// The active product filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProductFilter {
    /// Plain paginated listing.
    #[default]
    None,
    /// Case-insensitive title search (trimmed, never empty).
    Search(String),
    /// Products in any of these categories (never empty).
    Categories(Vec<CategoryId>),
}

impl ProductFilter {
    /// Search filter; blank text normalises to [`ProductFilter::None`].
    #[must_use]
    pub fn search(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            Self::None
        } else {
            Self::Search(text.to_owned())
        }
    }

    /// Category filter; an empty selection normalises to [`ProductFilter::None`].
    /// Duplicate ids are dropped, first occurrence wins.
    #[must_use]
    pub fn categories(ids: impl IntoIterator<Item = CategoryId>) -> Self {
        let mut unique: Vec<CategoryId> = Vec::new();
        for id in ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        if unique.is_empty() {
            Self::None
        } else {
            Self::Categories(unique)
        }
    }

    /// Search text, or `""` when not searching.
    #[must_use]
    pub fn search_text(&self) -> &str {
        match self {
            Self::Search(text) => text,
            _ => "",
        }
    }

    /// Selected categories, or an empty slice.
    #[must_use]
    pub fn category_ids(&self) -> &[CategoryId] {
        match self {
            Self::Categories(ids) => ids,
            _ => &[],
        }
    }

    /// Whether any filter is applied.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Everything that determines a product listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    /// 1-based page.
    pub page: u32,
    pub filter: ProductFilter,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            page: 1,
            filter: ProductFilter::None,
        }
    }
}

impl ListingQuery {
    /// Query for `page` with `filter`; page 0 is treated as page 1.
    #[must_use]
    pub fn new(page: u32, filter: ProductFilter) -> Self {
        Self {
            page: page.max(1),
            filter,
        }
    }

    /// Same filter, different page.
    #[must_use]
    pub fn with_page(&self, page: u32) -> Self {
        Self::new(page, self.filter.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_search_is_none() {
        assert_eq!(ProductFilter::search("   "), ProductFilter::None);
        assert_eq!(
            ProductFilter::search("  lamp "),
            ProductFilter::Search("lamp".to_string())
        );
    }

    #[test]
    fn test_empty_categories_is_none() {
        assert_eq!(ProductFilter::categories([]), ProductFilter::None);
    }

    #[test]
    fn test_categories_deduplicate() {
        let filter =
            ProductFilter::categories([CategoryId::new(2), CategoryId::new(1), CategoryId::new(2)]);
        assert_eq!(filter.category_ids(), &[CategoryId::new(2), CategoryId::new(1)]);
        assert_eq!(filter.search_text(), "");
        assert!(filter.is_active());
    }

    #[test]
    fn test_listing_query_page_floor() {
        assert_eq!(ListingQuery::new(0, ProductFilter::None).page, 1);
        let query = ListingQuery::new(3, ProductFilter::search("x"));
        assert_eq!(query.with_page(1).filter, ProductFilter::search("x"));
    }
}
