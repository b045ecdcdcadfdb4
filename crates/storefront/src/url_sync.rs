//! Mirror the listing state into URL query parameters.
//!
//! A bookmarked or reloaded listing URL reproduces the same page and filter.
//! Parameters this module does not own are left untouched.

use tracing::debug;
use url::Url;

use shopfront_core::{CategoryId, ListingQuery, ProductFilter};

pub const PAGE_PARAM: &str = "page";
pub const SEARCH_PARAM: &str = "search";
/// Older links carry the search text here.
pub const LEGACY_SEARCH_PARAM: &str = "q";
pub const CATEGORIES_PARAM: &str = "categories";

const OWNED_PARAMS: [&str; 4] = [PAGE_PARAM, SEARCH_PARAM, LEGACY_SEARCH_PARAM, CATEGORIES_PARAM];

/// Parse the listing state encoded in `url`.
///
/// A missing or invalid page is page 1. When both a search and a category
/// selection are present, the category selection wins.
#[must_use]
pub fn read_listing_query(url: &Url) -> ListingQuery {
    let param = |key: &str| {
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    };

    let page = param(PAGE_PARAM)
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|page| *page >= 1)
        .unwrap_or(1);

    let categories: Vec<CategoryId> = param(CATEGORIES_PARAM)
        .map(|v| {
            v.split(',')
                .filter(|entry| !entry.trim().is_empty())
                .filter_map(|entry| {
                    entry
                        .parse()
                        .inspect_err(|_| debug!(entry, "Ignoring invalid category id in URL"))
                        .ok()
                })
                .collect()
        })
        .unwrap_or_default();

    let filter = if categories.is_empty() {
        let search = param(SEARCH_PARAM)
            .filter(|v| !v.trim().is_empty())
            .or_else(|| param(LEGACY_SEARCH_PARAM))
            .unwrap_or_default();
        ProductFilter::search(&search)
    } else {
        ProductFilter::categories(categories)
    };

    ListingQuery::new(page, filter)
}

/// Return `url` with its listing parameters replaced by `query`.
#[must_use]
pub fn write_listing_query(url: &Url, query: &ListingQuery) -> Url {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !OWNED_PARAMS.contains(&k.as_ref()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if query.page > 1 {
        pairs.push((PAGE_PARAM.to_string(), query.page.to_string()));
    }
    match &query.filter {
        ProductFilter::Search(text) => pairs.push((SEARCH_PARAM.to_string(), text.clone())),
        ProductFilter::Categories(ids) => {
            let joined = ids
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",");
            pairs.push((CATEGORIES_PARAM.to_string(), joined));
        }
        ProductFilter::None => {}
    }

    let mut url = url.clone();
    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
    url
}
