//! Product listing and product detail state.
//!
//! Listing and detail fetches each carry a generation number. Only the
//! response to the most recently issued request is applied; earlier ones
//! that resolve late are dropped without touching loading or error state.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, error, instrument, warn};

use shopfront_core::{DocumentId, ListingQuery, Pagination, Product, ProductFilter};

use crate::strapi::StrapiClient;

/// Error shown when a listing request fails.
pub const LOAD_PRODUCTS_ERROR: &str = "Failed to load products";

/// Error shown when a product detail request fails.
pub const LOAD_PRODUCT_ERROR: &str = "Failed to load product";

/// How many related products the detail view shows.
pub const SIMILAR_PRODUCTS_LIMIT: usize = 3;

/// Result of a store fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response was applied to the store.
    Applied,
    /// The request failed and the store's error was set.
    Failed,
    /// A newer request was issued meanwhile; the response was dropped.
    Stale,
}

/// Snapshot of listing and detail state.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductsState {
    pub products: Vec<Product>,
    pub loading: bool,
    pub error: Option<String>,
    pub pagination: Pagination,
    /// The query of the most recently issued listing fetch.
    pub query: ListingQuery,

    pub current: Option<Product>,
    pub similar: Vec<Product>,
    pub product_loading: bool,
    pub product_error: Option<String>,
}

impl ProductsState {
    fn new(page_size: u32) -> Self {
        Self {
            products: Vec::new(),
            loading: false,
            error: None,
            pagination: Pagination {
                page_size,
                ..Pagination::default()
            },
            query: ListingQuery::default(),
            current: None,
            similar: Vec::new(),
            product_loading: false,
            product_error: None,
        }
    }

    /// Whether a title search is active and matched something.
    #[must_use]
    pub fn has_search_results(&self) -> bool {
        matches!(self.query.filter, ProductFilter::Search(_)) && !self.products.is_empty()
    }

    /// Total matching products across all pages.
    #[must_use]
    pub const fn displayed_total(&self) -> u32 {
        self.pagination.total
    }

    /// 1-based first and last index shown on the current page.
    #[must_use]
    pub fn current_range(&self) -> (u32, u32) {
        self.pagination.current_range()
    }
}

/// Listing and product-detail store.
#[derive(Debug)]
pub struct ProductsStore {
    client: StrapiClient,
    page_size: u32,
    state: watch::Sender<ProductsState>,
    list_generation: AtomicU64,
    detail_generation: AtomicU64,
}

impl ProductsStore {
    #[must_use]
    pub fn new(client: StrapiClient, page_size: u32) -> Self {
        Self {
            client,
            page_size,
            state: watch::Sender::new(ProductsState::new(page_size)),
            list_generation: AtomicU64::new(0),
            detail_generation: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ProductsState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> ProductsState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// The query of the most recently issued listing fetch.
    #[must_use]
    pub fn query(&self) -> ListingQuery {
        self.state.borrow().query.clone()
    }

    #[must_use]
    pub fn pagination(&self) -> Pagination {
        self.state.borrow().pagination
    }

    #[must_use]
    pub fn has_search_results(&self) -> bool {
        self.state.borrow().has_search_results()
    }

    #[must_use]
    pub fn displayed_total(&self) -> u32 {
        self.state.borrow().displayed_total()
    }

    #[must_use]
    pub fn current_range(&self) -> (u32, u32) {
        self.state.borrow().current_range()
    }

    /// Load the listing for `query`.
    #[instrument(skip(self), fields(page = query.page))]
    pub async fn fetch(&self, query: ListingQuery) -> FetchOutcome {
        let generation = self.list_generation.fetch_add(1, Ordering::SeqCst) + 1;

        self.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
            state.query = query.clone();
        });

        let result = self.client.fetch_listing(&query, self.page_size).await;

        if self.list_generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "Dropping stale listing response");
            return FetchOutcome::Stale;
        }

        match result {
            Ok(page) => {
                debug!(
                    count = page.products.len(),
                    total = page.pagination.total,
                    "Listing loaded"
                );
                self.state.send_modify(|state| {
                    state.products = page.products;
                    state.pagination = page.pagination;
                    state.loading = false;
                });
                FetchOutcome::Applied
            }
            Err(e) => {
                error!(error = %e, "Error fetching products");
                self.state.send_modify(|state| {
                    state.error = Some(LOAD_PRODUCTS_ERROR.to_string());
                    state.loading = false;
                });
                FetchOutcome::Failed
            }
        }
    }

    /// Load one product and up to [`SIMILAR_PRODUCTS_LIMIT`] products from
    /// the same category.
    #[instrument(skip(self), fields(document_id = %id))]
    pub async fn fetch_by_id(&self, id: &DocumentId) -> FetchOutcome {
        let generation = self.detail_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let is_latest = || self.detail_generation.load(Ordering::SeqCst) == generation;

        self.state.send_modify(|state| {
            state.product_loading = true;
            state.product_error = None;
        });

        let product = match self.client.product(id).await {
            Ok(product) => product,
            Err(e) => {
                if !is_latest() {
                    return FetchOutcome::Stale;
                }
                error!(error = %e, "Error fetching product");
                self.state.send_modify(|state| {
                    state.product_error = Some(LOAD_PRODUCT_ERROR.to_string());
                    state.product_loading = false;
                });
                return FetchOutcome::Failed;
            }
        };

        if !is_latest() {
            return FetchOutcome::Stale;
        }
        let similar_source = product.clone();
        self.state.send_modify(|state| {
            state.current = Some(product);
            state.similar.clear();
        });

        let similar = self.similar_products(&similar_source).await;

        if !is_latest() {
            return FetchOutcome::Stale;
        }
        self.state.send_modify(|state| {
            state.similar = similar;
            state.product_loading = false;
        });
        FetchOutcome::Applied
    }

    /// Products sharing `product`'s category, excluding itself. Failures are
    /// logged and yield an empty list.
    async fn similar_products(&self, product: &Product) -> Vec<Product> {
        let Some(category) = product.category_id() else {
            return Vec::new();
        };

        // One extra in case the product itself is among the results.
        let limit = u32::try_from(SIMILAR_PRODUCTS_LIMIT + 1).unwrap_or(u32::MAX);
        match self.client.products_by_categories(&[category], 1, limit).await {
            Ok(page) => page
                .products
                .into_iter()
                .filter(|p| p.document_id != product.document_id)
                .take(SIMILAR_PRODUCTS_LIMIT)
                .collect(),
            Err(e) => {
                warn!(error = %e, "Error fetching similar products");
                Vec::new()
            }
        }
    }

    /// Clear the detail view.
    pub fn reset_product_page(&self) {
        self.state.send_modify(|state| {
            state.current = None;
            state.similar.clear();
            state.product_error = None;
        });
    }

    /// Return every field to its initial value.
    ///
    /// In-flight requests started before the reset are treated as stale.
    pub fn reset(&self) {
        self.list_generation.fetch_add(1, Ordering::SeqCst);
        self.detail_generation.fetch_add(1, Ordering::SeqCst);
        self.state.send_replace(ProductsState::new(self.page_size));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use shopfront_core::{Price, ProductId};
    use url::Url;

    use super::*;
    use crate::config::StrapiConfig;

    fn product(doc: &str) -> Product {
        Product {
            id: ProductId::new(1),
            document_id: DocumentId::new(doc),
            title: doc.to_string(),
            description: String::new(),
            price: Price::from_units(10),
            discount_percent: Decimal::ZERO,
            rating: 0.0,
            is_in_stock: true,
            images: Vec::new(),
            product_category: None,
        }
    }

    fn unreachable_store() -> ProductsStore {
        // Port 9 (discard) on loopback refuses connections.
        let config = StrapiConfig::new(Url::parse("http://127.0.0.1:9/api").unwrap());
        ProductsStore::new(StrapiClient::new(&config).unwrap(), 9)
    }

    #[test]
    fn test_initial_state() {
        let store = unreachable_store();
        let state = store.snapshot();
        assert!(state.products.is_empty());
        assert!(!state.loading);
        assert_eq!(state.pagination.page_size, 9);
        assert_eq!(state.current_range(), (0, 0));
        assert_eq!(state.displayed_total(), 0);
    }

    #[test]
    fn test_has_search_results() {
        let mut state = ProductsState::new(9);
        state.products = vec![product("a")];
        assert!(!state.has_search_results());

        state.query = ListingQuery::new(1, ProductFilter::search("lamp"));
        assert!(state.has_search_results());

        state.products.clear();
        assert!(!state.has_search_results());
    }

    #[test]
    fn test_current_range_follows_pagination() {
        let mut state = ProductsState::new(9);
        state.pagination = Pagination::new(3, 9, 23);
        assert_eq!(state.current_range(), (19, 23));
        assert_eq!(state.displayed_total(), 23);
    }

    #[tokio::test]
    async fn test_fetch_failure_sets_error() {
        let store = unreachable_store();
        let query = ListingQuery::new(2, ProductFilter::search("lamp"));

        assert_eq!(store.fetch(query.clone()).await, FetchOutcome::Failed);

        let state = store.snapshot();
        assert_eq!(state.error.as_deref(), Some(LOAD_PRODUCTS_ERROR));
        assert!(!state.loading);
        assert_eq!(state.query, query);
    }

    #[tokio::test]
    async fn test_fetch_by_id_failure_sets_product_error() {
        let store = unreachable_store();
        assert_eq!(
            store.fetch_by_id(&DocumentId::new("x")).await,
            FetchOutcome::Failed
        );
        let state = store.snapshot();
        assert_eq!(state.product_error.as_deref(), Some(LOAD_PRODUCT_ERROR));
        assert!(!state.product_loading);
        assert!(state.error.is_none());
    }

    #[test]
    fn test_reset_product_page() {
        let store = unreachable_store();
        store.state.send_modify(|state| {
            state.current = Some(product("a"));
            state.similar = vec![product("b")];
            state.product_error = Some(LOAD_PRODUCT_ERROR.to_string());
            state.products = vec![product("c")];
        });

        store.reset_product_page();

        let state = store.snapshot();
        assert!(state.current.is_none());
        assert!(state.similar.is_empty());
        assert!(state.product_error.is_none());
        assert_eq!(state.products.len(), 1);
    }

    #[test]
    fn test_reset() {
        let store = unreachable_store();
        store.state.send_modify(|state| {
            state.products = vec![product("c")];
            state.pagination = Pagination::new(2, 9, 30);
            state.error = Some(LOAD_PRODUCTS_ERROR.to_string());
        });

        store.reset();

        assert_eq!(store.snapshot(), ProductsState::new(9));
    }
}
