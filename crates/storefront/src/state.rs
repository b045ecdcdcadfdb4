//! Storefront state shared by every view.
//!
//! [`Storefront`] owns the API client and the three stores, and implements
//! the listing page actions. Search and category filtering are mutually
//! exclusive: choosing one clears the other.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, instrument};
use url::Url;

use shopfront_core::{CategoryId, ListingQuery, ProductFilter};

use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::storage::{FileStorage, KeyValueStorage};
use crate::stores::{CartStore, CategoryFilterStore, FetchOutcome, ProductsStore};
use crate::strapi::StrapiClient;
use crate::url_sync::{read_listing_query, write_listing_query};

/// Client-side application state.
///
/// This struct is cheaply cloneable via `Arc`; clones share the stores.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    client: StrapiClient,
    cart: CartStore,
    products: ProductsStore,
    categories: CategoryFilterStore,
    location: watch::Sender<Url>,
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("client", &self.inner.client)
            .field("location", &self.inner.location.borrow().as_str())
            .finish_non_exhaustive()
    }
}

impl Storefront {
    /// Assemble a storefront from parts.
    ///
    /// # Arguments
    ///
    /// * `client` - Strapi API client shared by the product and category stores
    /// * `storage` - Backend for the persisted cart
    /// * `page_size` - Products per listing page
    /// * `location` - Listing URL the filter state is mirrored into
    #[must_use]
    pub fn new(
        client: StrapiClient,
        storage: Arc<dyn KeyValueStorage>,
        page_size: u32,
        location: Url,
    ) -> Self {
        Self {
            inner: Arc::new(StorefrontInner {
                cart: CartStore::load(storage),
                products: ProductsStore::new(client.clone(), page_size),
                categories: CategoryFilterStore::new(client.clone()),
                client,
                location: watch::Sender::new(location),
            }),
        }
    }

    /// Build a storefront from configuration, persisting the cart under
    /// `config.storage_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API client cannot be created.
    pub fn from_config(config: &StorefrontConfig) -> Result<Self> {
        let client = StrapiClient::new(&config.api)?;
        let storage = Arc::new(FileStorage::new(&config.storage_dir));
        Ok(Self::new(
            client,
            storage,
            config.page_size,
            config.public_url.clone(),
        ))
    }

    #[must_use]
    pub fn client(&self) -> &StrapiClient {
        &self.inner.client
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    #[must_use]
    pub fn products(&self) -> &ProductsStore {
        &self.inner.products
    }

    #[must_use]
    pub fn categories(&self) -> &CategoryFilterStore {
        &self.inner.categories
    }

    /// The listing URL reflecting the current page and filter.
    #[must_use]
    pub fn location(&self) -> Url {
        self.inner.location.borrow().clone()
    }

    /// Receive every subsequent location change.
    #[must_use]
    pub fn subscribe_location(&self) -> watch::Receiver<Url> {
        self.inner.location.subscribe()
    }

    /// Adopt the listing state encoded in `url` and load it.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn restore_from_url(&self, url: Url) -> FetchOutcome {
        let query = read_listing_query(&url);
        self.inner
            .categories
            .set_selected(query.filter.category_ids().to_vec());
        self.inner
            .location
            .send_replace(write_listing_query(&url, &query));
        self.inner.products.fetch(query).await
    }

    /// Search by title, dropping any category selection.
    pub async fn search(&self, text: &str) -> Url {
        self.inner.categories.clear();
        self.apply(ListingQuery::new(1, ProductFilter::search(text)))
            .await
    }

    /// Filter by categories, dropping any search text.
    pub async fn select_categories(&self, ids: Vec<CategoryId>) -> Url {
        let filter = ProductFilter::categories(ids);
        self.inner
            .categories
            .set_selected(filter.category_ids().to_vec());
        self.apply(ListingQuery::new(1, filter)).await
    }

    /// Move to `page` of the current listing.
    ///
    /// Returns `None` without fetching when `page` is outside the listing.
    pub async fn change_page(&self, page: u32) -> Option<Url> {
        let pagination = self.inner.products.pagination();
        if !pagination.contains_page(page) {
            debug!(page, page_count = pagination.page_count, "Ignoring out-of-range page");
            return None;
        }
        let query = self.inner.products.query().with_page(page);
        Some(self.apply(query).await)
    }

    /// Drop search and category filters and return to page 1.
    pub async fn clear_filters(&self) -> Url {
        self.inner.categories.clear();
        self.apply(ListingQuery::default()).await
    }

    /// Re-run the current listing query.
    pub async fn refresh(&self) -> FetchOutcome {
        let query = self.inner.products.query();
        self.inner.products.fetch(query).await
    }

    async fn apply(&self, query: ListingQuery) -> Url {
        let url = write_listing_query(&self.inner.location.borrow(), &query);
        self.inner.location.send_replace(url.clone());
        self.inner.products.fetch(query).await;
        url
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shopfront_core::Pagination;

    use super::*;
    use crate::config::StrapiConfig;
    use crate::storage::MemoryStorage;

    fn storefront() -> Storefront {
        let config = StrapiConfig::new(Url::parse("http://127.0.0.1:9/api").unwrap());
        Storefront::new(
            StrapiClient::new(&config).unwrap(),
            Arc::new(MemoryStorage::new()),
            9,
            Url::parse("https://shop.test/products?ref=home").unwrap(),
        )
    }

    #[tokio::test]
    async fn test_search_clears_category_selection() {
        let storefront = storefront();
        storefront
            .select_categories(vec![CategoryId::new(2)])
            .await;
        assert!(storefront.categories().is_filter_active());

        let url = storefront.search("lamp").await;

        assert!(!storefront.categories().is_filter_active());
        assert_eq!(
            storefront.products().query().filter,
            ProductFilter::Search("lamp".to_string())
        );
        assert_eq!(url.as_str(), "https://shop.test/products?ref=home&search=lamp");
        assert_eq!(storefront.location(), url);
    }

    #[tokio::test]
    async fn test_select_categories_clears_search() {
        let storefront = storefront();
        storefront.search("lamp").await;

        let url = storefront
            .select_categories(vec![CategoryId::new(3), CategoryId::new(1)])
            .await;

        let query = storefront.products().query();
        assert_eq!(query.filter.search_text(), "");
        assert_eq!(query.page, 1);
        assert_eq!(
            storefront.categories().selected(),
            vec![CategoryId::new(3), CategoryId::new(1)]
        );
        assert_eq!(
            url.as_str(),
            "https://shop.test/products?ref=home&categories=3%2C1"
        );
    }

    #[tokio::test]
    async fn test_change_page_out_of_range_is_ignored() {
        let storefront = storefront();
        assert_eq!(storefront.products().pagination().page_count, 1);

        assert!(storefront.change_page(0).await.is_none());
        assert!(storefront.change_page(2).await.is_none());
        assert!(storefront.change_page(1).await.is_some());
    }

    #[tokio::test]
    async fn test_change_page_keeps_filter() {
        let storefront = storefront();
        storefront.search("lamp").await;
        // A failed fetch leaves the initial single-page pagination in place.
        assert_eq!(
            storefront.products().pagination(),
            Pagination {
                page_size: 9,
                ..Pagination::default()
            }
        );

        let url = storefront.change_page(1).await.unwrap();
        assert_eq!(storefront.products().query().filter.search_text(), "lamp");
        assert_eq!(url.as_str(), "https://shop.test/products?ref=home&search=lamp");
    }

    #[tokio::test]
    async fn test_clear_filters() {
        let storefront = storefront();
        storefront
            .select_categories(vec![CategoryId::new(2)])
            .await;

        let url = storefront.clear_filters().await;

        assert!(!storefront.categories().is_filter_active());
        assert_eq!(storefront.products().query(), ListingQuery::default());
        assert_eq!(url.as_str(), "https://shop.test/products?ref=home");
    }

    #[tokio::test]
    async fn test_restore_from_url() {
        let storefront = storefront();
        let outcome = storefront
            .restore_from_url(Url::parse("https://shop.test/products?categories=4&search=x&page=2").unwrap())
            .await;

        assert_eq!(outcome, FetchOutcome::Failed);
        assert_eq!(storefront.categories().selected(), vec![CategoryId::new(4)]);
        assert_eq!(storefront.products().query().page, 2);
        assert_eq!(
            storefront.location().as_str(),
            "https://shop.test/products?page=2&categories=4"
        );
    }
}
