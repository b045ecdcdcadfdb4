//! Strapi REST client implementation.
//!
//! Uses `reqwest` for HTTP and caches the category list using `moka`.

use std::sync::Arc;

use moka::future::Cache;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use shopfront_core::{CategoryId, DocumentId, ListingQuery, Product, ProductCategory, ProductFilter};

use super::StrapiError;
use super::cache::{CacheKey, CacheValue};
use super::query::StrapiQuery;
use super::types::{CollectionResponse, ErrorResponse, NullableResponse, ProductPage};
use crate::config::StrapiConfig;

// =============================================================================
// StrapiClient
// =============================================================================

/// Client for the Strapi REST API.
///
/// Cheap to clone; clones share the HTTP connection pool and cache.
#[derive(Clone)]
pub struct StrapiClient {
    inner: Arc<StrapiClientInner>,
}

struct StrapiClientInner {
    client: reqwest::Client,
    base_url: Url,
    api_token: Option<SecretString>,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for StrapiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrapiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl StrapiClient {
    /// Create a new Strapi API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot take path segments or the HTTP
    /// client cannot be built.
    pub fn new(config: &StrapiConfig) -> Result<Self, StrapiError> {
        if config.base_url.cannot_be_a_base() {
            return Err(StrapiError::InvalidBaseUrl(config.base_url.to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(config.category_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(StrapiClientInner {
                client,
                base_url: config.base_url.clone(),
                api_token: config.api_token.clone(),
                cache,
            }),
        })
    }

    /// Base URL requests are issued against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build `<base>/<segments...>`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, StrapiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| StrapiError::InvalidBaseUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Issue a GET request and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &StrapiQuery,
    ) -> Result<T, StrapiError> {
        let mut request = self.inner.client.get(url.clone()).query(query.pairs());
        if let Some(token) = &self.inner.api_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(StrapiError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(StrapiError::NotFound(url.path().to_string()));
        }

        if !status.is_success() {
            tracing::error!(
                status = %status,
                url = %url,
                body = %response_text.chars().take(500).collect::<String>(),
                "Strapi API returned non-success status"
            );
            let message = serde_json::from_str::<ErrorResponse>(&response_text).map_or_else(
                |_| response_text.chars().take(200).collect(),
                |e| e.error.message,
            );
            return Err(StrapiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                url = %url,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse Strapi response"
            );
            StrapiError::Parse(e)
        })
    }

    async fn get_product_page(
        &self,
        query: StrapiQuery,
        page: u32,
        page_size: u32,
    ) -> Result<ProductPage, StrapiError> {
        let url = self.endpoint(&["products"])?;
        debug!(query = %query.to_query_string(), "Fetching products");
        let response: CollectionResponse<Product> = self.get_json(url, &query).await?;
        Ok(ProductPage::from_response(response, page, page_size))
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get one page of the unfiltered catalogue.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self, page: u32, page_size: u32) -> Result<ProductPage, StrapiError> {
        let query = StrapiQuery::products().paginate(page, page_size);
        self.get_product_page(query, page, page_size).await
    }

    /// Get one page of products whose title contains `text` (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn search_products(
        &self,
        text: &str,
        page: u32,
        page_size: u32,
    ) -> Result<ProductPage, StrapiError> {
        let query = StrapiQuery::products()
            .title_contains(text)
            .paginate(page, page_size);
        self.get_product_page(query, page, page_size).await
    }

    /// Get one page of products in any of the given categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products_by_categories(
        &self,
        ids: &[CategoryId],
        page: u32,
        page_size: u32,
    ) -> Result<ProductPage, StrapiError> {
        let query = StrapiQuery::products()
            .in_categories(ids)
            .paginate(page, page_size);
        self.get_product_page(query, page, page_size).await
    }

    /// Fetch the listing a [`ListingQuery`] describes.
    ///
    /// Exactly one request mode is used: category filter, else title search,
    /// else plain pagination.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn fetch_listing(
        &self,
        query: &ListingQuery,
        page_size: u32,
    ) -> Result<ProductPage, StrapiError> {
        match &query.filter {
            ProductFilter::Categories(ids) => {
                self.products_by_categories(ids, query.page, page_size).await
            }
            ProductFilter::Search(text) => {
                self.search_products(text, query.page, page_size).await
            }
            ProductFilter::None => self.list_products(query.page, page_size).await,
        }
    }

    /// Get a product by its document id.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request fails.
    #[instrument(skip(self), fields(document_id = %document_id))]
    pub async fn product(&self, document_id: &DocumentId) -> Result<Product, StrapiError> {
        let url = self.endpoint(&["products", document_id.as_str()])?;
        let response: NullableResponse<Product> =
            self.get_json(url, &StrapiQuery::products()).await?;

        response
            .data
            .ok_or_else(|| StrapiError::NotFound(format!("Product not found: {document_id}")))
    }

    // =========================================================================
    // Category Methods
    // =========================================================================

    /// Get all product categories.
    ///
    /// Returns `Ok(None)` when the endpoint answers with `data: null`, which
    /// some deployments do when the content type is not publicly readable.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Option<Vec<ProductCategory>>, StrapiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(Some(categories));
        }

        let url = self.endpoint(&["product-categories"])?;
        let response: NullableResponse<Vec<ProductCategory>> =
            self.get_json(url, &StrapiQuery::new()).await?;

        if let Some(categories) = &response.data {
            self.inner
                .cache
                .insert(CacheKey::Categories, CacheValue::Categories(categories.clone()))
                .await;
        }

        Ok(response.data)
    }

    /// Drop the cached category list.
    pub async fn invalidate_categories(&self) {
        self.inner.cache.invalidate(&CacheKey::Categories).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> StrapiClient {
        StrapiClient::new(&StrapiConfig::new(Url::parse(base).unwrap())).unwrap()
    }

    #[test]
    fn test_endpoint_appends_segments() {
        let client = client("https://cms.example.org/api");
        let url = client.endpoint(&["products", "abc"]).unwrap();
        assert_eq!(url.as_str(), "https://cms.example.org/api/products/abc");
    }

    #[test]
    fn test_endpoint_handles_trailing_slash() {
        let client = client("https://cms.example.org/api/");
        let url = client.endpoint(&["product-categories"]).unwrap();
        assert_eq!(url.as_str(), "https://cms.example.org/api/product-categories");
    }

    #[test]
    fn test_endpoint_encodes_document_id() {
        let client = client("https://cms.example.org/api");
        let url = client.endpoint(&["products", "a b/c"]).unwrap();
        assert_eq!(url.as_str(), "https://cms.example.org/api/products/a%20b%2Fc");
    }

    #[test]
    fn test_rejects_non_base_url() {
        let config = StrapiConfig::new(Url::parse("mailto:cms@example.org").unwrap());
        assert!(matches!(
            StrapiClient::new(&config),
            Err(StrapiError::InvalidBaseUrl(_))
        ));
    }
}
