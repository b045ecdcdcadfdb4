//! Integration tests for Shopfront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```
//!
//! Tests run against [`FakeStrapi`], an in-process `axum` server that speaks
//! the subset of the Strapi REST API the storefront uses: product listing
//! with pagination, title and category filters, single products, and the
//! category list.
//!
//! # Test Categories
//!
//! - `strapi_client` - request modes, error mapping, caching
//! - `products_store` - listing and detail state, stale responses
//! - `category_filter` - category loading and fallback
//! - `cart_persistence` - cart storage across reloads
//! - `listing_controller` - filter exclusivity and URL state

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::{HashMap, HashSet};
use std::io::ErrorKind;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

use shopfront_storefront::Storefront;
use shopfront_storefront::config::StrapiConfig;
use shopfront_storefront::storage::KeyValueStorage;
use shopfront_storefront::strapi::StrapiClient;

/// Listing URL used by storefronts built from the harness.
pub const LISTING_URL: &str = "https://shop.test/products";

// =============================================================================
// Fixtures
// =============================================================================

/// A category as Strapi serializes it.
#[must_use]
pub fn category_json(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "documentId": format!("cat-{id}"),
        "name": name,
        "slug": name.to_lowercase(),
    })
}

/// A product as Strapi serializes it (with `images` and `productCategory`
/// populated).
#[must_use]
pub fn product_json(
    id: i64,
    title: &str,
    price: i64,
    discount_percent: i64,
    category: Option<(i64, &str)>,
) -> Value {
    json!({
        "id": id,
        "documentId": format!("doc-{id}"),
        "title": title,
        "description": format!("{title} description"),
        "price": price,
        "discountPercent": discount_percent,
        "rating": 4.5,
        "isInStock": true,
        "images": [{
            "id": id * 10,
            "url": format!("https://cdn.test/{id}.png"),
            "name": format!("{id}.png"),
            "alternativeText": null,
        }],
        "productCategory": category.map(|(cid, name)| category_json(cid, name)),
    })
}

/// `count` products titled `Product N`, alternating between categories 1
/// ("Chairs") and 2 ("Lamps").
#[must_use]
pub fn catalogue(count: i64) -> Vec<Value> {
    (1..=count)
        .map(|id| {
            let category = if id % 2 == 1 { (1, "Chairs") } else { (2, "Lamps") };
            product_json(id, &format!("Product {id}"), id * 100, 0, Some(category))
        })
        .collect()
}

// =============================================================================
// FakeStrapi
// =============================================================================

/// What `GET /product-categories` answers with.
#[derive(Debug, Clone)]
pub enum CategoriesResponse {
    /// `{ data: [...] }`
    List(Vec<Value>),
    /// `{ data: null }`
    Null,
    /// The given error status.
    Error(StatusCode),
}

struct FakeState {
    products: Vec<Value>,
    categories: Mutex<CategoriesResponse>,
    products_status: Mutex<Option<StatusCode>>,
    failing_page_size: Mutex<Option<u32>>,
    page_delays: Mutex<HashMap<u32, Duration>>,
    product_delays: Mutex<HashMap<String, Duration>>,
    requests: Mutex<Vec<String>>,
}

impl FakeState {
    fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
        mutex.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// In-process fake Strapi server.
pub struct FakeStrapi {
    base_url: Url,
    state: Arc<FakeState>,
    handle: JoinHandle<()>,
}

impl Drop for FakeStrapi {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl FakeStrapi {
    /// Serve `products` on a random loopback port.
    ///
    /// Returns `None` when the sandbox forbids binding local sockets.
    pub async fn start(products: Vec<Value>) -> Option<Self> {
        let listener = match TcpListener::bind("127.0.0.1:0").await {
            Ok(listener) => listener,
            Err(err) if err.kind() == ErrorKind::PermissionDenied => return None,
            Err(err) => panic!("failed to bind local test listener: {err}"),
        };
        let addr = listener.local_addr().unwrap();

        let mut seen = HashSet::new();
        let categories = products
            .iter()
            .filter_map(|p| p.get("productCategory").filter(|c| !c.is_null()).cloned())
            .filter(|c| seen.insert(c["id"].as_i64()))
            .collect();

        let state = Arc::new(FakeState {
            products,
            categories: Mutex::new(CategoriesResponse::List(categories)),
            products_status: Mutex::new(None),
            failing_page_size: Mutex::new(None),
            page_delays: Mutex::new(HashMap::new()),
            product_delays: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/api/products", get(list_products))
            .route("/api/products/{document_id}", get(get_product))
            .route("/api/product-categories", get(list_categories))
            .with_state(state.clone());

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Some(Self {
            base_url: Url::parse(&format!("http://{addr}/api")).unwrap(),
            state,
            handle,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Client configuration pointing at this server.
    #[must_use]
    pub fn config(&self) -> StrapiConfig {
        let mut config = StrapiConfig::new(self.base_url.clone());
        config.request_timeout = Duration::from_secs(5);
        config
    }

    #[must_use]
    pub fn client(&self) -> StrapiClient {
        StrapiClient::new(&self.config()).unwrap()
    }

    /// A storefront backed by this server and `storage`, 9 products per page.
    #[must_use]
    pub fn storefront(&self, storage: Arc<dyn KeyValueStorage>) -> Storefront {
        Storefront::new(self.client(), storage, 9, Url::parse(LISTING_URL).unwrap())
    }

    pub fn set_categories(&self, response: CategoriesResponse) {
        *FakeState::lock(&self.state.categories) = response;
    }

    /// Answer every product request with `status`; `None` restores normal
    /// responses.
    pub fn set_products_status(&self, status: Option<StatusCode>) {
        *FakeState::lock(&self.state.products_status) = status;
    }

    /// Fail listing requests asking for exactly `page_size` products.
    ///
    /// The category scan asks for 100 and the similar-products lookup for 4,
    /// so either can be broken without affecting the main listing.
    pub fn fail_page_size(&self, page_size: Option<u32>) {
        *FakeState::lock(&self.state.failing_page_size) = page_size;
    }

    /// Delay listing responses for `page`.
    pub fn delay_page(&self, page: u32, delay: Duration) {
        FakeState::lock(&self.state.page_delays).insert(page, delay);
    }

    /// Delay single-product responses for `document_id`.
    pub fn delay_product(&self, document_id: &str, delay: Duration) {
        FakeState::lock(&self.state.product_delays).insert(document_id.to_string(), delay);
    }

    /// Decoded `path?query` of every request received, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        FakeState::lock(&self.state.requests).clone()
    }

    /// Requests whose path is exactly `path`.
    #[must_use]
    pub fn requests_to(&self, path: &str) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|r| r.split('?').next() == Some(path))
            .collect()
    }
}

fn record(state: &FakeState, path: &str, query: &[(String, String)]) {
    let rendered = query
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    let entry = if rendered.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{rendered}")
    };
    FakeState::lock(&state.requests).push(entry);
}

fn parse_query(raw: Option<&str>) -> Vec<(String, String)> {
    url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes())
        .into_owned()
        .collect()
}

fn strapi_error(status: StatusCode, message: &str) -> Response {
    let body = json!({
        "data": null,
        "error": {"status": status.as_u16(), "name": "ApplicationError", "message": message, "details": {}},
    });
    let mut response = (status, Json(body)).into_response();
    if status == StatusCode::TOO_MANY_REQUESTS {
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from_static("7"));
    }
    response
}

async fn list_products(
    State(state): State<Arc<FakeState>>,
    RawQuery(raw): RawQuery,
) -> Response {
    let query = parse_query(raw.as_deref());
    record(&state, "/api/products", &query);

    let param = |key: &str| {
        query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    };
    let page: u32 = param("pagination[page]")
        .and_then(|v| v.parse().ok())
        .unwrap_or(1);
    let page_size: u32 = param("pagination[pageSize]")
        .and_then(|v| v.parse().ok())
        .unwrap_or(25);

    let delay = FakeState::lock(&state.page_delays).get(&page).copied();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let status = *FakeState::lock(&state.products_status);
    if let Some(status) = status {
        return strapi_error(status, "Products unavailable");
    }
    if *FakeState::lock(&state.failing_page_size) == Some(page_size) {
        return strapi_error(StatusCode::INTERNAL_SERVER_ERROR, "Listing failed");
    }

    let title = param("filters[title][$containsi]").map(|t| t.to_lowercase());
    let category_ids: Vec<i64> = query
        .iter()
        .filter(|(k, _)| k.starts_with("filters[productCategory][id][$in]"))
        .filter_map(|(_, v)| v.parse().ok())
        .collect();

    let matching: Vec<&Value> = state
        .products
        .iter()
        .filter(|p| {
            title.as_ref().is_none_or(|t| {
                p["title"]
                    .as_str()
                    .unwrap_or_default()
                    .to_lowercase()
                    .contains(t.as_str())
            })
        })
        .filter(|p| {
            category_ids.is_empty()
                || p["productCategory"]["id"]
                    .as_i64()
                    .is_some_and(|id| category_ids.contains(&id))
        })
        .collect();

    let total = u32::try_from(matching.len()).unwrap();
    let start = usize::try_from(page.saturating_sub(1) * page_size).unwrap();
    let data: Vec<&Value> = matching
        .into_iter()
        .skip(start)
        .take(usize::try_from(page_size).unwrap())
        .collect();

    Json(json!({
        "data": data,
        "meta": {"pagination": {
            "page": page,
            "pageSize": page_size,
            "pageCount": total.div_ceil(page_size.max(1)),
            "total": total,
        }},
    }))
    .into_response()
}

async fn get_product(
    State(state): State<Arc<FakeState>>,
    Path(document_id): Path<String>,
    RawQuery(raw): RawQuery,
) -> Response {
    let query = parse_query(raw.as_deref());
    record(&state, &format!("/api/products/{document_id}"), &query);

    let delay = FakeState::lock(&state.product_delays).get(&document_id).copied();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let status = *FakeState::lock(&state.products_status);
    if let Some(status) = status {
        return strapi_error(status, "Products unavailable");
    }

    state
        .products
        .iter()
        .find(|p| p["documentId"] == document_id.as_str())
        .map_or_else(
            || strapi_error(StatusCode::NOT_FOUND, "Not Found"),
            |product| Json(json!({"data": product, "meta": {}})).into_response(),
        )
}

async fn list_categories(State(state): State<Arc<FakeState>>) -> Response {
    record(&state, "/api/product-categories", &[]);

    let response = FakeState::lock(&state.categories).clone();
    match response {
        CategoriesResponse::List(categories) => {
            Json(json!({"data": categories, "meta": {}})).into_response()
        }
        CategoriesResponse::Null => Json(json!({"data": null, "meta": {}})).into_response(),
        CategoriesResponse::Error(status) => strapi_error(status, "Categories unavailable"),
    }
}
