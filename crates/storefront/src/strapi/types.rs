//! Strapi response envelopes.
//!
//! Strapi wraps every payload in `{ "data": ..., "meta": ... }`, and error
//! responses in `{ "data": null, "error": { ... } }`.

use serde::Deserialize;

use shopfront_core::{Pagination, Product};

/// `{ data: [...], meta: { pagination } }`
#[derive(Debug, Deserialize)]
pub struct CollectionResponse<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub meta: CollectionMeta,
}

/// Listing metadata. Strapi omits `pagination` on some endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct CollectionMeta {
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// `{ data: ... }` where `data` may be `null`.
#[derive(Debug, Deserialize)]
pub struct NullableResponse<T> {
    pub data: Option<T>,
}

/// `{ error: { status, name, message } }`
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Strapi error details.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub message: String,
}

/// One page of products plus its pagination block.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub pagination: Pagination,
}

impl ProductPage {
    /// Build from a collection response, deriving pagination from the
    /// request when the backend omitted it.
    #[must_use]
    pub fn from_response(response: CollectionResponse<Product>, page: u32, page_size: u32) -> Self {
        let pagination = response.meta.pagination.unwrap_or_else(|| {
            let total = u32::try_from(response.data.len()).unwrap_or(u32::MAX);
            Pagination::new(page, page_size, total)
        });
        Self {
            products: response.data,
            pagination,
        }
    }
}
