//! Strapi REST API client.
//!
//! # Architecture
//!
//! - Plain `reqwest` GET requests against the configured base URL
//! - Strapi is source of truth - NO local sync, direct API calls
//! - Only the category list is cached (`moka`, configurable TTL); product
//!   listings are re-fetched on every query change
//!
//! # Endpoints
//!
//! - `GET /products` - listing with `populate`, `pagination` and `filters`
//! - `GET /products/{documentId}` - single product
//! - `GET /product-categories` - category list (may answer `data: null`)
//!
//! # Example
//!
//! ```rust,ignore
//! use shopfront_storefront::strapi::StrapiClient;
//!
//! let client = StrapiClient::new(&config.api)?;
//!
//! // Second page of a title search
//! let page = client.search_products("chair", 2, 9).await?;
//!
//! // One product
//! let product = client.product(&page.products[0].document_id).await?;
//! ```

mod cache;
mod client;
pub mod query;
pub mod types;

pub use client::StrapiClient;
pub use query::StrapiQuery;
pub use types::ProductPage;

use thiserror::Error;

/// Errors that can occur when talking to the Strapi API.
#[derive(Debug, Error)]
pub enum StrapiError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Non-success status with Strapi's error message, when it sent one.
    #[error("Strapi returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The base URL cannot have path segments appended.
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),
}
