//! Shopfront storefront library.
//!
//! Client-side state for a Strapi-backed shop: the REST client, the
//! persisted cart, the product listing with search, category filter and
//! pagination, and the URL mirroring that makes listings bookmarkable.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod state;
pub mod storage;
pub mod stores;
pub mod strapi;
pub mod url_sync;

pub use error::{AppError, Result};
pub use state::Storefront;
