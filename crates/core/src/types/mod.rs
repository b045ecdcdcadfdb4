//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers for catalogue and cart concepts.

pub mod cart;
pub mod filter;
pub mod id;
pub mod pagination;
pub mod price;
pub mod product;

pub use cart::CartItem;
pub use filter::{ListingQuery, ProductFilter};
pub use id::*;
pub use pagination::{DEFAULT_PAGE_SIZE, PageLink, PageWindow, Pagination, page_count};
pub use price::Price;
pub use product::{Product, ProductCategory, ProductImage, UNNAMED_CATEGORY};
