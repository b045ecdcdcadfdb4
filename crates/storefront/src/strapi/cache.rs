//! Cache types for Strapi API responses.

use shopfront_core::ProductCategory;

/// Cache key for reusable responses.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Categories,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Categories(Vec<ProductCategory>),
}
