//! Observable client-side state.
//!
//! Each store keeps its state in a [`tokio::sync::watch`] channel. Mutations
//! go through `send_modify` and never hold the value across an `.await`;
//! readers either take a snapshot or [`subscribe`](CartStore::subscribe) and
//! react to changes.

pub mod cart;
pub mod categories;
pub mod products;

pub use cart::{CART_STORAGE_KEY, CartState, CartStore};
pub use categories::{CATEGORY_SCAN_PAGE_SIZE, CategoryFilterStore, CategoryState, SelectOption};
pub use products::{
    FetchOutcome, LOAD_PRODUCT_ERROR, LOAD_PRODUCTS_ERROR, ProductsState, ProductsStore,
    SIMILAR_PRODUCTS_LIMIT,
};
