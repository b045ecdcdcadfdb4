//! Shopfront Core - Shared types library.
//!
//! This crate provides common types used across all Shopfront components:
//! - `storefront` - CMS client, local storage and the observable stores
//! - `cli` - Command-line front end driving the stores
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no storage. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - IDs, prices, catalogue records, cart items, pagination and filters

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
