//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! shopfront cart add x1b2c3d4e5f6g7h8i9j0k1l2
//! shopfront cart set x1b2c3d4e5f6g7h8i9j0k1l2 3
//! shopfront cart show
//! shopfront cart remove x1b2c3d4e5f6g7h8i9j0k1l2
//! shopfront cart clear
//! ```
//!
//! The cart is stored in `SHOPFRONT_STORAGE_DIR/cart.json`.

use std::io::Write;

use shopfront_core::DocumentId;
use shopfront_storefront::stores::CartState;
use shopfront_storefront::strapi::StrapiError;
use shopfront_storefront::{AppError, Storefront};

use super::Result;

/// Print the cart contents and total.
///
/// # Errors
///
/// Returns an error if output cannot be written.
pub fn show(storefront: &Storefront, out: &mut impl Write) -> Result<()> {
    render(&storefront.cart().snapshot(), out)?;
    Ok(())
}

/// Fetch a product and add one unit of it.
///
/// # Errors
///
/// Returns an error if the product cannot be fetched or output cannot be
/// written.
pub async fn add(storefront: &Storefront, id: &str, out: &mut impl Write) -> Result<()> {
    let id = parse_id(id)?;
    let product = storefront
        .client()
        .product(&id)
        .await
        .map_err(|e| match e {
            StrapiError::NotFound(_) => AppError::NotFound(format!("product {id}")),
            other => AppError::Strapi(other),
        })?;

    storefront.cart().add_item(&product);
    let quantity = storefront
        .cart()
        .items()
        .iter()
        .find(|item| item.id == id)
        .map_or(0, |item| item.quantity);
    writeln!(out, "Added {} (quantity {quantity})", product.title)?;
    Ok(())
}

/// Remove a line from the cart.
///
/// # Errors
///
/// Returns an error if the item is not in the cart or output cannot be
/// written.
pub fn remove(storefront: &Storefront, id: &str, out: &mut impl Write) -> Result<()> {
    let id = in_cart(storefront, id)?;
    storefront.cart().remove_item(&id);
    writeln!(out, "Removed {id}")?;
    Ok(())
}

/// Set the quantity of a line; zero or less removes it.
///
/// # Errors
///
/// Returns an error if the item is not in the cart or output cannot be
/// written.
pub fn set(storefront: &Storefront, id: &str, quantity: i64, out: &mut impl Write) -> Result<()> {
    let id = in_cart(storefront, id)?;
    storefront.cart().update_quantity(&id, quantity);
    let stored = storefront
        .cart()
        .items()
        .into_iter()
        .find(|item| item.id == id)
        .map(|item| item.quantity);
    match stored {
        Some(quantity) => writeln!(out, "Set {id} to quantity {quantity}")?,
        None => writeln!(out, "Removed {id}")?,
    }
    Ok(())
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error if output cannot be written.
pub fn clear(storefront: &Storefront, out: &mut impl Write) -> Result<()> {
    storefront.cart().clear();
    writeln!(out, "Cart cleared")?;
    Ok(())
}

fn parse_id(raw: &str) -> Result<DocumentId> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::BadRequest("product id cannot be empty".to_string()).into());
    }
    Ok(DocumentId::new(raw))
}

fn in_cart(storefront: &Storefront, raw: &str) -> Result<DocumentId> {
    let id = parse_id(raw)?;
    if !storefront.cart().is_in_cart(&id) {
        return Err(AppError::NotFound(format!("{id} is not in the cart")).into());
    }
    Ok(id)
}

/// Render cart lines and totals.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn render(state: &CartState, out: &mut impl Write) -> std::io::Result<()> {
    if state.is_empty() {
        return writeln!(out, "Cart is empty");
    }
    for item in &state.items {
        writeln!(
            out,
            "  {:<26} {} × {} = {}",
            item.id,
            item.title,
            item.quantity,
            item.line_total()
        )?;
    }
    writeln!(
        out,
        "Total: {} ({} items)",
        state.total(),
        state.total_items()
    )
}
