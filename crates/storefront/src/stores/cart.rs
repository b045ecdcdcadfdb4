//! Shopping cart store.
//!
//! The item list is persisted as JSON under [`CART_STORAGE_KEY`] after every
//! mutation. The drawer flag lives in memory only.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use shopfront_core::{CartItem, DocumentId, Price, Product};

use crate::error::add_breadcrumb;
use crate::storage::KeyValueStorage;

/// Storage key holding the serialized item list.
pub const CART_STORAGE_KEY: &str = "cart";

/// Snapshot of the cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartState {
    pub items: Vec<CartItem>,
    /// Whether the cart drawer is open.
    pub is_open: bool,
}

impl CartState {
    /// Sum of `price × quantity` over all lines.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Sum of quantities, saturating at `u32::MAX`.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |total, item| total.saturating_add(item.quantity))
    }

    #[must_use]
    pub fn contains(&self, id: &DocumentId) -> bool {
        self.items.iter().any(|item| &item.id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Cart backed by a [`KeyValueStorage`].
pub struct CartStore {
    state: watch::Sender<CartState>,
    storage: Arc<dyn KeyValueStorage>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Load the cart from `storage`.
    ///
    /// Missing, unreadable, or malformed data yields an empty cart.
    #[must_use]
    pub fn load(storage: Arc<dyn KeyValueStorage>) -> Self {
        let items = read_items(storage.as_ref());
        debug!(items = items.len(), "Cart loaded");
        Self {
            state: watch::Sender::new(CartState {
                items,
                is_open: false,
            }),
            storage,
        }
    }

    /// Receive every subsequent cart change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.state.subscribe()
    }

    /// Current cart contents.
    #[must_use]
    pub fn snapshot(&self) -> CartState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.state.borrow().items.clone()
    }

    #[must_use]
    pub fn total(&self) -> Price {
        self.state.borrow().total()
    }

    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.state.borrow().total_items()
    }

    #[must_use]
    pub fn is_in_cart(&self, id: &DocumentId) -> bool {
        self.state.borrow().contains(id)
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state.borrow().is_open
    }

    /// Add one unit of `product`.
    ///
    /// An existing line is incremented; a new line captures the discounted
    /// price at the time of adding.
    pub fn add_item(&self, product: &Product) {
        self.state.send_modify(|state| {
            if let Some(item) = state
                .items
                .iter_mut()
                .find(|item| item.id == product.document_id)
            {
                item.quantity = item.quantity.saturating_add(1);
            } else {
                state.items.push(CartItem::from_product(product));
            }
        });
        add_breadcrumb(
            "cart",
            "Added item",
            Some(&[("document_id", product.document_id.as_str())]),
        );
        self.persist();
    }

    /// Remove the line for `id`, if present.
    pub fn remove_item(&self, id: &DocumentId) {
        self.state
            .send_modify(|state| state.items.retain(|item| &item.id != id));
        add_breadcrumb("cart", "Removed item", Some(&[("document_id", id.as_str())]));
        self.persist();
    }

    /// Set the quantity for `id`; zero or less removes the line.
    ///
    /// Unknown ids are ignored.
    pub fn update_quantity(&self, id: &DocumentId, quantity: i64) {
        if !self.is_in_cart(id) {
            debug!(document_id = %id, "Quantity update for item not in cart");
            return;
        }

        if quantity <= 0 {
            self.remove_item(id);
            return;
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        self.state.send_modify(|state| {
            if let Some(item) = state.items.iter_mut().find(|item| &item.id == id) {
                item.quantity = quantity;
            }
        });
        self.persist();
    }

    /// Remove every line.
    pub fn clear(&self) {
        self.state.send_modify(|state| state.items.clear());
        add_breadcrumb("cart", "Cleared", None);
        self.persist();
    }

    pub fn toggle(&self) {
        self.state.send_modify(|state| state.is_open = !state.is_open);
    }

    pub fn open(&self) {
        self.state.send_if_modified(|state| !std::mem::replace(&mut state.is_open, true));
    }

    pub fn close(&self) {
        self.state.send_if_modified(|state| std::mem::replace(&mut state.is_open, false));
    }

    /// Write the item list; failures are logged and the in-memory cart stays
    /// authoritative.
    fn persist(&self) {
        let json = match serde_json::to_string(&self.state.borrow().items) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize cart");
                return;
            }
        };
        if let Err(e) = self.storage.set(CART_STORAGE_KEY, &json) {
            warn!(error = %e, "Failed to persist cart");
        }
    }
}

fn read_items(storage: &dyn KeyValueStorage) -> Vec<CartItem> {
    let raw = match storage.get(CART_STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(error = %e, "Failed to read stored cart");
            return Vec::new();
        }
    };

    let stored: Vec<CartItem> = match serde_json::from_str(&raw) {
        Ok(items) => items,
        Err(e) => {
            warn!(error = %e, "Stored cart is malformed, starting empty");
            return Vec::new();
        }
    };

    normalize_items(stored)
}

/// Drop empty lines and merge lines sharing an id into the first one.
fn normalize_items(stored: Vec<CartItem>) -> Vec<CartItem> {
    let stored_len = stored.len();
    let mut items: Vec<CartItem> = Vec::with_capacity(stored_len);
    for item in stored {
        if item.quantity == 0 {
            continue;
        }
        match items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(item.quantity),
            None => items.push(item),
        }
    }

    if items.len() != stored_len {
        warn!(
            stored = stored_len,
            kept = items.len(),
            "Stored cart had empty or duplicate lines"
        );
    }
    items
}
