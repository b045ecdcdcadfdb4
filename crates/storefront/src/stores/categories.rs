//! Category filter store.

use std::collections::HashSet;

use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use shopfront_core::{CategoryId, ProductCategory};

use crate::strapi::StrapiClient;

/// Page size used when deriving categories from products.
pub const CATEGORY_SCAN_PAGE_SIZE: u32 = 100;

/// A selectable filter entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    /// Category id as a string.
    pub key: String,
    /// Display name.
    pub value: String,
}

impl From<&ProductCategory> for SelectOption {
    fn from(category: &ProductCategory) -> Self {
        Self {
            key: category.id.to_string(),
            value: category.display_name().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryState {
    pub categories: Vec<ProductCategory>,
    pub selected: Vec<CategoryId>,
    pub is_loading: bool,
}

impl CategoryState {
    #[must_use]
    pub fn options(&self) -> Vec<SelectOption> {
        self.categories.iter().map(SelectOption::from).collect()
    }

    /// Options for selected categories, in category order.
    #[must_use]
    pub fn selected_options(&self) -> Vec<SelectOption> {
        self.categories
            .iter()
            .filter(|category| self.selected.contains(&category.id))
            .map(SelectOption::from)
            .collect()
    }

    #[must_use]
    pub fn is_filter_active(&self) -> bool {
        !self.selected.is_empty()
    }

    /// Label for the filter control: "All categories" or "Selected: N".
    #[must_use]
    pub fn filter_title(&self) -> String {
        match self.selected_options().len() {
            0 => "All categories".to_string(),
            n => format!("Selected: {n}"),
        }
    }
}

/// Available categories and the shopper's selection.
#[derive(Debug)]
pub struct CategoryFilterStore {
    client: StrapiClient,
    state: watch::Sender<CategoryState>,
}

impl CategoryFilterStore {
    #[must_use]
    pub fn new(client: StrapiClient) -> Self {
        Self {
            client,
            state: watch::Sender::new(CategoryState::default()),
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CategoryState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> CategoryState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn categories(&self) -> Vec<ProductCategory> {
        self.state.borrow().categories.clone()
    }

    #[must_use]
    pub fn selected(&self) -> Vec<CategoryId> {
        self.state.borrow().selected.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    #[must_use]
    pub fn options(&self) -> Vec<SelectOption> {
        self.state.borrow().options()
    }

    #[must_use]
    pub fn selected_options(&self) -> Vec<SelectOption> {
        self.state.borrow().selected_options()
    }

    #[must_use]
    pub fn is_filter_active(&self) -> bool {
        self.state.borrow().is_filter_active()
    }

    /// Load categories from the categories endpoint, falling back to the
    /// categories of the first [`CATEGORY_SCAN_PAGE_SIZE`] products when the
    /// endpoint fails or returns no data.
    #[instrument(skip(self))]
    pub async fn load(&self) {
        self.state.send_modify(|state| state.is_loading = true);

        let categories = match self.client.categories().await {
            Ok(Some(categories)) => categories,
            Ok(None) => {
                warn!("Categories endpoint returned null data, deriving from products");
                self.categories_from_products().await
            }
            Err(e) => {
                error!(error = %e, "Failed to load categories, deriving from products");
                self.categories_from_products().await
            }
        };

        debug!(count = categories.len(), "Categories loaded");
        self.state.send_modify(|state| {
            state.categories = categories;
            state.is_loading = false;
        });
    }

    async fn categories_from_products(&self) -> Vec<ProductCategory> {
        match self.client.list_products(1, CATEGORY_SCAN_PAGE_SIZE).await {
            Ok(page) => {
                let categories =
                    distinct_categories(page.products.into_iter().filter_map(|p| p.product_category));
                info!(count = categories.len(), "Derived categories from products");
                categories
            }
            Err(e) => {
                error!(error = %e, "Failed to load categories from products");
                Vec::new()
            }
        }
    }

    /// Replace the selection.
    pub fn set_selected(&self, ids: Vec<CategoryId>) {
        self.state.send_modify(|state| state.selected = ids);
    }

    pub fn clear(&self) {
        self.state
            .send_if_modified(|state| !std::mem::take(&mut state.selected).is_empty());
    }
}

/// Deduplicate by id, keeping first-seen order.
fn distinct_categories(categories: impl IntoIterator<Item = ProductCategory>) -> Vec<ProductCategory> {
    let mut seen = HashSet::new();
    categories
        .into_iter()
        .filter(|category| seen.insert(category.id))
        .collect()
}
