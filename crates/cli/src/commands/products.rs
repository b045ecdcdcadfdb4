//! Product listing and product detail commands.
//!
//! # Usage
//!
//! ```bash
//! # Second page of the catalogue
//! shopfront products list --page 2
//!
//! # Title search
//! shopfront products list --search "oak table"
//!
//! # Category filter
//! shopfront products list --categories 1,4
//!
//! # Reproduce a bookmarked listing
//! shopfront products list --url "https://shop.example.org/products?page=2&search=lamp"
//!
//! # One product with similar products
//! shopfront products show x1b2c3d4e5f6g7h8i9j0k1l2
//! ```

use std::io::Write;

use shopfront_core::{
    CategoryId, DocumentId, ListingQuery, PageLink, Product, ProductFilter,
};
use shopfront_storefront::stores::{FetchOutcome, ProductsState};
use shopfront_storefront::url_sync::write_listing_query;
use shopfront_storefront::{AppError, Storefront};
use url::Url;

use super::{CommandError, Result};

/// Listing options from the command line.
#[derive(Debug, Default)]
pub struct ListArgs {
    pub page: Option<u32>,
    pub search: Option<String>,
    pub categories: Vec<CategoryId>,
    pub url: Option<String>,
}

impl ListArgs {
    /// The listing URL to load: `--url` as given, otherwise `base` with the
    /// page and filter flags applied.
    ///
    /// # Errors
    ///
    /// Returns an error if `--url` is not a valid absolute URL.
    pub fn location(&self, base: &Url) -> Result<Url> {
        if let Some(raw) = &self.url {
            return Url::parse(raw)
                .map_err(|e| AppError::BadRequest(format!("invalid --url {raw:?}: {e}")).into());
        }

        let filter = if self.categories.is_empty() {
            ProductFilter::search(self.search.as_deref().unwrap_or_default())
        } else {
            ProductFilter::categories(self.categories.iter().copied())
        };
        let query = ListingQuery::new(self.page.unwrap_or(1), filter);
        Ok(write_listing_query(base, &query))
    }
}

/// Print one listing page.
///
/// # Errors
///
/// Returns an error if the listing fails to load or output cannot be written.
pub async fn list(storefront: &Storefront, args: &ListArgs, out: &mut impl Write) -> Result<()> {
    let location = args.location(&storefront.location())?;
    tracing::debug!(url = %location, "Loading listing");

    if storefront.restore_from_url(location).await == FetchOutcome::Failed {
        let state = storefront.products().snapshot();
        return Err(CommandError::Load(state.error.unwrap_or_default()));
    }

    let filter_label = match storefront.products().query().filter {
        ProductFilter::Categories(_) => {
            storefront.categories().load().await;
            let names: Vec<String> = storefront
                .categories()
                .selected_options()
                .into_iter()
                .map(|option| option.value)
                .collect();
            Some(format!("Categories: {}", names.join(", ")))
        }
        ProductFilter::Search(text) => Some(format!("Search: \"{text}\"")),
        ProductFilter::None => None,
    };

    render_listing(
        &storefront.products().snapshot(),
        filter_label.as_deref(),
        &storefront.location(),
        out,
    )?;
    Ok(())
}

/// Print one product and its similar products.
///
/// # Errors
///
/// Returns an error if the product fails to load or output cannot be written.
pub async fn show(storefront: &Storefront, id: &str, out: &mut impl Write) -> Result<()> {
    let id = DocumentId::new(id.trim());
    if id.as_str().is_empty() {
        return Err(AppError::BadRequest("product id cannot be empty".to_string()).into());
    }

    let outcome = storefront.products().fetch_by_id(&id).await;
    let state = storefront.products().snapshot();
    match (outcome, state.current) {
        (FetchOutcome::Applied, Some(product)) => {
            render_product(&product, &state.similar, storefront.cart().is_in_cart(&id), out)?;
            Ok(())
        }
        _ => Err(CommandError::Load(state.product_error.unwrap_or_default())),
    }
}

fn price_label(product: &Product) -> String {
    if product.has_discount() {
        format!(
            "{} (was {}, -{}%)",
            product.discounted_price(),
            product.price,
            product.discount_percent.normalize()
        )
    } else {
        product.price.to_string()
    }
}

/// Render a listing snapshot.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn render_listing(
    state: &ProductsState,
    filter_label: Option<&str>,
    location: &Url,
    out: &mut impl Write,
) -> std::io::Result<()> {
    if let Some(label) = filter_label {
        writeln!(out, "{label}")?;
    }

    if state.products.is_empty() {
        writeln!(out, "No products found")?;
    } else {
        let (start, end) = state.current_range();
        writeln!(
            out,
            "Products {start}-{end} of {} (page {} of {})",
            state.displayed_total(),
            state.pagination.page,
            state.pagination.page_count
        )?;
        for product in &state.products {
            let stock = if product.is_in_stock { "" } else { "  [out of stock]" };
            writeln!(
                out,
                "  {:<26} {}  {}{stock}",
                product.document_id,
                product.title,
                price_label(product)
            )?;
        }
    }

    let window = state.pagination.page_window(state.pagination.page);
    if !window.links.is_empty() {
        let mut line = String::from(if window.has_previous { "‹ " } else { "  " });
        for link in &window.links {
            match link {
                PageLink::Page { number, active: true } => line.push_str(&format!("[{number}] ")),
                PageLink::Page { number, active: false } => line.push_str(&format!("{number} ")),
                PageLink::Ellipsis => line.push_str("… "),
            }
        }
        if window.has_next {
            line.push('›');
        }
        writeln!(out, "Pages: {}", line.trim_end())?;
    }

    writeln!(out, "URL: {location}")
}

/// Render a product detail view.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn render_product(
    product: &Product,
    similar: &[Product],
    in_cart: bool,
    out: &mut impl Write,
) -> std::io::Result<()> {
    writeln!(out, "{}", product.title)?;
    if let Some(category) = &product.product_category {
        writeln!(out, "Category: {}", category.display_name())?;
    }
    writeln!(out, "Price: {}", price_label(product))?;
    writeln!(out, "Rating: {:.1}", product.rating)?;
    writeln!(
        out,
        "Availability: {}",
        if product.is_in_stock { "in stock" } else { "out of stock" }
    )?;
    if in_cart {
        writeln!(out, "In cart")?;
    }
    if let Some(image) = product.primary_image() {
        writeln!(out, "Image: {} (+{} more)", image.url, product.images.len() - 1)?;
    }
    if !product.description.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", product.description)?;
    }

    if !similar.is_empty() {
        writeln!(out)?;
        writeln!(out, "Similar products:")?;
        for item in similar {
            writeln!(
                out,
                "  {:<26} {}  {}",
                item.document_id,
                item.title,
                price_label(item)
            )?;
        }
    }
    Ok(())
}
