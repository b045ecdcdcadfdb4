//! Catalogue records as served by the CMS.
//!
//! Field names follow the Strapi JSON payloads (`camelCase`). Strapi emits
//! `null` for empty media and optional text fields, so those deserialize to
//! their defaults instead of failing the whole listing.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::id::{CategoryId, DocumentId, ImageId, ProductId};
use super::price::Price;

/// Label used when a category has no name.
pub const UNNAMED_CATEGORY: &str = "Unnamed Category";

/// A product image (Strapi media entry, trimmed to the fields we use).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub id: ImageId,
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub alternative_text: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCategory {
    pub id: CategoryId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub document_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: String,
}

impl ProductCategory {
    /// Name shown in filters and product cards.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            UNNAMED_CATEGORY
        } else {
            &self.name
        }
    }
}

/// A catalogue product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub document_id: DocumentId,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub price: Price,
    #[serde(default, deserialize_with = "null_as_default")]
    pub discount_percent: Decimal,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rating: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_in_stock: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub product_category: Option<ProductCategory>,
}

impl Product {
    /// Whether a positive discount applies.
    #[must_use]
    pub fn has_discount(&self) -> bool {
        self.discount_percent > Decimal::ZERO
    }

    /// The price a shopper pays: `round(price × (1 − discount / 100))`.
    #[must_use]
    pub fn discounted_price(&self) -> Price {
        self.price.discounted(self.discount_percent)
    }

    /// First image, used for cards and cart thumbnails.
    #[must_use]
    pub fn primary_image(&self) -> Option<&ProductImage> {
        self.images.first()
    }

    /// Category id, if the product is categorised.
    #[must_use]
    pub fn category_id(&self) -> Option<CategoryId> {
        self.product_category.as_ref().map(|c| c.id)
    }
}

/// Treat an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
