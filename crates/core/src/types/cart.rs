//! Cart line items.

use serde::{Deserialize, Serialize};

use super::id::DocumentId;
use super::price::Price;
use super::product::Product;

/// One line in the shopper's cart.
///
/// `price` is the unit price after discount, captured when the product was
/// first added. This is also the on-disk shape of the persisted cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: DocumentId,
    pub title: String,
    pub price: Price,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl CartItem {
    /// A single-unit line for `product`.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            id: product.document_id.clone(),
            title: product.title.clone(),
            price: product.discounted_price(),
            quantity: 1,
            image: product.primary_image().map(|image| image.url.clone()),
        }
    }

    /// `price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::types::id::{ImageId, ProductId};
    use crate::types::product::ProductImage;

    fn product() -> Product {
        Product {
            id: ProductId::new(1),
            document_id: DocumentId::new("doc-1"),
            title: "Lamp".to_string(),
            description: String::new(),
            price: Price::from_units(200),
            discount_percent: Decimal::from(25),
            rating: 4.0,
            is_in_stock: true,
            images: vec![ProductImage {
                id: ImageId::new(1),
                url: "https://cdn/lamp.png".to_string(),
                name: String::new(),
                alternative_text: None,
                width: None,
                height: None,
            }],
            product_category: None,
        }
    }

    #[test]
    fn test_from_product_uses_discounted_price() {
        let item = CartItem::from_product(&product());
        assert_eq!(item.price, Price::from_units(150));
        assert_eq!(item.quantity, 1);
        assert_eq!(item.image.as_deref(), Some("https://cdn/lamp.png"));
    }

    #[test]
    fn test_line_total() {
        let mut item = CartItem::from_product(&product());
        item.quantity = 3;
        assert_eq!(item.line_total(), Price::from_units(450));
    }

    #[test]
    fn test_stored_shape_accepts_numeric_price() {
        let json = r#"{"id":"doc-1","title":"Lamp","price":150,"quantity":2}"#;
        let item: CartItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.price, Price::from_units(150));
        assert!(item.image.is_none());
    }
}
