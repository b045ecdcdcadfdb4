//! Integration tests for cart persistence across storefront restarts.

use std::path::PathBuf;
use std::sync::Arc;

use shopfront_core::{DocumentId, Price};
use shopfront_integration_tests::{FakeStrapi, catalogue, product_json};
use shopfront_storefront::storage::{FileStorage, KeyValueStorage};
use shopfront_storefront::stores::CART_STORAGE_KEY;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "shopfront-it-{name}-{}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[tokio::test]
async fn test_cart_survives_restart() {
    let products = vec![
        product_json(1, "Armchair", 1000, 15, Some((1, "Chairs"))),
        product_json(2, "Lamp", 250, 0, Some((2, "Lamps"))),
    ];
    let Some(server) = FakeStrapi::start(products).await else {
        return;
    };
    let dir = scratch_dir("restart");

    {
        let storefront = server.storefront(Arc::new(FileStorage::new(&dir)));
        let client = storefront.client();
        let armchair = client.product(&DocumentId::new("doc-1")).await.unwrap();
        let lamp = client.product(&DocumentId::new("doc-2")).await.unwrap();

        storefront.cart().add_item(&armchair);
        storefront.cart().add_item(&armchair);
        storefront.cart().add_item(&lamp);
    }

    let storefront = server.storefront(Arc::new(FileStorage::new(&dir)));
    let cart = storefront.cart();
    assert_eq!(cart.items().len(), 2);
    assert_eq!(cart.total_items(), 3);
    assert_eq!(cart.total(), Price::from_units(850 * 2 + 250));
    assert!(cart.is_in_cart(&DocumentId::new("doc-1")));
    assert!(dir.join("cart.json").exists());

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_corrupted_cart_file_loads_empty_and_is_replaced() {
    let Some(server) = FakeStrapi::start(catalogue(2)).await else {
        return;
    };
    let dir = scratch_dir("corrupt");
    let storage = Arc::new(FileStorage::new(&dir));
    storage.set(CART_STORAGE_KEY, "[{\"id\": 1}").unwrap();

    let storefront = server.storefront(storage.clone());
    assert!(storefront.cart().items().is_empty());

    let product = storefront
        .client()
        .product(&DocumentId::new("doc-1"))
        .await
        .unwrap();
    storefront.cart().add_item(&product);

    let stored = storage.get(CART_STORAGE_KEY).unwrap().unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&stored).unwrap();
    assert_eq!(parsed[0]["id"], "doc-1");
    assert_eq!(parsed[0]["quantity"], 1);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_update_quantity_zero_recomputes_total() {
    let Some(server) = FakeStrapi::start(catalogue(2)).await else {
        return;
    };
    let dir = scratch_dir("quantity");
    let storefront = server.storefront(Arc::new(FileStorage::new(&dir)));
    let client = storefront.client();
    let cart = storefront.cart();

    cart.add_item(&client.product(&DocumentId::new("doc-1")).await.unwrap());
    cart.add_item(&client.product(&DocumentId::new("doc-2")).await.unwrap());
    assert_eq!(cart.total(), Price::from_units(300));

    cart.update_quantity(&DocumentId::new("doc-2"), 0);

    assert_eq!(cart.total(), Price::from_units(100));
    let reloaded = server.storefront(Arc::new(FileStorage::new(&dir)));
    assert_eq!(reloaded.cart().total(), Price::from_units(100));

    let _ = std::fs::remove_dir_all(&dir);
}
