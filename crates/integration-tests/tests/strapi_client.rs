//! Integration tests for the Strapi REST client.

use axum::http::StatusCode;
use shopfront_core::{CategoryId, DocumentId, ListingQuery, Pagination, Price, ProductFilter};
use shopfront_integration_tests::{CategoriesResponse, FakeStrapi, catalogue, product_json};
use shopfront_storefront::strapi::StrapiError;

// =============================================================================
// Listing Modes
// =============================================================================

#[tokio::test]
async fn test_list_products_paginates() {
    let Some(server) = FakeStrapi::start(catalogue(23)).await else {
        return;
    };
    let client = server.client();

    let page = client.list_products(3, 9).await.unwrap();

    assert_eq!(page.products.len(), 5);
    assert_eq!(page.pagination, Pagination::new(3, 9, 23));
    assert_eq!(page.pagination.page_count, 3);
    assert_eq!(page.products[0].document_id, DocumentId::new("doc-19"));

    let request = &server.requests_to("/api/products")[0];
    assert!(request.contains("populate[0]=images"));
    assert!(request.contains("populate[1]=productCategory"));
    assert!(request.contains("pagination[page]=3"));
    assert!(request.contains("pagination[pageSize]=9"));
}

#[tokio::test]
async fn test_search_products_is_case_insensitive() {
    let products = vec![
        product_json(1, "Oak Table", 100, 0, None),
        product_json(2, "Pine table", 100, 0, None),
        product_json(3, "Lamp", 100, 0, None),
    ];
    let Some(server) = FakeStrapi::start(products).await else {
        return;
    };

    let page = server.client().search_products("TABLE", 1, 9).await.unwrap();

    let titles: Vec<_> = page.products.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, ["Oak Table", "Pine table"]);
    assert_eq!(page.pagination.total, 2);
    assert!(server.requests()[0].contains("filters[title][$containsi]=TABLE"));
}

#[tokio::test]
async fn test_products_by_categories() {
    let Some(server) = FakeStrapi::start(catalogue(10)).await else {
        return;
    };

    let page = server
        .client()
        .products_by_categories(&[CategoryId::new(2)], 1, 9)
        .await
        .unwrap();

    assert_eq!(page.products.len(), 5);
    assert!(
        page.products
            .iter()
            .all(|p| p.category_id() == Some(CategoryId::new(2)))
    );
    assert!(server.requests()[0].contains("filters[productCategory][id][$in][0]=2"));
}

#[tokio::test]
async fn test_fetch_listing_uses_one_mode() {
    let Some(server) = FakeStrapi::start(catalogue(10)).await else {
        return;
    };
    let client = server.client();

    client
        .fetch_listing(
            &ListingQuery::new(1, ProductFilter::categories([CategoryId::new(1)])),
            9,
        )
        .await
        .unwrap();
    client
        .fetch_listing(&ListingQuery::new(2, ProductFilter::search("product")), 9)
        .await
        .unwrap();
    client.fetch_listing(&ListingQuery::default(), 9).await.unwrap();

    let requests = server.requests();
    assert!(requests[0].contains("filters[productCategory]"));
    assert!(!requests[0].contains("filters[title]"));
    assert!(requests[1].contains("filters[title][$containsi]=product"));
    assert!(!requests[1].contains("filters[productCategory]"));
    assert!(!requests[2].contains("filters["));
}

// =============================================================================
// Single Product
// =============================================================================

#[tokio::test]
async fn test_product_by_document_id() {
    let products = vec![product_json(7, "Armchair", 1000, 15, Some((1, "Chairs")))];
    let Some(server) = FakeStrapi::start(products).await else {
        return;
    };

    let product = server
        .client()
        .product(&DocumentId::new("doc-7"))
        .await
        .unwrap();

    assert_eq!(product.title, "Armchair");
    assert_eq!(product.discounted_price(), Price::from_units(850));
    assert_eq!(product.product_category.unwrap().name, "Chairs");
    assert_eq!(product.images.len(), 1);
}

#[tokio::test]
async fn test_missing_product_is_not_found() {
    let Some(server) = FakeStrapi::start(catalogue(1)).await else {
        return;
    };

    let err = server
        .client()
        .product(&DocumentId::new("missing"))
        .await
        .unwrap_err();

    assert!(matches!(err, StrapiError::NotFound(_)));
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn test_server_error_carries_strapi_message() {
    let Some(server) = FakeStrapi::start(catalogue(3)).await else {
        return;
    };
    server.set_products_status(Some(StatusCode::INTERNAL_SERVER_ERROR));

    let err = server.client().list_products(1, 9).await.unwrap_err();

    match err {
        StrapiError::Status { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Products unavailable");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_rate_limited_reads_retry_after() {
    let Some(server) = FakeStrapi::start(catalogue(3)).await else {
        return;
    };
    server.set_products_status(Some(StatusCode::TOO_MANY_REQUESTS));

    let err = server.client().list_products(1, 9).await.unwrap_err();

    assert!(matches!(err, StrapiError::RateLimited(7)));
}

// =============================================================================
// Categories
// =============================================================================

#[tokio::test]
async fn test_categories_are_cached() {
    let Some(server) = FakeStrapi::start(catalogue(4)).await else {
        return;
    };
    let client = server.client();

    let first = client.categories().await.unwrap().unwrap();
    let second = client.categories().await.unwrap().unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
    assert_eq!(server.requests_to("/api/product-categories").len(), 1);

    client.invalidate_categories().await;
    client.categories().await.unwrap();
    assert_eq!(server.requests_to("/api/product-categories").len(), 2);
}

#[tokio::test]
async fn test_null_categories_are_not_cached() {
    let Some(server) = FakeStrapi::start(catalogue(4)).await else {
        return;
    };
    server.set_categories(CategoriesResponse::Null);
    let client = server.client();

    assert!(client.categories().await.unwrap().is_none());
    assert!(client.categories().await.unwrap().is_none());
    assert_eq!(server.requests_to("/api/product-categories").len(), 2);
}
