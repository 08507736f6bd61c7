//! Integration tests for `ShopifyAdminClient` using wiremock HTTP mocks.

use std::time::Duration;

use stocksync_core::RetryPolicy;
use stocksync_shopify::{
    NewProduct, NewProductOption, NewVariant, ShopifyAdminClient, ShopifyError,
};
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> ShopifyAdminClient {
    let retry = RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::ZERO,
    };
    ShopifyAdminClient::with_base_url(base_url, "shpat_test", 30, "stocksync-test", retry, Duration::ZERO)
        .expect("client construction should not fail")
}

fn product_json(id: i64, title: &str, sku: &str, inventory_item_id: i64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": title,
        "vendor": "Saphira",
        "product_type": "Blusas",
        "variants": [{
            "id": id * 10,
            "product_id": id,
            "title": "38",
            "option1": "38",
            "sku": sku,
            "barcode": null,
            "price": "129.90",
            "inventory_item_id": inventory_item_id,
            "inventory_quantity": 99
        }]
    })
}

#[tokio::test]
async fn fetch_all_products_follows_link_cursor() {
    let server = MockServer::start().await;
    let next = format!(
        "<{}/products.json?limit=250&page_info=PAGE2>; rel=\"next\"",
        server.uri()
    );

    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param_is_missing("page_info"))
        .and(header("X-Shopify-Access-Token", "shpat_test"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Link", next.as_str())
                .set_body_json(serde_json::json!({ "products": [product_json(1, "Blusa Alba", "C01", 11)] })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page_info", "PAGE2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "products": [product_json(2, "Saia Lua", "C02", 12)] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let products = test_client(&server.uri())
        .fetch_all_products()
        .await
        .expect("products should load");
    let titles: Vec<_> = products.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Blusa Alba", "Saia Lua"]);
}

#[tokio::test]
async fn cycling_cursor_hits_pagination_limit() {
    let server = MockServer::start().await;
    let next = format!(
        "<{}/products.json?limit=250&page_info=LOOP>; rel=\"next\"",
        server.uri()
    );
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Link", next.as_str())
                .set_body_json(serde_json::json!({ "products": [] })),
        )
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .fetch_all_products()
        .await
        .unwrap_err();
    assert!(matches!(err, ShopifyError::PaginationLimit { max_pages: 200, .. }));
}

#[tokio::test]
async fn fetch_catalog_uses_location_levels() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "products": [product_json(1, "Blusa Alba", "C01", 11), product_json(2, "Saia Lua", "C02", 12)]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/inventory_levels.json"))
        .and(query_param("location_ids", "555"))
        .and(query_param("inventory_item_ids", "11,12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "inventory_levels": [
                { "inventory_item_id": 11, "location_id": 555, "available": 3 },
                { "inventory_item_id": 12, "location_id": 555, "available": null }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let catalog = test_client(&server.uri())
        .fetch_catalog(555)
        .await
        .expect("catalog should load");

    assert_eq!(catalog.location_id, 555);
    assert_eq!(catalog.items.len(), 2);
    assert_eq!(catalog.items[0].stock_quantity, 3);
    // No level at this location: the all-locations total of 99 is ignored.
    assert_eq!(catalog.items[1].stock_quantity, 0);
    assert_eq!(catalog.items[0].remote.as_ref().map(|r| r.inventory_item_id), Some(11));
}

#[tokio::test]
async fn default_location_skips_inactive() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/locations.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "locations": [
                { "id": 1, "name": "Old store", "active": false },
                { "id": 2, "name": "Warehouse", "active": true }
            ]
        })))
        .mount(&server)
        .await;

    let location = test_client(&server.uri())
        .default_location()
        .await
        .expect("location should resolve");
    assert_eq!(location.id, 2);
}

#[tokio::test]
async fn no_locations_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/locations.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "locations": [] })))
        .mount(&server)
        .await;

    let err = test_client(&server.uri()).default_location().await.unwrap_err();
    assert!(matches!(err, ShopifyError::NoLocation));
}

#[tokio::test]
async fn set_inventory_level_posts_absolute_quantity_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/inventory_levels/set.json"))
        .and(body_json(serde_json::json!({
            "location_id": 555,
            "inventory_item_id": 11,
            "available": 5
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "inventory_level": { "inventory_item_id": 11, "location_id": 555, "available": 5 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let level = test_client(&server.uri())
        .set_inventory_level(555, 11, 5)
        .await
        .expect("set should succeed");
    assert_eq!(level.available, Some(5));
}

#[tokio::test]
async fn set_inventory_level_does_not_retry_by_itself() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/inventory_levels/set.json"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "2.0"))
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .set_inventory_level(555, 11, 5)
        .await
        .unwrap_err();
    assert!(matches!(err, ShopifyError::RateLimited { retry_after_secs: 2 }));
}

#[tokio::test]
async fn fetch_orders_stops_at_requested_maximum() {
    let server = MockServer::start().await;
    let next = format!(
        "<{}/orders.json?limit=250&page_info=MORE>; rel=\"next\"",
        server.uri()
    );
    Mock::given(method("GET"))
        .and(path("/orders.json"))
        .and(query_param("status", "any"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Link", next.as_str())
                .set_body_json(serde_json::json!({
                    "orders": [
                        { "id": 3, "order_number": 1003 },
                        { "id": 2, "order_number": 1002 },
                        { "id": 1, "order_number": 1001 }
                    ]
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let orders = test_client(&server.uri())
        .fetch_orders(|o| o.id != 3, Some(1))
        .await
        .expect("orders should load");
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].order_number, 1002);
}

#[tokio::test]
async fn create_product_surfaces_validation_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/products.json"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(serde_json::json!({ "errors": { "sku": ["has already been taken"] } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let product = NewProduct {
        title: "Blusa Alba".into(),
        body_html: None,
        vendor: "Saphira".into(),
        product_type: "Blusas".into(),
        options: vec![NewProductOption {
            name: "Tamanho".into(),
            values: vec!["38".into()],
        }],
        variants: vec![NewVariant {
            option1: "38".into(),
            sku: "C0738".into(),
            price: "129.90".into(),
            inventory_management: "shopify".into(),
            inventory_quantity: 0,
            requires_shipping: true,
        }],
    };

    let err = test_client(&server.uri())
        .create_product(&product)
        .await
        .unwrap_err();
    match err {
        ShopifyError::Rejected { message, .. } => assert!(message.contains("already been taken")),
        other => panic!("expected Rejected, got {other:?}"),
    }
}
