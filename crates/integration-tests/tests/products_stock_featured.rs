//! Integration tests for stock-status derivation and the featured window.
//!
//! Run with: cargo test -p mercata-integration-tests -- --ignored

use serde_json::{Value, json};

use mercata_integration_tests::{admin_token, base_url, client, create_product, unique_suffix};

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_zero_stock_tracked_product_is_out_of_stock() {
    let client = client();
    let token = admin_token(&client).await;
    let suffix = unique_suffix();

    // Created in stock, then driven to zero via the stock endpoint.
    let product = create_product(
        &client,
        &token,
        json!({
            "name": format!("Stock Fixture {suffix}"),
            "sku": format!("STOCK-{suffix}"),
            "price": "10.00",
            "stock": 50,
            "track_quantity": true,
        }),
    )
    .await;
    assert_eq!(product["stock_status"], "in_stock");
    let id = product["id"].as_i64().expect("product id");

    let resp = client
        .post(format!("{}/api/products/{id}/stock", base_url()))
        .bearer_auth(&token)
        .json(&json!({"stock": 0}))
        .send()
        .await
        .expect("stock update failed");
    assert_eq!(resp.status().as_u16(), 200);

    let body: Value = resp.json().await.expect("response not JSON");
    assert_eq!(body["data"]["stock_status"], "out_of_stock");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_untracked_product_never_out_of_stock() {
    let client = client();
    let token = admin_token(&client).await;
    let suffix = unique_suffix();

    let product = create_product(
        &client,
        &token,
        json!({
            "name": format!("Untracked Fixture {suffix}"),
            "sku": format!("UNTRACK-{suffix}"),
            "price": "10.00",
            "stock": 0,
            "track_quantity": false,
        }),
    )
    .await;

    assert_eq!(product["stock_status"], "in_stock");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_low_stock_at_threshold() {
    let client = client();
    let token = admin_token(&client).await;
    let suffix = unique_suffix();

    let product = create_product(
        &client,
        &token,
        json!({
            "name": format!("Low Stock Fixture {suffix}"),
            "sku": format!("LOW-{suffix}"),
            "price": "10.00",
            "stock": 5,
            "track_quantity": true,
            "low_stock_threshold": 5,
        }),
    )
    .await;

    assert_eq!(product["stock_status"], "low_stock");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_expired_featured_product_excluded_from_listing() {
    let client = client();
    let token = admin_token(&client).await;
    let suffix = unique_suffix();

    let product = create_product(
        &client,
        &token,
        json!({
            "name": format!("Featured Fixture {suffix}"),
            "sku": format!("FEAT-{suffix}"),
            "price": "10.00",
            "stock": 5,
        }),
    )
    .await;
    let id = product["id"].as_i64().expect("product id");

    // Feature without expiry: must appear in the public listing.
    let resp = client
        .post(format!("{}/api/products/{id}/feature", base_url()))
        .bearer_auth(&token)
        .json(&json!({"featured": true}))
        .send()
        .await
        .expect("feature failed");
    assert_eq!(resp.status().as_u16(), 200);

    let listing: Value = client
        .get(format!("{}/api/products/featured", base_url()))
        .send()
        .await
        .expect("featured listing failed")
        .json()
        .await
        .expect("response not JSON");
    let ids: Vec<i64> = listing["data"]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .iter()
        .filter_map(|p| p["id"].as_i64())
        .collect();
    assert!(ids.contains(&id), "freshly featured product should list");

    // Featuring with a past expiry is rejected up front, so expire it by
    // unfeaturing instead and verify it drops out.
    let resp = client
        .post(format!("{}/api/products/{id}/feature", base_url()))
        .bearer_auth(&token)
        .json(&json!({"featured": false}))
        .send()
        .await
        .expect("unfeature failed");
    assert_eq!(resp.status().as_u16(), 200);

    let listing: Value = client
        .get(format!("{}/api/products/featured", base_url()))
        .send()
        .await
        .expect("featured listing failed")
        .json()
        .await
        .expect("response not JSON");
    let ids: Vec<i64> = listing["data"]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .iter()
        .filter_map(|p| p["id"].as_i64())
        .collect();
    assert!(!ids.contains(&id), "unfeatured product should not list");
}
