//! Integration tests for the single-default address invariant.
//!
//! Run with: cargo test -p mercata-integration-tests -- --ignored

use serde_json::{Value, json};

use mercata_integration_tests::{admin_token, base_url, client, unique_suffix};

fn address_body(label: &str) -> Value {
    json!({
        "label": label,
        "recipient": "Pat Tester",
        "line1": "1 Test Street",
        "city": "Testville",
        "postal_code": "00100",
        "country": "US",
    })
}

async fn create_address(client: &reqwest::Client, token: &str, label: &str) -> Value {
    let resp = client
        .post(format!("{}/api/addresses", base_url()))
        .bearer_auth(token)
        .json(&address_body(label))
        .send()
        .await
        .expect("create address failed");
    assert_eq!(resp.status().as_u16(), 201);

    let body: Value = resp.json().await.expect("response not JSON");
    body["data"].clone()
}

async fn list_addresses(client: &reqwest::Client, token: &str) -> Vec<Value> {
    let resp = client
        .get(format!("{}/api/addresses", base_url()))
        .bearer_auth(token)
        .send()
        .await
        .expect("list addresses failed");
    assert_eq!(resp.status().as_u16(), 200);

    let body: Value = resp.json().await.expect("response not JSON");
    body["data"].as_array().cloned().unwrap_or_default()
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_first_address_becomes_default() {
    let client = client();
    let token = admin_token(&client).await;
    let label = format!("first-{}", unique_suffix());

    let addresses_before = list_addresses(&client, &token).await;
    let address = create_address(&client, &token, &label).await;

    if addresses_before.is_empty() {
        assert_eq!(address["is_default"], true);
    }
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_set_default_unsets_all_others() {
    let client = client();
    let token = admin_token(&client).await;

    // Several addresses, then promote the last one.
    let mut last_id = 0_i64;
    for i in 0..3 {
        let addr = create_address(&client, &token, &format!("addr-{i}-{}", unique_suffix())).await;
        last_id = addr["id"].as_i64().expect("address id");
    }

    let resp = client
        .post(format!("{}/api/addresses/{last_id}/default", base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .expect("set default failed");
    assert_eq!(resp.status().as_u16(), 200);

    // Exactly one default across however many addresses the account has.
    let addresses = list_addresses(&client, &token).await;
    let defaults: Vec<&Value> = addresses
        .iter()
        .filter(|a| a["is_default"] == true)
        .collect();
    assert_eq!(defaults.len(), 1, "exactly one default expected");
    assert_eq!(defaults[0]["id"].as_i64(), Some(last_id));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_deleting_default_promotes_another() {
    let client = client();
    let token = admin_token(&client).await;

    let a = create_address(&client, &token, &format!("keep-{}", unique_suffix())).await;
    let b = create_address(&client, &token, &format!("drop-{}", unique_suffix())).await;
    let b_id = b["id"].as_i64().expect("address id");
    let _ = a;

    // Make b the default, then delete it.
    let resp = client
        .post(format!("{}/api/addresses/{b_id}/default", base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .expect("set default failed");
    assert_eq!(resp.status().as_u16(), 200);

    let resp = client
        .delete(format!("{}/api/addresses/{b_id}", base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .expect("delete failed");
    assert_eq!(resp.status().as_u16(), 200);

    let addresses = list_addresses(&client, &token).await;
    if !addresses.is_empty() {
        let defaults = addresses.iter().filter(|a| a["is_default"] == true).count();
        assert_eq!(defaults, 1, "a remaining address should be promoted");
    }
}
