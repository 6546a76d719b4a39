//! Integration tests for Mercata.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations
//! docker compose up -d postgres
//! cargo run -p mercata-cli -- migrate
//!
//! # Create an admin and export its token
//! cargo run -p mercata-cli -- admin create -e admin@test.local -n Admin -p 'admin-pass-1'
//! export MERCATA_TEST_ADMIN_EMAIL=admin@test.local
//! export MERCATA_TEST_ADMIN_PASSWORD=admin-pass-1
//!
//! # Run the API, then the tests
//! cargo run -p mercata-api &
//! cargo test -p mercata-integration-tests -- --ignored
//! ```
//!
//! Tests are `#[ignore]`d by default because they need a running server,
//! a migrated database, and admin credentials in the environment.

use reqwest::Client;
use serde_json::{Value, json};

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("MERCATA_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Plain HTTP client.
///
/// # Panics
///
/// Panics if the client cannot be constructed.
#[must_use]
pub fn client() -> Client {
    Client::builder().build().expect("Failed to create HTTP client")
}

/// Login and return a bearer token for the given credentials.
///
/// # Panics
///
/// Panics when the login request fails or the envelope carries no token.
pub async fn login(client: &Client, email: &str, password: &str) -> String {
    let resp = client
        .post(format!("{}/api/auth/login", base_url()))
        .json(&json!({"email": email, "password": password}))
        .send()
        .await
        .expect("login request failed");

    let body: Value = resp.json().await.expect("login response not JSON");
    body["data"]["token"]
        .as_str()
        .unwrap_or_else(|| panic!("no token in login response: {body}"))
        .to_string()
}

/// Bearer token for the admin account named by
/// `MERCATA_TEST_ADMIN_EMAIL` / `MERCATA_TEST_ADMIN_PASSWORD`.
///
/// # Panics
///
/// Panics when the environment variables are unset or login fails.
pub async fn admin_token(client: &Client) -> String {
    let email = std::env::var("MERCATA_TEST_ADMIN_EMAIL")
        .expect("MERCATA_TEST_ADMIN_EMAIL must be set for integration tests");
    let password = std::env::var("MERCATA_TEST_ADMIN_PASSWORD")
        .expect("MERCATA_TEST_ADMIN_PASSWORD must be set for integration tests");

    login(client, &email, &password).await
}

/// Create a product via the admin API and return its JSON.
///
/// # Panics
///
/// Panics when the request fails or the response is not a success envelope.
pub async fn create_product(client: &Client, token: &str, body: Value) -> Value {
    let resp = client
        .post(format!("{}/api/products", base_url()))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .expect("create product request failed");

    assert_eq!(resp.status().as_u16(), 201, "create product should succeed");
    let envelope: Value = resp.json().await.expect("response not JSON");
    assert_eq!(envelope["success"], true);
    envelope["data"].clone()
}

/// A unique suffix so fixtures from repeated runs never collide.
#[must_use]
pub fn unique_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}
