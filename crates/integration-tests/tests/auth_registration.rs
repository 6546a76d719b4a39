//! Integration tests for registration and login.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p mercata-api)
//! - Admin credentials in `MERCATA_TEST_ADMIN_EMAIL` / `_PASSWORD`
//!
//! Run with: cargo test -p mercata-integration-tests -- --ignored

use serde_json::{Value, json};

use mercata_integration_tests::{admin_token, base_url, client, login, unique_suffix};

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_register_duplicate_email_conflicts() {
    let client = client();
    let email = std::env::var("MERCATA_TEST_ADMIN_EMAIL")
        .expect("MERCATA_TEST_ADMIN_EMAIL must be set for integration tests");

    // The admin account already exists, so registering it again must 409.
    let resp = client
        .post(format!("{}/api/auth/register", base_url()))
        .json(&json!({
            "email": email,
            "name": "Impostor",
            "password": "some-password-1",
        }))
        .send()
        .await
        .expect("register request failed");

    assert_eq!(resp.status().as_u16(), 409);
    let body: Value = resp.json().await.expect("response not JSON");
    assert_eq!(body["success"], false);
    assert!(
        body["message"]
            .as_str()
            .unwrap_or_default()
            .contains("already"),
        "unexpected message: {body}"
    );
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_register_returns_envelope_and_sends_code() {
    let client = client();
    let email = format!("newuser-{}@test.local", unique_suffix());

    let resp = client
        .post(format!("{}/api/auth/register", base_url()))
        .json(&json!({
            "email": email,
            "name": "New User",
            "password": "fresh-password-1",
        }))
        .send()
        .await
        .expect("register request failed");

    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.expect("response not JSON");
    assert_eq!(body["success"], true);

    // No account exists until the OTP is confirmed, so login must fail.
    let resp = client
        .post(format!("{}/api/auth/login", base_url()))
        .json(&json!({"email": email, "password": "fresh-password-1"}))
        .send()
        .await
        .expect("login request failed");
    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_verify_with_wrong_code_rejected() {
    let client = client();
    let email = format!("verify-{}@test.local", unique_suffix());

    let resp = client
        .post(format!("{}/api/auth/register", base_url()))
        .json(&json!({
            "email": email,
            "name": "Verify Me",
            "password": "fresh-password-1",
        }))
        .send()
        .await
        .expect("register request failed");
    assert_eq!(resp.status().as_u16(), 200);

    let resp = client
        .post(format!("{}/api/auth/verify", base_url()))
        .json(&json!({"email": email, "code": "000000"}))
        .send()
        .await
        .expect("verify request failed");

    // Either mismatch (422) for the wrong code; never a created account.
    assert_eq!(resp.status().as_u16(), 422);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_login_lockout_after_repeated_failures() {
    let client = client();
    let email = format!("locked-{}@test.local", unique_suffix());

    // Unknown account: failures still count against the identifier.
    for _ in 0..5 {
        let resp = client
            .post(format!("{}/api/auth/login", base_url()))
            .json(&json!({"email": email, "password": "wrong-password-1"}))
            .send()
            .await
            .expect("login request failed");
        assert!(resp.status().as_u16() == 401 || resp.status().as_u16() == 429);
    }

    let resp = client
        .post(format!("{}/api/auth/login", base_url()))
        .json(&json!({"email": email, "password": "wrong-password-1"}))
        .send()
        .await
        .expect("login request failed");

    assert_eq!(resp.status().as_u16(), 429);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_me_requires_bearer_token() {
    let client = client();

    let resp = client
        .get(format!("{}/api/auth/me", base_url()))
        .send()
        .await
        .expect("me request failed");
    assert_eq!(resp.status().as_u16(), 401);

    let token = admin_token(&client).await;
    let resp = client
        .get(format!("{}/api/auth/me", base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .expect("me request failed");
    assert_eq!(resp.status().as_u16(), 200);

    let body: Value = resp.json().await.expect("response not JSON");
    assert_eq!(body["data"]["role"], "admin");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_login_returns_token_and_user() {
    let client = client();
    let email = std::env::var("MERCATA_TEST_ADMIN_EMAIL").expect("admin email env");
    let password = std::env::var("MERCATA_TEST_ADMIN_PASSWORD").expect("admin password env");

    let token = login(&client, &email, &password).await;
    assert!(!token.is_empty());
}
