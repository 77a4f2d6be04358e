//! Authentication and authorization boundaries.
//!
//! Every request here is rejected before a query would run.

use axum::http::StatusCode;
use serde_json::json;

use pawtopia_core::UserId;
use pawtopia_integration_tests::{TestApp, get, json};
use pawtopia_server::services::auth::Principal;

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = TestApp::new();
    let resp = app.send(get("/users/me", None)).await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.message(), "Authentication required");
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let app = TestApp::new();
    let resp = app.send(get("/users/me", Some("not.a.token"))).await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.message(), "Invalid or expired token");
}

#[tokio::test]
async fn test_expired_token_is_unauthorized() {
    let app = TestApp::new();
    let token = app
        .state
        .tokens()
        .issue_at(&Principal::customer(UserId::new(3), "ana".to_string()), 0)
        .unwrap_or_else(|e| panic!("{e}"));

    let resp = app.send(get("/users/me", Some(&token))).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_tampered_signature_is_unauthorized() {
    let app = TestApp::new();
    let mut token = app.customer_token(3);
    // Flip the last signature character
    let last = if token.ends_with('A') { 'B' } else { 'A' };
    token.pop();
    token.push(last);

    let resp = app.send(get("/users/me", Some(&token))).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_customer_cannot_use_admin_routes() {
    let app = TestApp::new();
    let token = app.customer_token(3);

    for path in [
        "/admin/all",
        "/admin/dashboard",
        "/api/order/getAllOrders",
        "/api/cart/getAllCarts",
        "/appointments/getAppointment",
        "/addresses/getAllAddress",
    ] {
        let resp = app.send(get(path, Some(&token))).await;
        assert_eq!(resp.status, StatusCode::FORBIDDEN, "{path}");
        assert_eq!(resp.message(), "Admin access required", "{path}");
    }
}

#[tokio::test]
async fn test_customer_cannot_write_catalog() {
    let app = TestApp::new();
    let token = app.customer_token(3);
    let body = json!({
        "productName": "Chew Bone",
        "productPrice": "99.00",
        "productType": "Toys",
        "quantity": 5
    });

    let resp = app
        .send(json("POST", "/api/product/postProduct", Some(&token), &body))
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_customer_cannot_read_another_customers_records() {
    let app = TestApp::new();
    let token = app.customer_token(3);

    for path in [
        "/users/user/4",
        "/addresses/get-users/4",
        "/api/cart/getCartById/4",
        "/api/cart/getCartSummary/4",
        "/api/order/getAllOrdersByUserId?userId=4",
    ] {
        let resp = app.send(get(path, Some(&token))).await;
        assert_eq!(resp.status, StatusCode::FORBIDDEN, "{path}");
    }
}

#[tokio::test]
async fn test_admin_cannot_use_customer_only_routes() {
    let app = TestApp::new();
    let token = app.admin_token(1);

    let me = app.send(get("/users/me", Some(&token))).await;
    assert_eq!(me.status, StatusCode::FORBIDDEN);

    let cart = app
        .send(json("POST", "/api/cart/postCartRecord", Some(&token), &json!({})))
        .await;
    assert_eq!(cart.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_login_is_rate_limited_per_ip() {
    let app = TestApp::new();
    // Missing fields are rejected by the JSON extractor, after the limiter
    let body = json!({});

    let mut statuses = Vec::new();
    for _ in 0..6 {
        let resp = app.send(json("POST", "/users/login", None, &body)).await;
        statuses.push(resp.status);
    }

    assert!(
        statuses[..5].iter().all(|s| *s != StatusCode::TOO_MANY_REQUESTS),
        "{statuses:?}"
    );
    assert_eq!(statuses[5], StatusCode::TOO_MANY_REQUESTS);
}
