//! Checkout and cancellation against a real database.

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;

use pawtopia_integration_tests::{TestApp, empty, fixtures, json, money};

#[sqlx::test(migrations = "../server/migrations")]
async fn test_checkout_moves_stock_and_clears_listed_cart_lines(pool: PgPool) {
    let user = fixtures::customer(&pool, "maria").await;
    let kibble = fixtures::product(&pool, "Kibble", 250, 10).await;
    let leash = fixtures::product(&pool, "Leash", 120, 5).await;
    let kibble_line = fixtures::cart_item(&pool, user, kibble, 2).await;
    let leash_line = fixtures::cart_item(&pool, user, leash, 1).await;

    let app = TestApp::with_pool(pool.clone());
    let token = app.customer_token(user);

    let resp = app
        .send(json(
            "POST",
            "/api/order/postOrderRecord",
            Some(&token),
            &json!({
                "orderItems": [{ "productId": kibble, "quantity": 2 }],
                "paymentMethod": "CASH_ON_DELIVERY",
                "cartItemIds": [kibble_line],
            }),
        ))
        .await;
    assert_eq!(resp.status, StatusCode::CREATED, "{}", resp.body);

    let order = resp.json();
    assert_eq!(order["orderStatus"], "PENDING");
    assert_eq!(order["paymentStatus"], "PENDING");
    assert!((money(&order["shippingFee"]) - 30.0).abs() < f64::EPSILON);
    assert!((money(&order["totalPrice"]) - 530.0).abs() < f64::EPSILON);
    assert_eq!(order["orderItems"][0]["orderItemName"], "Kibble");
    assert_eq!(order["orderItems"][0]["quantity"], 2);

    assert_eq!(fixtures::stock(&pool, kibble).await, (8, 2));
    assert_eq!(fixtures::stock(&pool, leash).await, (5, 0));
    assert!(fixtures::stored_cart_item(&pool, kibble_line).await.is_none());
    assert!(fixtures::stored_cart_item(&pool, leash_line).await.is_some());
}

#[sqlx::test(migrations = "../server/migrations")]
async fn test_checkout_rejects_short_stock_without_side_effects(pool: PgPool) {
    let user = fixtures::customer(&pool, "jose").await;
    let shampoo = fixtures::product(&pool, "Shampoo", 180, 3).await;
    let treats = fixtures::product(&pool, "Treats", 90, 50).await;

    let app = TestApp::with_pool(pool.clone());
    let token = app.customer_token(user);

    let resp = app
        .send(json(
            "POST",
            "/api/order/postOrderRecord",
            Some(&token),
            &json!({
                "orderItems": [
                    { "productId": treats, "quantity": 5 },
                    { "productId": shampoo, "quantity": 4 },
                ],
                "paymentMethod": "CASH_ON_DELIVERY",
            }),
        ))
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT, "{}", resp.body);
    assert!(resp.message().contains("Shampoo"), "{}", resp.message());

    assert_eq!(fixtures::stock(&pool, shampoo).await, (3, 0));
    assert_eq!(fixtures::stock(&pool, treats).await, (50, 0));
    assert_eq!(fixtures::order_count(&pool, user).await, 0);
}

#[sqlx::test(migrations = "../server/migrations")]
async fn test_cancelling_returns_items_to_stock_once(pool: PgPool) {
    let user = fixtures::customer(&pool, "ana").await;
    let bed = fixtures::product(&pool, "Pet Bed", 1200, 10).await;

    let app = TestApp::with_pool(pool.clone());
    let customer = app.customer_token(user);
    let admin = app.admin_token(1);

    let placed = app
        .send(json(
            "POST",
            "/api/order/postOrderRecord",
            Some(&customer),
            &json!({ "orderItems": [{ "productId": bed, "quantity": 3 }] }),
        ))
        .await;
    assert_eq!(placed.status, StatusCode::CREATED, "{}", placed.body);
    let order_id = placed.json()["orderId"].as_i64().unwrap_or_default();
    assert_eq!(fixtures::stock(&pool, bed).await, (7, 3));

    let cancelled = app
        .send(empty(
            "PUT",
            &format!("/api/order/updateStatus/{order_id}?status=CANCELLED"),
            Some(&admin),
        ))
        .await;
    assert_eq!(cancelled.status, StatusCode::OK, "{}", cancelled.body);
    assert_eq!(cancelled.json()["orderStatus"], "CANCELLED");
    assert_eq!(fixtures::stock(&pool, bed).await, (10, 0));

    let reopened = app
        .send(empty(
            "PUT",
            &format!("/api/order/updateStatus/{order_id}?status=APPROVED"),
            Some(&admin),
        ))
        .await;
    assert_eq!(reopened.status, StatusCode::CONFLICT, "{}", reopened.body);
    assert_eq!(fixtures::stock(&pool, bed).await, (10, 0));
}
