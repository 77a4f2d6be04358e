//! Cart reads and edits against a real database.

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;

use pawtopia_integration_tests::{TestApp, fixtures, get, json, money};

#[sqlx::test(migrations = "../server/migrations")]
async fn test_system_update_keeps_last_updated(pool: PgPool) {
    let user = fixtures::customer(&pool, "lito").await;
    let brush = fixtures::product(&pool, "Brush", 150, 10).await;
    let line = fixtures::cart_item(&pool, user, brush, 1).await;

    let app = TestApp::with_pool(pool.clone());
    let token = app.customer_token(user);

    let resp = app
        .send(json(
            "PUT",
            &format!("/api/cartItem/systemUpdateCartItem/{line}"),
            Some(&token),
            &json!({ "quantity": 3 }),
        ))
        .await;
    assert_eq!(resp.status, StatusCode::OK, "{}", resp.body);
    assert_eq!(
        fixtures::stored_cart_item(&pool, line).await,
        Some((3, fixtures::seeded_at()))
    );

    let resp = app
        .send(json(
            "PUT",
            &format!("/api/cartItem/updateCartItem/{line}"),
            Some(&token),
            &json!({ "quantity": 4 }),
        ))
        .await;
    assert_eq!(resp.status, StatusCode::OK, "{}", resp.body);
    let (quantity, last_updated) = fixtures::stored_cart_item(&pool, line)
        .await
        .unwrap_or_else(|| panic!("cart item {line} disappeared"));
    assert_eq!(quantity, 4);
    assert!(last_updated > fixtures::seeded_at());
}

#[sqlx::test(migrations = "../server/migrations")]
async fn test_cart_reads_clamp_to_stock_and_agree_on_totals(pool: PgPool) {
    let user = fixtures::customer(&pool, "nena").await;
    let collar = fixtures::product(&pool, "Collar", 100, 2).await;
    let line = fixtures::cart_item(&pool, user, collar, 5).await;

    let app = TestApp::with_pool(pool.clone());
    let token = app.customer_token(user);

    let summary = app
        .send(get(&format!("/api/cart/getCartSummary/{user}"), Some(&token)))
        .await;
    assert_eq!(summary.status, StatusCode::OK, "{}", summary.body);
    let summary = summary.json();
    assert_eq!(summary["itemCount"], 2);
    assert!((money(&summary["subtotal"]) - 200.0).abs() < f64::EPSILON);
    assert!((money(&summary["total"]) - 230.0).abs() < f64::EPSILON);

    let cart = app
        .send(get(&format!("/api/cart/getCartById/{user}"), Some(&token)))
        .await;
    assert_eq!(cart.status, StatusCode::OK, "{}", cart.body);
    let cart = cart.json();
    assert_eq!(cart["items"][0]["quantity"], 2);
    assert_eq!(cart["totals"], summary);

    assert_eq!(
        fixtures::stored_cart_item(&pool, line).await,
        Some((2, fixtures::seeded_at()))
    );
}

#[sqlx::test(migrations = "../server/migrations")]
async fn test_adding_merges_with_existing_line_up_to_stock(pool: PgPool) {
    let user = fixtures::customer(&pool, "ben").await;
    let toy = fixtures::product(&pool, "Rope Toy", 75, 5).await;

    let app = TestApp::with_pool(pool.clone());
    let token = app.customer_token(user);
    let add = |quantity: i32| {
        json(
            "POST",
            "/api/cartItem/postCartItem",
            Some(&token),
            &json!({ "productId": toy, "quantity": quantity }),
        )
    };

    let first = app.send(add(3)).await;
    assert_eq!(first.status, StatusCode::CREATED, "{}", first.body);
    assert_eq!(first.json()["quantity"], 3);

    let second = app.send(add(4)).await;
    assert_eq!(second.status, StatusCode::CREATED, "{}", second.body);
    assert_eq!(second.json()["quantity"], 5);
    assert_eq!(second.json()["cartItemId"], first.json()["cartItemId"]);
}

#[sqlx::test(migrations = "../server/migrations")]
async fn test_concurrent_adds_keep_every_increment(pool: PgPool) {
    let user = fixtures::customer(&pool, "caloy").await;
    let bowl = fixtures::product(&pool, "Bowl", 60, 20).await;

    let app = TestApp::with_pool(pool.clone());
    let token = app.customer_token(user);
    let add = || {
        json(
            "POST",
            "/api/cartItem/postCartItem",
            Some(&token),
            &json!({ "productId": bowl, "quantity": 1 }),
        )
    };

    let (a, b, c) = tokio::join!(app.send(add()), app.send(add()), app.send(add()));
    for resp in [&a, &b, &c] {
        assert_eq!(resp.status, StatusCode::CREATED, "{}", resp.body);
    }

    let line = a.json()["cartItemId"].as_i64().unwrap_or_default();
    let line = i32::try_from(line).unwrap_or_default();
    let (quantity, _) = fixtures::stored_cart_item(&pool, line)
        .await
        .unwrap_or_else(|| panic!("cart item {line} missing"));
    assert_eq!(quantity, 3);
}

#[sqlx::test(migrations = "../server/migrations")]
async fn test_adding_out_of_stock_product_conflicts(pool: PgPool) {
    let user = fixtures::customer(&pool, "rosa").await;
    let sold_out = fixtures::product(&pool, "Cat Tree", 2500, 0).await;

    let app = TestApp::with_pool(pool);
    let token = app.customer_token(user);

    let resp = app
        .send(json(
            "POST",
            "/api/cartItem/postCartItem",
            Some(&token),
            &json!({ "productId": sold_out, "quantity": 1 }),
        ))
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT, "{}", resp.body);
}
