//! Request validation that completes before any query runs.

use axum::http::StatusCode;
use chrono::{Days, Utc};
use serde_json::json;

use pawtopia_integration_tests::{TestApp, get, json};

#[tokio::test]
async fn test_cart_item_quantity_must_be_positive() {
    let app = TestApp::new();
    let token = app.customer_token(3);

    for quantity in [0, -2] {
        let resp = app
            .send(json(
                "POST",
                "/api/cartItem/postCartItem",
                Some(&token),
                &json!({ "productId": 1, "quantity": quantity }),
            ))
            .await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST, "quantity {quantity}");
    }
}

#[tokio::test]
async fn test_cart_summary_rejects_malformed_selection() {
    let app = TestApp::new();
    let token = app.customer_token(3);

    let resp = app
        .send(get("/api/cart/getCartSummary/3?items=1,two", Some(&token)))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.message().contains("two"), "{}", resp.message());
}

#[tokio::test]
async fn test_order_requires_items() {
    let app = TestApp::new();
    let token = app.customer_token(3);

    let resp = app
        .send(json(
            "POST",
            "/api/order/postOrderRecord",
            Some(&token),
            &json!({ "orderItems": [], "paymentMethod": "CASH_ON_DELIVERY" }),
        ))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.message(), "orderItems is required");
}

#[tokio::test]
async fn test_order_line_quantity_must_be_positive() {
    let app = TestApp::new();
    let token = app.customer_token(3);

    let resp = app
        .send(json(
            "POST",
            "/api/order/postOrderRecord",
            Some(&token),
            &json!({ "orderItems": [{ "productId": 1, "quantity": 0 }] }),
        ))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_review_rating_range() {
    let app = TestApp::new();
    let token = app.customer_token(3);

    for ratings in [0, 6] {
        let resp = app
            .send(json(
                "POST",
                "/api/review/postReview",
                Some(&token),
                &json!({ "productId": 1, "orderId": 1, "ratings": ratings }),
            ))
            .await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST, "ratings {ratings}");
    }
}

#[tokio::test]
async fn test_appointment_date_cannot_be_past() {
    let app = TestApp::new();
    let token = app.customer_token(3);
    let yesterday = Utc::now()
        .date_naive()
        .checked_sub_days(Days::new(2))
        .unwrap_or_else(|| panic!("date out of range"));

    let resp = app
        .send(json(
            "POST",
            "/appointments/postAppointment",
            Some(&token),
            &json!({
                "date": yesterday.to_string(),
                "time": "10:30",
                "email": "ana@example.com",
                "contactNo": "09171234567",
                "groomService": "GROOMING"
            }),
        ))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_product_name_is_required() {
    let app = TestApp::new();
    let token = app.admin_token(1);

    let resp = app
        .send(json(
            "POST",
            "/api/product/postProduct",
            Some(&token),
            &json!({
                "productName": "   ",
                "productPrice": "99.00",
                "productType": "Toys",
                "quantity": 5
            }),
        ))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.message(), "productName is required");
}

#[tokio::test]
async fn test_unknown_order_status_is_rejected() {
    let app = TestApp::new();
    let token = app.admin_token(1);

    let resp = app
        .send(json(
            "PUT",
            "/api/order/updateStatus/1?status=LOST",
            Some(&token),
            &json!({}),
        ))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_update_rejects_bad_email() {
    let app = TestApp::new();
    let token = app.admin_token(1);

    let resp = app
        .send(json(
            "PUT",
            "/admin/update/3",
            Some(&token),
            &json!({ "email": "no-at-sign" }),
        ))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_payment_unavailable_without_configuration() {
    let app = TestApp::new();
    let token = app.customer_token(3);

    let resp = app
        .send(json(
            "POST",
            "/api/payment/create-payment",
            Some(&token),
            &json!({ "orderId": 1 }),
        ))
        .await;
    assert_eq!(resp.status, StatusCode::SERVICE_UNAVAILABLE);
}
