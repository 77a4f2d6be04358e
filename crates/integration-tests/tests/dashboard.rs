//! Admin dashboard counters against a real database.

use axum::http::StatusCode;
use sqlx::PgPool;

use pawtopia_core::OrderStatus;
use pawtopia_integration_tests::{TestApp, fixtures, get, money};

#[sqlx::test(migrations = "../server/migrations")]
async fn test_dashboard_counts_store_activity(pool: PgPool) {
    let lola = fixtures::customer(&pool, "lola").await;
    let pedro = fixtures::customer(&pool, "pedro").await;
    let kibble = fixtures::product(&pool, "Kibble", 250, 10).await;
    fixtures::order(&pool, lola, kibble, 1, OrderStatus::Pending).await;
    fixtures::order(&pool, pedro, kibble, 1, OrderStatus::Delivered).await;
    fixtures::order(&pool, pedro, kibble, 1, OrderStatus::Cancelled).await;
    fixtures::appointment(&pool, lola).await;

    let app = TestApp::with_pool(pool);
    let admin = app.admin_token(1);

    let resp = app.send(get("/admin/dashboard", Some(&admin))).await;
    assert_eq!(resp.status, StatusCode::OK, "{}", resp.body);

    let stats = resp.json();
    assert_eq!(stats["userCount"], 2);
    assert_eq!(stats["orderCount"], 3);
    assert_eq!(stats["pendingOrders"], 1);
    assert_eq!(stats["pendingAppointments"], 1);
    assert_eq!(stats["totalQuantitySold"], 0);
    assert!((money(&stats["totalIncome"]) - 60.0).abs() < f64::EPSILON);
}
