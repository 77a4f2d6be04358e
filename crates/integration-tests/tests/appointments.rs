//! Appointment status changes against a real database.

use axum::http::StatusCode;
use sqlx::PgPool;

use pawtopia_core::AppointmentId;
use pawtopia_integration_tests::{TestApp, empty, fixtures};
use pawtopia_server::db::AppointmentRepository;

#[sqlx::test(migrations = "../server/migrations")]
async fn test_canceled_appointment_cannot_be_confirmed(pool: PgPool) {
    let user = fixtures::customer(&pool, "pilar").await;
    let booking = fixtures::appointment(&pool, user).await;

    let app = TestApp::with_pool(pool);
    let customer = app.customer_token(user);
    let admin = app.admin_token(1);

    let canceled = app
        .send(empty("PUT", &format!("/appointments/cancel/{booking}"), Some(&customer)))
        .await;
    assert_eq!(canceled.status, StatusCode::OK, "{}", canceled.body);
    assert_eq!(canceled.json()["status"], "CANCELED");

    let again = app
        .send(empty("PUT", &format!("/appointments/cancel/{booking}"), Some(&customer)))
        .await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST, "{}", again.body);

    let confirmed = app
        .send(empty("PUT", &format!("/appointments/confirm/{booking}"), Some(&admin)))
        .await;
    assert_eq!(confirmed.status, StatusCode::BAD_REQUEST, "{}", confirmed.body);
    assert_eq!(confirmed.message(), "Canceled appointments cannot be confirmed");
}

#[sqlx::test(migrations = "../server/migrations")]
async fn test_status_writes_only_apply_to_eligible_rows(pool: PgPool) {
    let user = fixtures::customer(&pool, "mang_ben").await;
    let id = AppointmentId::new(fixtures::appointment(&pool, user).await);
    let appointments = AppointmentRepository::new(&pool);

    let confirmed = appointments.confirm(id).await.unwrap_or_else(|e| panic!("{e}"));
    assert!(confirmed.is_some_and(|a| a.confirmed));
    assert!(
        appointments
            .confirm(id)
            .await
            .unwrap_or_else(|e| panic!("{e}"))
            .is_none()
    );

    let canceled = appointments.cancel(id).await.unwrap_or_else(|e| panic!("{e}"));
    assert!(canceled.is_some_and(|a| a.canceled));
    assert!(
        appointments
            .cancel(id)
            .await
            .unwrap_or_else(|e| panic!("{e}"))
            .is_none()
    );
    assert!(
        appointments
            .confirm(id)
            .await
            .unwrap_or_else(|e| panic!("{e}"))
            .is_none()
    );
}
