//! Admin account, customer management, and dashboard handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use pawtopia_core::{Email, OrderStatus, UserId, Username};

use crate::db::users::UserChanges;
use crate::db::{AppointmentRepository, OrderRepository, ProductRepository, UserRepository};
use crate::error::{Result, add_breadcrumb, set_sentry_user};
use crate::middleware::RequireAdmin;
use crate::models::dashboard::DashboardStats;
use crate::models::optional;
use crate::models::user::{Admin, AdminLoginResponse, LoginRequest, User, UserUpdate};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

#[instrument(skip_all, fields(username = %request.username))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AdminLoginResponse>> {
    let response = AuthService::new(state.pool(), state.tokens())
        .admin_login(&request.username, &request.password)
        .await?;

    set_sentry_user(&response.admin_id, &response.username);
    add_breadcrumb("auth", "Admin logged in", &[]);

    Ok(Json(response))
}

/// Create another admin. Only an existing admin may do this.
#[instrument(skip_all, fields(username = %request.username))]
pub async fn add(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(request): Json<LoginRequest>,
) -> Result<(StatusCode, Json<Admin>)> {
    let created = AuthService::new(state.pool(), state.tokens())
        .create_admin(&request.username, &request.password)
        .await?;

    add_breadcrumb(
        "admin",
        "Admin account created",
        &[("created_by", admin.username.as_str())],
    );

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn all(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Vec<User>>> {
    let users = UserRepository::new(state.pool()).list().await?;
    Ok(Json(users))
}

/// Partially update a customer. Blank fields are left unchanged.
#[instrument(skip_all, fields(%user_id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(user_id): Path<UserId>,
    Json(update): Json<UserUpdate>,
) -> Result<Json<User>> {
    let changes = user_changes(&update)?;
    let user = UserRepository::new(state.pool())
        .update(user_id, &changes)
        .await?;
    tracing::info!(user_id = %user.id, "Customer updated by admin");
    Ok(Json(user))
}

#[instrument(skip_all, fields(%user_id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(user_id): Path<UserId>,
) -> Result<StatusCode> {
    UserRepository::new(state.pool()).delete(user_id).await?;
    tracing::info!(%user_id, "Customer deleted by admin");
    Ok(StatusCode::NO_CONTENT)
}

/// Store-wide counters for the admin dashboard.
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<DashboardStats>> {
    let pool = state.pool();
    let orders = OrderRepository::new(pool);
    let products = ProductRepository::new(pool);
    let users = UserRepository::new(pool);
    let appointments = AppointmentRepository::new(pool);

    let (
        total_income,
        total_quantity_sold,
        user_count,
        order_count,
        pending_orders,
        pending_appointments,
    ) = tokio::try_join!(
        orders.total_income(),
        products.total_quantity_sold(),
        users.count(),
        orders.count(None),
        orders.count(Some(OrderStatus::Pending)),
        appointments.count_pending(),
    )?;

    Ok(Json(DashboardStats {
        total_income,
        total_quantity_sold,
        user_count,
        order_count,
        pending_orders,
        pending_appointments,
    }))
}

fn user_changes(update: &UserUpdate) -> std::result::Result<UserChanges, AuthError> {
    let username = optional(update.username.as_deref())
        .map(|name| Username::parse(&name))
        .transpose()?
        .map(|name| name.as_str().to_owned());
    let email = optional(update.email.as_deref())
        .map(|email| Email::parse(&email))
        .transpose()?;

    Ok(UserChanges {
        username,
        first_name: optional(update.first_name.as_deref()),
        last_name: optional(update.last_name.as_deref()),
        email,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn update(username: Option<&str>, email: Option<&str>) -> UserUpdate {
        UserUpdate {
            username: username.map(String::from),
            first_name: Some("  ".to_string()),
            last_name: Some(" Santos ".to_string()),
            email: email.map(String::from),
        }
    }

    #[test]
    fn test_user_changes_skip_blank_fields() {
        let changes = user_changes(&update(None, Some(""))).unwrap();
        assert_eq!(changes.username, None);
        assert_eq!(changes.first_name, None);
        assert_eq!(changes.last_name.as_deref(), Some("Santos"));
        assert!(changes.email.is_none());
    }

    #[test]
    fn test_user_changes_validate_email() {
        let err = user_changes(&update(None, Some("not-an-email"))).unwrap_err();
        assert!(matches!(err, AuthError::InvalidEmail(_)));

        let changes = user_changes(&update(None, Some("ana@example.com"))).unwrap();
        assert_eq!(changes.email.unwrap().as_str(), "ana@example.com");
    }
}
