//! Customer signup, login, and profile handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use pawtopia_core::UserId;

use crate::db::{AddressRepository, UserRepository};
use crate::error::{AppError, Result, add_breadcrumb, set_sentry_user};
use crate::middleware::RequireAuth;
use crate::models::address::AddressInput;
use crate::models::user::{LoginRequest, LoginResponse, SignupRequest, UserProfile};
use crate::routes::{MessageResponse, message};
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Register a customer account together with its empty cart.
#[instrument(skip_all, fields(username = %request.username))]
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    let user = AuthService::new(state.pool(), state.tokens())
        .signup(&request)
        .await?;

    add_breadcrumb(
        "auth",
        "Customer signed up",
        &[("user_id", &user.id.to_string())],
    );
    tracing::info!(user_id = %user.id, "Customer registered");

    Ok((
        StatusCode::CREATED,
        message("User registered successfully"),
    ))
}

/// Exchange customer credentials for a bearer token.
#[instrument(skip_all, fields(username = %request.username))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let response = AuthService::new(state.pool(), state.tokens())
        .login(&request.username, &request.password)
        .await?;

    set_sentry_user(&response.user_id, &response.username);
    add_breadcrumb("auth", "Customer logged in", &[]);

    Ok(Json(response))
}

/// Profile of `id` with its address.
#[instrument(skip_all, fields(user_id = %id))]
pub async fn get_user(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(id): Path<UserId>,
) -> Result<Json<UserProfile>> {
    principal.ensure_owner_or_admin(id)?;
    load_profile(&state, id).await.map(Json)
}

/// Profile of the authenticated customer.
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
) -> Result<Json<UserProfile>> {
    let id = principal.require_customer()?;
    load_profile(&state, id).await.map(Json)
}

/// Create or replace the shipping address of `id`.
#[instrument(skip_all, fields(user_id = %id))]
pub async fn put_address(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(id): Path<UserId>,
    Json(input): Json<AddressInput>,
) -> Result<Json<MessageResponse>> {
    principal.ensure_owner_or_admin(id)?;
    let address = input.validate()?;
    AddressRepository::new(state.pool())
        .upsert(id, &address)
        .await?;
    Ok(message("Address updated successfully"))
}

async fn load_profile(state: &AppState, id: UserId) -> Result<UserProfile> {
    let user = UserRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    let address = AddressRepository::new(state.pool()).get(id).await?;
    Ok(UserProfile { user, address })
}
