//! Shipping address handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use pawtopia_core::UserId;

use crate::db::AddressRepository;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::address::{Address, AddressInput};
use crate::state::AppState;

pub async fn upsert(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(user_id): Path<UserId>,
    Json(input): Json<AddressInput>,
) -> Result<Json<Address>> {
    principal.ensure_owner_or_admin(user_id)?;
    let address = input.validate()?;
    let saved = AddressRepository::new(state.pool())
        .upsert(user_id, &address)
        .await?;
    Ok(Json(saved))
}

pub async fn get(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(user_id): Path<UserId>,
) -> Result<Json<Address>> {
    principal.ensure_owner_or_admin(user_id)?;
    AddressRepository::new(state.pool())
        .get(user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Address not found".to_string()))
}

pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Vec<Address>>> {
    let addresses = AddressRepository::new(state.pool()).list().await?;
    Ok(Json(addresses))
}

pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(user_id): Path<UserId>,
) -> Result<StatusCode> {
    principal.ensure_owner_or_admin(user_id)?;
    AddressRepository::new(state.pool()).delete(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
