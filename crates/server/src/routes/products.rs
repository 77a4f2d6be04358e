//! Product catalog handlers.
//!
//! Listing reads through the catalog cache; every write invalidates it.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use pawtopia_core::ProductId;

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::product::{Product, ProductFilter, ProductInput, QuantitySold};
use crate::state::AppState;

#[instrument(skip_all, fields(name = %input.product_name))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = input.validate()?;
    let created = ProductRepository::new(state.pool()).create(&product).await?;
    state.catalog().invalidate().await;

    tracing::info!(product_id = %created.id, "Product created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// Catalog listing, optionally filtered by `type` and `search`.
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<Product>>> {
    let products = state.catalog().products(state.pool()).await?;
    let matching = products
        .iter()
        .filter(|p| filter.matches(p))
        .cloned()
        .collect();
    Ok(Json(matching))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<ProductId>) -> Result<Json<Product>> {
    ProductRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

#[instrument(skip_all, fields(product_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<ProductId>,
    Json(input): Json<ProductInput>,
) -> Result<Json<Product>> {
    let product = input.validate()?;
    let updated = ProductRepository::new(state.pool())
        .update(id, &product)
        .await?;
    state.catalog().invalidate().await;
    Ok(Json(updated))
}

#[instrument(skip_all, fields(product_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    ProductRepository::new(state.pool()).delete(id).await?;
    state.catalog().invalidate().await;
    tracing::info!(product_id = %id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn total_quantity_sold(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<QuantitySold>> {
    let total_quantity_sold = ProductRepository::new(state.pool())
        .total_quantity_sold()
        .await?;
    Ok(Json(QuantitySold {
        total_quantity_sold,
    }))
}
