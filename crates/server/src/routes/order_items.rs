//! Order item handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use pawtopia_core::OrderItemId;

use crate::db::OrderRepository;
use crate::db::orders::OrderItemChanges;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::optional;
use crate::models::order::{IdQuery, OrderItem, OrderItemUpdate, RatedInput};
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Vec<OrderItem>>> {
    let items = OrderRepository::new(state.pool()).list_items().await?;
    Ok(Json(items))
}

/// Admin edit of an item's snapshot name and image.
#[instrument(skip_all, fields(order_item_id = %query.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Query(query): Query<IdQuery<OrderItemId>>,
    Json(update): Json<OrderItemUpdate>,
) -> Result<Json<OrderItem>> {
    let changes = OrderItemChanges {
        name: update.name()?,
        image: optional(update.order_item_image.as_deref()),
        is_rated: update.is_rated,
    };
    let item = OrderRepository::new(state.pool())
        .update_item(query.id, &changes)
        .await?;
    Ok(Json(item))
}

/// Flag an item as rated. Only the order's owner may do this.
#[instrument(skip_all, fields(order_item_id = %id))]
pub async fn update_is_rated(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(id): Path<OrderItemId>,
    Json(input): Json<RatedInput>,
) -> Result<Json<OrderItem>> {
    let orders = OrderRepository::new(state.pool());
    let owner = orders
        .item_owner(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order item not found".to_string()))?;
    principal.ensure_owner_or_admin(owner)?;

    let item = orders.set_rated(id, input.is_rated).await?;
    Ok(Json(item))
}

#[instrument(skip_all, fields(order_item_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<OrderItemId>,
) -> Result<StatusCode> {
    OrderRepository::new(state.pool()).delete_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
