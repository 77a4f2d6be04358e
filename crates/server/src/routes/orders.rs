//! Checkout and order management handlers.
//!
//! Placing or cancelling an order changes product stock, so both invalidate
//! the catalog cache.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use pawtopia_core::{OrderId, OrderStatus};

use crate::db::OrderRepository;
use crate::db::orders::OrderChanges;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::order::{
    IdQuery, NewOrder, Order, OrderUpdate, StatusQuery, TotalIncome, UserIdQuery,
};
use crate::state::AppState;

/// Place an order from the caller's selected lines.
#[instrument(skip_all, fields(payment_method = ?input.payment_method))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Json(input): Json<NewOrder>,
) -> Result<(StatusCode, Json<Order>)> {
    let user_id = principal.require_customer()?;
    let lines = input.lines()?;

    let order = OrderRepository::new(state.pool())
        .create(user_id, &lines, input.payment_method, &input.cart_item_ids)
        .await?;
    state.catalog().invalidate().await;

    add_breadcrumb(
        "order",
        "Order placed",
        &[
            ("order_id", &order.id.to_string()),
            ("total", &order.total_price.to_string()),
        ],
    );
    tracing::info!(order_id = %order.id, %user_id, total = %order.total_price, "Order placed");

    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool()).list().await?;
    Ok(Json(orders))
}

pub async fn get(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let order = find(&state, id).await?;
    principal.ensure_owner_or_admin(order.user_id)?;
    Ok(Json(order))
}

pub async fn list_by_user(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Query(query): Query<UserIdQuery>,
) -> Result<Json<Vec<Order>>> {
    principal.ensure_owner_or_admin(query.user_id)?;
    let orders = OrderRepository::new(state.pool())
        .list_by_user(query.user_id)
        .await?;
    Ok(Json(orders))
}

pub async fn total_income(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<TotalIncome>> {
    let total_income = OrderRepository::new(state.pool()).total_income().await?;
    Ok(Json(TotalIncome { total_income }))
}

/// Admin edit of payment details and status.
#[instrument(skip_all, fields(order_id = %query.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Query(query): Query<IdQuery<OrderId>>,
    Json(update): Json<OrderUpdate>,
) -> Result<Json<Order>> {
    let order_status = update
        .order_status
        .as_deref()
        .map(parse_status)
        .transpose()?;

    let changes = OrderChanges {
        payment_method: update.payment_method,
        payment_status: update.payment_status,
        order_status,
    };
    apply(&state, query.id, changes).await.map(Json)
}

/// Move an order to `?status=`.
#[instrument(skip_all, fields(order_id = %id, status = %query.status))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<OrderId>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Order>> {
    let changes = OrderChanges {
        order_status: Some(parse_status(&query.status)?),
        ..OrderChanges::default()
    };
    apply(&state, id, changes).await.map(Json)
}

#[instrument(skip_all, fields(order_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<OrderId>,
) -> Result<StatusCode> {
    OrderRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn apply(state: &AppState, id: OrderId, changes: OrderChanges) -> Result<Order> {
    let order = OrderRepository::new(state.pool())
        .update(id, changes)
        .await?;
    if changes.order_status == Some(OrderStatus::Cancelled) {
        state.catalog().invalidate().await;
    }
    tracing::info!(order_id = %order.id, status = %order.order_status, "Order updated");
    Ok(order)
}

async fn find(state: &AppState, id: OrderId) -> Result<Order> {
    OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
}

fn parse_status(raw: &str) -> Result<OrderStatus> {
    raw.parse()
        .map_err(|e: pawtopia_core::ParseStatusError| AppError::BadRequest(e.to_string()))
}
