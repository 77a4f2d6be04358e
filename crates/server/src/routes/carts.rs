//! Cart handlers.
//!
//! A customer's cart ID equals their user ID, so ownership checks compare
//! the cart's owner with the caller.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use pawtopia_core::{CartId, CartTotals, clamp_to_stock};

use crate::db::CartRepository;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::cart::{Cart, CartItem, CartView, SummaryQuery, totals_for};
use crate::state::AppState;

/// Create the caller's cart if it does not exist yet.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
) -> Result<Json<Cart>> {
    let user_id = principal.require_customer()?;
    let cart = CartRepository::new(state.pool()).ensure(user_id).await?;
    Ok(Json(cart))
}

pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Vec<Cart>>> {
    let carts = CartRepository::new(state.pool()).list().await?;
    Ok(Json(carts))
}

/// The cart with its items, newest first.
///
/// Lines asking for more than the current stock are clamped in place without
/// bumping their `lastUpdated`, so the ordering the customer sees is stable.
#[instrument(skip_all, fields(%cart_id))]
pub async fn get(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(cart_id): Path<CartId>,
) -> Result<Json<CartView>> {
    principal.ensure_owner_or_admin(cart_id.owner())?;
    let items = load_items(&state, cart_id).await?;
    let items = clamp_items(&state, items).await?;
    Ok(Json(CartView::new(cart_id, items)?))
}

/// Totals for the selected items, or for every available item.
pub async fn summary(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(cart_id): Path<CartId>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<CartTotals>> {
    principal.ensure_owner_or_admin(cart_id.owner())?;
    let selected = query
        .selected()
        .map_err(|token| AppError::BadRequest(format!("Invalid cart item ID: {token}")))?;

    let items = load_items(&state, cart_id).await?;
    let items = clamp_items(&state, items).await?;
    let totals = match selected {
        Some(ids) => totals_for(items.iter().filter(|item| ids.contains(&item.id)))?,
        None => totals_for(items.iter())?,
    };
    Ok(Json(totals))
}

/// Remove every item from the cart.
#[instrument(skip_all, fields(%cart_id))]
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(cart_id): Path<CartId>,
) -> Result<StatusCode> {
    principal.ensure_owner_or_admin(cart_id.owner())?;
    let removed = CartRepository::new(state.pool()).clear(cart_id).await?;
    tracing::debug!(removed, "Cart cleared");
    Ok(StatusCode::NO_CONTENT)
}

async fn load_items(state: &AppState, cart_id: CartId) -> Result<Vec<CartItem>> {
    let carts = CartRepository::new(state.pool());
    if carts.get(cart_id).await?.is_none() {
        return Err(AppError::NotFound("Cart not found".to_string()));
    }
    Ok(carts.items(cart_id).await?)
}

async fn clamp_items(state: &AppState, mut items: Vec<CartItem>) -> Result<Vec<CartItem>> {
    let carts = CartRepository::new(state.pool());
    for item in &mut items {
        let Ok(Some(clamped)) = clamp_to_stock(item.quantity, item.stock) else {
            continue;
        };
        let Ok(quantity) = i32::try_from(clamped) else {
            continue;
        };
        if quantity != item.quantity {
            carts.set_quantity(item.id, clamped, false).await?;
            tracing::debug!(
                cart_item_id = %item.id,
                from = item.quantity,
                to = quantity,
                "Clamped cart item to stock"
            );
            item.quantity = quantity;
        }
    }
    Ok(items)
}
