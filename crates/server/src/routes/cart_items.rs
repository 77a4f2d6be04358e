//! Cart item handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use pawtopia_core::{CartItemId, clamp_to_stock};

use crate::db::{CartRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::cart::{CartItem, CartItemInput, CartItemView, QuantityInput};
use crate::services::auth::Principal;
use crate::state::AppState;

/// Add a product to the caller's cart, merging with an existing line.
#[instrument(skip_all, fields(product_id = %input.product_id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Json(input): Json<CartItemInput>,
) -> Result<(StatusCode, Json<CartItemView>)> {
    let user_id = principal.require_customer()?;
    if input.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be at least 1".to_string(),
        ));
    }

    let product = ProductRepository::new(state.pool())
        .get_by_id(input.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    if product.quantity <= 0 {
        return Err(out_of_stock());
    }
    let requested = input.quantity.unsigned_abs();

    let carts = CartRepository::new(state.pool());
    let cart = carts.ensure(user_id).await?;
    let item = carts
        .add_item(cart.id, product.id, requested)
        .await?
        .ok_or_else(out_of_stock)?;

    Ok((StatusCode::CREATED, Json(CartItemView::new(item)?)))
}

pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Vec<CartItem>>> {
    let items = CartRepository::new(state.pool()).all_items().await?;
    Ok(Json(items))
}

/// Set a line's quantity on behalf of the customer.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(id): Path<CartItemId>,
    Json(input): Json<QuantityInput>,
) -> Result<Json<CartItemView>> {
    set_quantity(&state, &principal, id, input.quantity, true)
        .await
        .map(Json)
}

/// Set a line's quantity without moving it to the top of the cart.
pub async fn system_update(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(id): Path<CartItemId>,
    Json(input): Json<QuantityInput>,
) -> Result<Json<CartItemView>> {
    set_quantity(&state, &principal, id, input.quantity, false)
        .await
        .map(Json)
}

#[instrument(skip_all, fields(cart_item_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(id): Path<CartItemId>,
) -> Result<StatusCode> {
    let carts = CartRepository::new(state.pool());
    let item = find(&carts, id).await?;
    principal.ensure_owner_or_admin(item.cart_id.owner())?;
    carts.delete_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip_all, fields(cart_item_id = %id, touch))]
async fn set_quantity(
    state: &AppState,
    principal: &Principal,
    id: CartItemId,
    requested: i32,
    touch: bool,
) -> Result<CartItemView> {
    let carts = CartRepository::new(state.pool());
    let item = find(&carts, id).await?;
    principal.ensure_owner_or_admin(item.cart_id.owner())?;

    let quantity = clamped(requested, item.stock)?;
    carts.set_quantity(id, quantity, touch).await?;

    let updated = find(&carts, id).await?;
    Ok(CartItemView::new(updated)?)
}

async fn find(carts: &CartRepository<'_>, id: CartItemId) -> Result<CartItem> {
    carts
        .get_item(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cart item not found".to_string()))
}

fn clamped(requested: i32, stock: i32) -> Result<u32> {
    clamp_to_stock(requested, stock)
        .map_err(|e| AppError::BadRequest(e.to_string()))?
        .ok_or_else(out_of_stock)
}

fn out_of_stock() -> AppError {
    AppError::Conflict("Product is out of stock".to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    #[test]
    fn test_clamped_limits_to_stock() {
        assert_eq!(clamped(3, 10).unwrap(), 3);
        assert_eq!(clamped(15, 10).unwrap(), 10);
    }

    #[test]
    fn test_clamped_errors() {
        assert_eq!(clamped(0, 10).unwrap_err().status(), StatusCode::BAD_REQUEST);
        assert_eq!(clamped(2, 0).unwrap_err().status(), StatusCode::CONFLICT);
    }
}
