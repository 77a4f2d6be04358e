//! Online payment handler.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use pawtopia_core::{OrderId, OrderStatus, PaymentStatus};

use crate::db::OrderRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub order_id: OrderId,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub checkout_url: String,
}

/// Create a `PayMongo` payment link for one of the caller's orders.
#[instrument(skip_all, fields(order_id = %request.order_id))]
pub async fn create_payment(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Json(request): Json<PaymentRequest>,
) -> Result<Json<PaymentResponse>> {
    let client = state.payments().ok_or_else(|| {
        AppError::ServiceUnavailable("Online payments are not available".to_string())
    })?;

    let order = OrderRepository::new(state.pool())
        .get(request.order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
    principal.ensure_owner_or_admin(order.user_id)?;

    if order.order_status == OrderStatus::Cancelled {
        return Err(AppError::BadRequest(
            "Cancelled orders cannot be paid".to_string(),
        ));
    }
    if order.payment_status == PaymentStatus::Paid {
        return Err(AppError::Conflict("Order is already paid".to_string()));
    }

    let url = client
        .create_link(order.total_price, &order.description, &order.remarks)
        .await?;

    add_breadcrumb(
        "payment",
        "Payment link created",
        &[("order_id", &order.id.to_string())],
    );
    Ok(Json(PaymentResponse {
        checkout_url: url.to_string(),
    }))
}
