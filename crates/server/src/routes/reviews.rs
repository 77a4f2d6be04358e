//! Product review handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use pawtopia_core::pricing::average_rating;
use pawtopia_core::{ProductId, ReviewId};

use crate::db::ReviewRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::models::review::{RatingSummary, Review, ReviewInput, ReviewUpdate, validate_review};
use crate::state::AppState;

/// Review a product from one of the caller's approved orders.
#[instrument(skip_all, fields(product_id = %input.product_id, order_id = %input.order_id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Json(input): Json<ReviewInput>,
) -> Result<(StatusCode, Json<Review>)> {
    let user_id = principal.require_customer()?;
    let comment = validate_review(input.ratings, input.comment.as_deref())?;

    let reviews = ReviewRepository::new(state.pool());
    let item = reviews
        .find_order_item(user_id, input.order_id, input.product_id)
        .await?
        .ok_or_else(|| {
            AppError::BadRequest("You can only review products from your own orders".to_string())
        })?;
    if !item.order_status.is_reviewable() {
        return Err(AppError::BadRequest(format!(
            "Orders with status {} cannot be reviewed yet",
            item.order_status
        )));
    }
    if item.is_rated {
        return Err(AppError::Conflict(
            "You have already reviewed this product".to_string(),
        ));
    }

    let review = reviews
        .create(
            user_id,
            &item,
            input.product_id,
            input.order_id,
            input.ratings,
            comment.as_deref(),
        )
        .await?;

    add_breadcrumb(
        "review",
        "Review posted",
        &[("review_id", &review.id.to_string())],
    );
    Ok((StatusCode::CREATED, Json(review)))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Review>>> {
    let reviews = ReviewRepository::new(state.pool()).list().await?;
    Ok(Json(reviews))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<ReviewId>) -> Result<Json<Review>> {
    find(&state, id).await.map(Json)
}

/// Edit a review. Only its author may do this.
#[instrument(skip_all, fields(review_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(id): Path<ReviewId>,
    Json(input): Json<ReviewUpdate>,
) -> Result<Json<Review>> {
    let review = find(&state, id).await?;
    if principal.user_id() != Some(review.user_id) {
        return Err(AppError::Forbidden(
            "Only the author can edit a review".to_string(),
        ));
    }
    let comment = validate_review(input.ratings, input.comment.as_deref())?;

    let updated = ReviewRepository::new(state.pool())
        .update(id, input.ratings, comment.as_deref())
        .await?;
    Ok(Json(updated))
}

#[instrument(skip_all, fields(review_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(id): Path<ReviewId>,
) -> Result<StatusCode> {
    let review = find(&state, id).await?;
    principal.ensure_owner_or_admin(review.user_id)?;
    ReviewRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn by_product(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Vec<Review>>> {
    let reviews = ReviewRepository::new(state.pool())
        .list_by_product(product_id)
        .await?;
    Ok(Json(reviews))
}

/// Average rating and review count for a product.
pub async fn rating_summary(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<RatingSummary>> {
    let ratings = ReviewRepository::new(state.pool())
        .ratings_for(product_id)
        .await?;
    Ok(Json(RatingSummary {
        product_id,
        average_rating: average_rating(&ratings),
        review_count: ratings.len(),
    }))
}

async fn find(state: &AppState, id: ReviewId) -> Result<Review> {
    ReviewRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Review not found".to_string()))
}
