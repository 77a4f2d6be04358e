//! Product reviews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pawtopia_core::{OrderId, ProductId, ReviewId, UserId};

use super::{ValidationError, optional};

const MAX_COMMENT_CHARS: usize = 2000;

/// A review joined with the reviewer's username.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "reviewId")]
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    pub order_id: Option<OrderId>,
    pub ratings: i16,
    pub comment: Option<String>,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// A new review.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInput {
    pub product_id: ProductId,
    pub order_id: OrderId,
    pub ratings: i16,
    #[serde(default)]
    pub comment: Option<String>,
}

/// An edit to an existing review.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewUpdate {
    pub ratings: i16,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Average rating for a product.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub product_id: ProductId,
    pub average_rating: Option<f64>,
    pub review_count: usize,
}

/// Check a star rating and normalize a comment.
///
/// # Errors
///
/// Returns an error if the rating is outside 1-5 or the comment is too long.
pub fn validate_review(ratings: i16, comment: Option<&str>) -> Result<Option<String>, ValidationError> {
    if !(1..=5).contains(&ratings) {
        return Err(ValidationError::invalid("ratings", "must be between 1 and 5"));
    }
    let comment = optional(comment);
    if comment
        .as_ref()
        .is_some_and(|c| c.chars().count() > MAX_COMMENT_CHARS)
    {
        return Err(ValidationError::invalid(
            "comment",
            format!("must be at most {MAX_COMMENT_CHARS} characters"),
        ));
    }
    Ok(comment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert!(validate_review(0, None).is_err());
        assert!(validate_review(6, None).is_err());
        assert_eq!(validate_review(1, None), Ok(None));
        assert_eq!(validate_review(5, Some(" Great! ")), Ok(Some("Great!".into())));
    }

    #[test]
    fn test_comment_length() {
        let long = "a".repeat(MAX_COMMENT_CHARS + 1);
        assert!(validate_review(4, Some(&long)).is_err());
    }
}
