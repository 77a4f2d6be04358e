//! Bearer token extractors.
//!
//! Handlers that need a caller take [`RequireAuth`]; admin-only handlers take
//! [`RequireAdmin`]. Both answer with a JSON `{"message"}` body on rejection.
//!
//! ```rust,ignore
//! async fn handler(RequireAuth(principal): RequireAuth) -> impl IntoResponse {
//!     format!("Hello, {}!", principal.username)
//! }
//! ```

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::debug;

use pawtopia_core::UserId;

use crate::error::{AppError, set_sentry_user};
use crate::services::auth::Principal;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
pub struct RequireAuth(pub Principal);

/// Extractor that requires a valid bearer token with the admin role.
pub struct RequireAdmin(pub Principal);

/// Error returned when a request is not authenticated or not allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// No `Authorization: Bearer` header.
    MissingToken,
    /// Token failed verification or has expired.
    InvalidToken,
    /// Authenticated, but not an admin.
    NotAdmin,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::MissingToken => (StatusCode::UNAUTHORIZED, "Authentication required"),
            Self::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
            Self::NotAdmin => (StatusCode::FORBIDDEN, "Admin access required"),
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AuthRejection::MissingToken)?;

        let principal = state.tokens().verify(token).map_err(|e| {
            debug!(error = %e, "Rejected bearer token");
            AuthRejection::InvalidToken
        })?;

        set_sentry_user(&principal.id, &principal.username);
        Ok(Self(principal))
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(principal) = RequireAuth::from_request_parts(parts, state).await?;
        if !principal.is_admin() {
            return Err(AuthRejection::NotAdmin);
        }
        Ok(Self(principal))
    }
}

impl Principal {
    /// Allow the request only for `owner` or an admin.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` for any other caller.
    pub fn ensure_owner_or_admin(&self, owner: UserId) -> Result<(), AppError> {
        if self.can_access(owner) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "You do not have access to this resource".to_string(),
            ))
        }
    }

    /// The caller's customer ID. Admins have no cart, orders, or bookings.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` for admins.
    pub fn require_customer(&self) -> Result<UserId, AppError> {
        self.user_id().ok_or_else(|| {
            AppError::Forbidden("This action is only available to customers".to_string())
        })
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
