//! Application state shared across handlers.

use std::sync::Arc;

use chrono::TimeDelta;
use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::services::auth::TokenService;
use crate::services::catalog::CatalogCache;
use crate::services::payment::{PaymentClient, PaymentError};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("token lifetime of {0} minutes is out of range")]
    TokenTtl(i64),
    #[error("payment client: {0}")]
    Payment(#[from] PaymentError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    tokens: TokenService,
    payments: Option<PaymentClient>,
    catalog: CatalogCache,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the token lifetime is out of range or the payment
    /// client cannot be built.
    pub fn new(config: ServerConfig, pool: PgPool) -> Result<Self, StateError> {
        let ttl = TimeDelta::try_minutes(config.token_ttl_minutes)
            .ok_or(StateError::TokenTtl(config.token_ttl_minutes))?;
        let tokens = TokenService::new(config.jwt_secret.clone(), ttl);
        let payments = config.payment.as_ref().map(PaymentClient::new).transpose()?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                tokens,
                payments,
                catalog: CatalogCache::new(),
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Access token issuer and verifier.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    /// `PayMongo` client, if online payments are configured.
    #[must_use]
    pub fn payments(&self) -> Option<&PaymentClient> {
        self.inner.payments.as_ref()
    }

    /// Cached product list.
    #[must_use]
    pub fn catalog(&self) -> &CatalogCache {
        &self.inner.catalog
    }
}
