//! Cached product catalog.
//!
//! The public product list is read far more often than it changes, so the
//! full list is cached in `moka` for 60 seconds. Any catalog or stock write
//! calls [`CatalogCache::invalidate`].
//!
//! Entries are keyed by a generation number that every invalidation bumps. A
//! load that started before a write stores its list under the old generation,
//! where no later reader looks.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::debug;

use crate::db::{ProductRepository, RepositoryError};
use crate::models::product::Product;

const CATALOG_TTL: Duration = Duration::from_secs(60);

/// The product list, shared between requests.
#[derive(Clone)]
pub struct CatalogCache {
    cache: Cache<u64, Arc<Vec<Product>>>,
    generation: Arc<AtomicU64>,
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(2)
                .time_to_live(CATALOG_TTL)
                .build(),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// All products, newest first, from cache or the database.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if loading from the database fails.
    pub async fn products(&self, pool: &PgPool) -> Result<Arc<Vec<Product>>, RepositoryError> {
        let generation = self.generation();
        if let Some(products) = self.cache.get(&generation).await {
            debug!(generation, "Cache hit for product list");
            return Ok(products);
        }

        let products = Arc::new(ProductRepository::new(pool).list().await?);
        self.store(generation, Arc::clone(&products)).await;
        Ok(products)
    }

    /// Drop the cached list so the next read goes to the database.
    pub async fn invalidate(&self) {
        let stale = self.generation.fetch_add(1, Ordering::AcqRel);
        self.cache.invalidate(&stale).await;
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    async fn store(&self, generation: u64, products: Arc<Vec<Product>>) {
        self.cache.insert(generation, products).await;
    }

    #[cfg(test)]
    async fn cached(&self) -> Option<Arc<Vec<Product>>> {
        self.cache.get(&self.generation()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalidate_clears_cached_list() {
        let catalog = CatalogCache::new();
        catalog.store(catalog.generation(), Arc::new(Vec::new())).await;
        assert!(catalog.cached().await.is_some());

        catalog.invalidate().await;
        assert!(catalog.cached().await.is_none());
    }

    #[tokio::test]
    async fn test_load_started_before_invalidate_is_not_served() {
        let catalog = CatalogCache::new();
        let started_at = catalog.generation();

        catalog.invalidate().await;
        catalog.store(started_at, Arc::new(Vec::new())).await;

        assert!(catalog.cached().await.is_none());
    }

    #[tokio::test]
    async fn test_clones_share_invalidation() {
        let catalog = CatalogCache::new();
        let handle = catalog.clone();
        catalog.store(catalog.generation(), Arc::new(Vec::new())).await;

        handle.invalidate().await;
        assert!(catalog.cached().await.is_none());
    }
}
