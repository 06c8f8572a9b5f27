//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::StorefrontConfig;
use crate::stripe::{CheckoutProvider, StripeClient};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: SqlitePool,
    checkout: Arc<dyn CheckoutProvider>,
}

impl AppState {
    /// Create a new application state backed by the real Stripe client.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: SqlitePool) -> Self {
        let checkout = Arc::new(StripeClient::new(&config.stripe));
        Self::with_provider(config, pool, checkout)
    }

    /// Create an application state with an explicit checkout provider.
    #[must_use]
    pub fn with_provider(
        config: StorefrontConfig,
        pool: SqlitePool,
        checkout: Arc<dyn CheckoutProvider>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                checkout,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// Get a reference to the checkout provider.
    #[must_use]
    pub fn checkout(&self) -> &dyn CheckoutProvider {
        self.inner.checkout.as_ref()
    }
}
