//! Checkout orchestration.
//!
//! Bridges the cart to the hosted payment page and back. Starting a checkout
//! snapshots the cart into provider line items and records a single-use token
//! so the callback redirect can recover the buyer even when it arrives
//! without any session cookie. Completing a checkout converts the cart into
//! order rows in one transaction.

use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use pixel_den_core::UserId;

use crate::db::RepositoryError;
use crate::db::checkout_sessions::CheckoutSessionRepository;
use crate::db::orders::OrderRepository;
use crate::services::CartService;
use crate::stripe::{CheckoutProvider, LineItem, StripeError};

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Checkout started with an empty cart.
    #[error("cannot check out an empty cart")]
    EmptyCart,

    /// The payment provider rejected or failed the session request.
    #[error("payment provider error: {0}")]
    Provider(#[from] StripeError),

    /// The callback token is unknown, already used, or expired.
    #[error("checkout session expired")]
    ExpiredSession,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// The result of recording a successful checkout.
#[derive(Debug)]
pub struct PurchaseOutcome {
    /// Grouping key shared by every order row of this purchase.
    pub reference: String,
    /// Number of line items recorded (zero when the cart was already empty).
    pub line_count: usize,
}

/// Service orchestrating hosted checkout sessions.
pub struct CheckoutService<'a> {
    pool: &'a SqlitePool,
    provider: &'a dyn CheckoutProvider,
    base_url: &'a str,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(
        pool: &'a SqlitePool,
        provider: &'a dyn CheckoutProvider,
        base_url: &'a str,
    ) -> Self {
        Self {
            pool,
            provider,
            base_url,
        }
    }

    /// Start a hosted checkout for the user's current cart.
    ///
    /// Returns the provider URL to redirect the buyer to.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` when there is nothing to buy, and
    /// `CheckoutError::Provider` when the session request fails; the cart is
    /// left untouched in both cases.
    #[instrument(skip(self))]
    pub async fn begin(&self, user_id: UserId) -> Result<String, CheckoutError> {
        let summary = CartService::new(self.pool).summary(user_id).await?;
        if summary.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let line_items: Vec<LineItem> = summary
            .lines
            .iter()
            .map(|line| LineItem {
                price: line.product.stripe_price_id.clone(),
                quantity: line.quantity,
            })
            .collect();

        let token = Uuid::new_v4().to_string();
        let success_url = format!("{}/checkout/success?token={token}", self.base_url);
        let cancel_url = format!("{}/checkout/cancel?token={token}", self.base_url);

        let session = self
            .provider
            .create_session(&line_items, &success_url, &cancel_url)
            .await?;

        let sessions = CheckoutSessionRepository::new(self.pool);
        sessions.create(&token, user_id, &session.id).await?;

        // Housekeeping; a failure here must not block the checkout.
        if let Err(e) = sessions.prune_expired().await {
            tracing::warn!(error = %e, "failed to prune expired checkout sessions");
        }

        tracing::info!(session_id = %session.id, "started checkout session");

        Ok(session.url)
    }

    /// Resolve the user behind a checkout callback token.
    ///
    /// Consumes the token: a second call with the same value fails.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::ExpiredSession` when the token is unknown,
    /// already used, or older than its TTL.
    pub async fn identity_for(&self, token: &str) -> Result<UserId, CheckoutError> {
        CheckoutSessionRepository::new(self.pool)
            .take(token)
            .await?
            .ok_or(CheckoutError::ExpiredSession)
    }

    /// Record a completed purchase: cart rows become order rows, atomically.
    ///
    /// Every order row of the purchase shares a freshly generated reference
    /// and a single timestamp.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Repository` if the transaction fails; the cart
    /// is left untouched in that case.
    #[instrument(skip(self))]
    pub async fn complete_success(&self, user_id: UserId) -> Result<PurchaseOutcome, CheckoutError> {
        let reference = Uuid::new_v4().to_string();
        let placed_at = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

        let line_count = OrderRepository::new(self.pool)
            .record_purchase(user_id, &reference, &placed_at)
            .await?;

        tracing::info!(%reference, line_count, "recorded purchase");

        Ok(PurchaseOutcome {
            reference,
            line_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

    use pixel_den_core::Price;

    use super::*;
    use crate::db::MIGRATOR;
    use crate::db::products::ProductRepository;
    use crate::db::users::UserRepository;
    use crate::models::Product;
    use crate::stripe::CheckoutSession;

    /// Fake provider recording every session request.
    struct FakeProvider {
        calls: Mutex<Vec<(Vec<LineItem>, String, String)>>,
        fail: bool,
    }

    impl FakeProvider {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl CheckoutProvider for FakeProvider {
        async fn create_session(
            &self,
            line_items: &[LineItem],
            success_url: &str,
            cancel_url: &str,
        ) -> Result<CheckoutSession, StripeError> {
            self.calls.lock().expect("lock").push((
                line_items.to_vec(),
                success_url.to_owned(),
                cancel_url.to_owned(),
            ));

            if self.fail {
                return Err(StripeError::Api {
                    status: 400,
                    message: "No such price".to_owned(),
                });
            }

            Ok(CheckoutSession {
                id: "cs_test_123".to_owned(),
                url: "https://checkout.stripe.test/pay/cs_test_123".to_owned(),
            })
        }
    }

    async fn test_pool() -> SqlitePool {
        let options = "sqlite::memory:"
            .parse::<SqliteConnectOptions>()
            .expect("parse connect options")
            .foreign_keys(false);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .expect("connect to in-memory database");
        MIGRATOR.run(&pool).await.expect("run migrations");
        pool
    }

    async fn seed_user(pool: &SqlitePool) -> UserId {
        let email = "buyer@example.com".parse().expect("valid email");
        UserRepository::new(pool)
            .create(&email, "hash", "Buyer")
            .await
            .expect("create user")
            .id
    }

    async fn seed_product(pool: &SqlitePool, name: &str, price: &str) -> Product {
        ProductRepository::new(pool)
            .create(
                name,
                Price::parse(price).expect("valid price"),
                "/static/img.png",
                &format!("price_{name}"),
            )
            .await
            .expect("create product")
    }

    async fn add_to_cart(pool: &SqlitePool, user: UserId, product: &Product, times: usize) {
        let cart = CartService::new(pool);
        for _ in 0..times {
            cart.add(user, product.id).await.expect("add to cart");
        }
    }

    #[tokio::test]
    async fn test_begin_rejects_empty_cart() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;
        let provider = FakeProvider::new();

        let service = CheckoutService::new(&pool, &provider, "https://shop.test");
        let result = service.begin(user).await;

        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
        assert!(provider.calls.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn test_begin_builds_line_items_from_cart() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;
        let ps4 = seed_product(&pool, "ps4", "499").await;
        let switch = seed_product(&pool, "switch", "119").await;
        add_to_cart(&pool, user, &ps4, 3).await;
        add_to_cart(&pool, user, &switch, 1).await;

        let provider = FakeProvider::new();
        let service = CheckoutService::new(&pool, &provider, "https://shop.test");
        let url = service.begin(user).await.expect("begin checkout");

        assert_eq!(url, "https://checkout.stripe.test/pay/cs_test_123");

        let calls = provider.calls.lock().expect("lock");
        assert_eq!(calls.len(), 1);
        let (items, success_url, cancel_url) = &calls[0];
        assert_eq!(
            *items,
            vec![
                LineItem {
                    price: "price_ps4".to_owned(),
                    quantity: 3,
                },
                LineItem {
                    price: "price_switch".to_owned(),
                    quantity: 1,
                },
            ]
        );
        assert!(success_url.starts_with("https://shop.test/checkout/success?token="));
        assert!(cancel_url.starts_with("https://shop.test/checkout/cancel?token="));
    }

    #[tokio::test]
    async fn test_begin_surfaces_provider_failure() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;
        let ps4 = seed_product(&pool, "ps4", "499").await;
        add_to_cart(&pool, user, &ps4, 1).await;

        let provider = FakeProvider::failing();
        let service = CheckoutService::new(&pool, &provider, "https://shop.test");
        let result = service.begin(user).await;

        assert!(matches!(result, Err(CheckoutError::Provider(_))));

        // The cart survives a failed checkout attempt.
        let summary = CartService::new(&pool).summary(user).await.expect("summary");
        assert_eq!(summary.item_count(), 1);
    }

    #[tokio::test]
    async fn test_callback_token_resolves_user_once() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;
        let ps4 = seed_product(&pool, "ps4", "499").await;
        add_to_cart(&pool, user, &ps4, 1).await;

        let provider = FakeProvider::new();
        let service = CheckoutService::new(&pool, &provider, "https://shop.test");
        service.begin(user).await.expect("begin checkout");

        let token = {
            let calls = provider.calls.lock().expect("lock");
            let (_, success_url, _) = &calls[0];
            success_url
                .rsplit("token=")
                .next()
                .expect("token in url")
                .to_owned()
        };

        let resolved = service.identity_for(&token).await.expect("resolve token");
        assert_eq!(resolved, user);

        // Consumed on first use.
        let second = service.identity_for(&token).await;
        assert!(matches!(second, Err(CheckoutError::ExpiredSession)));
    }

    #[tokio::test]
    async fn test_unknown_token_is_expired() {
        let pool = test_pool().await;
        let provider = FakeProvider::new();
        let service = CheckoutService::new(&pool, &provider, "https://shop.test");

        let result = service.identity_for("no-such-token").await;
        assert!(matches!(result, Err(CheckoutError::ExpiredSession)));
    }

    #[tokio::test]
    async fn test_complete_success_records_and_empties_cart() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;
        let ps4 = seed_product(&pool, "ps4", "499").await;
        let switch = seed_product(&pool, "switch", "119").await;
        add_to_cart(&pool, user, &ps4, 1).await;
        add_to_cart(&pool, user, &switch, 2).await;

        let provider = FakeProvider::new();
        let service = CheckoutService::new(&pool, &provider, "https://shop.test");
        let outcome = service.complete_success(user).await.expect("complete");

        assert_eq!(outcome.line_count, 2);

        let summary = CartService::new(&pool).summary(user).await.expect("summary");
        assert!(summary.is_empty());

        // Both order rows share the reference returned in the outcome.
        let lines = OrderRepository::new(&pool)
            .items_for_group(user, &outcome.reference)
            .await
            .expect("items for group");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].quantity, 1);
        assert_eq!(lines[1].quantity, 2);
    }

    #[tokio::test]
    async fn test_complete_success_on_empty_cart_records_nothing() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;

        let provider = FakeProvider::new();
        let service = CheckoutService::new(&pool, &provider, "https://shop.test");
        let outcome = service.complete_success(user).await.expect("complete");

        assert_eq!(outcome.line_count, 0);
    }
}
