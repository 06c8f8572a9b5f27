//! Cart aggregation service.
//!
//! Joins raw cart rows against the catalog and computes line and cart
//! totals. A cart row whose product no longer exists is a data integrity
//! problem and surfaces as an error rather than being silently skipped.

use sqlx::SqlitePool;

use pixel_den_core::{ProductId, UserId};

use crate::db::RepositoryError;
use crate::db::cart::CartRepository;
use crate::db::products::ProductRepository;
use crate::models::{CartLine, CartSummary};

/// Service for viewing and mutating a user's cart.
pub struct CartService<'a> {
    cart: CartRepository<'a>,
    products: ProductRepository<'a>,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            cart: CartRepository::new(pool),
            products: ProductRepository::new(pool),
        }
    }

    /// The user's aggregated cart: one line per product, with totals.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::StaleReference` when a cart row points at a
    /// product that no longer exists.
    pub async fn summary(&self, user_id: UserId) -> Result<CartSummary, RepositoryError> {
        let entries = self.cart.items(user_id).await?;

        let mut lines = Vec::with_capacity(entries.len());
        let mut total = rust_decimal::Decimal::ZERO;

        for entry in entries {
            let product = self
                .products
                .get(entry.product_id)
                .await?
                .ok_or(RepositoryError::StaleReference(entry.product_id))?;

            let line_total = product.price.times(entry.quantity);
            total += line_total;
            lines.push(CartLine {
                product,
                quantity: entry.quantity,
                line_total,
            });
        }

        Ok(CartSummary { lines, total })
    }

    /// Add one unit of a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when the product does not exist.
    pub async fn add(&self, user_id: UserId, product_id: ProductId) -> Result<(), RepositoryError> {
        if self.products.get(product_id).await?.is_none() {
            return Err(RepositoryError::NotFound);
        }

        self.cart.add_one(user_id, product_id).await
    }

    /// Remove one unit of a product from the cart (floored at zero).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn reduce(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        self.cart.remove_one(user_id, product_id).await
    }

    /// Remove all units of a product from the cart. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        self.cart.remove_all(user_id, product_id).await
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

    use pixel_den_core::Price;

    use super::*;
    use crate::db::MIGRATOR;
    use crate::db::users::UserRepository;
    use crate::models::Product;

    async fn test_pool() -> SqlitePool {
        // A single connection keeps every query on the same in-memory database.
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

    #[tokio::test]
    async fn test_add_accumulates_quantity() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;
        let product = seed_product(&pool, "ps4", "499").await;

        let service = CartService::new(&pool);
        service.add(user, product.id).await.expect("add");
        service.add(user, product.id).await.expect("add");
        service.add(user, product.id).await.expect("add");

        let summary = service.summary(user).await.expect("summary");
        assert_eq!(summary.lines.len(), 1);
        assert_eq!(summary.lines[0].quantity, 3);
        assert_eq!(summary.item_count(), 3);
    }

    #[tokio::test]
    async fn test_add_unknown_product_rejected() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;

        let service = CartService::new(&pool);
        let result = service.add(user, ProductId::new(999)).await;
        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_reduce_floors_at_zero() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;
        let product = seed_product(&pool, "switch", "119").await;

        let service = CartService::new(&pool);
        service.add(user, product.id).await.expect("add");
        service.reduce(user, product.id).await.expect("reduce");
        service.reduce(user, product.id).await.expect("reduce again");
        service.reduce(user, product.id).await.expect("reduce empty");

        let summary = service.summary(user).await.expect("summary");
        assert!(summary.is_empty());
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;
        let product = seed_product(&pool, "xbox-one", "384").await;

        let service = CartService::new(&pool);
        service.add(user, product.id).await.expect("add");
        service.add(user, product.id).await.expect("add");
        service.remove(user, product.id).await.expect("remove");
        service.remove(user, product.id).await.expect("remove absent");

        let summary = service.summary(user).await.expect("summary");
        assert!(summary.is_empty());
    }

    #[tokio::test]
    async fn test_totals() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;
        let ps4 = seed_product(&pool, "ps4", "499").await;
        let switch = seed_product(&pool, "switch", "119").await;

        let service = CartService::new(&pool);
        service.add(user, ps4.id).await.expect("add");
        service.add(user, switch.id).await.expect("add");
        service.add(user, switch.id).await.expect("add");

        let summary = service.summary(user).await.expect("summary");
        assert_eq!(summary.lines.len(), 2);
        assert_eq!(summary.lines[0].line_total, Decimal::from(499));
        assert_eq!(summary.lines[1].line_total, Decimal::from(238));
        assert_eq!(summary.total, Decimal::from(737));
    }

    #[tokio::test]
    async fn test_stale_product_reference_is_an_error() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;
        let product = seed_product(&pool, "ps5", "1099").await;

        let service = CartService::new(&pool);
        service.add(user, product.id).await.expect("add");

        sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(product.id.as_i64())
            .execute(&pool)
            .await
            .expect("delete product");

        let result = service.summary(user).await;
        assert!(matches!(
            result,
            Err(RepositoryError::StaleReference(id)) if id == product.id
        ));
    }

    #[tokio::test]
    async fn test_carts_are_per_user() {
        let pool = test_pool().await;
        let user_a = seed_user(&pool).await;
        let email = "other@example.com".parse().expect("valid email");
        let user_b = UserRepository::new(&pool)
            .create(&email, "hash", "Other")
            .await
            .expect("create user")
            .id;
        let product = seed_product(&pool, "ps4", "499").await;

        let service = CartService::new(&pool);
        service.add(user_a, product.id).await.expect("add");

        let summary_b = service.summary(user_b).await.expect("summary");
        assert!(summary_b.is_empty());
    }
}
