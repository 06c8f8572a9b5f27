//! Order history service.
//!
//! Presents the append-only order rows as per-checkout groups: a listing of
//! past purchases and a detail view of one purchase with line totals.

use sqlx::SqlitePool;

use pixel_den_core::UserId;

use crate::db::RepositoryError;
use crate::db::orders::OrderRepository;
use crate::db::products::ProductRepository;
use crate::models::{OrderDetail, OrderGroup, PurchasedLine};

/// Service for viewing a user's purchase history.
pub struct OrderService<'a> {
    orders: OrderRepository<'a>,
    products: ProductRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            orders: OrderRepository::new(pool),
            products: ProductRepository::new(pool),
        }
    }

    /// The user's past purchases, one group per checkout, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<OrderGroup>, RepositoryError> {
        self.orders.list_groups(user_id).await
    }

    /// One past purchase with its line items and totals.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when the reference does not belong
    /// to this user, and `RepositoryError::StaleReference` when an order row
    /// points at a product that no longer exists.
    pub async fn detail(
        &self,
        user_id: UserId,
        reference: &str,
    ) -> Result<OrderDetail, RepositoryError> {
        let rows = self.orders.items_for_group(user_id, reference).await?;
        if rows.is_empty() {
            return Err(RepositoryError::NotFound);
        }

        let placed_at = self
            .orders
            .group_placed_at(user_id, reference)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let mut lines = Vec::with_capacity(rows.len());
        let mut total = rust_decimal::Decimal::ZERO;

        for row in rows {
            let product = self
                .products
                .get(row.product_id)
                .await?
                .ok_or(RepositoryError::StaleReference(row.product_id))?;

            let line_total = product.price.times(row.quantity);
            total += line_total;
            lines.push(PurchasedLine {
                product,
                quantity: row.quantity,
                line_total,
            });
        }

        Ok(OrderDetail {
            group: OrderGroup {
                reference: reference.to_owned(),
                placed_at,
            },
            lines,
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

    use pixel_den_core::{Price, ProductId};

    use super::*;
    use crate::db::MIGRATOR;
    use crate::db::users::UserRepository;
    use crate::models::Product;

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

    async fn seed_user(pool: &SqlitePool, email: &str) -> UserId {
        let email = email.parse().expect("valid email");
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

    async fn record(
        pool: &SqlitePool,
        user: UserId,
        reference: &str,
        placed_at: &str,
        items: &[(ProductId, i64)],
    ) {
        for (product_id, quantity) in items {
            sqlx::query(
                r"
                INSERT INTO orders (user_id, product_id, quantity, reference, placed_at)
                VALUES (?, ?, ?, ?, ?)
                ",
            )
            .bind(user.as_i64())
            .bind(product_id.as_i64())
            .bind(quantity)
            .bind(reference)
            .bind(placed_at)
            .execute(pool)
            .await
            .expect("insert order row");
        }
    }

    #[tokio::test]
    async fn test_list_groups_by_reference_in_first_seen_order() {
        let pool = test_pool().await;
        let user = seed_user(&pool, "buyer@example.com").await;
        let ps4 = seed_product(&pool, "ps4", "499").await;
        let switch = seed_product(&pool, "switch", "119").await;

        record(
            &pool,
            user,
            "ref-1",
            "2026-08-01 10:00:00",
            &[(ps4.id, 1), (switch.id, 2)],
        )
        .await;
        record(&pool, user, "ref-2", "2026-08-02 09:30:00", &[(ps4.id, 1)]).await;

        let groups = OrderService::new(&pool).list(user).await.expect("list");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].reference, "ref-1");
        assert_eq!(groups[0].placed_at, "2026-08-01 10:00:00");
        assert_eq!(groups[1].reference, "ref-2");
    }

    #[tokio::test]
    async fn test_detail_totals() {
        let pool = test_pool().await;
        let user = seed_user(&pool, "buyer@example.com").await;
        let ps4 = seed_product(&pool, "ps4", "499").await;
        let switch = seed_product(&pool, "switch", "119").await;

        record(
            &pool,
            user,
            "ref-1",
            "2026-08-01 10:00:00",
            &[(ps4.id, 1), (switch.id, 2)],
        )
        .await;

        let detail = OrderService::new(&pool)
            .detail(user, "ref-1")
            .await
            .expect("detail");

        assert_eq!(detail.group.placed_at, "2026-08-01 10:00:00");
        assert_eq!(detail.lines.len(), 2);
        assert_eq!(detail.lines[0].line_total, Decimal::from(499));
        assert_eq!(detail.lines[1].line_total, Decimal::from(238));
        assert_eq!(detail.total, Decimal::from(737));
    }

    #[tokio::test]
    async fn test_detail_is_scoped_to_the_user() {
        let pool = test_pool().await;
        let buyer = seed_user(&pool, "buyer@example.com").await;
        let other = seed_user(&pool, "other@example.com").await;
        let ps4 = seed_product(&pool, "ps4", "499").await;

        record(&pool, buyer, "ref-1", "2026-08-01 10:00:00", &[(ps4.id, 1)]).await;

        let result = OrderService::new(&pool).detail(other, "ref-1").await;
        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_detail_unknown_reference() {
        let pool = test_pool().await;
        let user = seed_user(&pool, "buyer@example.com").await;

        let result = OrderService::new(&pool).detail(user, "nope").await;
        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_detail_stale_product_is_an_error() {
        let pool = test_pool().await;
        let user = seed_user(&pool, "buyer@example.com").await;
        let ps4 = seed_product(&pool, "ps4", "499").await;

        record(&pool, user, "ref-1", "2026-08-01 10:00:00", &[(ps4.id, 1)]).await;

        sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(ps4.id.as_i64())
            .execute(&pool)
            .await
            .expect("delete product");

        let result = OrderService::new(&pool).detail(user, "ref-1").await;
        assert!(matches!(
            result,
            Err(RepositoryError::StaleReference(id)) if id == ps4.id
        ));
    }
}
