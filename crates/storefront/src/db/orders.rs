//! Order repository for database operations.
//!
//! Orders are append-only line items written once per successful checkout;
//! all rows of one checkout share a `reference` and a `placed_at` timestamp.

use sqlx::SqlitePool;

use pixel_den_core::{ProductId, UserId};

use super::RepositoryError;
use crate::models::OrderGroup;

/// One raw purchased line item.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct OrderLineRow {
    /// Product referenced by the line item.
    pub product_id: ProductId,
    /// Units purchased.
    pub quantity: i64,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Convert the user's current cart into order rows and clear the cart.
    ///
    /// The cart read, the order inserts, and the cart delete all run in one
    /// transaction: a purchase is recorded completely or not at all. Every
    /// created row shares `reference` and `placed_at`.
    ///
    /// Returns the number of line items recorded (zero if the cart was empty).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; nothing is
    /// committed in that case.
    pub async fn record_purchase(
        &self,
        user_id: UserId,
        reference: &str,
        placed_at: &str,
    ) -> Result<usize, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let lines = sqlx::query_as::<_, OrderLineRow>(
            r"
            SELECT product_id, quantity
            FROM cart_items
            WHERE user_id = ?
            ORDER BY id
            ",
        )
        .bind(user_id.as_i64())
        .fetch_all(&mut *tx)
        .await?;

        for line in &lines {
            sqlx::query(
                r"
                INSERT INTO orders (user_id, product_id, quantity, reference, placed_at)
                VALUES (?, ?, ?, ?, ?)
                ",
            )
            .bind(user_id.as_i64())
            .bind(line.product_id.as_i64())
            .bind(line.quantity)
            .bind(reference)
            .bind(placed_at)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM cart_items WHERE user_id = ?")
            .bind(user_id.as_i64())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(lines.len())
    }

    /// List one group per historical checkout for a user, in first-seen order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_groups(&self, user_id: UserId) -> Result<Vec<OrderGroup>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct GroupRow {
            reference: String,
            placed_at: String,
        }

        let rows = sqlx::query_as::<_, GroupRow>(
            r"
            SELECT reference, MIN(placed_at) AS placed_at
            FROM orders
            WHERE user_id = ?
            GROUP BY reference
            ORDER BY MIN(id)
            ",
        )
        .bind(user_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| OrderGroup {
                reference: r.reference,
                placed_at: r.placed_at,
            })
            .collect())
    }

    /// Line items of one checkout transaction.
    ///
    /// Returns an empty vec when the (user, reference) pair matches nothing;
    /// the caller decides whether that is a not-found condition.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items_for_group(
        &self,
        user_id: UserId,
        reference: &str,
    ) -> Result<Vec<OrderLineRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderLineRow>(
            r"
            SELECT product_id, quantity
            FROM orders
            WHERE user_id = ? AND reference = ?
            ORDER BY id
            ",
        )
        .bind(user_id.as_i64())
        .bind(reference)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// The `placed_at` timestamp of one checkout transaction, if it exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn group_placed_at(
        &self,
        user_id: UserId,
        reference: &str,
    ) -> Result<Option<String>, RepositoryError> {
        let row: Option<(String,)> = sqlx::query_as(
            r"
            SELECT placed_at
            FROM orders
            WHERE user_id = ? AND reference = ?
            ORDER BY id
            LIMIT 1
            ",
        )
        .bind(user_id.as_i64())
        .bind(reference)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(placed_at,)| placed_at))
    }
}
