//! Cart repository for database operations.
//!
//! Quantity is an explicit column on the (user, product) row. "Add one unit"
//! upserts with `quantity + 1`; "remove one unit" decrements and deletes the
//! row when it would reach zero, so quantities never go negative.

use sqlx::SqlitePool;

use pixel_den_core::{ProductId, UserId};

use super::RepositoryError;

/// One raw cart row: a product and its unit count.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct CartEntry {
    /// Product referenced by the row.
    pub product_id: ProductId,
    /// Units of the product (always >= 1).
    pub quantity: i64,
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// All cart rows for a user, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, user_id: UserId) -> Result<Vec<CartEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartEntry>(
            r"
            SELECT product_id, quantity
            FROM cart_items
            WHERE user_id = ?
            ORDER BY id
            ",
        )
        .bind(user_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Add one unit of a product to a user's cart.
    ///
    /// Each call increases the quantity by one; this is how quantity > 1 is
    /// represented.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add_one(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO cart_items (user_id, product_id, quantity)
            VALUES (?, ?, 1)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET quantity = quantity + 1
            ",
        )
        .bind(user_id.as_i64())
        .bind(product_id.as_i64())
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Remove one unit of a product from a user's cart.
    ///
    /// No-op when the product is not in the cart; the quantity is floored at
    /// zero (the row is deleted rather than decremented below one).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove_one(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            DELETE FROM cart_items
            WHERE user_id = ? AND product_id = ? AND quantity <= 1
            ",
        )
        .bind(user_id.as_i64())
        .bind(product_id.as_i64())
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
            UPDATE cart_items
            SET quantity = quantity - 1
            WHERE user_id = ? AND product_id = ?
            ",
        )
        .bind(user_id.as_i64())
        .bind(product_id.as_i64())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Remove all units of a product from a user's cart.
    ///
    /// Idempotent: removing an absent product is a no-op, not an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove_all(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            DELETE FROM cart_items
            WHERE user_id = ? AND product_id = ?
            ",
        )
        .bind(user_id.as_i64())
        .bind(product_id.as_i64())
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
