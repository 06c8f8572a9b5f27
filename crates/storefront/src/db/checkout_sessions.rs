//! Checkout-session repository.
//!
//! Associates an in-flight hosted checkout with the user who started it.
//! The provider's redirect back to the success/cancel callback is a plain
//! browser navigation that may arrive without session state, so the token
//! carried in the callback URL is the only way to recover the user. Each
//! association is scoped to one checkout (keyed by token), consumed on first
//! use, and expired after a bounded TTL.

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use pixel_den_core::UserId;

use super::RepositoryError;

/// How long a recorded checkout association stays valid.
pub const CHECKOUT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);

/// Repository for checkout-session associations.
pub struct CheckoutSessionRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CheckoutSessionRepository<'a> {
    /// Create a new checkout-session repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Record which user started a checkout session.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        token: &str,
        user_id: UserId,
        provider_session_id: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO checkout_sessions (token, user_id, provider_session_id, created_at)
            VALUES (?, ?, ?, ?)
            ",
        )
        .bind(token)
        .bind(user_id.as_i64())
        .bind(provider_session_id)
        .bind(Utc::now().to_rfc3339())
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Consume a checkout association, returning the recorded user.
    ///
    /// The row is deleted whether or not it is still valid, so a token can
    /// only ever be used once. Returns `None` when the token is unknown or
    /// older than [`CHECKOUT_SESSION_TTL`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a statement fails.
    /// Returns `RepositoryError::DataCorruption` if the stored timestamp is
    /// invalid.
    pub async fn take(&self, token: &str) -> Result<Option<UserId>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct SessionRow {
            user_id: i64,
            created_at: String,
        }

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, SessionRow>(
            r"
            SELECT user_id, created_at
            FROM checkout_sessions
            WHERE token = ?
            ",
        )
        .bind(token)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.commit().await?;
            return Ok(None);
        };

        sqlx::query("DELETE FROM checkout_sessions WHERE token = ?")
            .bind(token)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let created_at = DateTime::parse_from_rfc3339(&row.created_at)
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid created_at in database: {e}"))
            })?
            .with_timezone(&Utc);

        let age = Utc::now().signed_duration_since(created_at);
        if age.to_std().is_ok_and(|age| age > CHECKOUT_SESSION_TTL) {
            return Ok(None);
        }

        Ok(Some(UserId::new(row.user_id)))
    }

    /// Delete expired associations (housekeeping, invoked opportunistically).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn prune_expired(&self) -> Result<u64, RepositoryError> {
        let ttl = chrono::TimeDelta::from_std(CHECKOUT_SESSION_TTL)
            .unwrap_or_else(|_| chrono::TimeDelta::hours(1));
        let cutoff = (Utc::now() - ttl).to_rfc3339();

        let result = sqlx::query("DELETE FROM checkout_sessions WHERE created_at < ?")
            .bind(cutoff)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
