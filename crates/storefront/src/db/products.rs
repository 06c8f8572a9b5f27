//! Product repository for database operations.
//!
//! The catalog is read-mostly: rows are inserted by `pd-cli seed` and never
//! mutated by the request flow.

use sqlx::SqlitePool;

use pixel_den_core::{Price, ProductId};

use super::RepositoryError;
use crate::models::Product;

/// Raw `products` row as stored.
#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    price: String,
    image_url: String,
    stripe_price_id: String,
}

impl ProductRow {
    fn into_product(self) -> Result<Product, RepositoryError> {
        let price = Price::parse(&self.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price in database: {e}"))
        })?;

        Ok(Product {
            id: ProductId::new(self.id),
            name: self.name,
            price,
            image_url: self.image_url,
            stripe_price_id: self.stripe_price_id,
        })
    }
}

/// Repository for catalog database operations.
pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List the full catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored price is invalid.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, price, image_url, stripe_price_id
            FROM products
            ORDER BY id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored price is invalid.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, price, image_url, stripe_price_id
            FROM products
            WHERE id = ?
            ",
        )
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(ProductRow::into_product).transpose()
    }

    /// Insert a catalog product (seeding only).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name or Stripe price id
    /// already exists. Returns `RepositoryError::Database` for other errors.
    pub async fn create(
        &self,
        name: &str,
        price: Price,
        image_url: &str,
        stripe_price_id: &str,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO products (name, price, image_url, stripe_price_id)
            VALUES (?, ?, ?, ?)
            RETURNING id, name, price, image_url, stripe_price_id
            ",
        )
        .bind(name)
        .bind(price)
        .bind(image_url)
        .bind(stripe_price_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(format!("product '{name}' already exists"));
            }
            RepositoryError::Database(e)
        })?;

        row.into_product()
    }
}
