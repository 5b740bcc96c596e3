//! # Product Repository
//!
//! Database operations for the pharmacy catalog.
//!
//! ## Stock Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                products.quantity write paths                            │
//! │                                                                         │
//! │  ✅ TransactionEngine        conditional decrement inside its own       │
//! │                              DB transaction (sales)                     │
//! │  ✅ receive_stock()          positive delta (administrative receipt)    │
//! │  ❌ update()                 deliberately does NOT touch quantity       │
//! │                                                                         │
//! │  Catalog edits are last-writer-wins; stock movement is always a         │
//! │  delta, never an absolute overwrite.                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use medipos_core::{Category, Product};

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products, optionally filtered by category, sorted by name.
    pub async fn list(&self, category: Option<Category>) -> DbResult<Vec<Product>> {
        let products = match category {
            Some(category) => {
                sqlx::query_as::<_, Product>(
                    r#"
                    SELECT id, name, description, category, manufacturer,
                           price_cents, quantity, added_by, created_at, updated_at
                    FROM products
                    WHERE category = ?1
                    ORDER BY name
                    "#,
                )
                .bind(category)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Product>(
                    r#"
                    SELECT id, name, description, category, manufacturer,
                           price_cents, quantity, added_by, created_at, updated_at
                    FROM products
                    ORDER BY name
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, category, manufacturer,
                   price_cents, quantity, added_by, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a new product.
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description, category, manufacturer,
                price_cents, quantity, added_by, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.category)
        .bind(&product.manufacturer)
        .bind(product.price_cents)
        .bind(product.quantity)
        .bind(&product.added_by)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product.clone())
    }

    /// Updates catalog fields of an existing product.
    ///
    /// Last-writer-wins; `quantity` is intentionally left alone — stock
    /// moves only through deltas (see module docs).
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                description = ?3,
                category = ?4,
                manufacturer = ?5,
                price_cents = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.category)
        .bind(&product.manufacturer)
        .bind(product.price_cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Adds received units to a product's stock (administrative receipt).
    ///
    /// ## Arguments
    /// * `id` - Product ID
    /// * `units` - Units received, must be positive
    pub async fn receive_stock(&self, id: &str, units: i64) -> DbResult<()> {
        debug!(id = %id, units = %units, "Receiving stock");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET quantity = quantity + ?2,
                updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(units)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Deletes a product.
    ///
    /// Ledger lines keep their product_id and name snapshot, so history
    /// stays readable; the product's stock batches cascade away.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts total products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}
