//! # Stock Batch Repository
//!
//! Bookkeeping for received stock batches (batch number, expiry,
//! distributor, purchase price). Batches record *where stock came from*;
//! the sellable count lives on `products.quantity` and moves through
//! [`crate::repository::product::ProductRepository::receive_stock`] and
//! the transaction engine.

use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use medipos_core::StockBatch;

/// Repository for stock batch database operations.
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

impl StockRepository {
    /// Creates a new StockRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    /// Lists all stock batches, newest receipt first.
    pub async fn list(&self) -> DbResult<Vec<StockBatch>> {
        let batches = sqlx::query_as::<_, StockBatch>(
            r#"
            SELECT id, batch_no, expiry_date, distributor, price_cents,
                   quantity, price_per_unit, product_id, added_by, created_at
            FROM stocks
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(batches)
    }

    /// Lists the stock batches for one product, newest receipt first.
    pub async fn list_for_product(&self, product_id: &str) -> DbResult<Vec<StockBatch>> {
        let batches = sqlx::query_as::<_, StockBatch>(
            r#"
            SELECT id, batch_no, expiry_date, distributor, price_cents,
                   quantity, price_per_unit, product_id, added_by, created_at
            FROM stocks
            WHERE product_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(batches)
    }

    /// Gets a stock batch by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<StockBatch>> {
        let batch = sqlx::query_as::<_, StockBatch>(
            r#"
            SELECT id, batch_no, expiry_date, distributor, price_cents,
                   quantity, price_per_unit, product_id, added_by, created_at
            FROM stocks
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(batch)
    }

    /// Inserts a new stock batch.
    ///
    /// ## Returns
    /// * `Err(DbError::ForeignKeyViolation)` - the referenced product is gone
    pub async fn insert(&self, batch: &StockBatch) -> DbResult<StockBatch> {
        debug!(id = %batch.id, product_id = %batch.product_id, "Inserting stock batch");

        sqlx::query(
            r#"
            INSERT INTO stocks (
                id, batch_no, expiry_date, distributor, price_cents,
                quantity, price_per_unit, product_id, added_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&batch.id)
        .bind(&batch.batch_no)
        .bind(&batch.expiry_date)
        .bind(&batch.distributor)
        .bind(batch.price_cents)
        .bind(batch.quantity)
        .bind(&batch.price_per_unit)
        .bind(&batch.product_id)
        .bind(&batch.added_by)
        .bind(batch.created_at)
        .execute(&self.pool)
        .await?;

        Ok(batch.clone())
    }

    /// Updates a stock batch's bookkeeping fields.
    pub async fn update(&self, batch: &StockBatch) -> DbResult<()> {
        debug!(id = %batch.id, "Updating stock batch");

        let result = sqlx::query(
            r#"
            UPDATE stocks SET
                batch_no = ?2,
                expiry_date = ?3,
                distributor = ?4,
                price_cents = ?5,
                quantity = ?6,
                price_per_unit = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&batch.id)
        .bind(&batch.batch_no)
        .bind(&batch.expiry_date)
        .bind(&batch.distributor)
        .bind(batch.price_cents)
        .bind(batch.quantity)
        .bind(&batch.price_per_unit)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Stock", &batch.id));
        }

        Ok(())
    }

    /// Deletes a stock batch.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting stock batch");

        let result = sqlx::query("DELETE FROM stocks WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Stock", id));
        }

        Ok(())
    }

    /// Counts total stock batches (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stocks")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new stock batch ID.
pub fn generate_stock_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use medipos_core::{Category, Product, Role, User};

    async fn db_with_product() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let user = User {
            id: "user-1".to_string(),
            name: "Test Clerk".to_string(),
            email: "clerk@example.com".to_string(),
            password_hash: "not-a-real-hash".to_string(),
            role: Role::User,
            created_at: Utc::now(),
        };
        db.users().insert(&user).await.unwrap();

        let now = Utc::now();
        let product = Product {
            id: "p1".to_string(),
            name: "Paracetamol 500mg".to_string(),
            description: None,
            category: Category::Tablet,
            manufacturer: None,
            price_cents: 500,
            quantity: 10,
            added_by: "user-1".to_string(),
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await.unwrap();

        db
    }

    fn batch(id: &str, price_per_unit: Option<&str>) -> StockBatch {
        StockBatch {
            id: id.to_string(),
            batch_no: "BN-2026-001".to_string(),
            expiry_date: "2027-03".to_string(),
            distributor: "Acme Distribution".to_string(),
            price_cents: 40_000,
            quantity: 100,
            price_per_unit: price_per_unit.map(str::to_string),
            product_id: "p1".to_string(),
            added_by: "user-1".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_and_update_preserve_text_fields() {
        let db = db_with_product().await;
        let stocks = db.stocks();

        stocks.insert(&batch("s1", Some("400"))).await.unwrap();

        let stored = stocks.get_by_id("s1").await.unwrap().unwrap();
        assert_eq!(stored.expiry_date, "2027-03");
        assert_eq!(stored.price_per_unit.as_deref(), Some("400"));

        let mut updated = stored.clone();
        updated.expiry_date = "2028-06".to_string();
        updated.price_per_unit = None;
        stocks.update(&updated).await.unwrap();

        let stored = stocks.get_by_id("s1").await.unwrap().unwrap();
        assert_eq!(stored.expiry_date, "2028-06");
        assert_eq!(stored.price_per_unit, None);
    }

    #[tokio::test]
    async fn batches_cascade_with_their_product() {
        let db = db_with_product().await;
        db.stocks().insert(&batch("s1", None)).await.unwrap();

        db.products().delete("p1").await.unwrap();

        assert!(db.stocks().get_by_id("s1").await.unwrap().is_none());
        assert_eq!(db.stocks().count().await.unwrap(), 0);
    }
}
