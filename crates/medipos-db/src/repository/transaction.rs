//! # Transaction Repository (read side)
//!
//! Queries over the immutable transaction ledger. The write side lives in
//! [`crate::engine`]; nothing here inserts, updates, or deletes ledger rows.

use sqlx::SqlitePool;

use crate::error::DbResult;
use medipos_core::{Transaction, TransactionDetail, TransactionLine};

/// Repository for ledger reads.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Gets a transaction with its line items.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<TransactionDetail>> {
        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, customer_id, amount_cents, tx_type, notes,
                   processed_by, created_at
            FROM transactions
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(transaction) = transaction else {
            return Ok(None);
        };

        let products = self.lines_for(&transaction.id).await?;

        Ok(Some(TransactionDetail {
            transaction,
            products,
        }))
    }

    /// Lists a customer's transactions with line items, newest first.
    ///
    /// Ties on `created_at` break by `id` so the order is stable.
    pub async fn list_by_customer(&self, customer_id: &str) -> DbResult<Vec<TransactionDetail>> {
        let transactions = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, customer_id, amount_cents, tx_type, notes,
                   processed_by, created_at
            FROM transactions
            WHERE customer_id = ?1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        let mut details = Vec::with_capacity(transactions.len());
        for transaction in transactions {
            let products = self.lines_for(&transaction.id).await?;
            details.push(TransactionDetail {
                transaction,
                products,
            });
        }

        Ok(details)
    }

    /// Counts a customer's ledger entries.
    pub async fn count_by_customer(&self, customer_id: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM transactions WHERE customer_id = ?1")
                .bind(customer_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn lines_for(&self, transaction_id: &str) -> DbResult<Vec<TransactionLine>> {
        let lines = sqlx::query_as::<_, TransactionLine>(
            r#"
            SELECT id, transaction_id, product_id, name_snapshot,
                   quantity, price_at_time_cents
            FROM transaction_lines
            WHERE transaction_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }
}
