//! # Transaction Engine
//!
//! The write side of the ledger: the only code allowed to decrement
//! `products.quantity` or apply engine balance deltas.
//!
//! ## Atomicity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │             create_transaction, one SQLite transaction                  │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    load customer ──────────────────────── CustomerNotFound → ROLLBACK   │
//! │    load products, price_order (pure) ──── any failure      → ROLLBACK   │
//! │    per product:                                                         │
//! │      UPDATE products SET quantity = quantity - ?                        │
//! │      WHERE id = ? AND quantity >= ?                                     │
//! │      0 rows ───────────────────────────── InsufficientStock → ROLLBACK  │
//! │    INSERT transaction + lines                                           │
//! │    purchase: balance += total                                           │
//! │    payment:  balance = MAX(0, balance - total)                          │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The conditional decrement closes the check-then-act window: another
//! writer may commit between the pure pricing pass and the update, but the
//! `quantity >= ?` guard means the losing writer observes zero affected
//! rows and rolls back, and stock can never go negative.
//!
//! ## Contention
//! SQLite serializes writers. A concurrent write surfaces as
//! [`DbError::Busy`], the only retryable failure; the engine re-runs the
//! whole sequence a bounded number of times before giving up.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use sqlx::{Sqlite, SqlitePool, Transaction as SqlxTransaction};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::DbError;
use medipos_core::{
    order, Customer, CustomerStatement, OrderLine, PricedOrder, Transaction, TransactionDetail,
    TransactionLine, TransactionType,
};
use medipos_core::{CoreError, CustomerSnapshot};

/// Attempts per create before a busy database is surfaced to the caller.
const MAX_BUSY_ATTEMPTS: u32 = 3;

/// Pause between busy retries.
const BUSY_BACKOFF: Duration = Duration::from_millis(50);

// =============================================================================
// Request & Errors
// =============================================================================

/// A request to record one ledger entry.
///
/// Carries no prices or totals: amounts are computed server-side from the
/// catalog at creation time.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub customer_id: String,
    pub tx_type: TransactionType,
    /// Line items; must be non-empty for both purchases and payments.
    pub lines: Vec<OrderLine>,
    pub notes: Option<String>,
}

/// Engine failures: a domain rejection or a storage fault.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<sqlx::Error> for EngineError {
    fn from(err: sqlx::Error) -> Self {
        EngineError::Db(DbError::from(err))
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Engine
// =============================================================================

/// The transaction engine.
///
/// Cheap to clone; construct per call via [`crate::pool::Database::engine`].
#[derive(Debug, Clone)]
pub struct TransactionEngine {
    pool: SqlitePool,
}

impl TransactionEngine {
    /// Creates a new TransactionEngine.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionEngine { pool }
    }

    /// Records a purchase or payment as a single atomic unit of work.
    ///
    /// Validates everything, decrements stock, inserts the ledger entry,
    /// and applies the balance delta — all inside one database transaction.
    /// Either all of it commits or none of it does.
    ///
    /// ## Arguments
    /// * `request` - the order; caller-supplied prices don't exist by
    ///   construction (see [`NewTransaction`])
    /// * `processed_by` - authenticated user id stamped on the entry
    ///
    /// ## Errors
    /// * [`CoreError::EmptyOrder`] / validation failures - rejected before I/O
    /// * [`CoreError::CustomerNotFound`] / [`CoreError::ProductNotFound`]
    /// * [`CoreError::InsufficientStock`] - any line short on stock
    /// * [`DbError::Busy`] - write contention persisted through all retries
    pub async fn create_transaction(
        &self,
        request: &NewTransaction,
        processed_by: &str,
    ) -> EngineResult<TransactionDetail> {
        // Cheap rejections before touching the database.
        if request.lines.is_empty() {
            return Err(CoreError::EmptyOrder.into());
        }

        let mut attempt = 1;
        loop {
            match self.try_create(request, processed_by).await {
                Err(EngineError::Db(e)) if e.is_busy() && attempt < MAX_BUSY_ATTEMPTS => {
                    warn!(attempt, "Transaction hit write contention, retrying");
                    tokio::time::sleep(BUSY_BACKOFF).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    /// One attempt: the full validate-then-apply sequence in one DB
    /// transaction. Dropping `tx` on any error path rolls everything back.
    async fn try_create(
        &self,
        request: &NewTransaction,
        processed_by: &str,
    ) -> EngineResult<TransactionDetail> {
        let mut tx = self.pool.begin().await?;

        let customer = load_customer(&mut tx, &request.customer_id)
            .await?
            .ok_or_else(|| CoreError::CustomerNotFound(request.customer_id.clone()))?;

        // Load each distinct product once; the pure pricing pass handles
        // duplicate lines against this snapshot.
        let mut products = HashMap::new();
        for line in &request.lines {
            if products.contains_key(&line.product_id) {
                continue;
            }
            if let Some(product) = load_product(&mut tx, &line.product_id).await? {
                products.insert(product.id.clone(), product);
            }
        }

        let priced = order::price_order(&products, &request.lines)?;

        apply_decrements(&mut tx, &products, &priced).await?;

        let transaction = insert_entry(&mut tx, request, &priced, processed_by).await?;
        let lines = insert_lines(&mut tx, &transaction.id, &priced).await?;

        apply_balance_delta(&mut tx, &customer.id, request.tx_type, priced.total_cents).await?;

        tx.commit().await?;

        info!(
            id = %transaction.id,
            customer_id = %customer.id,
            amount_cents = priced.total_cents,
            tx_type = ?request.tx_type,
            "Transaction recorded"
        );

        Ok(TransactionDetail {
            transaction,
            products: lines,
        })
    }

    /// Builds a customer's statement: snapshot plus their ledger,
    /// newest first. Read-only.
    pub async fn transactions_for_customer(
        &self,
        customer_id: &str,
    ) -> EngineResult<CustomerStatement> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, phone, email, address, medical_history,
                   balance_cents, created_by, created_at
            FROM customers
            WHERE id = ?1
            "#,
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?
        .ok_or_else(|| CoreError::CustomerNotFound(customer_id.to_string()))?;

        let transactions = crate::repository::transaction::TransactionRepository::new(
            self.pool.clone(),
        )
        .list_by_customer(customer_id)
        .await?;

        Ok(CustomerStatement {
            customer: CustomerSnapshot::from(&customer),
            transactions,
        })
    }
}

// =============================================================================
// Transaction-scoped steps
// =============================================================================

async fn load_customer(
    tx: &mut SqlxTransaction<'_, Sqlite>,
    id: &str,
) -> EngineResult<Option<Customer>> {
    let customer = sqlx::query_as::<_, Customer>(
        r#"
        SELECT id, name, phone, email, address, medical_history,
               balance_cents, created_by, created_at
        FROM customers
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(customer)
}

async fn load_product(
    tx: &mut SqlxTransaction<'_, Sqlite>,
    id: &str,
) -> EngineResult<Option<medipos_core::Product>> {
    let product = sqlx::query_as::<_, medipos_core::Product>(
        r#"
        SELECT id, name, description, category, manufacturer,
               price_cents, quantity, added_by, created_at, updated_at
        FROM products
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(product)
}

/// Applies the merged per-product decrements, one guarded update each.
///
/// `quantity >= ?` re-checks availability at write time; zero affected
/// rows means another writer got there first since the pricing pass.
async fn apply_decrements(
    tx: &mut SqlxTransaction<'_, Sqlite>,
    products: &HashMap<String, medipos_core::Product>,
    priced: &PricedOrder,
) -> EngineResult<()> {
    for (product_id, units) in &priced.decrements {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET quantity = quantity - ?2
            WHERE id = ?1 AND quantity >= ?2
            "#,
        )
        .bind(product_id)
        .bind(units)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            // Lost the race; report against the freshly observable stock.
            let (name, available) = current_stock(tx, products, product_id).await?;
            debug!(product_id = %product_id, available, "Conditional decrement lost the race");
            return Err(CoreError::InsufficientStock {
                name,
                available,
                requested: *units,
            }
            .into());
        }
    }

    Ok(())
}

async fn current_stock(
    tx: &mut SqlxTransaction<'_, Sqlite>,
    products: &HashMap<String, medipos_core::Product>,
    product_id: &str,
) -> EngineResult<(String, i64)> {
    let available: Option<i64> = sqlx::query_scalar("SELECT quantity FROM products WHERE id = ?1")
        .bind(product_id)
        .fetch_optional(&mut **tx)
        .await?;

    let name = products
        .get(product_id)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| product_id.to_string());

    Ok((name, available.unwrap_or(0)))
}

async fn insert_entry(
    tx: &mut SqlxTransaction<'_, Sqlite>,
    request: &NewTransaction,
    priced: &PricedOrder,
    processed_by: &str,
) -> EngineResult<Transaction> {
    let transaction = Transaction {
        id: Uuid::new_v4().to_string(),
        customer_id: request.customer_id.clone(),
        amount_cents: priced.total_cents,
        tx_type: request.tx_type,
        notes: request.notes.clone(),
        processed_by: processed_by.to_string(),
        created_at: chrono::Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO transactions (
            id, customer_id, amount_cents, tx_type, notes, processed_by, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&transaction.id)
    .bind(&transaction.customer_id)
    .bind(transaction.amount_cents)
    .bind(transaction.tx_type)
    .bind(&transaction.notes)
    .bind(&transaction.processed_by)
    .bind(transaction.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(transaction)
}

async fn insert_lines(
    tx: &mut SqlxTransaction<'_, Sqlite>,
    transaction_id: &str,
    priced: &PricedOrder,
) -> EngineResult<Vec<TransactionLine>> {
    let mut lines = Vec::with_capacity(priced.lines.len());

    for priced_line in &priced.lines {
        let line = TransactionLine {
            id: Uuid::new_v4().to_string(),
            transaction_id: transaction_id.to_string(),
            product_id: priced_line.product_id.clone(),
            name_snapshot: priced_line.name.clone(),
            quantity: priced_line.quantity,
            price_at_time_cents: priced_line.price_at_time_cents,
        };

        sqlx::query(
            r#"
            INSERT INTO transaction_lines (
                id, transaction_id, product_id, name_snapshot, quantity, price_at_time_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&line.id)
        .bind(&line.transaction_id)
        .bind(&line.product_id)
        .bind(&line.name_snapshot)
        .bind(line.quantity)
        .bind(line.price_at_time_cents)
        .execute(&mut **tx)
        .await?;

        lines.push(line);
    }

    Ok(lines)
}

/// Applies the balance delta in SQL.
///
/// A purchase adds the full amount; a payment subtracts floored at zero —
/// an overpayment clamps the balance rather than producing a credit.
async fn apply_balance_delta(
    tx: &mut SqlxTransaction<'_, Sqlite>,
    customer_id: &str,
    tx_type: TransactionType,
    amount_cents: i64,
) -> EngineResult<()> {
    let result = match tx_type {
        TransactionType::Purchase => {
            sqlx::query(
                r#"
                UPDATE customers
                SET balance_cents = balance_cents + ?2
                WHERE id = ?1
                "#,
            )
            .bind(customer_id)
            .bind(amount_cents)
            .execute(&mut **tx)
            .await?
        }
        TransactionType::Payment => {
            sqlx::query(
                r#"
                UPDATE customers
                SET balance_cents = MAX(0, balance_cents - ?2)
                WHERE id = ?1
                "#,
            )
            .bind(customer_id)
            .bind(amount_cents)
            .execute(&mut **tx)
            .await?
        }
    };

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Customer", customer_id).into());
    }

    Ok(())
}
