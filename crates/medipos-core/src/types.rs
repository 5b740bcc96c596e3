//! # Domain Types
//!
//! Core domain types used throughout MediPOS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    Customer     │   │  Transaction    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  category       │   │  phone (unique) │   │  tx_type        │       │
//! │  │  price_cents    │   │  balance_cents  │   │  amount_cents   │       │
//! │  │  quantity       │   │  created_by     │   │  lines[]        │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   StockBatch    │   │    Category     │   │ TransactionType │       │
//! │  │  batch_no       │   │  Tablet, Syrup  │   │  Purchase       │       │
//! │  │  expiry_date    │   │  Ointment, ...  │   │  Payment        │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity has an immutable UUID v4 `id` used for database relations.
//! Transaction lines additionally freeze a `name_snapshot` so ledger history
//! survives catalog edits and deletions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Category
// =============================================================================

/// Pharmacy product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Tablet,
    Capsule,
    Syrup,
    Drop,
    Ointment,
    Equipment,
    PersonalCare,
    Other,
}

impl Default for Category {
    fn default() -> Self {
        Category::Other
    }
}

// =============================================================================
// Transaction Type
// =============================================================================

/// Direction of a ledger entry against a customer's running balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Increases the customer's owed balance by the full order amount.
    Purchase,
    /// Decreases the owed balance, floored at zero (excess is discarded).
    Payment,
}

// =============================================================================
// Role
// =============================================================================

/// User role; gates administrative mutation paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    User,
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in the pharmacy catalog.
///
/// `quantity` is the authoritative available stock count. It must never go
/// negative; only the transaction engine (decrement) and administrative
/// stock receipts (increment) may mutate it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to staff and on receipts.
    pub name: String,

    /// Optional description for product details.
    pub description: Option<String>,

    /// Pharmacy category (tablet, syrup, equipment, ...).
    pub category: Category,

    /// Manufacturer name.
    pub manufacturer: Option<String>,

    /// Unit price in cents.
    pub price_cents: i64,

    /// Available stock count. Never negative.
    pub quantity: i64,

    /// User who added this product.
    pub added_by: String,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether `quantity` units can be taken from stock.
    #[inline]
    pub fn can_fulfill(&self, quantity: i64) -> bool {
        self.quantity >= quantity
    }
}

// =============================================================================
// Stock Batch
// =============================================================================

/// A received stock batch for a product.
///
/// Batch records are administrative bookkeeping (batch number, expiry,
/// distributor). The transaction engine decrements `Product.quantity`
/// directly; batches are not consumed line-by-line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct StockBatch {
    pub id: String,
    /// Distributor's batch number.
    pub batch_no: String,
    /// Expiry date as printed on the batch (free-form, e.g. "2027-03").
    pub expiry_date: String,
    pub distributor: String,
    /// Total purchase price of the batch, in cents.
    pub price_cents: i64,
    /// Units received in this batch.
    pub quantity: i64,
    /// Optional per-unit purchase price note.
    pub price_per_unit: Option<String>,
    pub product_id: String,
    pub added_by: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Customer
// =============================================================================

/// A pharmacy customer with a running credit balance.
///
/// `balance_cents` is the net amount owed (positive = owes money).
/// Invariant: replaying the customer's ledger in order reproduces the
/// balance — each purchase adds its amount, each payment subtracts clamped
/// at zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    /// Unique phone number; the business identifier.
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub medical_history: Option<String>,
    /// Net amount owed, in cents. See the replay invariant above.
    pub balance_cents: i64,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// Returns the outstanding balance as Money.
    #[inline]
    pub fn balance(&self) -> Money {
        Money::from_cents(self.balance_cents)
    }
}

/// Read-only snapshot of a customer returned alongside their statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSnapshot {
    pub name: String,
    pub phone: String,
    pub balance_cents: i64,
}

impl From<&Customer> for CustomerSnapshot {
    fn from(customer: &Customer) -> Self {
        CustomerSnapshot {
            name: customer.name.clone(),
            phone: customer.phone.clone(),
            balance_cents: customer.balance_cents,
        }
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// An immutable ledger entry: one purchase or payment by a customer.
///
/// Created once, fully formed, never updated or deleted. `amount_cents` is
/// computed server-side from catalog prices at creation time — caller
/// supplied amounts are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub customer_id: String,
    /// Total amount in cents, summed from priced lines.
    pub amount_cents: i64,
    pub tx_type: TransactionType,
    pub notes: Option<String>,
    /// The authenticated user who processed this transaction.
    pub processed_by: String,
    pub created_at: DateTime<Utc>,
}

/// A line item within a transaction.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct TransactionLine {
    pub id: String,
    pub transaction_id: String,
    /// Referenced product. Deliberately not a foreign key: the ledger must
    /// survive product deletion.
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// Quantity sold.
    pub quantity: i64,
    /// Unit price in cents at the moment of creation (frozen; unaffected by
    /// later catalog price changes).
    pub price_at_time_cents: i64,
}

impl TransactionLine {
    /// Returns the frozen unit price as Money.
    #[inline]
    pub fn price_at_time(&self) -> Money {
        Money::from_cents(self.price_at_time_cents)
    }

    /// Returns the line total (price_at_time × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price_at_time().multiply_quantity(self.quantity)
    }
}

/// A transaction together with its line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetail {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub products: Vec<TransactionLine>,
}

/// A customer's statement: snapshot plus their ledger, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerStatement {
    pub customer: CustomerSnapshot,
    pub transactions: Vec<TransactionDetail>,
}

// =============================================================================
// User
// =============================================================================

/// A staff user account.
///
/// User management workflows (registration, password reset) are out of
/// scope; users exist to own records and stamp `processed_by`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Argon2 password hash. Never serialized to clients.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serde_names() {
        assert_eq!(
            serde_json::to_string(&Category::PersonalCare).unwrap(),
            "\"personal_care\""
        );
        assert_eq!(
            serde_json::from_str::<Category>("\"tablet\"").unwrap(),
            Category::Tablet
        );
    }

    #[test]
    fn test_transaction_type_serde_names() {
        assert_eq!(
            serde_json::to_string(&TransactionType::Purchase).unwrap(),
            "\"purchase\""
        );
        assert_eq!(
            serde_json::from_str::<TransactionType>("\"payment\"").unwrap(),
            TransactionType::Payment
        );
    }

    #[test]
    fn test_product_can_fulfill() {
        let product = sample_product(10);
        assert!(product.can_fulfill(10));
        assert!(product.can_fulfill(1));
        assert!(!product.can_fulfill(11));
    }

    #[test]
    fn test_line_total() {
        let line = TransactionLine {
            id: "l1".to_string(),
            transaction_id: "t1".to_string(),
            product_id: "p1".to_string(),
            name_snapshot: "Paracetamol 500mg".to_string(),
            quantity: 3,
            price_at_time_cents: 500,
        };
        assert_eq!(line.line_total().cents(), 1500);
    }

    fn sample_product(quantity: i64) -> Product {
        Product {
            id: "p1".to_string(),
            name: "Paracetamol 500mg".to_string(),
            description: None,
            category: Category::Tablet,
            manufacturer: None,
            price_cents: 500,
            quantity,
            added_by: "u1".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}
