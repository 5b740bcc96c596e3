//! # Order Pricing
//!
//! The pure validate-all / price-all pass of the transaction engine.
//!
//! ## Where This Sits
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Two-Phase Order Processing                              │
//! │                                                                         │
//! │  Phase 1 — VALIDATE ALL (this module, pure)                             │
//! │    For each line, in order:                                             │
//! │      ├── product exists?            → ProductNotFound                   │
//! │      ├── enough stock left?         → InsufficientStock                 │
//! │      │   (minus what earlier duplicate lines already staged)            │
//! │      ├── freeze price_at_time := catalog price                          │
//! │      └── accumulate total                                               │
//! │                                                                         │
//! │  Phase 2 — APPLY ALL (medipos-db engine, one DB transaction)            │
//! │    Conditional stock decrements, ledger insert, balance delta.          │
//! │                                                                         │
//! │  No write is committed unless every line passed phase 1.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Caller-supplied prices are ignored by construction: [`OrderLine`] carries
//! only a product id and a quantity, and prices come from the product
//! snapshots the engine loads inside its database transaction.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::Product;
use crate::validation::{validate_order_size, validate_quantity};

// =============================================================================
// Input
// =============================================================================

/// One requested line item: a product reference and a quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    /// Referenced product id.
    pub product_id: String,
    /// Requested quantity, must be >= 1.
    pub quantity: i64,
}

// =============================================================================
// Output
// =============================================================================

/// A line item after pricing: quantities validated, price frozen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: String,
    /// Product name frozen for the ledger snapshot.
    pub name: String,
    pub quantity: i64,
    /// Catalog unit price at pricing time, in cents.
    pub price_at_time_cents: i64,
    /// price_at_time × quantity, in cents.
    pub line_total_cents: i64,
}

/// The fully validated and priced order, ready to be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedOrder {
    /// Priced lines in the caller's original order.
    pub lines: Vec<PricedLine>,
    /// Sum of all line totals, in cents.
    pub total_cents: i64,
    /// Stock decrements merged per product, in first-occurrence order.
    /// Duplicate lines collapse into a single delta so the apply phase
    /// issues one conditional update per product.
    pub decrements: Vec<(String, i64)>,
}

// =============================================================================
// Pricing
// =============================================================================

/// Validates and prices an order against a snapshot of the catalog.
///
/// `products` must contain the products referenced by `lines`, keyed by id;
/// a missing entry yields [`CoreError::ProductNotFound`] naming the id.
///
/// ## Contract
/// - Empty `lines` → [`CoreError::EmptyOrder`]; oversized orders and
///   non-positive quantities are rejected before any stock check.
/// - Lines validate **sequentially**: a duplicate product id sees the stock
///   level minus what earlier lines already staged, so the total requested
///   across duplicates must fit the available quantity.
/// - A shortfall on any line fails the whole order; the function has no
///   side effects, so nothing needs unwinding.
///
/// ## Example
/// ```text
/// stock(P) = 10
/// lines = [{P, 6}, {P, 6}]
///   line 1: available 10, staged 6         → ok
///   line 2: available 10 - 6 = 4, need 6   → InsufficientStock
/// ```
pub fn price_order(
    products: &HashMap<String, Product>,
    lines: &[OrderLine],
) -> CoreResult<PricedOrder> {
    if lines.is_empty() {
        return Err(CoreError::EmptyOrder);
    }
    validate_order_size(lines.len())?;

    let mut priced = Vec::with_capacity(lines.len());
    let mut total_cents: i64 = 0;

    // Staged decrements per product, in first-occurrence order.
    let mut staged: Vec<(String, i64)> = Vec::new();
    let mut staged_index: HashMap<&str, usize> = HashMap::new();

    for line in lines {
        validate_quantity(line.quantity)?;

        let product = products
            .get(&line.product_id)
            .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;

        let already_staged = staged_index
            .get(product.id.as_str())
            .map(|&i| staged[i].1)
            .unwrap_or(0);
        let available = product.quantity - already_staged;

        if available < line.quantity {
            return Err(CoreError::InsufficientStock {
                name: product.name.clone(),
                available,
                requested: line.quantity,
            });
        }

        match staged_index.get(product.id.as_str()) {
            Some(&i) => staged[i].1 += line.quantity,
            None => {
                staged.push((product.id.clone(), line.quantity));
                staged_index.insert(product.id.as_str(), staged.len() - 1);
            }
        }

        let line_total = product.price().multiply_quantity(line.quantity);
        total_cents += line_total.cents();

        priced.push(PricedLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            quantity: line.quantity,
            price_at_time_cents: product.price_cents,
            line_total_cents: line_total.cents(),
        });
    }

    Ok(PricedOrder {
        lines: priced,
        total_cents,
        decrements: staged,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;
    use chrono::Utc;

    fn product(id: &str, name: &str, price_cents: i64, quantity: i64) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            category: Category::Tablet,
            manufacturer: None,
            price_cents,
            quantity,
            added_by: "user-1".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn catalog(products: Vec<Product>) -> HashMap<String, Product> {
        products.into_iter().map(|p| (p.id.clone(), p)).collect()
    }

    #[test]
    fn prices_single_line_order() {
        let products = catalog(vec![product("p1", "Paracetamol", 500, 10)]);
        let lines = vec![OrderLine {
            product_id: "p1".to_string(),
            quantity: 3,
        }];

        let order = price_order(&products, &lines).unwrap();

        assert_eq!(order.total_cents, 1500);
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.lines[0].price_at_time_cents, 500);
        assert_eq!(order.lines[0].line_total_cents, 1500);
        assert_eq!(order.decrements, vec![("p1".to_string(), 3)]);
    }

    #[test]
    fn prices_multi_line_order() {
        let products = catalog(vec![
            product("p1", "Paracetamol", 500, 10),
            product("p2", "Cough Syrup", 1200, 4),
        ]);
        let lines = vec![
            OrderLine {
                product_id: "p1".to_string(),
                quantity: 2,
            },
            OrderLine {
                product_id: "p2".to_string(),
                quantity: 1,
            },
        ];

        let order = price_order(&products, &lines).unwrap();

        assert_eq!(order.total_cents, 2 * 500 + 1200);
        assert_eq!(
            order.decrements,
            vec![("p1".to_string(), 2), ("p2".to_string(), 1)]
        );
    }

    #[test]
    fn rejects_empty_order() {
        let products = catalog(vec![]);
        let err = price_order(&products, &[]).unwrap_err();
        assert!(matches!(err, CoreError::EmptyOrder));
    }

    #[test]
    fn rejects_unknown_product() {
        let products = catalog(vec![product("p1", "Paracetamol", 500, 10)]);
        let lines = vec![OrderLine {
            product_id: "ghost".to_string(),
            quantity: 1,
        }];

        let err = price_order(&products, &lines).unwrap_err();
        match err {
            CoreError::ProductNotFound(id) => assert_eq!(id, "ghost"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_insufficient_stock() {
        let products = catalog(vec![product("p1", "Paracetamol", 500, 2)]);
        let lines = vec![OrderLine {
            product_id: "p1".to_string(),
            quantity: 5,
        }];

        let err = price_order(&products, &lines).unwrap_err();
        match err {
            CoreError::InsufficientStock {
                name,
                available,
                requested,
            } => {
                assert_eq!(name, "Paracetamol");
                assert_eq!(available, 2);
                assert_eq!(requested, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_non_positive_quantity() {
        let products = catalog(vec![product("p1", "Paracetamol", 500, 10)]);
        let lines = vec![OrderLine {
            product_id: "p1".to_string(),
            quantity: 0,
        }];

        assert!(matches!(
            price_order(&products, &lines).unwrap_err(),
            CoreError::Validation(_)
        ));
    }

    /// Duplicate lines validate sequentially: the second occurrence sees
    /// the stock remaining after the first occurrence's staged decrement.
    #[test]
    fn duplicate_lines_stage_sequentially() {
        let products = catalog(vec![product("p1", "Paracetamol", 500, 10)]);

        // 6 + 4 = 10 exactly fits
        let lines = vec![
            OrderLine {
                product_id: "p1".to_string(),
                quantity: 6,
            },
            OrderLine {
                product_id: "p1".to_string(),
                quantity: 4,
            },
        ];
        let order = price_order(&products, &lines).unwrap();
        assert_eq!(order.decrements, vec![("p1".to_string(), 10)]);
        assert_eq!(order.total_cents, 5000);
        assert_eq!(order.lines.len(), 2);

        // 6 + 6 = 12 exceeds 10: second line fails with remaining stock 4
        let lines = vec![
            OrderLine {
                product_id: "p1".to_string(),
                quantity: 6,
            },
            OrderLine {
                product_id: "p1".to_string(),
                quantity: 6,
            },
        ];
        match price_order(&products, &lines).unwrap_err() {
            CoreError::InsufficientStock {
                available,
                requested,
                ..
            } => {
                assert_eq!(available, 4);
                assert_eq!(requested, 6);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    /// A failure on a later line must not expose any earlier staging.
    /// price_order is pure, so this only asserts the all-or-nothing result.
    #[test]
    fn later_failure_fails_whole_order() {
        let products = catalog(vec![
            product("p1", "Paracetamol", 500, 10),
            product("p2", "Cough Syrup", 1200, 1),
        ]);
        let lines = vec![
            OrderLine {
                product_id: "p1".to_string(),
                quantity: 2,
            },
            OrderLine {
                product_id: "p2".to_string(),
                quantity: 3,
            },
        ];

        assert!(matches!(
            price_order(&products, &lines).unwrap_err(),
            CoreError::InsufficientStock { .. }
        ));
    }
}
