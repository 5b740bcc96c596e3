//! Integration tests for the transaction engine.
//!
//! Each test runs against a fresh in-memory SQLite database with the full
//! migration set applied, so the schema-level guards (CHECK constraints,
//! foreign keys) are active.

use chrono::Utc;

use medipos_core::{
    Category, CoreError, Customer, OrderLine, Product, Role, TransactionType, User,
};
use medipos_db::{Database, DbConfig, EngineError, NewTransaction};

async fn fresh_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

async fn seed_user(db: &Database) -> User {
    let user = User {
        id: "user-1".to_string(),
        name: "Test Clerk".to_string(),
        email: "clerk@example.com".to_string(),
        password_hash: "not-a-real-hash".to_string(),
        role: Role::User,
        created_at: Utc::now(),
    };
    db.users().insert(&user).await.unwrap()
}

async fn seed_product(db: &Database, id: &str, price_cents: i64, quantity: i64) -> Product {
    let now = Utc::now();
    let product = Product {
        id: id.to_string(),
        name: format!("Product {id}"),
        description: None,
        category: Category::Tablet,
        manufacturer: None,
        price_cents,
        quantity,
        added_by: "user-1".to_string(),
        created_at: now,
        updated_at: now,
    };
    db.products().insert(&product).await.unwrap()
}

async fn seed_customer(db: &Database, id: &str, balance_cents: i64) -> Customer {
    let customer = Customer {
        id: id.to_string(),
        name: "Test Customer".to_string(),
        phone: format!("0300{id}"),
        email: None,
        address: None,
        medical_history: None,
        balance_cents,
        created_by: "user-1".to_string(),
        created_at: Utc::now(),
    };
    db.customers().insert(&customer).await.unwrap()
}

fn purchase(customer_id: &str, lines: Vec<(&str, i64)>) -> NewTransaction {
    request(customer_id, TransactionType::Purchase, lines)
}

fn payment(customer_id: &str, lines: Vec<(&str, i64)>) -> NewTransaction {
    request(customer_id, TransactionType::Payment, lines)
}

fn request(customer_id: &str, tx_type: TransactionType, lines: Vec<(&str, i64)>) -> NewTransaction {
    NewTransaction {
        customer_id: customer_id.to_string(),
        tx_type,
        lines: lines
            .into_iter()
            .map(|(product_id, quantity)| OrderLine {
                product_id: product_id.to_string(),
                quantity,
            })
            .collect(),
        notes: None,
    }
}

async fn stock_of(db: &Database, id: &str) -> i64 {
    db.products().get_by_id(id).await.unwrap().unwrap().quantity
}

async fn balance_of(db: &Database, id: &str) -> i64 {
    db.customers()
        .get_by_id(id)
        .await
        .unwrap()
        .unwrap()
        .balance_cents
}

// =============================================================================
// Purchases
// =============================================================================

#[tokio::test]
async fn purchase_decrements_stock_and_raises_balance() {
    let db = fresh_db().await;
    seed_user(&db).await;
    seed_product(&db, "p1", 500, 10).await;
    seed_product(&db, "p2", 1200, 4).await;
    seed_customer(&db, "c1", 0).await;

    let detail = db
        .engine()
        .create_transaction(&purchase("c1", vec![("p1", 3), ("p2", 1)]), "user-1")
        .await
        .unwrap();

    assert_eq!(detail.transaction.amount_cents, 3 * 500 + 1200);
    assert_eq!(detail.products.len(), 2);
    assert_eq!(detail.products[0].price_at_time_cents, 500);
    assert_eq!(detail.products[0].name_snapshot, "Product p1");

    assert_eq!(stock_of(&db, "p1").await, 7);
    assert_eq!(stock_of(&db, "p2").await, 3);
    assert_eq!(balance_of(&db, "c1").await, 2700);
}

#[tokio::test]
async fn insufficient_stock_leaves_everything_untouched() {
    let db = fresh_db().await;
    seed_user(&db).await;
    seed_product(&db, "p1", 500, 10).await;
    seed_product(&db, "p2", 1200, 1).await;
    seed_customer(&db, "c1", 100).await;

    // p2 is short; the p1 line must not be applied either
    let err = db
        .engine()
        .create_transaction(&purchase("c1", vec![("p1", 2), ("p2", 3)]), "user-1")
        .await
        .unwrap_err();

    match err {
        EngineError::Core(CoreError::InsufficientStock {
            available,
            requested,
            ..
        }) => {
            assert_eq!(available, 1);
            assert_eq!(requested, 3);
        }
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(stock_of(&db, "p1").await, 10);
    assert_eq!(stock_of(&db, "p2").await, 1);
    assert_eq!(balance_of(&db, "c1").await, 100);
    assert_eq!(db.transactions().count_by_customer("c1").await.unwrap(), 0);
}

#[tokio::test]
async fn duplicate_lines_validate_against_remaining_stock() {
    let db = fresh_db().await;
    seed_user(&db).await;
    seed_product(&db, "p1", 500, 10).await;
    seed_customer(&db, "c1", 0).await;

    // 6 + 4 fits exactly
    let detail = db
        .engine()
        .create_transaction(&purchase("c1", vec![("p1", 6), ("p1", 4)]), "user-1")
        .await
        .unwrap();
    assert_eq!(detail.products.len(), 2);
    assert_eq!(stock_of(&db, "p1").await, 0);

    // 6 + 6 against a fresh stock of 10 fails as a whole
    seed_product(&db, "p2", 500, 10).await;
    let err = db
        .engine()
        .create_transaction(&purchase("c1", vec![("p2", 6), ("p2", 6)]), "user-1")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Core(CoreError::InsufficientStock { .. })
    ));
    assert_eq!(stock_of(&db, "p2").await, 10);
}

#[tokio::test]
async fn caller_cannot_influence_prices() {
    let db = fresh_db().await;
    seed_user(&db).await;
    seed_product(&db, "p1", 500, 10).await;
    seed_customer(&db, "c1", 0).await;

    let detail = db
        .engine()
        .create_transaction(&purchase("c1", vec![("p1", 2)]), "user-1")
        .await
        .unwrap();

    // Catalog price changes after the sale must not alter the ledger.
    let mut product = db.products().get_by_id("p1").await.unwrap().unwrap();
    product.price_cents = 9999;
    db.products().update(&product).await.unwrap();

    let reloaded = db
        .transactions()
        .get_by_id(&detail.transaction.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.transaction.amount_cents, 1000);
    assert_eq!(reloaded.products[0].price_at_time_cents, 500);
}

// =============================================================================
// Payments
// =============================================================================

#[tokio::test]
async fn payment_reduces_balance() {
    let db = fresh_db().await;
    seed_user(&db).await;
    seed_product(&db, "p1", 1000, 10).await;
    seed_customer(&db, "c1", 5000).await;

    db.engine()
        .create_transaction(&payment("c1", vec![("p1", 2)]), "user-1")
        .await
        .unwrap();

    assert_eq!(balance_of(&db, "c1").await, 3000);
}

#[tokio::test]
async fn overpayment_clamps_balance_at_zero() {
    let db = fresh_db().await;
    seed_user(&db).await;
    seed_product(&db, "p1", 5000, 10).await;
    seed_customer(&db, "c1", 2000).await;

    // Payment of 5000 against a balance of 2000: clamped, not credited.
    db.engine()
        .create_transaction(&payment("c1", vec![("p1", 1)]), "user-1")
        .await
        .unwrap();

    assert_eq!(balance_of(&db, "c1").await, 0);
}

// =============================================================================
// Rejections
// =============================================================================

#[tokio::test]
async fn empty_order_is_rejected_before_io() {
    let db = fresh_db().await;
    seed_user(&db).await;
    seed_customer(&db, "c1", 0).await;

    let err = db
        .engine()
        .create_transaction(&purchase("c1", vec![]), "user-1")
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::Core(CoreError::EmptyOrder)));
}

#[tokio::test]
async fn unknown_customer_is_rejected() {
    let db = fresh_db().await;
    seed_user(&db).await;
    seed_product(&db, "p1", 500, 10).await;

    let err = db
        .engine()
        .create_transaction(&purchase("ghost", vec![("p1", 1)]), "user-1")
        .await
        .unwrap_err();

    match err {
        EngineError::Core(CoreError::CustomerNotFound(id)) => assert_eq!(id, "ghost"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unknown_product_is_rejected() {
    let db = fresh_db().await;
    seed_user(&db).await;
    seed_customer(&db, "c1", 0).await;

    let err = db
        .engine()
        .create_transaction(&purchase("c1", vec![("ghost", 1)]), "user-1")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        EngineError::Core(CoreError::ProductNotFound(_))
    ));
}

// =============================================================================
// Concurrency
// =============================================================================

/// Two orders race for stock that can satisfy only one of them. Exactly
/// one must win; stock never goes negative and the loser leaves no trace.
#[tokio::test]
async fn concurrent_orders_cannot_oversell() {
    let db = fresh_db().await;
    seed_user(&db).await;
    seed_product(&db, "p1", 500, 10).await;
    seed_customer(&db, "c1", 0).await;
    seed_customer(&db, "c2", 0).await;

    let engine_a = db.engine();
    let engine_b = db.engine();
    let order_a = purchase("c1", vec![("p1", 6)]);
    let order_b = purchase("c2", vec![("p1", 6)]);

    let (result_a, result_b) = tokio::join!(
        engine_a.create_transaction(&order_a, "user-1"),
        engine_b.create_transaction(&order_b, "user-1"),
    );

    let successes = [&result_a, &result_b]
        .iter()
        .filter(|r| r.is_ok())
        .count();
    assert_eq!(successes, 1, "exactly one of the racing orders must win");

    for result in [result_a, result_b] {
        if let Err(err) = result {
            assert!(matches!(
                err,
                EngineError::Core(CoreError::InsufficientStock { .. })
            ));
        }
    }

    assert_eq!(stock_of(&db, "p1").await, 4);
    let winners = db.transactions().count_by_customer("c1").await.unwrap()
        + db.transactions().count_by_customer("c2").await.unwrap();
    assert_eq!(winners, 1);
}

// =============================================================================
// Statements
// =============================================================================

#[tokio::test]
async fn statement_lists_transactions_newest_first() {
    let db = fresh_db().await;
    seed_user(&db).await;
    seed_product(&db, "p1", 500, 100).await;
    seed_customer(&db, "c1", 0).await;

    let first = db
        .engine()
        .create_transaction(&purchase("c1", vec![("p1", 1)]), "user-1")
        .await
        .unwrap();
    let second = db
        .engine()
        .create_transaction(&purchase("c1", vec![("p1", 2)]), "user-1")
        .await
        .unwrap();

    let statement = db.engine().transactions_for_customer("c1").await.unwrap();

    assert_eq!(statement.customer.balance_cents, 1500);
    assert_eq!(statement.transactions.len(), 2);
    assert_eq!(statement.transactions[0].transaction.id, second.transaction.id);
    assert_eq!(statement.transactions[1].transaction.id, first.transaction.id);
    assert_eq!(statement.transactions[0].products.len(), 1);
}

#[tokio::test]
async fn statement_for_unknown_customer_fails() {
    let db = fresh_db().await;

    let err = db
        .engine()
        .transactions_for_customer("ghost")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Core(CoreError::CustomerNotFound(_))
    ));
}

// =============================================================================
// Ledger survives catalog deletion
// =============================================================================

#[tokio::test]
async fn ledger_survives_product_deletion() {
    let db = fresh_db().await;
    seed_user(&db).await;
    seed_product(&db, "p1", 500, 10).await;
    seed_customer(&db, "c1", 0).await;

    let detail = db
        .engine()
        .create_transaction(&purchase("c1", vec![("p1", 1)]), "user-1")
        .await
        .unwrap();

    db.products().delete("p1").await.unwrap();

    let reloaded = db
        .transactions()
        .get_by_id(&detail.transaction.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.products[0].name_snapshot, "Product p1");
    assert_eq!(reloaded.products[0].product_id, "p1");
}
