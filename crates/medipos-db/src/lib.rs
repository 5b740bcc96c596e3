//! # MediPOS Database Layer
//!
//! SQLite persistence for MediPOS: connection pool, embedded migrations,
//! per-aggregate repositories, and the transaction engine.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         medipos-db                                      │
//! │                                                                         │
//! │  ┌──────────────┐   ┌──────────────────┐   ┌───────────────────────┐   │
//! │  │  pool        │   │  repository/*    │   │  engine               │   │
//! │  │  DbConfig    │──▶│  reads + simple  │   │  the only writer of   │   │
//! │  │  Database    │   │  writes          │   │  stock decrements and │   │
//! │  └──────────────┘   └──────────────────┘   │  ledger entries       │   │
//! │         │                                  └───────────────────────┘   │
//! │         ▼                                                               │
//! │  ┌──────────────┐   ┌──────────────────┐                               │
//! │  │  migrations  │   │  error (DbError) │                               │
//! │  └──────────────┘   └──────────────────┘                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let db = Database::new(DbConfig::new("medipos.db")).await?;
//! let detail = db.engine().create_transaction(&request, actor_id).await?;
//! ```

pub mod engine;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use engine::{EngineError, EngineResult, NewTransaction, TransactionEngine};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::customer::{AdjustmentKind, CustomerRepository};
pub use repository::product::ProductRepository;
pub use repository::stock::StockRepository;
pub use repository::transaction::TransactionRepository;
pub use repository::user::UserRepository;
