//! # Repository Layer
//!
//! One repository per aggregate, each owning a pool clone:
//!
//! - [`product`] - catalog CRUD and administrative stock receipts
//! - [`customer`] - customer CRUD and manual balance adjustments
//! - [`stock`] - stock batch bookkeeping
//! - [`transaction`] - the ledger's read side (the write side is
//!   [`crate::engine`], which is the only code allowed to decrement
//!   `products.quantity` or apply engine balance deltas)
//! - [`user`] - staff accounts for auth and record ownership

pub mod customer;
pub mod product;
pub mod stock;
pub mod transaction;
pub mod user;
