//! # Authorization Policy
//!
//! A single decision function consulted once per operation.
//!
//! The original backend sprinkled `owner || role` checks across every
//! service method; here the rules live in one table so each entry point
//! asks one question and gets an allow/deny plus a reason.
//!
//! ## Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Operation                     │  Allowed for                           │
//! │  ──────────────────────────────┼─────────────────────────────────────── │
//! │  Mutate product                │  record owner, admin                   │
//! │  Mutate stock batch            │  record owner, admin                   │
//! │  Mutate customer               │  record owner, admin, manager          │
//! │  Adjust balance manually       │  record owner only                     │
//! │  Create transaction            │  any authenticated user                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reads are not gated here; authentication alone covers them.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::Role;

/// The authenticated caller, as resolved by the auth layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

/// An operation requiring an authorization decision.
///
/// Owned variants carry the id of the user who created the record, which is
/// what the ownership rules compare against.
#[derive(Debug, Clone, Copy)]
pub enum Action<'a> {
    MutateProduct { owner_id: &'a str },
    MutateStock { owner_id: &'a str },
    MutateCustomer { owner_id: &'a str },
    AdjustBalance { owner_id: &'a str },
    CreateTransaction,
}

impl Action<'_> {
    fn describe(&self) -> &'static str {
        match self {
            Action::MutateProduct { .. } => "update this product",
            Action::MutateStock { .. } => "update this stock",
            Action::MutateCustomer { .. } => "update this customer",
            Action::AdjustBalance { .. } => "update this customer's balance",
            Action::CreateTransaction => "create a transaction",
        }
    }
}

/// Decides whether `actor` may perform `action`.
///
/// Returns `Ok(())` on allow, or [`CoreError::Unauthorized`] with a
/// human-readable reason on deny.
///
/// ## Example
/// ```rust
/// use medipos_core::policy::{authorize, Action, Actor};
/// use medipos_core::types::Role;
///
/// let clerk = Actor { id: "u2".to_string(), role: Role::User };
///
/// // Any authenticated user may process a sale
/// assert!(authorize(&clerk, Action::CreateTransaction).is_ok());
///
/// // But only the owner or an admin may edit someone else's product
/// assert!(authorize(&clerk, Action::MutateProduct { owner_id: "u1" }).is_err());
/// ```
pub fn authorize(actor: &Actor, action: Action<'_>) -> CoreResult<()> {
    let allowed = match action {
        Action::MutateProduct { owner_id } | Action::MutateStock { owner_id } => {
            actor.id == owner_id || actor.role == Role::Admin
        }
        Action::MutateCustomer { owner_id } => {
            actor.id == owner_id || matches!(actor.role, Role::Admin | Role::Manager)
        }
        Action::AdjustBalance { owner_id } => actor.id == owner_id,
        Action::CreateTransaction => true,
    };

    if allowed {
        Ok(())
    } else {
        Err(CoreError::Unauthorized {
            reason: format!("user {} may not {}", actor.id, action.describe()),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(id: &str, role: Role) -> Actor {
        Actor {
            id: id.to_string(),
            role,
        }
    }

    #[test]
    fn owner_may_mutate_own_records() {
        let owner = actor("u1", Role::User);
        assert!(authorize(&owner, Action::MutateProduct { owner_id: "u1" }).is_ok());
        assert!(authorize(&owner, Action::MutateStock { owner_id: "u1" }).is_ok());
        assert!(authorize(&owner, Action::MutateCustomer { owner_id: "u1" }).is_ok());
        assert!(authorize(&owner, Action::AdjustBalance { owner_id: "u1" }).is_ok());
    }

    #[test]
    fn admin_may_mutate_any_product_or_stock() {
        let admin = actor("boss", Role::Admin);
        assert!(authorize(&admin, Action::MutateProduct { owner_id: "u1" }).is_ok());
        assert!(authorize(&admin, Action::MutateStock { owner_id: "u1" }).is_ok());
    }

    #[test]
    fn manager_may_mutate_customers_but_not_products() {
        let manager = actor("mgr", Role::Manager);
        assert!(authorize(&manager, Action::MutateCustomer { owner_id: "u1" }).is_ok());
        assert!(authorize(&manager, Action::MutateProduct { owner_id: "u1" }).is_err());
    }

    #[test]
    fn balance_adjustment_is_owner_only() {
        // Even admins go through the ledger for other users' customers
        let admin = actor("boss", Role::Admin);
        assert!(authorize(&admin, Action::AdjustBalance { owner_id: "u1" }).is_err());
        let owner = actor("u1", Role::User);
        assert!(authorize(&owner, Action::AdjustBalance { owner_id: "u1" }).is_ok());
    }

    #[test]
    fn any_authenticated_user_may_create_transactions() {
        for role in [Role::Admin, Role::Manager, Role::User] {
            assert!(authorize(&actor("any", role), Action::CreateTransaction).is_ok());
        }
    }

    #[test]
    fn denial_carries_reason() {
        let clerk = actor("u2", Role::User);
        match authorize(&clerk, Action::MutateProduct { owner_id: "u1" }).unwrap_err() {
            CoreError::Unauthorized { reason } => {
                assert!(reason.contains("u2"));
                assert!(reason.contains("product"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
