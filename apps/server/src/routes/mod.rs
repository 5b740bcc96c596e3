//! # HTTP Routes
//!
//! JSON API surface. Handlers stay thin: extract, authorize via the policy
//! function, call a repository or the engine, wrap in the response envelope.
//!
//! ## Envelope
//! ```text
//! success: {"success": true, "data": ...}            (+ "count" on lists)
//! failure: {"success": false, "error": {code, message}}
//! ```

use axum::extract::State;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value};

use crate::state::AppState;

pub mod auth;
pub mod customers;
pub mod products;
pub mod stocks;
pub mod transactions;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/auth/login", post(auth::login))
        .route(
            "/api/v1/products",
            get(products::list).post(products::create),
        )
        .route(
            "/api/v1/products/{id}",
            get(products::get_one)
                .put(products::update)
                .delete(products::remove),
        )
        .route(
            "/api/v1/customers",
            get(customers::list).post(customers::create),
        )
        .route(
            "/api/v1/customers/{id}",
            get(customers::get_one).put(customers::update),
        )
        .route(
            "/api/v1/customers/{id}/balance",
            put(customers::adjust_balance),
        )
        .route("/api/v1/stocks", get(stocks::list).post(stocks::create))
        .route(
            "/api/v1/stocks/{id}",
            get(stocks::get_one)
                .put(stocks::update)
                .delete(stocks::remove),
        )
        .route("/api/v1/transactions", post(transactions::create))
        .route("/api/v1/transactions/{id}", get(transactions::get_one))
        .route(
            "/api/v1/transactions/customer/{customer_id}",
            get(transactions::by_customer),
        )
        .with_state(state)
}

/// Liveness endpoint, unauthenticated.
async fn health(State(state): State<AppState>) -> Json<Value> {
    let healthy = state.db.health_check().await;
    Json(json!({
        "success": healthy,
        "status": if healthy { "ok" } else { "degraded" },
    }))
}

/// Wraps a single payload in the success envelope.
pub(crate) fn success<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

/// Wraps a collection in the success envelope with its count.
pub(crate) fn success_list<T: Serialize>(data: &[T]) -> Json<Value> {
    Json(json!({ "success": true, "count": data.len(), "data": data }))
}
