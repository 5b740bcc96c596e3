//! Transaction endpoints: the ledger's HTTP surface.
//!
//! The create body carries product ids and quantities only. Prices and
//! totals are computed server-side by the engine; nothing the caller sends
//! can influence them.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use medipos_core::{OrderLine, TransactionType};
use medipos_db::NewTransaction;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::routes::success;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    /// Customer id.
    pub customer: String,
    /// `purchase` or `payment`.
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    /// Line items: `[{product, quantity}]`.
    pub products: Vec<ProductLineRequest>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProductLineRequest {
    /// Product id.
    pub product: String,
    pub quantity: i64,
}

impl From<CreateTransactionRequest> for NewTransaction {
    fn from(request: CreateTransactionRequest) -> Self {
        NewTransaction {
            customer_id: request.customer,
            tx_type: request.tx_type,
            lines: request
                .products
                .into_iter()
                .map(|line| OrderLine {
                    product_id: line.product,
                    quantity: line.quantity,
                })
                .collect(),
            notes: request.notes,
        }
    }
}

/// `POST /api/v1/transactions`
///
/// Any authenticated user may record a sale or a settlement.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateTransactionRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let new_transaction = NewTransaction::from(request);

    let detail = state
        .db
        .engine()
        .create_transaction(&new_transaction, &auth.id)
        .await?;

    Ok((StatusCode::CREATED, success(detail)))
}

/// `GET /api/v1/transactions/{id}`
pub async fn get_one(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let detail = state
        .db
        .transactions()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Transaction not found with id of {id}")))?;
    Ok(success(detail))
}

/// `GET /api/v1/transactions/customer/{customer_id}`
///
/// The customer's statement: snapshot plus ledger, newest first.
pub async fn by_customer(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(customer_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let statement = state
        .db
        .engine()
        .transactions_for_customer(&customer_id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "count": statement.transactions.len(),
        "customer": statement.customer,
        "data": statement.transactions,
    })))
}
