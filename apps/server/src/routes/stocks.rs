//! Stock batch endpoints.
//!
//! Recording a batch also adds its units to the product's sellable count;
//! editing or deleting a batch is pure bookkeeping and does not move stock.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use medipos_core::policy::{authorize, Action};
use medipos_core::validation::validate_price_cents;
use medipos_core::StockBatch;
use medipos_db::repository::stock::generate_stock_id;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::routes::{success, success_list};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub product_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStockRequest {
    pub batch_no: String,
    pub expiry_date: String,
    pub distributor: String,
    pub price_cents: i64,
    pub quantity: i64,
    pub price_per_unit: Option<String>,
    pub product_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStockRequest {
    pub batch_no: String,
    pub expiry_date: String,
    pub distributor: String,
    pub price_cents: i64,
    pub quantity: i64,
    pub price_per_unit: Option<String>,
}

fn stock_not_found(id: &str) -> ApiError {
    ApiError::not_found(format!("Stock not found with id of {id}"))
}

/// `GET /api/v1/stocks[?productId=...]`
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Value>> {
    let batches = match query.product_id {
        Some(product_id) => state.db.stocks().list_for_product(&product_id).await?,
        None => state.db.stocks().list().await?,
    };
    Ok(success_list(&batches))
}

/// `GET /api/v1/stocks/{id}`
pub async fn get_one(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let batch = state
        .db
        .stocks()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| stock_not_found(&id))?;
    Ok(success(batch))
}

/// `POST /api/v1/stocks`
///
/// Records the batch and receives its units into the product's stock.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateStockRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    validate_price_cents(request.price_cents)?;
    if request.quantity <= 0 {
        return Err(ApiError::invalid_input("quantity must be positive"));
    }
    if request.batch_no.trim().is_empty() {
        return Err(ApiError::invalid_input("batchNo is required"));
    }

    // The FK on stocks.product_id rejects unknown products; check up front
    // for a clearer error.
    state
        .db
        .products()
        .get_by_id(&request.product_id)
        .await?
        .ok_or_else(|| {
            ApiError::not_found(format!(
                "Product not found with id of {}",
                request.product_id
            ))
        })?;

    let batch = StockBatch {
        id: generate_stock_id(),
        batch_no: request.batch_no,
        expiry_date: request.expiry_date,
        distributor: request.distributor,
        price_cents: request.price_cents,
        quantity: request.quantity,
        price_per_unit: request.price_per_unit,
        product_id: request.product_id,
        added_by: auth.id.clone(),
        created_at: Utc::now(),
    };

    let batch = state.db.stocks().insert(&batch).await?;
    state
        .db
        .products()
        .receive_stock(&batch.product_id, batch.quantity)
        .await?;

    Ok((StatusCode::CREATED, success(batch)))
}

/// `PUT /api/v1/stocks/{id}`
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateStockRequest>,
) -> ApiResult<Json<Value>> {
    let mut batch = state
        .db
        .stocks()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| stock_not_found(&id))?;

    authorize(
        &auth.actor(),
        Action::MutateStock {
            owner_id: &batch.added_by,
        },
    )?;

    validate_price_cents(request.price_cents)?;
    if request.quantity <= 0 {
        return Err(ApiError::invalid_input("quantity must be positive"));
    }

    batch.batch_no = request.batch_no;
    batch.expiry_date = request.expiry_date;
    batch.distributor = request.distributor;
    batch.price_cents = request.price_cents;
    batch.quantity = request.quantity;
    batch.price_per_unit = request.price_per_unit;

    state.db.stocks().update(&batch).await?;
    Ok(success(batch))
}

/// `DELETE /api/v1/stocks/{id}`
pub async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let batch = state
        .db
        .stocks()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| stock_not_found(&id))?;

    authorize(
        &auth.actor(),
        Action::MutateStock {
            owner_id: &batch.added_by,
        },
    )?;

    state.db.stocks().delete(&id).await?;
    Ok(success(serde_json::json!({})))
}
