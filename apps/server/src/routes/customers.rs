//! Customer endpoints, including the manual balance adjustment path.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use medipos_core::policy::{authorize, Action};
use medipos_core::validation::{validate_adjustment_amount, validate_name, validate_phone};
use medipos_core::Customer;
use medipos_db::repository::customer::{generate_customer_id, AdjustmentKind};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::routes::{success, success_list};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerRequest {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub medical_history: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerRequest {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub medical_history: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustBalanceRequest {
    /// Positive magnitude, in cents.
    pub amount_cents: i64,
    /// `credit` raises what the customer owes, `debit` lowers it.
    pub kind: BalanceKind,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceKind {
    Credit,
    Debit,
}

impl From<BalanceKind> for AdjustmentKind {
    fn from(kind: BalanceKind) -> Self {
        match kind {
            BalanceKind::Credit => AdjustmentKind::Credit,
            BalanceKind::Debit => AdjustmentKind::Debit,
        }
    }
}

fn customer_not_found(id: &str) -> ApiError {
    ApiError::not_found(format!("Customer not found with id of {id}"))
}

/// `GET /api/v1/customers`
pub async fn list(State(state): State<AppState>, _auth: AuthUser) -> ApiResult<Json<Value>> {
    let customers = state.db.customers().list().await?;
    Ok(success_list(&customers))
}

/// `GET /api/v1/customers/{id}`
pub async fn get_one(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let customer = state
        .db
        .customers()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| customer_not_found(&id))?;
    Ok(success(customer))
}

/// `POST /api/v1/customers`
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateCustomerRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    validate_name(&request.name)?;
    validate_phone(&request.phone)?;

    let customer = Customer {
        id: generate_customer_id(),
        name: request.name,
        phone: request.phone,
        email: request.email,
        address: request.address,
        medical_history: request.medical_history,
        balance_cents: 0,
        created_by: auth.id.clone(),
        created_at: Utc::now(),
    };

    let customer = state.db.customers().insert(&customer).await?;
    Ok((StatusCode::CREATED, success(customer)))
}

/// `PUT /api/v1/customers/{id}`
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateCustomerRequest>,
) -> ApiResult<Json<Value>> {
    let mut customer = state
        .db
        .customers()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| customer_not_found(&id))?;

    authorize(
        &auth.actor(),
        Action::MutateCustomer {
            owner_id: &customer.created_by,
        },
    )?;

    validate_name(&request.name)?;
    validate_phone(&request.phone)?;

    customer.name = request.name;
    customer.phone = request.phone;
    customer.email = request.email;
    customer.address = request.address;
    customer.medical_history = request.medical_history;

    state.db.customers().update(&customer).await?;

    let customer = state
        .db
        .customers()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| customer_not_found(&id))?;
    Ok(success(customer))
}

/// `PUT /api/v1/customers/{id}/balance`
///
/// Manual adjustment outside the ledger; owner-only, and unlike engine
/// payments a debit is not clamped at zero.
pub async fn adjust_balance(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<AdjustBalanceRequest>,
) -> ApiResult<Json<Value>> {
    let customer = state
        .db
        .customers()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| customer_not_found(&id))?;

    authorize(
        &auth.actor(),
        Action::AdjustBalance {
            owner_id: &customer.created_by,
        },
    )?;

    validate_adjustment_amount(request.amount_cents)?;

    let customer = state
        .db
        .customers()
        .adjust_balance(&id, request.amount_cents, request.kind.into())
        .await?;
    Ok(success(customer))
}
