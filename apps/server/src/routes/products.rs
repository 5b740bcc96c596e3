//! Product catalog endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use medipos_core::policy::{authorize, Action};
use medipos_core::validation::{validate_name, validate_price_cents};
use medipos_core::{Category, Product};
use medipos_db::repository::product::generate_product_id;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::routes::{success, success_list};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<Category>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub category: Category,
    pub manufacturer: Option<String>,
    pub price_cents: i64,
    /// Initial stock on hand.
    #[serde(default)]
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub category: Category,
    pub manufacturer: Option<String>,
    pub price_cents: i64,
}

/// `GET /api/v1/products[?category=...]`
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Value>> {
    let products = state.db.products().list(query.category).await?;
    Ok(success_list(&products))
}

/// `GET /api/v1/products/{id}`
pub async fn get_one(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Product not found with id of {id}")))?;
    Ok(success(product))
}

/// `POST /api/v1/products`
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateProductRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    validate_name(&request.name)?;
    validate_price_cents(request.price_cents)?;
    if request.quantity < 0 {
        return Err(ApiError::invalid_input("quantity must not be negative"));
    }

    let now = Utc::now();
    let product = Product {
        id: generate_product_id(),
        name: request.name,
        description: request.description,
        category: request.category,
        manufacturer: request.manufacturer,
        price_cents: request.price_cents,
        quantity: request.quantity,
        added_by: auth.id.clone(),
        created_at: now,
        updated_at: now,
    };

    let product = state.db.products().insert(&product).await?;
    Ok((StatusCode::CREATED, success(product)))
}

/// `PUT /api/v1/products/{id}`
///
/// Catalog fields only; stock moves through receipts and the engine.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateProductRequest>,
) -> ApiResult<Json<Value>> {
    let mut product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Product not found with id of {id}")))?;

    authorize(
        &auth.actor(),
        Action::MutateProduct {
            owner_id: &product.added_by,
        },
    )?;

    validate_name(&request.name)?;
    validate_price_cents(request.price_cents)?;

    product.name = request.name;
    product.description = request.description;
    product.category = request.category;
    product.manufacturer = request.manufacturer;
    product.price_cents = request.price_cents;

    state.db.products().update(&product).await?;

    let product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Product not found with id of {id}")))?;
    Ok(success(product))
}

/// `DELETE /api/v1/products/{id}`
pub async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Product not found with id of {id}")))?;

    authorize(
        &auth.actor(),
        Action::MutateProduct {
            owner_id: &product.added_by,
        },
    )?;

    state.db.products().delete(&id).await?;
    Ok(success(serde_json::json!({})))
}
