//! Customer API handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use stampcard_core::{Customer, CustomerId};

use super::{ApiJson, path_customer_id};
use crate::{
    error::AppError,
    services::{ImportRecord, ImportSummary},
    state::AppState,
};

/// Build the customers router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/customers", get(list).post(register))
        .route("/api/customers/import", post(import))
        .route("/api/customers/{id}", get(lookup).delete(delete))
}

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mobile: String,
}

/// Registration response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub success: bool,
    pub customer_id: CustomerId,
    pub customer: Customer,
}

/// List filter.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
}

/// Customer list response.
#[derive(Debug, Serialize)]
pub struct CustomerListResponse {
    pub success: bool,
    pub count: usize,
    pub customers: Vec<Customer>,
}

/// Single customer response.
#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    pub success: bool,
    pub customer: Customer,
}

/// Bare acknowledgement.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Bulk import request body.
#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub customers: Vec<ImportRecord>,
}

/// Bulk import response.
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub success: bool,
    #[serde(flatten)]
    pub summary: ImportSummary,
}

/// Register a new customer.
///
/// # Errors
///
/// 400 on malformed input, 409 on a duplicate mobile.
#[instrument(skip(state, body))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let customer = state
        .loyalty()
        .register(&body.name, &body.mobile, Utc::now())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            customer_id: customer.customer_id.clone(),
            customer,
        }),
    ))
}

/// List customers, newest first.
///
/// # Errors
///
/// 503 if the store is unavailable.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<CustomerListResponse>, AppError> {
    let customers = state.loyalty().list(query.q.as_deref()).await?;
    Ok(Json(CustomerListResponse {
        success: true,
        count: customers.len(),
        customers,
    }))
}

/// Look a customer up by id or mobile number.
///
/// # Errors
///
/// 404 if nothing matches.
pub async fn lookup(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> Result<Json<CustomerResponse>, AppError> {
    let customer = state.loyalty().lookup(&identifier).await?;
    Ok(Json(CustomerResponse {
        success: true,
        customer,
    }))
}

/// Delete a customer.
///
/// # Errors
///
/// 404 if the customer does not exist.
pub async fn delete(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    let customer_id = path_customer_id(&customer_id)?;
    state.loyalty().delete(&customer_id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// Import a batch of customer records.
///
/// # Errors
///
/// 503 if the store fails mid-import; invalid records are reported in the body.
pub async fn import(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ImportRequest>,
) -> Result<Json<ImportResponse>, AppError> {
    let summary = state.loyalty().import(body.customers, Utc::now()).await?;
    Ok(Json(ImportResponse {
        success: true,
        summary,
    }))
}
