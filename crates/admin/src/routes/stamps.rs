//! Stamp card handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{post, put},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use stampcard_core::{CustomerId, StampCard, StampUpdate};

use super::{ApiJson, path_customer_id};
use crate::{
    error::AppError,
    services::{LoyaltyError, ToggleOutcome},
    state::AppState,
};

/// Build the stamps router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/customers/{id}/stamps", put(update_stamps))
        .route("/api/customers/{id}/stamps/reset", post(reset_stamps))
        .route(
            "/api/customers/{id}/stamps/{day}/toggle",
            post(toggle_stamp),
        )
}

/// Whole-card replacement body.
#[derive(Debug, Deserialize)]
pub struct UpdateStampsRequest {
    pub stamps: Vec<bool>,
}

/// Response for replace and reset.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StampsResponse {
    pub success: bool,
    pub customer_id: CustomerId,
    #[serde(flatten)]
    pub update: StampUpdate,
}

/// Response for a single-day toggle.
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub success: bool,
    #[serde(flatten)]
    pub outcome: ToggleOutcome,
}

/// Replace a customer's card.
///
/// # Errors
///
/// 400 unless exactly six stamps are given, 404 if the customer does not exist.
pub async fn update_stamps(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
    ApiJson(body): ApiJson<UpdateStampsRequest>,
) -> Result<Json<StampsResponse>, AppError> {
    let customer_id = path_customer_id(&customer_id)?;
    let card = StampCard::try_from(body.stamps)
        .map_err(|e| LoyaltyError::Validation(e.to_string()))?;

    let update = state
        .loyalty()
        .update_stamps(&customer_id, card, Utc::now())
        .await?;

    Ok(Json(StampsResponse {
        success: true,
        customer_id,
        update,
    }))
}

/// Clear every stamp on a customer's card.
///
/// # Errors
///
/// 404 if the customer does not exist.
pub async fn reset_stamps(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
) -> Result<Json<StampsResponse>, AppError> {
    let customer_id = path_customer_id(&customer_id)?;
    let update = state
        .loyalty()
        .reset_stamps(&customer_id, Utc::now())
        .await?;

    Ok(Json(StampsResponse {
        success: true,
        customer_id,
        update,
    }))
}

/// Flip one day.
///
/// # Errors
///
/// 400 if `day` is not 0-5, 404 if the customer does not exist.
pub async fn toggle_stamp(
    State(state): State<AppState>,
    Path((customer_id, day)): Path<(String, String)>,
) -> Result<Json<ToggleResponse>, AppError> {
    let customer_id = path_customer_id(&customer_id)?;
    let day = day
        .parse::<usize>()
        .map_err(|_| LoyaltyError::Validation(format!("day must be 0-5 (got '{day}')")))?;

    let outcome = state
        .loyalty()
        .toggle_stamp(&customer_id, day, Utc::now())
        .await?;

    Ok(Json(ToggleResponse {
        success: true,
        outcome,
    }))
}
