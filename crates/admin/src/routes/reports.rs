//! Dashboard, report and insight handlers.

use axum::{Json, Router, extract::State, routing::get};
use chrono::Utc;
use serde::Serialize;

use stampcard_core::{DashboardStats, Insight, LoyaltyReport};

use crate::{error::AppError, state::AppState};

/// Build the reports router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/stats", get(stats))
        .route("/api/report", get(report))
        .route("/api/insights", get(insights))
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: DashboardStats,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub success: bool,
    pub report: LoyaltyReport,
}

#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    pub success: bool,
    pub insights: Vec<Insight>,
}

/// Dashboard counters.
///
/// # Errors
///
/// 503 if the store is unavailable.
pub async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, AppError> {
    let stats = state.loyalty().stats(Utc::now()).await?;
    Ok(Json(StatsResponse {
        success: true,
        stats,
    }))
}

/// Full aggregate report as of now.
///
/// # Errors
///
/// 503 if the store is unavailable.
pub async fn report(State(state): State<AppState>) -> Result<Json<ReportResponse>, AppError> {
    let report = state.loyalty().report(Utc::now()).await?;
    Ok(Json(ReportResponse {
        success: true,
        report,
    }))
}

/// Advisory insights as of now.
///
/// # Errors
///
/// 503 if the store is unavailable.
pub async fn insights(
    State(state): State<AppState>,
) -> Result<Json<InsightsResponse>, AppError> {
    let insights = state.loyalty().insights(Utc::now()).await?;
    Ok(Json(InsightsResponse {
        success: true,
        insights,
    }))
}
