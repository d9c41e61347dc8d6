//! HTTP route handlers for the admin API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                                      - Liveness
//! GET    /health/ready                                - Store readiness
//!
//! # Customers
//! POST   /api/customers                               - Register
//! GET    /api/customers?q=                            - List (newest first)
//! POST   /api/customers/import                        - Bulk import
//! GET    /api/customers/{id}                          - Lookup by id or mobile
//! DELETE /api/customers/{id}                          - Delete
//!
//! # Stamps
//! PUT    /api/customers/{id}/stamps                   - Replace card
//! POST   /api/customers/{id}/stamps/{day}/toggle
//! POST   /api/customers/{id}/stamps/reset
//!
//! # Reports
//! GET    /api/stats                                   - Dashboard counters
//! GET    /api/report                                  - Full report
//! GET    /api/insights                                - Advisory insights
//! ```

pub mod customers;
pub mod health;
pub mod reports;
pub mod stamps;

use std::time::Duration;

use axum::{Router, extract::FromRequest, routing::get};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use stampcard_core::CustomerId;

use crate::error::AppError;
use crate::services::LoyaltyError;
use crate::state::AppState;

/// All API routes, without state.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(customers::router())
        .merge(stamps::router())
        .merge(reports::router())
}

/// The complete application: health checks, API routes and request tracing.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(routes())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Parse a customer id from a path segment.
///
/// A malformed id cannot name an existing customer, so it is a 404.
pub(crate) fn path_customer_id(raw: &str) -> Result<CustomerId, AppError> {
    CustomerId::parse(raw.trim()).map_err(|_| LoyaltyError::NotFound(raw.to_owned()).into())
}

/// JSON request body whose rejections are reported as [`AppError::BadRequest`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
