//! Integration tests for Stampcard.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process API tests (no external services)
//! cargo test -p stampcard-integration-tests
//!
//! # Including the PostgreSQL store tests
//! STAMPCARD_DATABASE_URL=postgres://... cargo test -p stampcard-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `api_customers` - registration, lookup, stamping, import
//! - `api_reports` - stats, report, insights, health
//! - `pg_store` - `PgCustomerStore` against a live database (ignored by default)

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::Value;
use tower::ServiceExt;

use stampcard_admin::{AppState, LoyaltyService, MemoryCustomerStore};
use stampcard_core::CustomerId;

/// The full admin router over an in-memory store.
///
/// Customer ids are handed out sequentially from `RK1000`.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryCustomerStore>,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(MemoryCustomerStore::new());
        let next = AtomicU16::new(CustomerId::MIN_NUMBER);
        let loyalty = LoyaltyService::new(store.clone()).with_id_source(move || {
            CustomerId::from_number(next.fetch_add(1, Ordering::SeqCst))
                .expect("test id sequence stays in range")
        });

        Self {
            router: stampcard_admin::app(AppState::new(loyalty)),
            store,
        }
    }

    /// Send a request and decode the body as JSON (or a JSON string for
    /// plain-text bodies).
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    /// Register a customer and return its id, asserting success.
    pub async fn register(&self, name: &str, mobile: &str) -> String {
        let (status, body) = self
            .post(
                "/api/customers",
                serde_json::json!({ "name": name, "mobile": mobile }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["customerId"]
            .as_str()
            .expect("customerId in response")
            .to_owned()
    }
}
