//! Customer persistence.
//!
//! # Table: `loyalty.customer`
//!
//! One row per registered customer. `customer_id` is the primary key and
//! `mobile` carries a unique index, so the database itself rejects
//! duplicates even when two registrations race.
//!
//! # Backends
//!
//! - [`PgCustomerStore`] - `PostgreSQL` via sqlx (production)
//! - [`MemoryCustomerStore`] - in-process map (tests and local demos)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p stampcard-cli -- migrate
//! ```

pub mod customers;
pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use stampcard_core::{Customer, CustomerId, MobileNumber, StampUpdate};

pub use customers::PgCustomerStore;
pub use memory::MemoryCustomerStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique mobile).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The backend refused the operation without a database error.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Storage operations the loyalty service needs.
///
/// Implementations must enforce uniqueness of both `customer_id` and
/// `mobile`, reporting a violation as [`RepositoryError::Conflict`].
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Insert a new customer.
    async fn create(&self, customer: &Customer) -> Result<Customer, RepositoryError>;

    /// Insert or fully replace a customer keyed by id.
    async fn upsert(&self, customer: &Customer) -> Result<(), RepositoryError>;

    /// Get a customer by id.
    async fn get_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError>;

    /// Get a customer by mobile number.
    async fn get_by_mobile(
        &self,
        mobile: &MobileNumber,
    ) -> Result<Option<Customer>, RepositoryError>;

    /// Write the stamp card and its derived fields in one update.
    ///
    /// Returns [`RepositoryError::NotFound`] if the customer does not exist.
    async fn update_stamps(
        &self,
        id: &CustomerId,
        update: &StampUpdate,
    ) -> Result<(), RepositoryError>;

    /// Delete a customer.
    ///
    /// Returns [`RepositoryError::NotFound`] if the customer does not exist.
    async fn delete(&self, id: &CustomerId) -> Result<(), RepositoryError>;

    /// All customers, newest registration first.
    async fn list_all(&self) -> Result<Vec<Customer>, RepositoryError>;

    /// Cheap connectivity probe for readiness checks.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
