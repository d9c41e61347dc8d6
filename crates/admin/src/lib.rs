//! Stampcard admin library.
//!
//! The loyalty service, its stores and the JSON API, exposed as a library so
//! the server binary, the CLI and the integration tests share one code path.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;

pub use config::{AdminConfig, ConfigError, StoreBackend};
pub use db::{CustomerStore, MemoryCustomerStore, PgCustomerStore, RepositoryError};
pub use error::AppError;
pub use routes::app;
pub use services::{LoyaltyError, LoyaltyService};
pub use state::AppState;
