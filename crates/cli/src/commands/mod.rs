//! CLI command implementations.

pub mod customer;
pub mod migrate;
pub mod report;

use std::sync::Arc;

use secrecy::SecretString;
use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;

use stampcard_admin::{
    ConfigError, CustomerStore, LoyaltyError, LoyaltyService, PgCustomerStore, config, db,
};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Configuration value is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Loyalty operation failed.
    #[error(transparent)]
    Loyalty(#[from] LoyaltyError),

    /// Output could not be encoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Connect to the database named by `STAMPCARD_DATABASE_URL` (or `DATABASE_URL`).
pub async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("STAMPCARD_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| CommandError::MissingEnvVar("STAMPCARD_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(db::create_pool(&SecretString::from(database_url)).await?)
}

/// Loyalty service over the configured database.
///
/// Honours `STAMPCARD_ID_MAX_ATTEMPTS` like the admin server does.
pub async fn loyalty() -> Result<LoyaltyService, CommandError> {
    dotenvy::dotenv().ok();
    let max_id_attempts = config::id_max_attempts_from_env()?;
    let pool = connect().await?;
    Ok(service(Arc::new(PgCustomerStore::new(pool)), max_id_attempts))
}

fn service(store: Arc<dyn CustomerStore>, max_id_attempts: u32) -> LoyaltyService {
    LoyaltyService::new(store).with_max_id_attempts(max_id_attempts)
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), CommandError> {
    let json = serde_json::to_string_pretty(value)?;
    #[allow(clippy::print_stdout)]
    {
        println!("{json}");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use stampcard_admin::MemoryCustomerStore;
    use stampcard_core::CustomerId;

    use super::*;

    #[tokio::test]
    async fn test_service_uses_configured_id_bound() {
        let max_id_attempts = config::parse_attempts(Some("3".to_string())).unwrap();
        let loyalty = service(Arc::new(MemoryCustomerStore::new()), max_id_attempts)
            .with_id_source(|| CustomerId::from_number(1000).unwrap());

        loyalty
            .register("Asha", "+919876543210", Utc::now())
            .await
            .unwrap();
        let err = loyalty
            .register("Ravi", "+919876543211", Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LoyaltyError::IdentifierSpaceExhausted { attempts: 3 }
        ));
    }

    #[test]
    fn test_invalid_id_bound_is_config_error() {
        let err: CommandError = config::parse_attempts(Some("0".to_string()))
            .unwrap_err()
            .into();
        assert!(matches!(err, CommandError::Config(_)));
    }
}
