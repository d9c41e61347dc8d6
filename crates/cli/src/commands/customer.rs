//! Customer management commands.
//!
//! Every command prints the affected record or outcome as JSON.

use chrono::Utc;
use stampcard_core::CustomerId;

use stampcard_admin::LoyaltyError;

use super::{CommandError, loyalty, print_json};

fn parse_id(raw: &str) -> Result<CustomerId, CommandError> {
    CustomerId::parse(raw.trim())
        .map_err(|_| LoyaltyError::NotFound(raw.to_owned()).into())
}

/// Register a new customer.
pub async fn register(name: &str, mobile: &str) -> Result<(), CommandError> {
    let customer = loyalty().await?.register(name, mobile, Utc::now()).await?;
    tracing::info!("Registered {}", customer.customer_id);
    print_json(&customer)
}

/// Look up a customer by id or mobile.
pub async fn show(term: &str) -> Result<(), CommandError> {
    let customer = loyalty().await?.lookup(term).await?;
    print_json(&customer)
}

/// List customers, optionally filtered.
pub async fn list(query: Option<&str>) -> Result<(), CommandError> {
    let customers = loyalty().await?.list(query).await?;
    tracing::info!("{} customer(s)", customers.len());
    print_json(&customers)
}

/// Toggle one day on a card.
pub async fn stamp(customer_id: &str, day: usize) -> Result<(), CommandError> {
    let customer_id = parse_id(customer_id)?;
    let outcome = loyalty()
        .await?
        .toggle_stamp(&customer_id, day, Utc::now())
        .await?;
    if outcome.newly_completed {
        tracing::info!("{customer_id} completed their card and earned a free reward");
    }
    print_json(&outcome)
}

/// Clear a card.
pub async fn reset(customer_id: &str) -> Result<(), CommandError> {
    let customer_id = parse_id(customer_id)?;
    let update = loyalty()
        .await?
        .reset_stamps(&customer_id, Utc::now())
        .await?;
    print_json(&update)
}

/// Delete a customer.
pub async fn delete(customer_id: &str) -> Result<(), CommandError> {
    let customer_id = parse_id(customer_id)?;
    loyalty().await?.delete(&customer_id).await?;
    tracing::info!("Deleted {customer_id}");
    Ok(())
}
