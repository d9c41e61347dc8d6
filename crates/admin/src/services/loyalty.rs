//! Loyalty operations over a [`CustomerStore`].
//!
//! Every operation is a short unit of work against the store. Instants are
//! passed in by the caller so the same inputs always yield the same writes.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use stampcard_core::{
    Customer, CustomerId, DashboardStats, Insight, LoyaltyReport, MobileNumber, StampCard,
    StampUpdate, insights,
};

use crate::db::{CustomerStore, RepositoryError};

/// Default bound on identifier regeneration during registration.
pub const DEFAULT_MAX_ID_ATTEMPTS: u32 = 50;

/// Errors returned by loyalty operations.
#[derive(Debug, Error)]
pub enum LoyaltyError {
    /// Malformed caller input.
    #[error("{0}")]
    Validation(String),

    /// No customer matches the id or search term.
    #[error("customer not found: {0}")]
    NotFound(String),

    /// The mobile number or customer id is already taken.
    #[error("{0}")]
    AlreadyExists(String),

    /// Every generated identifier collided with an existing customer.
    #[error("could not allocate a free customer id after {attempts} attempts")]
    IdentifierSpaceExhausted { attempts: u32 },

    /// The store failed; the operation was not retried.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[source] RepositoryError),

    /// The store failed partway through an import. Earlier records stay written.
    #[error("import interrupted after {imported} records: {source}")]
    ImportInterrupted {
        imported: usize,
        #[source]
        source: RepositoryError,
    },
}

impl From<RepositoryError> for LoyaltyError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("customer".to_owned()),
            RepositoryError::Conflict(message) => Self::AlreadyExists(message),
            other => Self::StoreUnavailable(other),
        }
    }
}

/// Source of candidate customer ids.
pub type IdSource = Arc<dyn Fn() -> CustomerId + Send + Sync>;

/// Result of toggling a single day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleOutcome {
    pub customer_id: CustomerId,
    pub day: usize,
    /// Whether the day is stamped after the toggle.
    pub stamped: bool,
    /// Whether this toggle moved the card from incomplete to complete.
    pub newly_completed: bool,
    #[serde(flatten)]
    pub update: StampUpdate,
}

/// One record of a bulk import.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRecord {
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub stamps: Option<Vec<bool>>,
    #[serde(default)]
    pub last_stamp_date: Option<DateTime<Utc>>,
}

/// Outcome of a bulk import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub imported: usize,
    /// One message per rejected record, prefixed with its 1-based position.
    pub errors: Vec<String>,
}

/// Customer registration, stamping, lookup and reporting.
#[derive(Clone)]
pub struct LoyaltyService {
    store: Arc<dyn CustomerStore>,
    id_source: IdSource,
    max_id_attempts: u32,
}

impl fmt::Debug for LoyaltyService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoyaltyService")
            .field("max_id_attempts", &self.max_id_attempts)
            .finish_non_exhaustive()
    }
}

impl LoyaltyService {
    /// Create a service generating random `RK####` ids.
    #[must_use]
    pub fn new(store: Arc<dyn CustomerStore>) -> Self {
        Self {
            store,
            id_source: Arc::new(CustomerId::random),
            max_id_attempts: DEFAULT_MAX_ID_ATTEMPTS,
        }
    }

    /// Replace the id generator.
    #[must_use]
    pub fn with_id_source<F>(mut self, source: F) -> Self
    where
        F: Fn() -> CustomerId + Send + Sync + 'static,
    {
        self.id_source = Arc::new(source);
        self
    }

    /// Bound the number of ids tried per registration. Values below 1 are
    /// raised to 1.
    #[must_use]
    pub fn with_max_id_attempts(mut self, attempts: u32) -> Self {
        self.max_id_attempts = attempts.max(1);
        self
    }

    /// The backing store.
    #[must_use]
    pub fn store(&self) -> &dyn CustomerStore {
        self.store.as_ref()
    }

    /// Register a new customer with an empty card.
    ///
    /// # Errors
    ///
    /// - `Validation` if the name is blank or the mobile is malformed
    /// - `AlreadyExists` if the mobile is already registered
    /// - `IdentifierSpaceExhausted` if no free id was found within the bound
    /// - `StoreUnavailable` if the store fails
    #[instrument(skip(self, name, mobile))]
    pub async fn register(
        &self,
        name: &str,
        mobile: &str,
        now: DateTime<Utc>,
    ) -> Result<Customer, LoyaltyError> {
        let name = validate_name(name)?;
        let mobile = parse_mobile(mobile)?;

        if self.store.get_by_mobile(&mobile).await?.is_some() {
            debug!("Mobile already registered");
            return Err(LoyaltyError::AlreadyExists(
                "mobile number already registered".to_owned(),
            ));
        }

        let customer_id = self.allocate_id().await?;
        let customer = Customer::register(customer_id, name, mobile, now);
        let created = self.store.create(&customer).await?;

        info!(customer_id = %created.customer_id, "Customer registered");
        Ok(created)
    }

    async fn allocate_id(&self) -> Result<CustomerId, LoyaltyError> {
        for attempt in 1..=self.max_id_attempts {
            let candidate = (self.id_source)();
            if self.store.get_by_id(&candidate).await?.is_none() {
                return Ok(candidate);
            }
            debug!(attempt, candidate = %candidate, "Customer id collision");
        }
        warn!(attempts = self.max_id_attempts, "Customer id space exhausted");
        Err(LoyaltyError::IdentifierSpaceExhausted {
            attempts: self.max_id_attempts,
        })
    }

    /// Replace the whole card and persist the recomputed fields.
    ///
    /// # Errors
    ///
    /// `NotFound` if the customer does not exist, `StoreUnavailable` if the
    /// store fails.
    #[instrument(skip(self), fields(customer_id = %id, card = %stamps))]
    pub async fn update_stamps(
        &self,
        id: &CustomerId,
        stamps: StampCard,
        now: DateTime<Utc>,
    ) -> Result<StampUpdate, LoyaltyError> {
        let update = StampUpdate::compute(stamps, now);
        self.store
            .update_stamps(id, &update)
            .await
            .map_err(|e| not_found_as(e, id))?;
        Ok(update)
    }

    /// Flip one day of a customer's card.
    ///
    /// # Errors
    ///
    /// `Validation` if `day` is not in `0..6`, `NotFound` if the customer does
    /// not exist, `StoreUnavailable` if the store fails.
    #[instrument(skip(self), fields(customer_id = %id))]
    pub async fn toggle_stamp(
        &self,
        id: &CustomerId,
        day: usize,
        now: DateTime<Utc>,
    ) -> Result<ToggleOutcome, LoyaltyError> {
        let customer = self.get(id).await?;
        let was_completed = customer.completed();
        let card = customer
            .stamps
            .toggled(day)
            .map_err(|e| LoyaltyError::Validation(e.to_string()))?;

        let update = self.update_stamps(id, card, now).await?;
        let newly_completed = update.newly_completed(was_completed);
        if newly_completed {
            info!("Card completed, free reward earned");
        }

        Ok(ToggleOutcome {
            customer_id: id.clone(),
            day,
            stamped: card.is_stamped(day).unwrap_or(false),
            newly_completed,
            update,
        })
    }

    /// Clear every stamp.
    ///
    /// # Errors
    ///
    /// Same as [`Self::update_stamps`].
    pub async fn reset_stamps(
        &self,
        id: &CustomerId,
        now: DateTime<Utc>,
    ) -> Result<StampUpdate, LoyaltyError> {
        self.update_stamps(id, StampCard::empty(), now).await
    }

    /// Find a customer by id (terms starting with `RK`) or by mobile.
    ///
    /// Malformed terms of either shape are reported as `NotFound`.
    ///
    /// # Errors
    ///
    /// `NotFound` if nothing matches, `StoreUnavailable` if the store fails.
    #[instrument(skip(self))]
    pub async fn lookup(&self, term: &str) -> Result<Customer, LoyaltyError> {
        let term = term.trim();
        let found = if CustomerId::is_identifier_shaped(term) {
            match CustomerId::parse(term) {
                Ok(id) => self.store.get_by_id(&id).await?,
                Err(_) => None,
            }
        } else {
            match MobileNumber::parse(term) {
                Ok(mobile) => self.store.get_by_mobile(&mobile).await?,
                Err(_) => None,
            }
        };
        found.ok_or_else(|| LoyaltyError::NotFound(term.to_owned()))
    }

    /// Get a customer by id.
    ///
    /// # Errors
    ///
    /// `NotFound` if the customer does not exist, `StoreUnavailable` if the
    /// store fails.
    pub async fn get(&self, id: &CustomerId) -> Result<Customer, LoyaltyError> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or_else(|| LoyaltyError::NotFound(id.to_string()))
    }

    /// Delete a customer.
    ///
    /// # Errors
    ///
    /// `NotFound` if the customer does not exist, `StoreUnavailable` if the
    /// store fails.
    #[instrument(skip(self), fields(customer_id = %id))]
    pub async fn delete(&self, id: &CustomerId) -> Result<(), LoyaltyError> {
        self.store
            .delete(id)
            .await
            .map_err(|e| not_found_as(e, id))?;
        info!("Customer deleted");
        Ok(())
    }

    /// All customers, newest first, narrowed by an optional filter.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` if the store fails.
    pub async fn list(&self, query: Option<&str>) -> Result<Vec<Customer>, LoyaltyError> {
        let mut customers = self.store.list_all().await?;
        if let Some(query) = query {
            customers.retain(|c| c.matches(query));
        }
        Ok(customers)
    }

    /// Aggregate report as of `now`.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` if the store fails.
    #[instrument(skip(self))]
    pub async fn report(&self, now: DateTime<Utc>) -> Result<LoyaltyReport, LoyaltyError> {
        let customers = self.store.list_all().await?;
        Ok(LoyaltyReport::compute(&customers, now))
    }

    /// Advisory insights as of `now`.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` if the store fails.
    pub async fn insights(&self, now: DateTime<Utc>) -> Result<Vec<Insight>, LoyaltyError> {
        Ok(insights::generate(&self.report(now).await?))
    }

    /// Dashboard counters.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` if the store fails.
    pub async fn stats(&self, now: DateTime<Utc>) -> Result<DashboardStats, LoyaltyError> {
        Ok(self.report(now).await?.stats())
    }

    /// Import customer records, validating each one independently.
    ///
    /// Existing ids are overwritten. A record whose mobile belongs to a
    /// different customer is rejected. The import is not atomic: a store
    /// outage stops it, and records written before the outage are kept.
    ///
    /// # Errors
    ///
    /// `ImportInterrupted` (carrying the number of records already written)
    /// if the store fails; per-record problems are collected in the summary
    /// instead.
    #[instrument(skip(self, records), fields(count = records.len()))]
    pub async fn import(
        &self,
        records: Vec<ImportRecord>,
        now: DateTime<Utc>,
    ) -> Result<ImportSummary, LoyaltyError> {
        let mut summary = ImportSummary::default();

        for (index, record) in records.into_iter().enumerate() {
            let position = index + 1;
            match self.import_one(record, now).await {
                Ok(customer_id) => {
                    debug!(position, customer_id = %customer_id, "Imported record");
                    summary.imported += 1;
                }
                Err(LoyaltyError::StoreUnavailable(source)) => {
                    warn!(
                        position,
                        imported = summary.imported,
                        "Import interrupted by store failure"
                    );
                    return Err(LoyaltyError::ImportInterrupted {
                        imported: summary.imported,
                        source,
                    });
                }
                Err(e) => summary.errors.push(format!("record {position}: {e}")),
            }
        }

        info!(
            imported = summary.imported,
            rejected = summary.errors.len(),
            "Import finished"
        );
        Ok(summary)
    }

    async fn import_one(
        &self,
        record: ImportRecord,
        now: DateTime<Utc>,
    ) -> Result<CustomerId, LoyaltyError> {
        let name = validate_name(&record.name)?;
        let mobile = parse_mobile(&record.mobile)?;
        let stamps = match record.stamps {
            Some(stamps) => StampCard::try_from(stamps)
                .map_err(|e| LoyaltyError::Validation(e.to_string()))?,
            None => StampCard::empty(),
        };

        let customer_id = match record.customer_id.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => CustomerId::parse(raw)
                .map_err(|e| LoyaltyError::Validation(format!("invalid customer id: {e}")))?,
            _ => self.allocate_id().await?,
        };

        if let Some(owner) = self.store.get_by_mobile(&mobile).await?
            && owner.customer_id != customer_id
        {
            return Err(LoyaltyError::AlreadyExists(format!(
                "mobile number already registered to {}",
                owner.customer_id
            )));
        }

        let customer = Customer {
            customer_id: customer_id.clone(),
            name,
            mobile,
            stamps,
            created_date: now,
            last_stamp_date: record.last_stamp_date,
        };
        self.store.upsert(&customer).await?;
        Ok(customer_id)
    }
}

fn not_found_as(err: RepositoryError, id: &CustomerId) -> LoyaltyError {
    match err {
        RepositoryError::NotFound => LoyaltyError::NotFound(id.to_string()),
        other => other.into(),
    }
}

fn validate_name(name: &str) -> Result<String, LoyaltyError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LoyaltyError::Validation("name is required".to_owned()));
    }
    Ok(name.to_owned())
}

fn parse_mobile(mobile: &str) -> Result<MobileNumber, LoyaltyError> {
    MobileNumber::parse(mobile.trim()).map_err(|e| LoyaltyError::Validation(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU16, Ordering};

    use chrono::Duration;

    use super::*;
    use crate::db::MemoryCustomerStore;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_750_000_000, 0).unwrap()
    }

    fn service(store: &Arc<MemoryCustomerStore>) -> LoyaltyService {
        let next = AtomicU16::new(1000);
        LoyaltyService::new(store.clone())
            .with_id_source(move || {
                CustomerId::from_number(next.fetch_add(1, Ordering::SeqCst)).unwrap()
            })
    }

    fn id(s: &str) -> CustomerId {
        CustomerId::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_register_creates_empty_card() {
        let store = Arc::new(MemoryCustomerStore::new());
        let customer = service(&store)
            .register("  Asha  ", "+919876543210", now())
            .await
            .unwrap();

        assert_eq!(customer.customer_id.as_str(), "RK1000");
        assert_eq!(customer.name, "Asha");
        assert_eq!(customer.stamps, StampCard::empty());
        assert_eq!(customer.created_date, now());
        assert!(customer.last_stamp_date.is_none());
    }

    #[tokio::test]
    async fn test_register_duplicate_mobile() {
        let store = Arc::new(MemoryCustomerStore::new());
        let service = service(&store);
        service
            .register("Asha", "+919876543210", now())
            .await
            .unwrap();

        let err = service
            .register("Someone Else", "+919876543210", now())
            .await
            .unwrap_err();
        assert!(matches!(err, LoyaltyError::AlreadyExists(_)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_register_validation() {
        let store = Arc::new(MemoryCustomerStore::new());
        let service = service(&store);

        assert!(matches!(
            service.register("   ", "+919876543210", now()).await,
            Err(LoyaltyError::Validation(_))
        ));
        assert!(matches!(
            service.register("Asha", "9876543210", now()).await,
            Err(LoyaltyError::Validation(_))
        ));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_register_retries_on_collision() {
        let store = Arc::new(MemoryCustomerStore::new());
        let candidates = Mutex::new(vec!["RK5555", "RK5555", "RK7777"].into_iter());
        let service = LoyaltyService::new(store.clone())
            .with_id_source(move || id(candidates.lock().unwrap().next().unwrap()));

        let first = service
            .register("A", "+919000000001", now())
            .await
            .unwrap();
        let second = service
            .register("B", "+919000000002", now())
            .await
            .unwrap();

        assert_eq!(first.customer_id.as_str(), "RK5555");
        assert_eq!(second.customer_id.as_str(), "RK7777");
    }

    #[tokio::test]
    async fn test_register_exhausts_id_space() {
        let store = Arc::new(MemoryCustomerStore::new());
        let service = LoyaltyService::new(store.clone())
            .with_id_source(|| id("RK4000"))
            .with_max_id_attempts(3);
        service
            .register("A", "+919000000001", now())
            .await
            .unwrap();

        let err = service
            .register("B", "+919000000002", now())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LoyaltyError::IdentifierSpaceExhausted { attempts: 3 }
        ));
    }

    #[tokio::test]
    async fn test_store_outage_is_surfaced() {
        let store = Arc::new(MemoryCustomerStore::new());
        store.set_unavailable(true).await;

        let err = service(&store)
            .register("A", "+919000000001", now())
            .await
            .unwrap_err();
        assert!(matches!(err, LoyaltyError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_lookup_by_id_and_mobile() {
        let store = Arc::new(MemoryCustomerStore::new());
        let service = service(&store);
        let customer = service
            .register("Asha", "+919876543210", now())
            .await
            .unwrap();

        let by_id = service.lookup("RK1000").await.unwrap();
        assert_eq!(by_id, customer);
        let by_mobile = service.lookup(" +919876543210 ").await.unwrap();
        assert_eq!(by_mobile, customer);

        for term in ["RK1234", "RKabc", "+919999999999", "hello", ""] {
            assert!(
                matches!(service.lookup(term).await, Err(LoyaltyError::NotFound(_))),
                "term {term:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_toggle_reports_completion_once() {
        let store = Arc::new(MemoryCustomerStore::new());
        let service = service(&store);
        let customer = service
            .register("Asha", "+919876543210", now())
            .await
            .unwrap();
        let id = customer.customer_id;

        for day in 0..5 {
            let outcome = service.toggle_stamp(&id, day, now()).await.unwrap();
            assert!(outcome.stamped);
            assert!(!outcome.newly_completed);
        }

        let later = now() + Duration::minutes(5);
        let outcome = service.toggle_stamp(&id, 5, later).await.unwrap();
        assert!(outcome.newly_completed);
        assert!(outcome.update.completed);
        assert_eq!(outcome.update.total_visits, 6);
        assert_eq!(outcome.update.last_stamp_date, later);

        // Un-stamping and re-stamping the last day completes again.
        let outcome = service.toggle_stamp(&id, 5, later).await.unwrap();
        assert!(!outcome.stamped);
        assert!(!outcome.update.completed);
        let outcome = service.toggle_stamp(&id, 5, later).await.unwrap();
        assert!(outcome.newly_completed);
    }

    #[tokio::test]
    async fn test_toggle_rejects_bad_day_and_missing_customer() {
        let store = Arc::new(MemoryCustomerStore::new());
        let service = service(&store);
        let customer = service
            .register("Asha", "+919876543210", now())
            .await
            .unwrap();

        assert!(matches!(
            service.toggle_stamp(&customer.customer_id, 6, now()).await,
            Err(LoyaltyError::Validation(_))
        ));
        assert!(matches!(
            service.toggle_stamp(&id("RK9999"), 0, now()).await,
            Err(LoyaltyError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_and_reset() {
        let store = Arc::new(MemoryCustomerStore::new());
        let service = service(&store);
        let customer = service
            .register("Asha", "+919876543210", now())
            .await
            .unwrap();
        let customer_id = customer.customer_id;

        let update = service
            .update_stamps(&customer_id, StampCard::full(), now())
            .await
            .unwrap();
        assert!(update.completed);

        let update = service.reset_stamps(&customer_id, now()).await.unwrap();
        assert!(!update.completed);
        assert_eq!(update.total_visits, 0);

        let stored = service.get(&customer_id).await.unwrap();
        assert_eq!(stored.stamps, StampCard::empty());
        assert_eq!(stored.last_stamp_date, Some(now()));

        assert!(matches!(
            service
                .update_stamps(&id("RK9999"), StampCard::full(), now())
                .await,
            Err(LoyaltyError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = Arc::new(MemoryCustomerStore::new());
        let service = service(&store);
        let customer = service
            .register("Asha", "+919876543210", now())
            .await
            .unwrap();

        service.delete(&customer.customer_id).await.unwrap();
        assert!(matches!(
            service.delete(&customer.customer_id).await,
            Err(LoyaltyError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_filter() {
        let store = Arc::new(MemoryCustomerStore::new());
        let service = service(&store);
        service
            .register("Asha", "+919000000001", now())
            .await
            .unwrap();
        service
            .register("Ravi", "+919000000002", now() + Duration::hours(1))
            .await
            .unwrap();

        let all = service.list(None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Ravi");

        let filtered = service.list(Some("ash")).await.unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "Asha");
    }

    #[tokio::test]
    async fn test_report_and_insights() {
        let store = Arc::new(MemoryCustomerStore::new());
        let service = service(&store);
        for n in 0..10u8 {
            let customer = service
                .register("C", &format!("+9190000000{n:02}"), now())
                .await
                .unwrap();
            if n < 9 {
                service
                    .update_stamps(&customer.customer_id, StampCard::full(), now())
                    .await
                    .unwrap();
            }
        }

        let report = service.report(now()).await.unwrap();
        assert_eq!(report.total_customers, 10);
        assert_eq!(report.completed_cards, 9);
        assert_eq!(report.free_rewards_given, 9);

        let stats = service.stats(now()).await.unwrap();
        assert_eq!(stats.free_rewards, 9);

        let insights = service.insights(now()).await.unwrap();
        assert!(
            insights
                .iter()
                .any(|i| i.title == "Excellent Completion Rate!")
        );
        assert!(!insights.iter().any(|i| i.title == "Low Completion Rate"));
    }

    #[tokio::test]
    async fn test_import_validates_each_record() {
        let store = Arc::new(MemoryCustomerStore::new());
        let service = service(&store);
        service
            .register("Existing", "+919000000009", now())
            .await
            .unwrap();

        let records = vec![
            ImportRecord {
                customer_id: Some("RK2000".to_string()),
                name: "Full Card".to_string(),
                mobile: "+919000000001".to_string(),
                stamps: Some(vec![true; 6]),
                ..ImportRecord::default()
            },
            ImportRecord {
                name: "Generated Id".to_string(),
                mobile: "+919000000002".to_string(),
                ..ImportRecord::default()
            },
            ImportRecord {
                name: "Bad Mobile".to_string(),
                mobile: "12345".to_string(),
                ..ImportRecord::default()
            },
            ImportRecord {
                name: "Short Card".to_string(),
                mobile: "+919000000003".to_string(),
                stamps: Some(vec![true; 3]),
                ..ImportRecord::default()
            },
            ImportRecord {
                name: "Stolen Mobile".to_string(),
                mobile: "+919000000009".to_string(),
                ..ImportRecord::default()
            },
        ];

        let summary = service.import(records, now()).await.unwrap();
        assert_eq!(summary.imported, 2);
        assert_eq!(summary.errors.len(), 3);
        assert!(summary.errors[0].starts_with("record 3:"));
        assert!(summary.errors[2].starts_with("record 5:"));

        let full = service.get(&id("RK2000")).await.unwrap();
        assert!(full.completed());
        assert_eq!(full.total_visits(), 6);
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test]
    async fn test_import_overwrites_existing_id() {
        let store = Arc::new(MemoryCustomerStore::new());
        let service = service(&store);
        let customer = service
            .register("Old Name", "+919000000001", now())
            .await
            .unwrap();

        let summary = service
            .import(
                vec![ImportRecord {
                    customer_id: Some(customer.customer_id.to_string()),
                    name: "New Name".to_string(),
                    mobile: "+919000000001".to_string(),
                    stamps: Some(vec![true, false, true, false, false, false]),
                    ..ImportRecord::default()
                }],
                now(),
            )
            .await
            .unwrap();
        assert_eq!(summary.imported, 1);

        let updated = service.get(&customer.customer_id).await.unwrap();
        assert_eq!(updated.name, "New Name");
        assert_eq!(updated.total_visits(), 2);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_import_interrupted_reports_written_records() {
        let store = Arc::new(MemoryCustomerStore::new());
        let service = service(&store);
        store.fail_after_writes(2).await;

        let records = (1..=4)
            .map(|n| ImportRecord {
                customer_id: Some(format!("RK200{n}")),
                name: format!("Customer {n}"),
                mobile: format!("+91900000000{n}"),
                ..ImportRecord::default()
            })
            .collect();

        let err = service.import(records, now()).await.unwrap_err();

        assert!(matches!(
            err,
            LoyaltyError::ImportInterrupted { imported: 2, .. }
        ));
        assert_eq!(store.len().await, 2);
        assert!(service.get(&id("RK2002")).await.is_ok());
    }

    #[test]
    fn test_repository_error_mapping() {
        assert!(matches!(
            LoyaltyError::from(RepositoryError::NotFound),
            LoyaltyError::NotFound(_)
        ));
        assert!(matches!(
            LoyaltyError::from(RepositoryError::Conflict("x".to_string())),
            LoyaltyError::AlreadyExists(_)
        ));
        assert!(matches!(
            LoyaltyError::from(RepositoryError::DataCorruption("x".to_string())),
            LoyaltyError::StoreUnavailable(_)
        ));
    }
}
