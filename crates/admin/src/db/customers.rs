//! `PostgreSQL` customer store.
//!
//! Queries are built at runtime with `sqlx::query_as` so the crate builds
//! without a live database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument, warn};

use stampcard_core::{Customer, CustomerId, MobileNumber, StampCard, StampUpdate};

use super::{CustomerStore, RepositoryError};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `loyalty.customer` queries.
#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    customer_id: String,
    name: String,
    mobile: String,
    stamps: Vec<bool>,
    completed: bool,
    total_visits: i16,
    created_at: DateTime<Utc>,
    last_stamp_at: Option<DateTime<Utc>>,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = RepositoryError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let customer_id = CustomerId::parse(&row.customer_id).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid customer id in database: {e}"))
        })?;
        let mobile = MobileNumber::parse(&row.mobile).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid mobile in database: {e}"))
        })?;
        let stamps = StampCard::try_from(row.stamps).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid stamp card in database: {e}"))
        })?;

        if row.completed != stamps.is_completed() || row.total_visits != i16::from(stamps.count())
        {
            warn!(
                customer_id = %customer_id,
                stored_completed = row.completed,
                stored_total_visits = row.total_visits,
                card = %stamps,
                "Stored counters disagree with stamp card, using the card"
            );
        }

        Ok(Self {
            customer_id,
            name: row.name,
            mobile,
            stamps,
            created_date: row.created_at,
            last_stamp_date: row.last_stamp_at,
        })
    }
}

fn conflict_or_database(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        let message = match db_err.constraint() {
            Some(constraint) if constraint.contains("mobile") => "mobile already registered",
            _ => "customer id already exists",
        };
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(e)
}

// =============================================================================
// Repository
// =============================================================================

/// Customer store backed by the `loyalty.customer` table.
#[derive(Debug, Clone)]
pub struct PgCustomerStore {
    pool: PgPool,
}

impl PgCustomerStore {
    /// Create a new customer store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerStore for PgCustomerStore {
    #[instrument(skip(self, customer), fields(customer_id = %customer.customer_id))]
    async fn create(&self, customer: &Customer) -> Result<Customer, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            INSERT INTO loyalty.customer
                (customer_id, name, mobile, stamps, completed, total_visits, created_at, last_stamp_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING customer_id, name, mobile, stamps, completed, total_visits,
                      created_at, last_stamp_at
            ",
        )
        .bind(&customer.customer_id)
        .bind(&customer.name)
        .bind(&customer.mobile)
        .bind(customer.stamps.to_vec())
        .bind(customer.completed())
        .bind(i16::from(customer.total_visits()))
        .bind(customer.created_date)
        .bind(customer.last_stamp_date)
        .fetch_one(&self.pool)
        .await
        .map_err(conflict_or_database)?;

        debug!("Inserted customer");
        row.try_into()
    }

    #[instrument(skip(self, customer), fields(customer_id = %customer.customer_id))]
    async fn upsert(&self, customer: &Customer) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO loyalty.customer
                (customer_id, name, mobile, stamps, completed, total_visits, created_at, last_stamp_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (customer_id) DO UPDATE SET
                name = EXCLUDED.name,
                mobile = EXCLUDED.mobile,
                stamps = EXCLUDED.stamps,
                completed = EXCLUDED.completed,
                total_visits = EXCLUDED.total_visits,
                created_at = EXCLUDED.created_at,
                last_stamp_at = EXCLUDED.last_stamp_at
            ",
        )
        .bind(&customer.customer_id)
        .bind(&customer.name)
        .bind(&customer.mobile)
        .bind(customer.stamps.to_vec())
        .bind(customer.completed())
        .bind(i16::from(customer.total_visits()))
        .bind(customer.created_date)
        .bind(customer.last_stamp_date)
        .execute(&self.pool)
        .await
        .map_err(conflict_or_database)?;

        Ok(())
    }

    #[instrument(skip(self), fields(customer_id = %id))]
    async fn get_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            SELECT customer_id, name, mobile, stamps, completed, total_visits,
                   created_at, last_stamp_at
            FROM loyalty.customer
            WHERE customer_id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    #[instrument(skip(self, mobile))]
    async fn get_by_mobile(
        &self,
        mobile: &MobileNumber,
    ) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            SELECT customer_id, name, mobile, stamps, completed, total_visits,
                   created_at, last_stamp_at
            FROM loyalty.customer
            WHERE mobile = $1
            ",
        )
        .bind(mobile)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    #[instrument(skip(self, update), fields(customer_id = %id, card = %update.stamps))]
    async fn update_stamps(
        &self,
        id: &CustomerId,
        update: &StampUpdate,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE loyalty.customer
            SET stamps = $2, completed = $3, total_visits = $4, last_stamp_at = $5
            WHERE customer_id = $1
            ",
        )
        .bind(id)
        .bind(update.stamps.to_vec())
        .bind(update.completed)
        .bind(i16::from(update.total_visits))
        .bind(update.last_stamp_date)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(customer_id = %id))]
    async fn delete(&self, id: &CustomerId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM loyalty.customer WHERE customer_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<Customer>, RepositoryError> {
        let rows = sqlx::query_as::<_, CustomerRow>(
            r"
            SELECT customer_id, name, mobile, stamps, completed, total_visits,
                   created_at, last_stamp_at
            FROM loyalty.customer
            ORDER BY created_at DESC, customer_id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
