//! The loyalty customer record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use super::{CustomerId, MobileNumber, StampCard, StampUpdate};

/// A registered loyalty customer.
///
/// `completed` and `total_visits` are not stored on the struct; they are
/// always derived from `stamps`. They are still emitted when serializing so
/// API consumers see the full record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Unique `RK####` identifier.
    pub customer_id: CustomerId,
    /// Display name.
    pub name: String,
    /// Unique mobile number.
    pub mobile: MobileNumber,
    /// Stamp card.
    pub stamps: StampCard,
    /// Registration instant (never mutated).
    pub created_date: DateTime<Utc>,
    /// Instant of the most recent stamp mutation.
    pub last_stamp_date: Option<DateTime<Utc>>,
}

impl Customer {
    /// A freshly registered customer with an empty card.
    #[must_use]
    pub const fn register(
        customer_id: CustomerId,
        name: String,
        mobile: MobileNumber,
        created_date: DateTime<Utc>,
    ) -> Self {
        Self {
            customer_id,
            name,
            mobile,
            stamps: StampCard::empty(),
            created_date,
            last_stamp_date: None,
        }
    }

    /// Whether all six days are stamped.
    #[must_use]
    pub fn completed(&self) -> bool {
        self.stamps.is_completed()
    }

    /// Count of stamped days.
    #[must_use]
    pub fn total_visits(&self) -> u8 {
        self.stamps.count()
    }

    /// Replace the card and record the mutation instant.
    pub fn apply(&mut self, update: &StampUpdate) {
        self.stamps = update.stamps;
        self.last_stamp_date = Some(update.last_stamp_date);
    }

    /// Admin list filter: case-insensitive match on name or id, substring
    /// match on mobile. An empty query matches everything.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return true;
        }
        let lowered = query.to_lowercase();
        self.name.to_lowercase().contains(&lowered)
            || self.customer_id.as_str().to_lowercase().contains(&lowered)
            || self.mobile.as_str().contains(query)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CustomerRecord<'a> {
    customer_id: &'a CustomerId,
    name: &'a str,
    mobile: &'a MobileNumber,
    stamps: &'a StampCard,
    completed: bool,
    total_visits: u8,
    created_date: &'a DateTime<Utc>,
    last_stamp_date: Option<&'a DateTime<Utc>>,
}

impl Serialize for Customer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        CustomerRecord {
            customer_id: &self.customer_id,
            name: &self.name,
            mobile: &self.mobile,
            stamps: &self.stamps,
            completed: self.completed(),
            total_visits: self.total_visits(),
            created_date: &self.created_date,
            last_stamp_date: self.last_stamp_date.as_ref(),
        }
        .serialize(serializer)
    }
}
