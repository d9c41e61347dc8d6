//! In-memory customer store.
//!
//! Enforces the same uniqueness rules as the database. The `unavailable`
//! switch makes every call fail so callers can exercise outage handling;
//! a write budget makes writes fail after a fixed number of attempts.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use stampcard_core::{Customer, CustomerId, MobileNumber, StampUpdate};

use super::{CustomerStore, RepositoryError};

/// Customer store held in process memory.
#[derive(Debug, Default)]
pub struct MemoryCustomerStore {
    customers: RwLock<HashMap<CustomerId, Customer>>,
    unavailable: RwLock<bool>,
    write_budget: RwLock<Option<usize>>,
}

impl MemoryCustomerStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with [`RepositoryError::Unavailable`].
    pub async fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.write().await = unavailable;
    }

    /// Allow `writes` more write attempts, then fail every write with
    /// [`RepositoryError::Unavailable`]. Reads keep working.
    pub async fn fail_after_writes(&self, writes: usize) {
        *self.write_budget.write().await = Some(writes);
    }

    /// Number of stored customers.
    pub async fn len(&self) -> usize {
        self.customers.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.customers.read().await.is_empty()
    }

    async fn check_available(&self) -> Result<(), RepositoryError> {
        if *self.unavailable.read().await {
            return Err(RepositoryError::Unavailable(
                "in-memory store switched off".to_owned(),
            ));
        }
        Ok(())
    }

    async fn check_writable(&self) -> Result<(), RepositoryError> {
        self.check_available().await?;
        let mut budget = self.write_budget.write().await;
        match *budget {
            Some(0) => Err(RepositoryError::Unavailable(
                "in-memory store write budget spent".to_owned(),
            )),
            Some(ref mut left) => {
                *left -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

fn mobile_taken(
    customers: &HashMap<CustomerId, Customer>,
    mobile: &MobileNumber,
    except: &CustomerId,
) -> bool {
    customers
        .values()
        .any(|c| &c.mobile == mobile && &c.customer_id != except)
}

#[async_trait]
impl CustomerStore for MemoryCustomerStore {
    async fn create(&self, customer: &Customer) -> Result<Customer, RepositoryError> {
        self.check_writable().await?;
        let mut customers = self.customers.write().await;
        if customers.contains_key(&customer.customer_id) {
            return Err(RepositoryError::Conflict(
                "customer id already exists".to_owned(),
            ));
        }
        if mobile_taken(&customers, &customer.mobile, &customer.customer_id) {
            return Err(RepositoryError::Conflict(
                "mobile already registered".to_owned(),
            ));
        }
        customers.insert(customer.customer_id.clone(), customer.clone());
        Ok(customer.clone())
    }

    async fn upsert(&self, customer: &Customer) -> Result<(), RepositoryError> {
        self.check_writable().await?;
        let mut customers = self.customers.write().await;
        if mobile_taken(&customers, &customer.mobile, &customer.customer_id) {
            return Err(RepositoryError::Conflict(
                "mobile already registered".to_owned(),
            ));
        }
        customers.insert(customer.customer_id.clone(), customer.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError> {
        self.check_available().await?;
        Ok(self.customers.read().await.get(id).cloned())
    }

    async fn get_by_mobile(
        &self,
        mobile: &MobileNumber,
    ) -> Result<Option<Customer>, RepositoryError> {
        self.check_available().await?;
        Ok(self
            .customers
            .read()
            .await
            .values()
            .find(|c| &c.mobile == mobile)
            .cloned())
    }

    async fn update_stamps(
        &self,
        id: &CustomerId,
        update: &StampUpdate,
    ) -> Result<(), RepositoryError> {
        self.check_writable().await?;
        let mut customers = self.customers.write().await;
        let customer = customers.get_mut(id).ok_or(RepositoryError::NotFound)?;
        customer.apply(update);
        Ok(())
    }

    async fn delete(&self, id: &CustomerId) -> Result<(), RepositoryError> {
        self.check_writable().await?;
        self.customers
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    async fn list_all(&self) -> Result<Vec<Customer>, RepositoryError> {
        self.check_available().await?;
        let mut customers: Vec<Customer> = self.customers.read().await.values().cloned().collect();
        customers.sort_by(|a, b| {
            b.created_date
                .cmp(&a.created_date)
                .then_with(|| a.customer_id.cmp(&b.customer_id))
        });
        Ok(customers)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.check_available().await
    }
}
