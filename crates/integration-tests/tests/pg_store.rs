//! `PgCustomerStore` against a live `PostgreSQL` database.
//!
//! Ignored by default. Run with:
//!
//! ```bash
//! STAMPCARD_DATABASE_URL=postgres://... cargo test -p stampcard-integration-tests -- --include-ignored
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{Duration, DurationRound, Utc};
use secrecy::SecretString;

use stampcard_admin::{CustomerStore, PgCustomerStore, RepositoryError, db};
use stampcard_core::{Customer, CustomerId, MobileNumber, StampCard, StampUpdate};

async fn store() -> PgCustomerStore {
    let url = std::env::var("STAMPCARD_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("STAMPCARD_DATABASE_URL must be set");
    let pool = db::create_pool(&SecretString::from(url))
        .await
        .expect("database reachable");
    sqlx::migrate!("../admin/migrations")
        .run(&pool)
        .await
        .expect("migrations apply");
    PgCustomerStore::new(pool)
}

/// A customer in the RK99xx range, removed first if a previous run left it.
async fn fresh_customer(store: &PgCustomerStore, number: u16) -> Customer {
    let customer_id = CustomerId::from_number(number).unwrap();
    let _ = store.delete(&customer_id).await;

    // Postgres keeps microseconds.
    let now = Utc::now().duration_trunc(Duration::seconds(1)).unwrap();
    Customer::register(
        customer_id,
        format!("Store Test {number}"),
        MobileNumber::parse(&format!("+91990000{number}")).unwrap(),
        now,
    )
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (STAMPCARD_DATABASE_URL)"]
async fn test_create_and_fetch() {
    let store = store().await;
    let customer = fresh_customer(&store, 9901).await;

    let created = store.create(&customer).await.unwrap();
    assert_eq!(created, customer);

    let by_id = store.get_by_id(&customer.customer_id).await.unwrap();
    assert_eq!(by_id.as_ref(), Some(&customer));
    let by_mobile = store.get_by_mobile(&customer.mobile).await.unwrap();
    assert_eq!(by_mobile.as_ref(), Some(&customer));

    store.delete(&customer.customer_id).await.unwrap();
    assert!(store.get_by_id(&customer.customer_id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (STAMPCARD_DATABASE_URL)"]
async fn test_duplicate_id_conflicts() {
    let store = store().await;
    let customer = fresh_customer(&store, 9902).await;
    store.create(&customer).await.unwrap();

    let err = store.create(&customer).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)), "{err:?}");

    store.delete(&customer.customer_id).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (STAMPCARD_DATABASE_URL)"]
async fn test_update_stamps_persists_counters() {
    let store = store().await;
    let customer = fresh_customer(&store, 9903).await;
    store.create(&customer).await.unwrap();

    let update = StampUpdate::compute(StampCard::full(), customer.created_date);
    store.update_stamps(&customer.customer_id, &update).await.unwrap();

    let stored = store
        .get_by_id(&customer.customer_id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.completed());
    assert_eq!(stored.total_visits(), 6);
    assert_eq!(stored.last_stamp_date, Some(customer.created_date));

    store.delete(&customer.customer_id).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (STAMPCARD_DATABASE_URL)"]
async fn test_missing_customer_is_not_found() {
    let store = store().await;
    let customer = fresh_customer(&store, 9904).await;

    let update = StampUpdate::compute(StampCard::empty(), customer.created_date);
    let err = store
        .update_stamps(&customer.customer_id, &update)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));

    let err = store.delete(&customer.customer_id).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (STAMPCARD_DATABASE_URL)"]
async fn test_upsert_replaces_card() {
    let store = store().await;
    let mut customer = fresh_customer(&store, 9905).await;
    store.upsert(&customer).await.unwrap();

    customer.stamps = StampCard::from_bits(0b0000_0111);
    customer.name = "Renamed".to_string();
    store.upsert(&customer).await.unwrap();

    let stored = store
        .get_by_id(&customer.customer_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.name, "Renamed");
    assert_eq!(stored.total_visits(), 3);

    store.ping().await.unwrap();
    store.delete(&customer.customer_id).await.unwrap();
}
