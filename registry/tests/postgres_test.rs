//! Runs against a live PostgreSQL configured through the usual DB_* variables.
//! The `devices` table is truncated, so point it at a scratch database:
//!
//! DB_NAME=smart_home_test cargo test -p registry -- --ignored

use clap::Parser;
use registry::config::Config;
use registry::db::{make_pool, DeviceStore, PgDeviceStore};
use registry::model::{seed_devices, NewDevice};

async fn fresh_store() -> PgDeviceStore {
    let config = Config::try_parse_from(["registry"]).expect("config from environment");
    let pool = make_pool(&config).await.expect("database reachable");

    sqlx::query("TRUNCATE devices RESTART IDENTITY")
        .execute(&pool)
        .await
        .expect("truncate devices");

    PgDeviceStore::new(pool)
}

#[tokio::test]
#[ignore]
async fn test_seed_runs_once() {
    let store = fresh_store().await;

    assert_eq!(store.seed_if_empty(&seed_devices()).await.unwrap(), 3);
    // Second startup against the same table
    assert_eq!(store.seed_if_empty(&seed_devices()).await.unwrap(), 0);

    let devices = store.list().await.unwrap();
    assert_eq!(devices.len(), 3);
    assert_eq!(devices[0].name, "Living Room Sensor");
    assert_eq!(devices[2].device_type, "switch");
}

#[tokio::test]
#[ignore]
async fn test_create_and_fetch() {
    let store = fresh_store().await;
    store.seed_if_empty(&seed_devices()).await.unwrap();

    let created = store
        .create(&NewDevice::new("Hallway Sensor", "Hallway", "temperature"))
        .await
        .unwrap();
    assert!(created.id > 3);

    let fetched = store.get(created.id).await.unwrap().expect("device exists");
    assert_eq!(fetched, created);
    assert!(store.get(created.id + 1000).await.unwrap().is_none());

    let ids: Vec<i64> = store.list().await.unwrap().iter().map(|d| d.id).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
}

#[tokio::test]
#[ignore]
async fn test_ping() {
    let store = fresh_store().await;
    assert!(store.ping().await.is_ok());
}
