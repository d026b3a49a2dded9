use crate::config::Config;
use crate::errors::Result;
use crate::metrics::QUERY_LATENCY_SECONDS;
use crate::model::{Device, NewDevice};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Instant;
use tracing::{debug, info};

#[cfg(test)]
pub mod memory;

const DEVICE_COLUMNS: &str = "id, name, location, type, created_at";

/// Storage for device records. The backing store is the source of truth;
/// implementations hold no cached copy.
#[async_trait]
pub trait DeviceStore: Send + Sync {
    /// Trivial round-trip used by the health probe
    async fn ping(&self) -> Result<()>;

    /// All devices ordered by ascending id
    async fn list(&self) -> Result<Vec<Device>>;

    async fn get(&self, id: i64) -> Result<Option<Device>>;

    async fn create(&self, device: &NewDevice) -> Result<Device>;

    /// Inserts `seeds` only if the table holds no rows. Returns the number of rows inserted.
    async fn seed_if_empty(&self, seeds: &[NewDevice]) -> Result<u64>;
}

pub async fn make_pool(config: &Config) -> Result<PgPool> {
    info!("Connecting to database at {}...", config.database_display());
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect_with(config.connect_options())
        .await?;

    info!("Database connection established");
    info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Migrations completed");

    Ok(pool)
}

#[derive(Debug, Clone)]
pub struct PgDeviceStore {
    pool: PgPool,
}

impl PgDeviceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeviceStore for PgDeviceStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Device>> {
        let start = Instant::now();
        let query = format!("SELECT {} FROM devices ORDER BY id ASC", DEVICE_COLUMNS);
        let devices = sqlx::query_as::<_, Device>(&query)
            .fetch_all(&self.pool)
            .await?;
        QUERY_LATENCY_SECONDS.observe(start.elapsed().as_secs_f64());

        debug!("Listed {} devices", devices.len());
        Ok(devices)
    }

    async fn get(&self, id: i64) -> Result<Option<Device>> {
        let start = Instant::now();
        let query = format!("SELECT {} FROM devices WHERE id = $1", DEVICE_COLUMNS);
        let device = sqlx::query_as::<_, Device>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        QUERY_LATENCY_SECONDS.observe(start.elapsed().as_secs_f64());

        Ok(device)
    }

    async fn create(&self, device: &NewDevice) -> Result<Device> {
        let start = Instant::now();
        let query = format!(
            "INSERT INTO devices (name, location, type) VALUES ($1, $2, $3) RETURNING {}",
            DEVICE_COLUMNS
        );
        let created = sqlx::query_as::<_, Device>(&query)
            .bind(&device.name)
            .bind(&device.location)
            .bind(&device.device_type)
            .fetch_one(&self.pool)
            .await?;
        QUERY_LATENCY_SECONDS.observe(start.elapsed().as_secs_f64());

        Ok(created)
    }

    async fn seed_if_empty(&self, seeds: &[NewDevice]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        // Serializes concurrent first startups; the lock is released on commit or rollback
        sqlx::query("LOCK TABLE devices IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM devices")
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            tx.commit().await?;
            debug!("Device table already has {} rows, skipping seed", existing);
            return Ok(0);
        }

        let mut inserted = 0;
        for seed in seeds {
            let result = sqlx::query("INSERT INTO devices (name, location, type) VALUES ($1, $2, $3)")
                .bind(&seed.name)
                .bind(&seed.location)
                .bind(&seed.device_type)
                .execute(&mut *tx)
                .await?;
            inserted += result.rows_affected();
        }
        tx.commit().await?;

        Ok(inserted)
    }
}
