use super::DeviceStore;
use crate::errors::{Error, Result};
use crate::model::{Device, NewDevice};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// In-process [`DeviceStore`] for handler tests
#[derive(Debug, Default)]
pub struct MemoryDeviceStore {
    devices: Mutex<Vec<Device>>,
    unreachable: AtomicBool,
}

impl MemoryDeviceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every operation fail as if the database went away
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.devices.lock().len()
    }

    fn check(&self) -> Result<()> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(Error::Database(sqlx::Error::PoolClosed));
        }
        Ok(())
    }

    fn insert(devices: &mut Vec<Device>, device: &NewDevice) -> Device {
        let id = devices.last().map_or(1, |d| d.id + 1);
        let created = Device {
            id,
            name: device.name.clone(),
            location: device.location.clone(),
            device_type: device.device_type.clone(),
            created_at: Utc::now(),
        };
        devices.push(created.clone());
        created
    }
}

#[async_trait]
impl DeviceStore for MemoryDeviceStore {
    async fn ping(&self) -> Result<()> {
        self.check()
    }

    async fn list(&self) -> Result<Vec<Device>> {
        self.check()?;
        Ok(self.devices.lock().clone())
    }

    async fn get(&self, id: i64) -> Result<Option<Device>> {
        self.check()?;
        Ok(self.devices.lock().iter().find(|d| d.id == id).cloned())
    }

    async fn create(&self, device: &NewDevice) -> Result<Device> {
        self.check()?;
        Ok(Self::insert(&mut self.devices.lock(), device))
    }

    async fn seed_if_empty(&self, seeds: &[NewDevice]) -> Result<u64> {
        self.check()?;
        let mut devices = self.devices.lock();
        if !devices.is_empty() {
            return Ok(0);
        }
        for seed in seeds {
            Self::insert(&mut devices, seed);
        }
        Ok(seeds.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::seed_devices;

    #[test]
    fn test_seed_only_once() {
        tokio_test::block_on(async {
            let store = MemoryDeviceStore::new();

            assert_eq!(store.seed_if_empty(&seed_devices()).await.unwrap(), 3);
            assert_eq!(store.seed_if_empty(&seed_devices()).await.unwrap(), 0);
            assert_eq!(store.len(), 3);
        });
    }

    #[test]
    fn test_seed_skipped_when_rows_exist() {
        tokio_test::block_on(async {
            let store = MemoryDeviceStore::new();
            store
                .create(&NewDevice::new("Porch Light", "Porch", "switch"))
                .await
                .unwrap();

            assert_eq!(store.seed_if_empty(&seed_devices()).await.unwrap(), 0);
            assert_eq!(store.len(), 1);
        });
    }

    #[test]
    fn test_unreachable_store_fails() {
        tokio_test::block_on(async {
            let store = MemoryDeviceStore::new();
            store.set_unreachable(true);

            assert!(store.ping().await.is_err());
            assert!(store.list().await.is_err());
        });
    }
}
