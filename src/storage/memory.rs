//! In-memory `DriverStore` used by tests and local runs.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Mutex;

use super::{DriverStore, StoreError};
use crate::models::{DriverCandidate, DriverMatch};

/// Dashmap-backed store. The claim/release operations run under the map's
/// per-entry lock, which gives them the same atomicity a real backing must
/// provide with a conditional update.
#[derive(Default)]
pub struct InMemoryDriverStore {
    drivers: DashMap<String, DriverCandidate>,
    assignments: Mutex<Vec<DriverMatch>>,
}

impl InMemoryDriverStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_drivers(drivers: impl IntoIterator<Item = DriverCandidate>) -> Self {
        let store = Self::new();
        for driver in drivers {
            store.upsert_driver(driver);
        }
        store
    }

    pub fn upsert_driver(&self, driver: DriverCandidate) {
        self.drivers.insert(driver.driver_id.clone(), driver);
    }

    pub fn driver(&self, driver_id: &str) -> Option<DriverCandidate> {
        self.drivers.get(driver_id).map(|entry| entry.clone())
    }

    /// Recorded assignments, oldest first.
    pub fn assignments(&self) -> Vec<DriverMatch> {
        self.assignments
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl DriverStore for InMemoryDriverStore {
    async fn available_drivers(&self) -> Result<Vec<DriverCandidate>, StoreError> {
        Ok(self
            .drivers
            .iter()
            .filter(|entry| entry.is_available)
            .map(|entry| entry.clone())
            .collect())
    }

    async fn try_claim_driver(&self, driver_id: &str) -> Result<bool, StoreError> {
        let mut entry = self
            .drivers
            .get_mut(driver_id)
            .ok_or_else(|| StoreError::UnknownDriver(driver_id.to_string()))?;
        if !entry.is_available {
            return Ok(false);
        }
        entry.is_available = false;
        Ok(true)
    }

    async fn release_driver(&self, driver_id: &str) -> Result<(), StoreError> {
        let mut entry = self
            .drivers
            .get_mut(driver_id)
            .ok_or_else(|| StoreError::UnknownDriver(driver_id.to_string()))?;
        entry.is_available = true;
        Ok(())
    }

    async fn record_assignment(&self, assignment: &DriverMatch) -> Result<(), StoreError> {
        let mut log = self
            .assignments
            .lock()
            .map_err(|_| StoreError::Unavailable("assignment log poisoned".to_string()))?;
        log.push(assignment.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeoPoint, ServiceType, VehicleType};

    fn driver(id: &str, available: bool) -> DriverCandidate {
        DriverCandidate {
            driver_id: id.to_string(),
            position: GeoPoint::new(40.7128, -74.0060),
            vehicle_type: VehicleType::Sedan,
            is_available: available,
            is_verified: true,
            rating_recent: 4.5,
            rating_lifetime: 4.4,
            completion_rate: 0.95,
            acceptance_rate: 0.9,
            eta_accuracy: 0.85,
            features: Default::default(),
            supported_services: [ServiceType::Ride].into_iter().collect(),
        }
    }

    #[tokio::test]
    async fn snapshot_excludes_unavailable_drivers() {
        let store =
            InMemoryDriverStore::with_drivers([driver("driver-1", true), driver("driver-2", false)]);

        let snapshot = store.available_drivers().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].driver_id, "driver-1");
    }

    #[tokio::test]
    async fn claim_succeeds_once() {
        let store = InMemoryDriverStore::with_drivers([driver("driver-1", true)]);

        assert!(store.try_claim_driver("driver-1").await.unwrap());
        assert!(!store.try_claim_driver("driver-1").await.unwrap());

        store.release_driver("driver-1").await.unwrap();
        assert!(store.try_claim_driver("driver-1").await.unwrap());
    }

    #[tokio::test]
    async fn claiming_unknown_driver_is_an_error() {
        let store = InMemoryDriverStore::new();
        assert!(matches!(
            store.try_claim_driver("nobody").await,
            Err(StoreError::UnknownDriver(_))
        ));
    }
}
