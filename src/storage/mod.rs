//! Injected storage seam.
//!
//! The engine depends on driver data abstractly: production deployments
//! back this trait with a real datastore, tests use the in-memory
//! implementation. No storage I/O happens inside the scoring path; the
//! store is consulted once per request for the candidate snapshot and on
//! assignment confirmation.

pub mod memory;

pub use memory::InMemoryDriverStore;

use async_trait::async_trait;

use crate::models::{DriverCandidate, DriverMatch};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("Unknown driver: {0}")]
    UnknownDriver(String),
}

/// Capability surface the engine needs from the driver registry.
///
/// `try_claim_driver` must be an atomic compare-and-swap on the driver's
/// availability flag: when two concurrent match requests select the same
/// driver, exactly one claim returns `true`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DriverStore: Send + Sync {
    /// Read-only snapshot of drivers currently flagged available.
    async fn available_drivers(&self) -> Result<Vec<DriverCandidate>, StoreError>;

    /// Atomically flip the driver from available to assigned. Returns
    /// `false` when someone else won the race.
    async fn try_claim_driver(&self, driver_id: &str) -> Result<bool, StoreError>;

    /// Return a driver to the pool after a decline or cancellation.
    async fn release_driver(&self, driver_id: &str) -> Result<(), StoreError>;

    /// Persist the assignment record; long-term match history lives behind
    /// the store, not in the engine.
    async fn record_assignment(&self, assignment: &DriverMatch) -> Result<(), StoreError>;
}
