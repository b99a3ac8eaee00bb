//! Driver-request matching and scoring engine.
//!
//! Given an incoming service request and a pool of candidate drivers, the
//! engine filters by hard eligibility constraints, computes a multi-factor
//! score per driver (ETA, rating, reliability, fairness, vehicle match),
//! and returns a deterministic ranked shortlist. A tier-based pricing
//! adviser is provided alongside for the post-selection fare quote.
//!
//! Transport, persistence, and notification concerns live outside this
//! crate; driver data is injected through the [`storage::DriverStore`]
//! trait.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use config::{ConfigError, MatchingConfig, MatchingWeights};
pub use error::{MatchingError, Result};
pub use services::{
    EligibilityLayer, FairnessTracker, MatchingEngine, PricingEngine, ScoringLayer,
};
pub use storage::{DriverStore, InMemoryDriverStore, StoreError};
