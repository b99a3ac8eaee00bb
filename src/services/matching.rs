//! Engine orchestration: validate, snapshot, filter, score, rank, confirm.
//!
//! One engine instance serves the whole process. Each `find_best_matches`
//! call is independent and safe to run concurrently with others; the only
//! shared state is the fairness tracker, and the driver claim goes through
//! the store's compare-and-swap.

use std::sync::Arc;
use tracing::{info, warn};

use super::eligibility::EligibilityLayer;
use super::fairness::FairnessTracker;
use super::scoring::ScoringLayer;
use crate::config::MatchingConfig;
use crate::error::{MatchingError, Result};
use crate::models::{DriverMatch, MatchOutcome, MatchRequest};
use crate::storage::DriverStore;

pub struct MatchingEngine {
    config: Arc<MatchingConfig>,
    store: Arc<dyn DriverStore>,
    eligibility: EligibilityLayer,
    scoring: ScoringLayer,
    fairness: Arc<FairnessTracker>,
}

impl MatchingEngine {
    pub fn new(config: MatchingConfig, store: Arc<dyn DriverStore>) -> Self {
        let config = Arc::new(config);
        Self {
            eligibility: EligibilityLayer::new(Arc::clone(&config)),
            scoring: ScoringLayer::new(Arc::clone(&config)),
            fairness: Arc::new(FairnessTracker::new(config.fairness.clone())),
            config,
            store,
        }
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    pub fn fairness(&self) -> &FairnessTracker {
        &self.fairness
    }

    /// Produce the ranked shortlist for a request.
    ///
    /// An empty pool or a pool that filters down to nothing yields an empty
    /// outcome; only malformed requests and storage failures are errors.
    pub async fn find_best_matches(&self, request: &MatchRequest) -> Result<MatchOutcome> {
        validate_request(request)?;

        let pool = self.store.available_drivers().await?;
        let total_candidates = pool.len();

        let eligible = self.eligibility.filter(request, pool);
        let eligible_candidates = eligible.len();

        let mut matches = self.scoring.score(request, eligible, &self.fairness);
        let limit = request
            .max_results
            .unwrap_or(self.config.default_max_results);
        matches.truncate(limit);

        info!(
            order_id = %request.order_id,
            total_candidates,
            eligible_candidates,
            returned = matches.len(),
            "Match ranking complete"
        );

        Ok(MatchOutcome {
            order_id: request.order_id.clone(),
            matches,
            total_candidates,
            eligible_candidates,
        })
    }

    /// Confirm an assignment: atomically claim the driver, then record the
    /// assignment for fairness and history. Losing the claim race surfaces
    /// as `DriverUnavailable` so the caller can fall through to the next
    /// ranked driver.
    pub async fn confirm_assignment(&self, assignment: &DriverMatch) -> Result<()> {
        let claimed = self.store.try_claim_driver(&assignment.driver_id).await?;
        if !claimed {
            warn!(
                order_id = %assignment.order_id,
                driver_id = %assignment.driver_id,
                "Driver claimed by a concurrent request"
            );
            return Err(MatchingError::DriverUnavailable(
                assignment.driver_id.clone(),
            ));
        }

        self.fairness.record_assignment(&assignment.driver_id);
        self.store.record_assignment(assignment).await?;

        info!(
            order_id = %assignment.order_id,
            driver_id = %assignment.driver_id,
            match_score = assignment.match_score,
            "Assignment confirmed"
        );
        Ok(())
    }

    /// Return a declined or cancelled driver to the pool.
    pub async fn release_driver(&self, driver_id: &str) -> Result<()> {
        self.store.release_driver(driver_id).await?;
        info!(driver_id, "Driver released back to pool");
        Ok(())
    }
}

fn validate_request(request: &MatchRequest) -> Result<()> {
    if request.order_id.trim().is_empty() {
        return Err(MatchingError::InvalidRequest(
            "order_id must not be empty".to_string(),
        ));
    }
    if !request.pickup.is_valid() {
        return Err(MatchingError::InvalidRequest(format!(
            "pickup coordinates out of range: ({}, {})",
            request.pickup.latitude, request.pickup.longitude
        )));
    }
    if !request.dropoff.is_valid() {
        return Err(MatchingError::InvalidRequest(format!(
            "dropoff coordinates out of range: ({}, {})",
            request.dropoff.latitude, request.dropoff.longitude
        )));
    }
    if request.max_results == Some(0) {
        return Err(MatchingError::InvalidRequest(
            "max_results must be at least 1".to_string(),
        ));
    }
    Ok(())
}
