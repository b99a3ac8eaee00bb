//! Feature normalization and composite scoring.
//!
//! Every normalizer maps raw attributes into [0,1]; with weights summing to
//! 1.0 the composite stays inside [0,1] as well. All functions here are
//! pure, which keeps concurrent scoring passes trivially safe.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use super::eligibility::EligibleDriver;
use super::fairness::FairnessTracker;
use crate::config::{MatchingConfig, MatchingWeights};
use crate::models::{DriverMatch, MatchRequest, MatchStatus, VehicleType};

/// ETA score: 1.0 at zero ETA, declining linearly to the ceiling.
///
/// At or beyond the ceiling the score is 0.0, unless a soft floor is
/// configured; the eligibility filter already excludes over-ceiling
/// candidates, so the floor only matters for score exports.
pub fn eta_score(eta_minutes: f64, max_eta_minutes: f64, soft_floor: Option<f64>) -> f64 {
    if eta_minutes >= max_eta_minutes {
        return soft_floor.unwrap_or(0.0);
    }
    (1.0 - eta_minutes / max_eta_minutes).clamp(0.0, 1.0)
}

/// Normalize a 1-5 rating into [0,1].
pub fn rating_score(rating: f64) -> f64 {
    ((rating - 1.0) / 4.0).clamp(0.0, 1.0)
}

/// Blend of completion and acceptance rates; completion dominates.
pub fn reliability_score(completion_rate: f64, acceptance_rate: f64) -> f64 {
    0.7 * completion_rate.clamp(0.0, 1.0) + 0.3 * acceptance_rate.clamp(0.0, 1.0)
}

/// Vehicle/requirement match score.
///
/// With no requested vehicle every driver matches fully. An exact
/// vehicle-type match also scores 1.0. Otherwise the driver earns the
/// satisfied fraction of the request's special requirements, or 0.0 when
/// there are none to satisfy.
pub fn vehicle_match_score(
    requested: Option<VehicleType>,
    driver_vehicle: VehicleType,
    special_requirements: &HashSet<String>,
    driver_features: &HashSet<String>,
) -> f64 {
    let Some(requested) = requested else {
        return 1.0;
    };
    if requested == driver_vehicle {
        return 1.0;
    }
    if special_requirements.is_empty() {
        return 0.0;
    }
    let satisfied = special_requirements
        .iter()
        .filter(|requirement| driver_features.contains(*requirement))
        .count();
    satisfied as f64 / special_requirements.len() as f64
}

/// Weighted composite of the five sub-scores.
pub fn composite_score(
    weights: &MatchingWeights,
    eta: f64,
    rating: f64,
    reliability: f64,
    fairness: f64,
    vehicle: f64,
) -> f64 {
    weights.eta * eta
        + weights.rating * rating
        + weights.reliability * reliability
        + weights.fairness * fairness
        + weights.vehicle * vehicle
}

/// Scores eligible candidates and orders them deterministically.
pub struct ScoringLayer {
    config: Arc<MatchingConfig>,
}

impl ScoringLayer {
    pub fn new(config: Arc<MatchingConfig>) -> Self {
        Self { config }
    }

    /// Score every eligible candidate and sort descending by composite
    /// score, ties broken by lower ETA, then by driver id.
    pub fn score(
        &self,
        request: &MatchRequest,
        eligible: Vec<EligibleDriver>,
        fairness: &FairnessTracker,
    ) -> Vec<DriverMatch> {
        let mut matches: Vec<DriverMatch> = eligible
            .into_iter()
            .map(|driver| self.score_one(request, driver, fairness))
            .collect();

        // Note: NaN scores are treated as less than any valid score
        matches.sort_by(|a, b| {
            b.match_score
                .partial_cmp(&a.match_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| {
                    a.estimated_arrival_minutes
                        .cmp(&b.estimated_arrival_minutes)
                })
                .then_with(|| a.driver_id.cmp(&b.driver_id))
        });

        debug!(
            order_id = %request.order_id,
            scored = matches.len(),
            top_score = matches.first().map(|m| m.match_score),
            "Scoring complete"
        );

        matches
    }

    fn score_one(
        &self,
        request: &MatchRequest,
        driver: EligibleDriver,
        fairness: &FairnessTracker,
    ) -> DriverMatch {
        let candidate = driver.candidate;
        let eta = eta_score(
            driver.eta_minutes,
            self.config.max_eta_minutes,
            self.config.eta_soft_floor,
        );
        let rating = rating_score(candidate.rating_recent);
        let reliability = reliability_score(candidate.completion_rate, candidate.acceptance_rate);
        let fairness_boost = fairness.boost(&candidate.driver_id);
        let vehicle = vehicle_match_score(
            request.vehicle_type,
            candidate.vehicle_type,
            &request.special_requirements,
            &candidate.features,
        );

        let match_score = composite_score(
            &self.config.weights,
            eta,
            rating,
            reliability,
            fairness_boost,
            vehicle,
        );

        DriverMatch {
            order_id: request.order_id.clone(),
            driver_id: candidate.driver_id,
            match_score,
            eta_score: eta,
            rating_score: rating,
            reliability_score: reliability,
            fairness_boost,
            vehicle_match_score: vehicle,
            estimated_arrival_minutes: driver
                .eta_minutes
                .min(self.config.max_eta_minutes)
                .round() as u32,
            distance_km: driver.distance_km,
            status: MatchStatus::Pending,
        }
    }
}
