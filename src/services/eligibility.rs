//! Hard-constraint filtering applied before any scoring.
//!
//! Filtering is pure over the request, the candidate snapshot, and the
//! config; a rejected candidate never reaches the scoring layer. Rejections
//! are logged with their reason so that dispatch operators can see why a
//! pool thinned out.

use std::sync::Arc;
use tracing::debug;

use super::geo;
use crate::config::MatchingConfig;
use crate::models::{DriverCandidate, MatchRequest};

/// A candidate that passed every hard constraint, carrying the distance and
/// raw ETA computed along the way so the scoring layer does not recompute
/// them.
#[derive(Debug, Clone)]
pub struct EligibleDriver {
    pub candidate: DriverCandidate,
    pub distance_km: f64,
    pub eta_minutes: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    Unavailable,
    Unverified,
    TooFar,
    EtaAboveCeiling,
    ServiceUnsupported,
    BelowTierRating,
    MissingRequirements,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::Unavailable => "unavailable",
            RejectionReason::Unverified => "unverified",
            RejectionReason::TooFar => "too_far",
            RejectionReason::EtaAboveCeiling => "eta_above_ceiling",
            RejectionReason::ServiceUnsupported => "service_unsupported",
            RejectionReason::BelowTierRating => "below_tier_rating",
            RejectionReason::MissingRequirements => "missing_requirements",
        }
    }
}

pub struct EligibilityLayer {
    config: Arc<MatchingConfig>,
}

impl EligibilityLayer {
    pub fn new(config: Arc<MatchingConfig>) -> Self {
        Self { config }
    }

    /// Reduce the candidate pool to drivers satisfying every hard
    /// constraint for this request.
    pub fn filter(&self, request: &MatchRequest, pool: Vec<DriverCandidate>) -> Vec<EligibleDriver> {
        pool.into_iter()
            .filter_map(|candidate| {
                let distance_km = geo::distance_km(candidate.position, request.pickup);
                let eta_minutes = geo::eta_minutes(
                    distance_km,
                    self.config.average_speed_kmh,
                    self.config.pickup_overhead_minutes,
                    self.config.max_eta_minutes,
                );

                match self.check(request, &candidate, distance_km, eta_minutes) {
                    Ok(()) => Some(EligibleDriver {
                        candidate,
                        distance_km,
                        eta_minutes,
                    }),
                    Err(reason) => {
                        debug!(
                            order_id = %request.order_id,
                            driver_id = %candidate.driver_id,
                            reason = reason.as_str(),
                            distance_km,
                            "Driver filtered"
                        );
                        None
                    }
                }
            })
            .collect()
    }

    fn check(
        &self,
        request: &MatchRequest,
        candidate: &DriverCandidate,
        distance_km: f64,
        eta_minutes: f64,
    ) -> Result<(), RejectionReason> {
        if !candidate.is_available {
            return Err(RejectionReason::Unavailable);
        }
        if self.config.require_verified && !candidate.is_verified {
            return Err(RejectionReason::Unverified);
        }
        if distance_km > self.config.max_match_distance_km {
            return Err(RejectionReason::TooFar);
        }
        if eta_minutes > self.config.max_eta_minutes {
            return Err(RejectionReason::EtaAboveCeiling);
        }
        if !candidate.supported_services.contains(&request.service_type) {
            return Err(RejectionReason::ServiceUnsupported);
        }
        if let Some(tier) = request.premium_tier {
            if candidate.rating_recent < self.config.tiers.policy(tier).min_rating {
                return Err(RejectionReason::BelowTierRating);
            }
        }
        if !request
            .special_requirements
            .is_subset(&candidate.features)
        {
            return Err(RejectionReason::MissingRequirements);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeoPoint, PremiumTier, ServiceType, VehicleType};

    fn config() -> Arc<MatchingConfig> {
        Arc::new(MatchingConfig::default())
    }

    fn driver(id: &str) -> DriverCandidate {
        DriverCandidate {
            driver_id: id.to_string(),
            position: GeoPoint::new(40.7128, -74.0060),
            vehicle_type: VehicleType::Sedan,
            is_available: true,
            is_verified: true,
            rating_recent: 4.8,
            rating_lifetime: 4.7,
            completion_rate: 0.96,
            acceptance_rate: 0.92,
            eta_accuracy: 0.88,
            features: Default::default(),
            supported_services: [ServiceType::Ride].into_iter().collect(),
        }
    }

    fn request() -> MatchRequest {
        MatchRequest {
            order_id: "order-1".to_string(),
            pickup: GeoPoint::new(40.7580, -73.9855),
            dropoff: GeoPoint::new(40.7308, -73.9357),
            service_type: ServiceType::Ride,
            vehicle_type: None,
            premium_tier: None,
            special_requirements: Default::default(),
            scheduled_at: None,
            max_results: None,
        }
    }

    #[test]
    fn nearby_verified_driver_passes() {
        let layer = EligibilityLayer::new(config());
        let eligible = layer.filter(&request(), vec![driver("driver-1")]);

        assert_eq!(eligible.len(), 1);
        assert!(eligible[0].distance_km < 10.0);
        assert!(eligible[0].eta_minutes < 30.0);
    }

    #[test]
    fn unavailable_driver_is_rejected() {
        let layer = EligibilityLayer::new(config());
        let mut candidate = driver("driver-1");
        candidate.is_available = false;

        assert!(layer.filter(&request(), vec![candidate]).is_empty());
    }

    #[test]
    fn unverified_driver_is_rejected_when_verification_required() {
        let mut candidate = driver("driver-1");
        candidate.is_verified = false;

        let layer = EligibilityLayer::new(config());
        assert!(layer.filter(&request(), vec![candidate.clone()]).is_empty());

        // With verification not required the same driver passes.
        let mut relaxed = MatchingConfig::default();
        relaxed.require_verified = false;
        let layer = EligibilityLayer::new(Arc::new(relaxed));
        assert_eq!(layer.filter(&request(), vec![candidate]).len(), 1);
    }

    #[test]
    fn distant_driver_is_rejected() {
        let mut candidate = driver("driver-1");
        // Boston is well beyond the 50 km default ceiling from Manhattan.
        candidate.position = GeoPoint::new(42.3601, -71.0589);

        let layer = EligibilityLayer::new(config());
        assert!(layer.filter(&request(), vec![candidate]).is_empty());
    }

    #[test]
    fn never_passes_drivers_beyond_the_distance_ceiling() {
        let layer = EligibilityLayer::new(config());
        let positions = [
            GeoPoint::new(40.7130, -74.0055),
            GeoPoint::new(41.2, -74.5),
            GeoPoint::new(42.3601, -71.0589),
            GeoPoint::new(40.9, -73.8),
        ];
        let pool: Vec<DriverCandidate> = positions
            .iter()
            .enumerate()
            .map(|(i, position)| {
                let mut candidate = driver(&format!("driver-{i}"));
                candidate.position = *position;
                candidate
            })
            .collect();

        for eligible in layer.filter(&request(), pool) {
            assert!(eligible.distance_km <= 50.0);
        }
    }

    #[test]
    fn unsupported_service_type_is_rejected() {
        let mut candidate = driver("driver-1");
        candidate.supported_services = [ServiceType::Food].into_iter().collect();

        let layer = EligibilityLayer::new(config());
        assert!(layer.filter(&request(), vec![candidate]).is_empty());
    }

    #[test]
    fn driver_with_no_declared_services_is_rejected_not_an_error() {
        let mut candidate = driver("driver-1");
        candidate.supported_services.clear();

        let layer = EligibilityLayer::new(config());
        assert!(layer.filter(&request(), vec![candidate]).is_empty());
    }

    #[test]
    fn tier_minimum_rating_gates_premium_requests() {
        let mut req = request();
        req.premium_tier = Some(PremiumTier::Platinum);
        let mut candidate = driver("driver-1");
        candidate.rating_recent = 4.6; // below the 4.8 Platinum floor

        let layer = EligibilityLayer::new(config());
        assert!(layer.filter(&req, vec![candidate.clone()]).is_empty());

        candidate.rating_recent = 4.9;
        assert_eq!(layer.filter(&req, vec![candidate]).len(), 1);
    }

    #[test]
    fn special_requirements_must_be_a_subset_of_features() {
        let mut req = request();
        req.special_requirements = ["child_seat".to_string(), "pet_friendly".to_string()]
            .into_iter()
            .collect();

        let layer = EligibilityLayer::new(config());

        // Missing feature set is treated as empty, not an error.
        assert!(layer.filter(&req, vec![driver("driver-1")]).is_empty());

        let mut equipped = driver("driver-2");
        equipped.features = [
            "child_seat".to_string(),
            "pet_friendly".to_string(),
            "wheelchair_accessible".to_string(),
        ]
        .into_iter()
        .collect();
        assert_eq!(layer.filter(&req, vec![equipped]).len(), 1);
    }
}
