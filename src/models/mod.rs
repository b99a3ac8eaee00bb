use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Geographic coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether the coordinates fall inside the valid WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceType {
    Ride,
    Moto,
    Food,
    Grocery,
    Goods,
    TruckVan,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Ride => "RIDE",
            ServiceType::Moto => "MOTO",
            ServiceType::Food => "FOOD",
            ServiceType::Grocery => "GROCERY",
            ServiceType::Goods => "GOODS",
            ServiceType::TruckVan => "TRUCK_VAN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleType {
    Sedan,
    Suv,
    LuxurySedan,
    LuxurySuv,
    Moto,
    Scooter,
    Car,
    Van,
    TruckVan,
}

impl VehicleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Sedan => "SEDAN",
            VehicleType::Suv => "SUV",
            VehicleType::LuxurySedan => "LUXURY_SEDAN",
            VehicleType::LuxurySuv => "LUXURY_SUV",
            VehicleType::Moto => "MOTO",
            VehicleType::Scooter => "SCOOTER",
            VehicleType::Car => "CAR",
            VehicleType::Van => "VAN",
            VehicleType::TruckVan => "TRUCK_VAN",
        }
    }
}

/// Premium service level, affecting both eligibility and pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PremiumTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl PremiumTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PremiumTier::Bronze => "BRONZE",
            PremiumTier::Silver => "SILVER",
            PremiumTier::Gold => "GOLD",
            PremiumTier::Platinum => "PLATINUM",
        }
    }
}

/// Lifecycle of a proposed match. The engine emits `Pending`; the
/// confirm/decline operations move it forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Pending,
    Accepted,
    Declined,
    Expired,
    Completed,
}

/// Read-only snapshot of a driver, as supplied by the driver registry.
///
/// Optional collections default to empty so that a driver with no declared
/// features or service types deserializes cleanly instead of failing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverCandidate {
    pub driver_id: String,
    pub position: GeoPoint,
    pub vehicle_type: VehicleType,
    pub is_available: bool,
    pub is_verified: bool,
    /// Average rating over the recent window (1-5 scale).
    pub rating_recent: f64,
    /// Average rating over the driver's lifetime (1-5 scale).
    pub rating_lifetime: f64,
    /// Completed / accepted trips over the recent window, both in [0,1].
    pub completion_rate: f64,
    pub acceptance_rate: f64,
    /// Fraction of past ETAs that held up, in [0,1].
    pub eta_accuracy: f64,
    /// Declared vehicle features and specialties (e.g. "child_seat").
    #[serde(default)]
    pub features: HashSet<String>,
    #[serde(default)]
    pub supported_services: HashSet<ServiceType>,
}

/// An incoming matching request. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRequest {
    pub order_id: String,
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,
    pub service_type: ServiceType,
    #[serde(default)]
    pub vehicle_type: Option<VehicleType>,
    #[serde(default)]
    pub premium_tier: Option<PremiumTier>,
    #[serde(default)]
    pub special_requirements: HashSet<String>,
    /// None means dispatch immediately.
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    /// None falls back to the configured default shortlist size.
    #[serde(default)]
    pub max_results: Option<usize>,
}

/// Per-driver score breakdown produced by one matching attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverMatch {
    pub order_id: String,
    pub driver_id: String,
    /// Weighted composite in [0,1] when the configured weights sum to 1.
    pub match_score: f64,
    pub eta_score: f64,
    pub rating_score: f64,
    pub reliability_score: f64,
    pub fairness_boost: f64,
    pub vehicle_match_score: f64,
    pub estimated_arrival_minutes: u32,
    pub distance_km: f64,
    pub status: MatchStatus,
}

/// Ranked shortlist returned to the caller.
///
/// An empty `matches` with `total_candidates: 0` is the no-drivers outcome,
/// not an error; the caller decides whether to widen the search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub order_id: String,
    pub matches: Vec<DriverMatch>,
    /// Pool size before eligibility filtering.
    pub total_candidates: usize,
    /// Pool size after eligibility filtering.
    pub eligible_candidates: usize,
}

/// Fare breakdown produced by the pricing adviser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FareQuote {
    pub base_fare: f64,
    pub premium_fee: f64,
    /// Tier multiplier with time-of-day surcharges applied.
    pub multiplier: f64,
    pub total_fare: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geo_point_range_validation() {
        assert!(GeoPoint::new(40.7128, -74.0060).is_valid());
        assert!(GeoPoint::new(-90.0, 180.0).is_valid());
        assert!(!GeoPoint::new(90.5, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, -180.5).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn match_request_defaults_from_json() {
        let request: MatchRequest = serde_json::from_str(
            r#"{
                "order_id": "order-1",
                "pickup": {"latitude": 40.7128, "longitude": -74.0060},
                "dropoff": {"latitude": 40.7580, "longitude": -73.9855},
                "service_type": "RIDE"
            }"#,
        )
        .unwrap();

        assert_eq!(request.max_results, None);
        assert!(request.vehicle_type.is_none());
        assert!(request.special_requirements.is_empty());
        assert!(request.scheduled_at.is_none());
    }

    #[test]
    fn driver_candidate_tolerates_missing_collections() {
        let driver: DriverCandidate = serde_json::from_str(
            r#"{
                "driver_id": "driver-1",
                "position": {"latitude": 40.7128, "longitude": -74.0060},
                "vehicle_type": "SEDAN",
                "is_available": true,
                "is_verified": true,
                "rating_recent": 4.8,
                "rating_lifetime": 4.7,
                "completion_rate": 0.96,
                "acceptance_rate": 0.92,
                "eta_accuracy": 0.88
            }"#,
        )
        .unwrap();

        assert!(driver.features.is_empty());
        assert!(driver.supported_services.is_empty());
    }

    #[test]
    fn enums_serialize_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&ServiceType::TruckVan).unwrap(),
            "\"TRUCK_VAN\""
        );
        assert_eq!(
            serde_json::to_string(&VehicleType::LuxurySedan).unwrap(),
            "\"LUXURY_SEDAN\""
        );
        assert_eq!(PremiumTier::Gold.as_str(), "GOLD");
    }
}
