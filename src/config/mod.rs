use serde::Deserialize;
use std::env;
use std::str::FromStr;

use crate::models::PremiumTier;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} is not a valid value: {message}")]
    Env { key: &'static str, message: String },

    #[error("Weights must be non-negative and sum to 1.0, got {sum}")]
    InvalidWeights { sum: f64 },

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("Invalid fairness decay table: {0}")]
    InvalidDecayTable(String),

    #[error("Invalid tier policy for {tier}: {message}")]
    InvalidTierPolicy { tier: &'static str, message: String },

    #[error("Invalid pricing factors: {0}")]
    InvalidPricing(String),

    #[error("ETA soft floor must be within [0,1], got {0}")]
    InvalidSoftFloor(f64),
}

/// The five scoring weights. They must sum to 1.0 so that the composite
/// score stays inside [0,1].
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MatchingWeights {
    pub eta: f64,
    pub rating: f64,
    pub reliability: f64,
    pub fairness: f64,
    pub vehicle: f64,
}

impl MatchingWeights {
    pub fn sum(&self) -> f64 {
        self.eta + self.rating + self.reliability + self.fairness + self.vehicle
    }
}

impl Default for MatchingWeights {
    fn default() -> Self {
        Self {
            eta: 0.35,
            rating: 0.25,
            reliability: 0.15,
            fairness: 0.15,
            vehicle: 0.10,
        }
    }
}

/// One step of the fairness decay table: drivers with up to
/// `max_assignments` recent assignments receive `boost`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DecayStep {
    pub max_assignments: u32,
    pub boost: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FairnessConfig {
    /// Rolling window over which assignments count, in hours.
    pub window_hours: i64,
    /// Step table, ordered by `max_assignments` ascending with
    /// non-increasing boosts.
    pub decay_steps: Vec<DecayStep>,
    /// Boost applied beyond the last step.
    pub tail_boost: f64,
}

impl Default for FairnessConfig {
    fn default() -> Self {
        Self {
            window_hours: 24,
            decay_steps: vec![
                DecayStep {
                    max_assignments: 5,
                    boost: 1.0,
                },
                DecayStep {
                    max_assignments: 10,
                    boost: 0.7,
                },
                DecayStep {
                    max_assignments: 15,
                    boost: 0.4,
                },
                DecayStep {
                    max_assignments: 20,
                    boost: 0.15,
                },
            ],
            tail_boost: 0.05,
        }
    }
}

/// Per-tier policy: fare multiplier plus the minimum recent rating a driver
/// needs to serve the tier.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TierPolicy {
    pub multiplier: f64,
    pub min_rating: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TierTable {
    pub bronze: TierPolicy,
    pub silver: TierPolicy,
    pub gold: TierPolicy,
    pub platinum: TierPolicy,
}

impl TierTable {
    pub fn policy(&self, tier: PremiumTier) -> TierPolicy {
        match tier {
            PremiumTier::Bronze => self.bronze,
            PremiumTier::Silver => self.silver,
            PremiumTier::Gold => self.gold,
            PremiumTier::Platinum => self.platinum,
        }
    }
}

impl Default for TierTable {
    fn default() -> Self {
        Self {
            bronze: TierPolicy {
                multiplier: 1.3,
                min_rating: 4.5,
            },
            silver: TierPolicy {
                multiplier: 1.5,
                min_rating: 4.0,
            },
            gold: TierPolicy {
                multiplier: 2.0,
                min_rating: 4.5,
            },
            platinum: TierPolicy {
                multiplier: 2.5,
                min_rating: 4.8,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PricingConfig {
    /// Premium fee as a fraction of the base fare.
    pub premium_fee_rate: f64,
    /// Surcharge factor for the night window.
    pub night_surcharge: f64,
    /// Surcharge factor for Saturday/Sunday.
    pub weekend_surcharge: f64,
    /// Night window: [start, 24) ∪ [0, end).
    pub night_start_hour: u32,
    pub night_end_hour: u32,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            premium_fee_rate: 0.20,
            night_surcharge: 1.1,
            weekend_surcharge: 1.05,
            night_start_hour: 22,
            night_end_hour: 6,
        }
    }
}

/// Engine configuration, loaded once at startup and validated eagerly.
/// A process must refuse to serve on any validation failure.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchingConfig {
    pub weights: MatchingWeights,
    pub max_match_distance_km: f64,
    pub max_eta_minutes: f64,
    pub average_speed_kmh: f64,
    pub pickup_overhead_minutes: f64,
    /// ETA score at or beyond the ceiling. None means hard zero; some
    /// deployments prefer a soft floor so over-ceiling candidates remain
    /// distinguishable in score exports.
    pub eta_soft_floor: Option<f64>,
    pub require_verified: bool,
    pub default_max_results: usize,
    pub fairness: FairnessConfig,
    pub tiers: TierTable,
    pub pricing: PricingConfig,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            weights: MatchingWeights::default(),
            max_match_distance_km: 50.0,
            max_eta_minutes: 30.0,
            average_speed_kmh: 30.0,
            pickup_overhead_minutes: 3.0,
            eta_soft_floor: None,
            require_verified: true,
            default_max_results: 5,
            fairness: FairnessConfig::default(),
            tiers: TierTable::default(),
            pricing: PricingConfig::default(),
        }
    }
}

impl MatchingConfig {
    /// Load configuration from the environment, falling back to defaults
    /// per field. The fairness decay table and tier policies are code-level
    /// configuration; override them on the returned value before validating
    /// again if a deployment needs different tables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let config = Self {
            weights: MatchingWeights {
                eta: env_parse("ETA_WEIGHT", defaults.weights.eta)?,
                rating: env_parse("RATING_WEIGHT", defaults.weights.rating)?,
                reliability: env_parse("RELIABILITY_WEIGHT", defaults.weights.reliability)?,
                fairness: env_parse("FAIRNESS_WEIGHT", defaults.weights.fairness)?,
                vehicle: env_parse("VEHICLE_WEIGHT", defaults.weights.vehicle)?,
            },
            max_match_distance_km: env_parse(
                "MAX_MATCH_DISTANCE_KM",
                defaults.max_match_distance_km,
            )?,
            max_eta_minutes: env_parse("MAX_ETA_MINUTES", defaults.max_eta_minutes)?,
            average_speed_kmh: env_parse("AVERAGE_SPEED_KMH", defaults.average_speed_kmh)?,
            pickup_overhead_minutes: env_parse(
                "PICKUP_OVERHEAD_MINUTES",
                defaults.pickup_overhead_minutes,
            )?,
            eta_soft_floor: env_parse_opt("ETA_SOFT_FLOOR")?,
            require_verified: env_parse("REQUIRE_VERIFIED", defaults.require_verified)?,
            default_max_results: env_parse("DEFAULT_MAX_RESULTS", defaults.default_max_results)?,
            fairness: FairnessConfig {
                window_hours: env_parse("FAIRNESS_WINDOW_HOURS", defaults.fairness.window_hours)?,
                ..defaults.fairness
            },
            tiers: defaults.tiers,
            pricing: defaults.pricing,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.weights;
        let components = [w.eta, w.rating, w.reliability, w.fairness, w.vehicle];
        if components.iter().any(|c| !c.is_finite() || *c < 0.0) {
            return Err(ConfigError::InvalidWeights { sum: w.sum() });
        }
        if (w.sum() - 1.0).abs() > 1e-6 {
            return Err(ConfigError::InvalidWeights { sum: w.sum() });
        }

        for (field, value) in [
            ("MAX_MATCH_DISTANCE_KM", self.max_match_distance_km),
            ("MAX_ETA_MINUTES", self.max_eta_minutes),
            ("AVERAGE_SPEED_KMH", self.average_speed_kmh),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        if !self.pickup_overhead_minutes.is_finite() || self.pickup_overhead_minutes < 0.0 {
            return Err(ConfigError::NonPositive {
                field: "PICKUP_OVERHEAD_MINUTES",
                value: self.pickup_overhead_minutes,
            });
        }
        if self.default_max_results == 0 {
            return Err(ConfigError::NonPositive {
                field: "DEFAULT_MAX_RESULTS",
                value: 0.0,
            });
        }
        if let Some(floor) = self.eta_soft_floor {
            if !floor.is_finite() || !(0.0..=1.0).contains(&floor) {
                return Err(ConfigError::InvalidSoftFloor(floor));
            }
        }

        self.validate_fairness()?;
        self.validate_tiers()?;
        self.validate_pricing()?;
        Ok(())
    }

    fn validate_fairness(&self) -> Result<(), ConfigError> {
        let fairness = &self.fairness;
        if fairness.window_hours <= 0 {
            return Err(ConfigError::InvalidDecayTable(format!(
                "window_hours must be positive, got {}",
                fairness.window_hours
            )));
        }
        if fairness.decay_steps.is_empty() {
            return Err(ConfigError::InvalidDecayTable(
                "decay table must have at least one step".to_string(),
            ));
        }
        let mut previous: Option<&DecayStep> = None;
        for step in &fairness.decay_steps {
            if !step.boost.is_finite() || !(0.0..=1.0).contains(&step.boost) {
                return Err(ConfigError::InvalidDecayTable(format!(
                    "boost {} outside [0,1]",
                    step.boost
                )));
            }
            if let Some(prev) = previous {
                if step.max_assignments <= prev.max_assignments {
                    return Err(ConfigError::InvalidDecayTable(
                        "step bounds must be strictly increasing".to_string(),
                    ));
                }
                if step.boost > prev.boost {
                    return Err(ConfigError::InvalidDecayTable(
                        "boosts must be non-increasing".to_string(),
                    ));
                }
            }
            previous = Some(step);
        }
        let last_boost = fairness.decay_steps[fairness.decay_steps.len() - 1].boost;
        if !fairness.tail_boost.is_finite()
            || !(0.0..=1.0).contains(&fairness.tail_boost)
            || fairness.tail_boost > last_boost
        {
            return Err(ConfigError::InvalidDecayTable(format!(
                "tail boost {} must be within [0,1] and not exceed the last step",
                fairness.tail_boost
            )));
        }
        Ok(())
    }

    fn validate_tiers(&self) -> Result<(), ConfigError> {
        for (name, policy) in [
            ("BRONZE", self.tiers.bronze),
            ("SILVER", self.tiers.silver),
            ("GOLD", self.tiers.gold),
            ("PLATINUM", self.tiers.platinum),
        ] {
            if !policy.multiplier.is_finite() || policy.multiplier < 1.0 {
                return Err(ConfigError::InvalidTierPolicy {
                    tier: name,
                    message: format!("multiplier {} must be at least 1.0", policy.multiplier),
                });
            }
            if !policy.min_rating.is_finite() || !(1.0..=5.0).contains(&policy.min_rating) {
                return Err(ConfigError::InvalidTierPolicy {
                    tier: name,
                    message: format!("min_rating {} must be within [1,5]", policy.min_rating),
                });
            }
        }
        Ok(())
    }

    fn validate_pricing(&self) -> Result<(), ConfigError> {
        let pricing = &self.pricing;
        if !pricing.premium_fee_rate.is_finite() || !(0.0..=1.0).contains(&pricing.premium_fee_rate)
        {
            return Err(ConfigError::InvalidPricing(format!(
                "premium_fee_rate {} outside [0,1]",
                pricing.premium_fee_rate
            )));
        }
        for (name, factor) in [
            ("night_surcharge", pricing.night_surcharge),
            ("weekend_surcharge", pricing.weekend_surcharge),
        ] {
            if !factor.is_finite() || factor < 1.0 {
                return Err(ConfigError::InvalidPricing(format!(
                    "{name} {factor} must be at least 1.0"
                )));
            }
        }
        if pricing.night_start_hour >= 24 || pricing.night_end_hour >= 24 {
            return Err(ConfigError::InvalidPricing(
                "night window hours must be within [0,24)".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_parse<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Env {
            key,
            message: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

fn env_parse_opt(key: &'static str) -> Result<Option<f64>, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: std::num::ParseFloatError| ConfigError::Env {
                key,
                message: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}
