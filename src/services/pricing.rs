//! Tier-based fare adviser.
//!
//! Pure over its inputs: the caller supplies the timestamp, so identical
//! inputs always produce identical quotes. Invoked once a driver has been
//! selected; it does not depend on ranking output beyond the chosen tier.

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use std::sync::Arc;
use tracing::debug;

use crate::config::MatchingConfig;
use crate::models::{FareQuote, PremiumTier};

pub struct PricingEngine {
    config: Arc<MatchingConfig>,
}

impl PricingEngine {
    pub fn new(config: Arc<MatchingConfig>) -> Self {
        Self { config }
    }

    /// Quote a premium fare: tier multiplier with night and weekend
    /// surcharges composed multiplicatively, plus a premium fee taken as a
    /// fraction of the base fare.
    pub fn premium_quote(
        &self,
        base_fare: f64,
        tier: PremiumTier,
        at: DateTime<Utc>,
    ) -> FareQuote {
        let pricing = &self.config.pricing;
        let mut multiplier = self.config.tiers.policy(tier).multiplier;

        if self.is_night(at.hour()) {
            multiplier *= pricing.night_surcharge;
        }
        if is_weekend(at.weekday()) {
            multiplier *= pricing.weekend_surcharge;
        }

        let premium_fee = base_fare * pricing.premium_fee_rate;
        let total_fare = base_fare * multiplier + premium_fee;

        debug!(
            tier = tier.as_str(),
            base_fare, multiplier, total_fare, "Premium fare quoted"
        );

        FareQuote {
            base_fare,
            premium_fee,
            multiplier,
            total_fare,
        }
    }

    fn is_night(&self, hour: u32) -> bool {
        let pricing = &self.config.pricing;
        if pricing.night_start_hour <= pricing.night_end_hour {
            (pricing.night_start_hour..pricing.night_end_hour).contains(&hour)
        } else {
            hour >= pricing.night_start_hour || hour < pricing.night_end_hour
        }
    }
}

fn is_weekend(weekday: Weekday) -> bool {
    matches!(weekday, Weekday::Sat | Weekday::Sun)
}
