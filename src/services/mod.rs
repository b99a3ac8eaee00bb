pub mod eligibility;
pub mod fairness;
pub mod geo;
pub mod matching;
pub mod pricing;
pub mod scoring;

pub use eligibility::{EligibilityLayer, EligibleDriver, RejectionReason};
pub use fairness::FairnessTracker;
pub use matching::MatchingEngine;
pub use pricing::PricingEngine;
pub use scoring::ScoringLayer;
