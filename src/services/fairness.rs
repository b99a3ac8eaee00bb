//! Recent-assignment tracking and the fairness correction term.
//!
//! This is the only shared mutable state in the engine. Counters live in a
//! `DashMap` so that concurrent scoring passes read without blocking each
//! other; a read racing a confirmation may observe a slightly stale count,
//! which is acceptable for a soft signal, but every confirmed assignment is
//! recorded exactly once under the per-key entry lock.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::collections::VecDeque;
use tracing::debug;

use crate::config::FairnessConfig;

/// Tracks confirmed assignments per driver inside a rolling window and
/// derives the fairness boost from the pruned count.
///
/// The boost is monotonic non-increasing in the assignment count: drivers
/// who have been assigned a lot recently rank lower than equally-qualified
/// drivers who have not, which keeps the ranker from surfacing the same
/// high-rated drivers on every request.
pub struct FairnessTracker {
    assignments: DashMap<String, VecDeque<DateTime<Utc>>>,
    window: Duration,
    config: FairnessConfig,
}

impl FairnessTracker {
    pub fn new(config: FairnessConfig) -> Self {
        Self {
            assignments: DashMap::new(),
            window: Duration::hours(config.window_hours),
            config,
        }
    }

    /// Record one confirmed assignment for the driver.
    pub fn record_assignment(&self, driver_id: &str) {
        self.record_assignment_at(driver_id, Utc::now());
    }

    pub fn record_assignment_at(&self, driver_id: &str, at: DateTime<Utc>) {
        let mut entry = self.assignments.entry(driver_id.to_string()).or_default();
        entry.push_back(at);
        debug!(driver_id, recent = entry.len(), "Assignment recorded");
    }

    /// Number of assignments inside the rolling window. Entries that have
    /// aged out are pruned on read.
    pub fn recent_assignments(&self, driver_id: &str) -> u32 {
        self.recent_assignments_at(driver_id, Utc::now())
    }

    pub fn recent_assignments_at(&self, driver_id: &str, now: DateTime<Utc>) -> u32 {
        let Some(mut entry) = self.assignments.get_mut(driver_id) else {
            return 0;
        };
        let cutoff = now - self.window;
        while entry.front().is_some_and(|at| *at < cutoff) {
            entry.pop_front();
        }
        entry.len() as u32
    }

    /// Fairness boost for the driver's current recent-assignment count.
    pub fn boost(&self, driver_id: &str) -> f64 {
        self.boost_for_count(self.recent_assignments(driver_id))
    }

    pub fn boost_at(&self, driver_id: &str, now: DateTime<Utc>) -> f64 {
        self.boost_for_count(self.recent_assignments_at(driver_id, now))
    }

    /// Step-table lookup. Pure; the table is validated monotone
    /// non-increasing at config load.
    pub fn boost_for_count(&self, recent_assignments: u32) -> f64 {
        for step in &self.config.decay_steps {
            if recent_assignments <= step.max_assignments {
                return step.boost;
            }
        }
        self.config.tail_boost
    }
}
