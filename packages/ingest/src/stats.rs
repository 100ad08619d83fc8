//! Community counters shown on the landing screen.

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of the community counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Accepted submissions.
    pub reports_submitted: u64,
    /// Incidents on record.
    pub incidents_recorded: u64,
    /// Participating community members.
    pub community_members: u64,
}

/// Lock-free counters, bumped once per accepted submission.
#[derive(Debug)]
pub struct CommunityStats {
    reports_submitted: AtomicU64,
    incidents_recorded: AtomicU64,
    community_members: AtomicU64,
}

impl CommunityStats {
    /// Starts with zero reports and one community member.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            reports_submitted: AtomicU64::new(0),
            incidents_recorded: AtomicU64::new(0),
            community_members: AtomicU64::new(1),
        }
    }

    /// Counts one accepted submission.
    pub fn record_submission(&self) {
        self.reports_submitted.fetch_add(1, Ordering::Relaxed);
        self.incidents_recorded.fetch_add(1, Ordering::Relaxed);
    }

    /// Reads the current counter values.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            reports_submitted: self.reports_submitted.load(Ordering::Relaxed),
            incidents_recorded: self.incidents_recorded.load(Ordering::Relaxed),
            community_members: self.community_members.load(Ordering::Relaxed),
        }
    }
}

impl Default for CommunityStats {
    fn default() -> Self {
        Self::new()
    }
}
