//! Report id generation.

use std::sync::atomic::{AtomicU64, Ordering};

use safety_watch_report_models::ReportId;

/// Length of ids minted by [`RandomIdGenerator`].
const RANDOM_ID_LENGTH: usize = 10;

/// Source of candidate report ids.
///
/// The store checks every candidate for collisions, so implementations
/// only need to make collisions unlikely, not impossible.
pub trait IdGenerator: Send + Sync {
    /// Produces the next candidate id.
    fn next_id(&self) -> ReportId;
}

/// Short uppercase tokens drawn from a random v4 UUID.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn next_id(&self) -> ReportId {
        let hex = uuid::Uuid::new_v4().simple().to_string().to_uppercase();
        ReportId::new(&hex[..RANDOM_ID_LENGTH])
    }
}

/// Deterministic `{prefix}{n}` ids, counting up from 1.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIdGenerator {
    /// Creates a generator yielding `{prefix}1`, `{prefix}2`, ...
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new("R")
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> ReportId {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        ReportId::new(format!("{}{n}", self.prefix))
    }
}
