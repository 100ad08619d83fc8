#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Report storage behind a narrow interface.
//!
//! The [`ReportStore`] trait is the only shared mutable resource in the
//! system. Writers go through [`ReportStore::append`] and
//! [`ReportStore::update_status`]; readers take a [`Snapshot`], an
//! immutable insertion-ordered view that later writes never affect.
//! Hotspot detection and aggregation run purely over snapshots.
//!
//! [`InMemoryReportStore`] is the default implementation. Report ids come
//! from an injected [`IdGenerator`] so tests can supply deterministic ids.

pub mod ids;
pub mod memory;

use std::sync::Arc;

use safety_watch_report_models::{NewReport, Report, ReportId, ReportStatus};
use thiserror::Error;

pub use ids::{IdGenerator, RandomIdGenerator, SequentialIdGenerator};
pub use memory::InMemoryReportStore;

/// Errors from report store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No report exists with the requested id.
    #[error("Report not found: {0}")]
    NotFound(ReportId),

    /// Every generated id collided with an existing report.
    #[error("Could not generate a unique report id after {attempts} attempts")]
    IdSpaceExhausted {
        /// How many ids were tried.
        attempts: u32,
    },
}

/// Storage contract for incident reports.
///
/// Implementations must make [`append`](Self::append) atomic with respect
/// to other appends (no lost writes, no duplicate ids) and must never
/// expose a partially written report through [`snapshot`](Self::snapshot).
pub trait ReportStore: Send + Sync {
    /// Assigns a fresh id to `report` and stores it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IdSpaceExhausted`] if no unique id could be
    /// generated.
    fn append(&self, report: NewReport) -> Result<Report, StoreError>;

    /// Looks up a report by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the id is unknown.
    fn get(&self, id: &ReportId) -> Result<Report, StoreError>;

    /// Replaces the status of an existing report and returns the updated
    /// record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the id is unknown.
    fn update_status(&self, id: &ReportId, status: ReportStatus) -> Result<Report, StoreError>;

    /// Returns a point-in-time view of every stored report in insertion
    /// order.
    fn snapshot(&self) -> Snapshot;
}

/// Immutable, insertion-ordered view of the store at one instant.
///
/// Cloning is cheap: reports are shared, not copied.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    reports: Arc<[Arc<Report>]>,
}

impl Snapshot {
    /// Builds a snapshot from already-shared reports.
    #[must_use]
    pub fn new(reports: Vec<Arc<Report>>) -> Self {
        Self {
            reports: reports.into(),
        }
    }

    /// Iterates reports in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Report> {
        self.reports.iter().map(|report| &**report)
    }

    /// Number of reports in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    /// Whether the snapshot holds no reports.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

impl FromIterator<Report> for Snapshot {
    fn from_iter<T: IntoIterator<Item = Report>>(iter: T) -> Self {
        Self::new(iter.into_iter().map(Arc::new).collect())
    }
}
