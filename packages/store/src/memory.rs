//! In-memory [`ReportStore`] guarded by a single reader/writer lock.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use safety_watch_report_models::{NewReport, Report, ReportId, ReportStatus};

use crate::{IdGenerator, RandomIdGenerator, ReportStore, Snapshot, StoreError};

/// How many ids are tried before [`StoreError::IdSpaceExhausted`].
const MAX_ID_ATTEMPTS: u32 = 8;

#[derive(Default)]
struct Inner {
    reports: Vec<Arc<Report>>,
    /// id -> position in `reports`
    index: BTreeMap<ReportId, usize>,
}

/// Append-mostly report store held entirely in memory.
///
/// Reports are kept behind `Arc` so a [`Snapshot`] only copies pointers
/// while the read lock is held. Status updates swap in a new `Arc`, which
/// leaves previously taken snapshots untouched.
pub struct InMemoryReportStore {
    inner: RwLock<Inner>,
    ids: Box<dyn IdGenerator>,
}

impl InMemoryReportStore {
    /// Creates an empty store drawing ids from `ids`.
    #[must_use]
    pub fn new(ids: Box<dyn IdGenerator>) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            ids,
        }
    }

    /// Number of stored reports.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().reports.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().reports.is_empty()
    }

    // No write path can panic between mutations, so a poisoned lock still
    // guards consistent data.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryReportStore {
    fn default() -> Self {
        Self::new(Box::new(RandomIdGenerator))
    }
}

impl std::fmt::Debug for InMemoryReportStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryReportStore")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl ReportStore for InMemoryReportStore {
    fn append(&self, report: NewReport) -> Result<Report, StoreError> {
        let mut inner = self.write();

        let mut id = None;
        for attempt in 1..=MAX_ID_ATTEMPTS {
            let candidate = self.ids.next_id();
            if inner.index.contains_key(&candidate) {
                log::warn!(
                    "Report id collision on {candidate} (attempt {attempt}/{MAX_ID_ATTEMPTS})"
                );
                continue;
            }
            id = Some(candidate);
            break;
        }
        let id = id.ok_or(StoreError::IdSpaceExhausted {
            attempts: MAX_ID_ATTEMPTS,
        })?;

        let report = report.into_report(id.clone());
        let position = inner.reports.len();
        inner.reports.push(Arc::new(report.clone()));
        inner.index.insert(id, position);
        drop(inner);

        Ok(report)
    }

    fn get(&self, id: &ReportId) -> Result<Report, StoreError> {
        let inner = self.read();
        inner
            .index
            .get(id)
            .map(|&position| inner.reports[position].as_ref().clone())
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    fn update_status(&self, id: &ReportId, status: ReportStatus) -> Result<Report, StoreError> {
        let mut inner = self.write();
        let position = *inner
            .index
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        let updated = inner.reports[position].with_status(status);
        inner.reports[position] = Arc::new(updated.clone());
        drop(inner);

        Ok(updated)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.read().reports.clone())
    }
}
