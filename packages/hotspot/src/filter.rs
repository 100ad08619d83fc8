//! Spatial-temporal pre-filter shared by detection and aggregation.

use chrono::{DateTime, TimeDelta, Utc};
use safety_watch_report_models::{Location, Report};

/// A report paired with its (guaranteed present) location.
#[derive(Debug, Clone, Copy)]
pub struct Located<'a> {
    /// The stored report.
    pub report: &'a Report,
    /// `report.location`, unwrapped.
    pub location: Location,
}

/// Keeps the reports that have a location and were submitted no more than
/// `time_window` before `now`. The boundary is inclusive and input order
/// is preserved.
pub fn filter_recent<'a>(
    reports: impl IntoIterator<Item = &'a Report>,
    now: DateTime<Utc>,
    time_window: TimeDelta,
) -> Vec<Located<'a>> {
    reports
        .into_iter()
        .filter_map(|report| {
            let location = report.location?;
            (now - report.submitted_at <= time_window).then_some(Located { report, location })
        })
        .collect()
}
