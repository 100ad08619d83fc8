//! Incremental hotspot detection at ingestion time.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use safety_watch_hotspot_models::{ClusterInfo, DetectionResult, HotspotAlert, HotspotConfig};
use safety_watch_report_models::Report;
use safety_watch_store::Snapshot;

use crate::filter::filter_recent;
use crate::geometry::{centroid, within};
use crate::HotspotIdGenerator;

/// Decides whether a newly submitted report completes a hotspot.
pub struct HotspotDetector {
    config: HotspotConfig,
    ids: Arc<dyn HotspotIdGenerator>,
}

impl HotspotDetector {
    /// Creates a detector with the given parameters and id source.
    #[must_use]
    pub fn new(config: HotspotConfig, ids: Arc<dyn HotspotIdGenerator>) -> Self {
        Self { config, ids }
    }

    /// The parameters this detector runs with.
    #[must_use]
    pub const fn config(&self) -> &HotspotConfig {
        &self.config
    }

    /// Checks `report` against the reports in `before`, which must be the
    /// snapshot taken before `report` itself was stored.
    ///
    /// Neighbors are recent, geolocated reports within the radius. The
    /// report is a hotspot when neighbors plus itself reach
    /// `min_reports`. The returned center is the mean of the neighbors
    /// only; the new report's own coordinate is left out.
    #[must_use]
    pub fn detect(
        &self,
        report: &Report,
        before: &Snapshot,
        now: DateTime<Utc>,
    ) -> DetectionResult {
        let Some(location) = report.location else {
            return DetectionResult::Isolated;
        };

        let recent = filter_recent(before.iter(), now, self.config.time_window);
        let neighbors: Vec<_> = recent
            .iter()
            .filter(|candidate| within(candidate.location, location, self.config.radius))
            .map(|candidate| candidate.location)
            .collect();

        let report_count = neighbors.len() + 1;
        if report_count < self.config.min_reports {
            log::debug!(
                "Report {} has {} neighbor(s), below hotspot threshold {}",
                report.id,
                neighbors.len(),
                self.config.min_reports
            );
            return DetectionResult::Isolated;
        }

        // Only reachable with no neighbors when min_reports is 1.
        let center = centroid(neighbors).unwrap_or(location);

        DetectionResult::Hotspot(HotspotAlert {
            hotspot_id: self.ids.next_id(),
            cluster: ClusterInfo {
                center,
                report_count,
                radius: self.config.radius,
                time_window_secs: self.config.time_window_secs(),
            },
        })
    }
}

impl std::fmt::Debug for HotspotDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HotspotDetector")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
