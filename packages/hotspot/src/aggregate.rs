//! Batch hotspot aggregation over the whole store.
//!
//! A single greedy pass in insertion order. Each unprocessed report acts
//! as an anchor: its cluster is every recent report within the radius of
//! the anchor, judged against the full recent set. Clusters that reach the
//! threshold are emitted and their members marked processed so they never
//! anchor again. Anchors below the threshold stay unprocessed and can
//! still be picked up as members by later anchors.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use safety_watch_hotspot_models::{Hotspot, HotspotConfig};
use safety_watch_report_models::{ReportCategory, ReportId};
use safety_watch_store::Snapshot;

use crate::filter::{Located, filter_recent};
use crate::geometry::{centroid, within};
use crate::HotspotIdGenerator;

/// Lists every currently active hotspot in a snapshot.
pub struct HotspotAggregator {
    config: HotspotConfig,
    ids: Arc<dyn HotspotIdGenerator>,
}

impl HotspotAggregator {
    /// Creates an aggregator with the given parameters and id source.
    #[must_use]
    pub fn new(config: HotspotConfig, ids: Arc<dyn HotspotIdGenerator>) -> Self {
        Self { config, ids }
    }

    /// Groups the recent reports of `snapshot` into hotspots, in anchor
    /// order.
    ///
    /// Membership is fully determined by the snapshot, `now`, and the
    /// config. Hotspot ids are freshly drawn on every call.
    #[must_use]
    pub fn aggregate(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> Vec<Hotspot> {
        let recent = filter_recent(snapshot.iter(), now, self.config.time_window);
        let mut processed: BTreeSet<&ReportId> = BTreeSet::new();
        let mut hotspots = Vec::new();

        for anchor in &recent {
            if processed.contains(&anchor.report.id) {
                continue;
            }

            let cluster: Vec<&Located<'_>> = recent
                .iter()
                .filter(|candidate| {
                    within(candidate.location, anchor.location, self.config.radius)
                })
                .collect();

            if cluster.len() < self.config.min_reports {
                continue;
            }

            processed.extend(cluster.iter().map(|member| &member.report.id));

            let Some(center) = centroid(cluster.iter().map(|member| member.location)) else {
                continue;
            };

            hotspots.push(Hotspot {
                id: self.ids.next_id(),
                center,
                report_count: cluster.len(),
                members: cluster
                    .iter()
                    .map(|member| member.report.id.clone())
                    .collect(),
                categories: distinct_categories(&cluster),
                radius: self.config.radius,
                time_window_secs: self.config.time_window_secs(),
                last_updated: now,
            });
        }

        log::debug!(
            "Aggregated {} recent report(s) of {} into {} hotspot(s)",
            recent.len(),
            snapshot.len(),
            hotspots.len()
        );

        hotspots
    }
}

impl std::fmt::Debug for HotspotAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HotspotAggregator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Distinct categories in order of first appearance.
fn distinct_categories(cluster: &[&Located<'_>]) -> Vec<ReportCategory> {
    let mut seen = BTreeSet::new();
    cluster
        .iter()
        .map(|member| member.report.category)
        .filter(|category| seen.insert(*category))
        .collect()
}
