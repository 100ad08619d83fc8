#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Report ingestion and hotspot queries.
//!
//! [`ReportService`] ties the store, the hotspot engine, and the notifier
//! together. A submission is validated, checked against the snapshot
//! taken just before it is stored, appended, counted, and finally handed
//! to the notifier. Two submissions racing each other may miss one
//! another during detection; the next hotspot listing sees both.

pub mod stats;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use safety_watch_hotspot::{
    HotspotAggregator, HotspotDetector, HotspotIdGenerator, RandomHotspotIds,
};
use safety_watch_hotspot_models::{DetectionResult, Hotspot, HotspotConfig};
use safety_watch_notify::{LogNotifier, Notifier};
use safety_watch_report_models::{
    Report, ReportId, ReportStatus, ReportSubmission, ValidationError,
};
use safety_watch_store::{InMemoryReportStore, ReportStore, StoreError};
use thiserror::Error;

pub use stats::{CommunityStats, StatsSnapshot};

/// Errors surfaced by [`ReportService`].
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The submission was rejected before touching the store.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The store rejected the operation.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// Whether this error means the requested report does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(StoreError::NotFound(_)))
    }
}

/// Outcome of an accepted submission.
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    /// The stored report.
    pub report: Report,
    /// Whether it completed a hotspot.
    pub detection: DetectionResult,
}

/// All currently active hotspots.
#[derive(Debug, Clone)]
pub struct HotspotListing {
    /// Hotspots in anchor order.
    pub hotspots: Vec<Hotspot>,
    /// `hotspots.len()`.
    pub total_active: usize,
}

/// Application service behind every report and hotspot operation.
pub struct ReportService {
    store: Arc<dyn ReportStore>,
    detector: HotspotDetector,
    aggregator: HotspotAggregator,
    notifier: Arc<dyn Notifier>,
    stats: CommunityStats,
}

impl ReportService {
    /// Wires a service from its collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn ReportStore>,
        config: HotspotConfig,
        hotspot_ids: Arc<dyn HotspotIdGenerator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            detector: HotspotDetector::new(config, hotspot_ids.clone()),
            aggregator: HotspotAggregator::new(config, hotspot_ids),
            notifier,
            stats: CommunityStats::new(),
        }
    }

    /// An in-memory service with random ids that logs its notifications.
    #[must_use]
    pub fn in_memory(config: HotspotConfig) -> Self {
        Self::new(
            Arc::new(InMemoryReportStore::default()),
            config,
            Arc::new(RandomHotspotIds),
            Arc::new(LogNotifier),
        )
    }

    /// The hotspot parameters in effect.
    #[must_use]
    pub const fn config(&self) -> &HotspotConfig {
        self.detector.config()
    }

    /// Validates, stores, and checks a new report, then notifies
    /// authorities.
    ///
    /// Notification failures are logged and otherwise ignored: once the
    /// report is stored the submission has succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Validation`] if the submission is invalid
    /// (nothing is stored), or [`ServiceError::Store`] if the store could
    /// not assign an id.
    pub async fn submit_report(
        &self,
        submission: ReportSubmission,
        now: DateTime<Utc>,
    ) -> Result<SubmissionOutcome, ServiceError> {
        let new_report = submission.validate(now)?;

        let before = self.store.snapshot();
        let report = self.store.append(new_report)?;
        let detection = self.detector.detect(&report, &before, now);
        self.stats.record_submission();

        match detection.alert() {
            Some(alert) => log::warn!(
                "Report {} ({}) joined hotspot {} with {} report(s)",
                report.id,
                report.category,
                alert.hotspot_id,
                alert.cluster.report_count
            ),
            None => log::info!("Report {} ({}) submitted", report.id, report.category),
        }

        if let Err(e) = self.notifier.notify(&report, &detection).await {
            log::error!("Failed to send notification for report {}: {e}", report.id);
        }

        Ok(SubmissionOutcome { report, detection })
    }

    /// Looks up a report.
    ///
    /// # Errors
    ///
    /// Returns a not-found [`ServiceError::Store`] if the id is unknown.
    pub fn get_report(&self, id: &ReportId) -> Result<Report, ServiceError> {
        Ok(self.store.get(id)?)
    }

    /// Every stored report in insertion order.
    #[must_use]
    pub fn list_reports(&self) -> Vec<Report> {
        self.store.snapshot().iter().cloned().collect()
    }

    /// Changes the review status of a report.
    ///
    /// # Errors
    ///
    /// Returns a not-found [`ServiceError::Store`] if the id is unknown.
    pub fn update_status(
        &self,
        id: &ReportId,
        status: ReportStatus,
    ) -> Result<Report, ServiceError> {
        let report = self.store.update_status(id, status)?;
        log::info!("Report {id} status changed to {status}");
        Ok(report)
    }

    /// Groups every recent geolocated report into active hotspots as of
    /// `now`. Read-only.
    #[must_use]
    pub fn list_hotspots(&self, now: DateTime<Utc>) -> HotspotListing {
        let hotspots = self.aggregator.aggregate(&self.store.snapshot(), now);
        HotspotListing {
            total_active: hotspots.len(),
            hotspots,
        }
    }

    /// Current community counters.
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}

impl std::fmt::Debug for ReportService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportService")
            .field("detector", &self.detector)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::TimeDelta;
    use safety_watch_hotspot::SequentialHotspotIds;
    use safety_watch_notify::{Notification, NotifyError, compose};
    use safety_watch_store::SequentialIdGenerator;

    use super::*;

    /// Roughly 100 m in degrees.
    const NEAR: f64 = 0.0009;
    /// Roughly 2 km in degrees.
    const FAR: f64 = 0.018;

    #[derive(Default)]
    struct RecordingNotifier(Mutex<Vec<Notification>>);

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(
            &self,
            report: &Report,
            detection: &DetectionResult,
        ) -> Result<(), NotifyError> {
            self.0.lock().unwrap().push(compose(report, detection));
            Ok(())
        }
    }

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn notify(&self, _: &Report, _: &DetectionResult) -> Result<(), NotifyError> {
            Err(NotifyError::Delivery {
                message: "smtp unreachable".to_string(),
            })
        }
    }

    fn service_with(
        notifier: Arc<dyn Notifier>,
    ) -> (ReportService, Arc<InMemoryReportStore>) {
        let store = Arc::new(InMemoryReportStore::new(Box::new(
            SequentialIdGenerator::default(),
        )));
        let service = ReportService::new(
            store.clone(),
            HotspotConfig::default(),
            Arc::new(SequentialHotspotIds::new()),
            notifier,
        );
        (service, store)
    }

    fn service() -> ReportService {
        service_with(Arc::new(LogNotifier)).0
    }

    fn located(lat: f64, lng: f64, submitted_at: Option<DateTime<Utc>>) -> ReportSubmission {
        ReportSubmission {
            category: "Suspicious Behavior".to_string(),
            description: "Someone trying car door handles".to_string(),
            latitude: Some(lat),
            longitude: Some(lng),
            submitted_at,
            ..ReportSubmission::default()
        }
    }

    #[tokio::test]
    async fn third_nearby_submission_raises_alert() {
        let service = service();
        let now = Utc::now();

        let first = service
            .submit_report(located(40.0, -75.0, None), now)
            .await
            .unwrap();
        let second = service
            .submit_report(located(40.0 + NEAR, -75.0, None), now)
            .await
            .unwrap();
        let third = service
            .submit_report(located(40.0, -75.0 + NEAR, None), now)
            .await
            .unwrap();

        assert!(!first.detection.is_hotspot());
        assert!(!second.detection.is_hotspot());
        let alert = third.detection.alert().unwrap();
        assert_eq!(alert.hotspot_id.as_str(), "HS-000001");
        assert_eq!(alert.cluster.report_count, 3);
    }

    #[tokio::test]
    async fn scenario_nearby_reports_within_the_hour_list_one_hotspot() {
        let service = service();
        let now = Utc::now();
        for (i, (lat, lng)) in [(40.0, -75.0), (40.0 + NEAR, -75.0), (40.0, -75.0 + NEAR)]
            .into_iter()
            .enumerate()
        {
            let minutes = 10 * i64::try_from(i).unwrap();
            let at = now - TimeDelta::minutes(50 - minutes);
            service
                .submit_report(located(lat, lng, Some(at)), at)
                .await
                .unwrap();
        }

        let listing = service.list_hotspots(now);
        assert_eq!(listing.total_active, 1);
        assert_eq!(listing.hotspots[0].report_count, 3);
    }

    #[tokio::test]
    async fn scenario_spread_out_reports_list_nothing() {
        let service = service();
        let now = Utc::now();
        for (lat, lng) in [(40.0, -75.0), (40.0 + FAR, -75.0), (40.0, -75.0 + FAR)] {
            service
                .submit_report(located(lat, lng, None), now)
                .await
                .unwrap();
        }

        assert_eq!(service.list_hotspots(now).total_active, 0);
    }

    #[tokio::test]
    async fn scenario_stale_report_is_filtered_out() {
        let service = service();
        let now = Utc::now();
        let day_ago = now - TimeDelta::hours(25);

        service
            .submit_report(located(40.0, -75.0, Some(day_ago)), now)
            .await
            .unwrap();
        service
            .submit_report(located(40.0, -75.0, None), now)
            .await
            .unwrap();
        let last = service
            .submit_report(located(40.0, -75.0, None), now)
            .await
            .unwrap();

        assert!(!last.detection.is_hotspot());
        assert_eq!(service.list_hotspots(now).total_active, 0);
    }

    #[test]
    fn scenario_racing_submissions_miss_each_other_until_listing() {
        let store = Arc::new(InMemoryReportStore::new(Box::new(
            SequentialIdGenerator::default(),
        )));
        let ids = Arc::new(SequentialHotspotIds::new());
        let config = HotspotConfig::default();
        let detector = HotspotDetector::new(config, ids.clone());
        let aggregator = HotspotAggregator::new(config, ids);
        let now = Utc::now();

        let third = located(40.0 + NEAR, -75.0, None).validate(now).unwrap();
        store.append(third).unwrap();

        // Both submissions snapshot before either commits.
        let shared_before = store.snapshot();
        let a = store
            .append(located(40.0, -75.0, None).validate(now).unwrap())
            .unwrap();
        let b = store
            .append(located(40.0, -75.0, None).validate(now).unwrap())
            .unwrap();

        assert!(!detector.detect(&a, &shared_before, now).is_hotspot());
        assert!(!detector.detect(&b, &shared_before, now).is_hotspot());

        let hotspots = aggregator.aggregate(&store.snapshot(), now);
        assert_eq!(hotspots.len(), 1);
        assert_eq!(hotspots[0].report_count, 3);
    }

    #[tokio::test]
    async fn invalid_submission_stores_nothing() {
        let (service, store) = service_with(Arc::new(RecordingNotifier::default()));
        let mut submission = located(40.0, -75.0, None);
        submission.description = String::new();

        let err = service
            .submit_report(submission, Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::EmptyDescription)
        ));
        assert!(store.is_empty());
        assert_eq!(service.stats().reports_submitted, 0);
    }

    #[tokio::test]
    async fn future_dated_submissions_cannot_pin_a_hotspot() {
        let (service, store) = service_with(Arc::new(LogNotifier));
        let now = Utc::now();
        let far_future = now + TimeDelta::days(50 * 365);

        for _ in 0..3 {
            let err = service
                .submit_report(located(40.0, -75.0, Some(far_future)), now)
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                ServiceError::Validation(ValidationError::FutureTimestamp(_))
            ));
        }

        assert!(store.is_empty());
        assert_eq!(
            service
                .list_hotspots(now + TimeDelta::days(10 * 365))
                .total_active,
            0
        );
    }

    #[tokio::test]
    async fn unlocated_submission_is_accepted_but_never_a_hotspot() {
        let service = service();
        let now = Utc::now();
        for _ in 0..3 {
            service
                .submit_report(located(40.0, -75.0, None), now)
                .await
                .unwrap();
        }

        let outcome = service
            .submit_report(
                ReportSubmission {
                    category: "Other".to_string(),
                    description: "No GPS available".to_string(),
                    ..ReportSubmission::default()
                },
                now,
            )
            .await
            .unwrap();

        assert!(!outcome.detection.is_hotspot());
        assert!(outcome.report.location.is_none());
    }

    #[tokio::test]
    async fn notifier_receives_every_accepted_report() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (service, _) = service_with(notifier.clone());
        let now = Utc::now();

        for _ in 0..3 {
            service
                .submit_report(located(40.0, -75.0, None), now)
                .await
                .unwrap();
        }

        let sent = notifier.0.lock().unwrap();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent.iter().filter(|n| n.urgent).count(), 1);
    }

    #[tokio::test]
    async fn notifier_failure_keeps_the_report() {
        let (service, store) = service_with(Arc::new(FailingNotifier));

        let outcome = service
            .submit_report(located(40.0, -75.0, None), Utc::now())
            .await
            .unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(service.get_report(&outcome.report.id).unwrap(), outcome.report);
        assert_eq!(service.stats().incidents_recorded, 1);
    }

    #[tokio::test]
    async fn status_update_and_not_found() {
        let service = service();
        let outcome = service
            .submit_report(located(40.0, -75.0, None), Utc::now())
            .await
            .unwrap();

        let updated = service
            .update_status(&outcome.report.id, ReportStatus::UnderReview)
            .unwrap();
        assert_eq!(updated.status, ReportStatus::UnderReview);
        assert_eq!(
            service.get_report(&outcome.report.id).unwrap().status,
            ReportStatus::UnderReview
        );

        let missing = ReportId::new("MISSING");
        assert!(service.get_report(&missing).unwrap_err().is_not_found());
        assert!(
            service
                .update_status(&missing, ReportStatus::Resolved)
                .unwrap_err()
                .is_not_found()
        );
    }

    #[tokio::test]
    async fn listing_hotspots_does_not_touch_the_store() {
        let service = service();
        let now = Utc::now();
        for _ in 0..4 {
            service
                .submit_report(located(40.0, -75.0, None), now)
                .await
                .unwrap();
        }

        let before = service.list_reports();
        let first = service.list_hotspots(now);
        let second = service.list_hotspots(now);

        assert_eq!(service.list_reports(), before);
        assert_eq!(first.hotspots[0].members, second.hotspots[0].members);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_submissions_are_all_stored() {
        let service = Arc::new(ReportService::in_memory(HotspotConfig::default()));
        let now = Utc::now();

        let tasks = (0..40).map(|_| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .submit_report(located(40.0, -75.0, None), now)
                    .await
                    .map(|outcome| outcome.report.id)
            })
        });
        let ids: Vec<ReportId> = futures::future::join_all(tasks)
            .await
            .into_iter()
            .map(|joined| joined.unwrap().unwrap())
            .collect();

        let unique: std::collections::BTreeSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), 40);
        assert_eq!(service.stats().reports_submitted, 40);

        let listing = service.list_hotspots(now);
        assert_eq!(listing.total_active, 1);
        assert_eq!(listing.hotspots[0].report_count, 40);
    }
}
