#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Authority notifications for submitted reports.
//!
//! Every accepted report is handed to a [`Notifier`] together with its
//! detection result. [`compose`] renders the message; delivery is up to
//! the notifier implementation. Dispatch failures are reported back to the
//! caller but never undo the stored report.

use async_trait::async_trait;
use safety_watch_hotspot_models::DetectionResult;
use safety_watch_report_models::Report;
use thiserror::Error;

/// Errors from notification dispatch.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The delivery channel rejected or dropped the message.
    #[error("Notification delivery failed: {message}")]
    Delivery {
        /// Description of what went wrong.
        message: String,
    },
}

/// A rendered notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// One-line subject.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
    /// Whether this is a hotspot alert rather than a routine report.
    pub urgent: bool,
}

/// Delivery channel for authority notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends a notification about `report`.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] if the message could not be delivered.
    async fn notify(
        &self,
        report: &Report,
        detection: &DetectionResult,
    ) -> Result<(), NotifyError>;
}

/// Renders the notification for a report and its detection result.
#[must_use]
pub fn compose(report: &Report, detection: &DetectionResult) -> Notification {
    let alert = detection.alert();

    let subject = alert.map_or_else(
        || format!("New Community Safety Report - {}", report.category),
        |alert| {
            format!(
                "URGENT: Hotspot Alert - {} ({})",
                report.category, alert.hotspot_id
            )
        },
    );

    let mut lines = vec!["New Community Safety Report".to_string(), String::new()];

    if let Some(alert) = alert {
        lines.extend([
            "HOTSPOT ALERT".to_string(),
            format!("Hotspot ID: {}", alert.hotspot_id),
            format!("Cluster Size: {} reports", alert.cluster.report_count),
            format!("Radius: {} degrees", alert.cluster.radius),
            format!(
                "Time Window: last {} hours",
                alert.cluster.time_window_secs / 3600
            ),
            "IMMEDIATE ACTION RECOMMENDED".to_string(),
            String::new(),
        ]);
    }

    lines.extend([
        format!("Report ID: {}", report.id),
        format!("Category: {}", report.category),
        format!("Description: {}", report.description),
        format!("Submitted: {}", report.submitted_at.to_rfc3339()),
    ]);

    match report.location {
        Some(location) => lines.extend([
            "Location:".to_string(),
            format!("  Latitude: {}", location.latitude),
            format!("  Longitude: {}", location.longitude),
            format!(
                "  Map: https://maps.google.com/?q={},{}",
                location.latitude, location.longitude
            ),
        ]),
        None => lines.push("Location: Not provided".to_string()),
    }

    lines.push(report.contact_info.as_ref().map_or_else(
        || "Contact Info: Anonymous report".to_string(),
        |contact| format!("Contact Info: {contact}"),
    ));
    lines.push(report.media_ref.as_ref().map_or_else(
        || "Evidence: No media attached".to_string(),
        |media| format!("Evidence: Media file attached ({media})"),
    ));

    if alert.is_some() {
        lines.extend([
            String::new(),
            "Multiple reports have been received from this area within a short \
             timeframe, indicating a possible pattern that requires attention."
                .to_string(),
        ]);
    }

    Notification {
        subject,
        body: lines.join("\n"),
        urgent: alert.is_some(),
    }
}

/// Writes notifications to the log instead of an external channel.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(
        &self,
        report: &Report,
        detection: &DetectionResult,
    ) -> Result<(), NotifyError> {
        let notification = compose(report, detection);
        if notification.urgent {
            log::warn!("{}\n{}", notification.subject, notification.body);
        } else {
            log::info!("{}\n{}", notification.subject, notification.body);
        }
        Ok(())
    }
}
