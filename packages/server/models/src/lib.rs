#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the safety watch server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the stored report types so the wire contract can evolve on its
//! own.

use chrono::{DateTime, Utc};
use safety_watch_hotspot_models::{ClusterInfo, DetectionResult, Hotspot, HotspotId};
use safety_watch_report_models::{
    Location, Report, ReportCategory, ReportId, ReportStatus, ReportSubmission,
};
use serde::{Deserialize, Serialize};

/// Coordinates as sent by a client. Either field may be missing; a lone
/// coordinate is rejected during validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLocationInput {
    /// Latitude in degrees.
    pub latitude: Option<f64>,
    /// Longitude in degrees.
    pub longitude: Option<f64>,
}

/// Body of `POST /api/reports`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSubmitReport {
    /// Category display name.
    #[serde(default)]
    pub category: String,
    /// Free text description.
    #[serde(default)]
    pub description: String,
    /// Optional contact details.
    pub contact_info: Option<String>,
    /// Optional location.
    pub location: Option<ApiLocationInput>,
    /// Reference to previously uploaded evidence.
    pub media_ref: Option<String>,
    /// Client-side submission time (ISO 8601).
    pub submitted_at: Option<DateTime<Utc>>,
}

impl From<ApiSubmitReport> for ReportSubmission {
    fn from(body: ApiSubmitReport) -> Self {
        let location = body.location.unwrap_or_default();
        Self {
            category: body.category,
            description: body.description,
            contact_info: body.contact_info,
            latitude: location.latitude,
            longitude: location.longitude,
            media_ref: body.media_ref,
            submitted_at: body.submitted_at,
        }
    }
}

/// Response of `POST /api/reports`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSubmitReportResponse {
    /// Always `true`; failures use [`ApiError`].
    pub success: bool,
    /// Id assigned to the new report.
    pub report_id: ReportId,
    /// Human-readable confirmation.
    pub message: String,
    /// Whether the report completed a hotspot.
    pub hotspot_alert: bool,
    /// Id of the detected hotspot, `null` otherwise.
    pub hotspot_id: Option<HotspotId>,
    /// Cluster details, only present for hotspot alerts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_info: Option<ClusterInfo>,
}

impl ApiSubmitReportResponse {
    /// Builds the response for a stored report and its detection result.
    #[must_use]
    pub fn new(report_id: ReportId, detection: DetectionResult) -> Self {
        let (hotspot_id, cluster_info) = match detection {
            DetectionResult::Hotspot(alert) => (Some(alert.hotspot_id), Some(alert.cluster)),
            DetectionResult::Isolated => (None, None),
        };
        Self {
            success: true,
            report_id,
            message: "Report submitted successfully".to_string(),
            hotspot_alert: hotspot_id.is_some(),
            hotspot_id,
            cluster_info,
        }
    }
}

/// A stored report as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiReport {
    /// Report id.
    pub id: ReportId,
    /// Category.
    pub category: ReportCategory,
    /// Description.
    pub description: String,
    /// Contact details, `null` for anonymous reports.
    pub contact_info: Option<String>,
    /// Location, if provided.
    pub location: Option<Location>,
    /// Evidence reference, if any.
    pub media_ref: Option<String>,
    /// Submission time (ISO 8601).
    pub submitted_at: DateTime<Utc>,
    /// Review status.
    pub status: ReportStatus,
}

impl From<Report> for ApiReport {
    fn from(report: Report) -> Self {
        Self {
            id: report.id,
            category: report.category,
            description: report.description,
            contact_info: report.contact_info,
            location: report.location,
            media_ref: report.media_ref,
            submitted_at: report.submitted_at,
            status: report.status,
        }
    }
}

/// Body of `PATCH /api/reports/{id}/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiUpdateStatus {
    /// New status.
    pub status: ReportStatus,
}

/// Response of `GET /api/hotspots`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHotspots {
    /// Active hotspots.
    pub hotspots: Vec<Hotspot>,
    /// Number of active hotspots.
    pub total_active: usize,
}

/// Response of `GET /api/stats`.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiStats {
    /// Accepted submissions.
    pub reports_submitted: u64,
    /// Incidents on record.
    pub incidents_recorded: u64,
    /// Community members.
    pub community_members: u64,
}

/// Feature flags reported by the health check.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiFeatures {
    /// Hotspot detection is active.
    pub hotspot_detection: bool,
    /// Reports may carry evidence references.
    pub media_references: bool,
}

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// `"OK"` when healthy.
    pub status: String,
    /// Server time.
    pub timestamp: DateTime<Utc>,
    /// Service version.
    pub version: String,
    /// Enabled features.
    pub features: ApiFeatures,
}

/// Error body for every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// What went wrong.
    pub error: String,
}

impl ApiError {
    /// Wraps a message.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use safety_watch_report_models::ValidationError;

    use super::*;

    #[test]
    fn submit_body_maps_partial_location() {
        let body: ApiSubmitReport = serde_json::from_value(serde_json::json!({
            "category": "Other",
            "description": "Abandoned shopping carts",
            "location": { "latitude": 40.0 }
        }))
        .unwrap();

        let submission = ReportSubmission::from(body);
        assert_eq!(submission.latitude, Some(40.0));
        assert_eq!(submission.longitude, None);
        assert_eq!(
            submission.validate(Utc::now()),
            Err(ValidationError::PartialLocation)
        );
    }

    #[test]
    fn missing_category_deserializes_as_empty() {
        let body: ApiSubmitReport =
            serde_json::from_value(serde_json::json!({ "description": "x" })).unwrap();
        assert!(body.category.is_empty());
    }

    #[test]
    fn isolated_response_has_null_hotspot_and_no_cluster() {
        let response =
            ApiSubmitReportResponse::new(ReportId::new("ABC"), DetectionResult::Isolated);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["reportId"], "ABC");
        assert_eq!(json["hotspotAlert"], false);
        assert!(json["hotspotId"].is_null());
        assert!(json.get("clusterInfo").is_none());
    }
}
