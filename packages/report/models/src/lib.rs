#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Anonymous incident report types and submission validation.
//!
//! This crate defines the canonical [`Report`] record owned by the report
//! store, the fixed [`ReportCategory`] taxonomy, the [`ReportStatus`]
//! lifecycle, and the validation step that turns a raw
//! [`ReportSubmission`] into a [`NewReport`] ready to be appended.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// How far ahead of the server clock a client-supplied submission time may
/// be before it is rejected.
pub const MAX_CLOCK_SKEW_SECS: i64 = 5 * 60;

/// Incident category chosen by the reporter.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum ReportCategory {
    /// Drug dealing, use, or paraphernalia in public.
    #[serde(rename = "Drug Activity")]
    #[strum(serialize = "Drug Activity")]
    DrugActivity,
    /// Loitering, casing, or otherwise suspicious conduct.
    #[serde(rename = "Suspicious Behavior")]
    #[strum(serialize = "Suspicious Behavior")]
    SuspiciousBehavior,
    /// Hazards to people in public spaces.
    #[serde(rename = "Public Safety")]
    #[strum(serialize = "Public Safety")]
    PublicSafety,
    /// Dumping, spills, and other environmental damage.
    #[serde(rename = "Environmental Hazard")]
    #[strum(serialize = "Environmental Hazard")]
    EnvironmentalHazard,
    /// Anything not covered above.
    #[serde(rename = "Other")]
    #[strum(serialize = "Other")]
    Other,
}

impl ReportCategory {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::DrugActivity,
            Self::SuspiciousBehavior,
            Self::PublicSafety,
            Self::EnvironmentalHazard,
            Self::Other,
        ]
    }
}

/// Review lifecycle of a report. Every report starts as
/// [`ReportStatus::Submitted`].
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReportStatus {
    /// Received, not yet looked at.
    #[default]
    Submitted,
    /// Picked up by an operator.
    UnderReview,
    /// Closed out.
    Resolved,
}

/// Opaque, immutable report identifier assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(String);

impl ReportId {
    /// Wraps a raw token as a report id.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReportId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A WGS84 point. Always carries both coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Location {
    /// Creates a location from a latitude/longitude pair.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Builds an optional location from independently optional
    /// coordinates.
    ///
    /// Both absent yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::PartialLocation`] if exactly one
    /// coordinate is present, or [`ValidationError::InvalidCoordinate`] if
    /// either value is non-finite or outside the WGS84 range.
    pub fn from_parts(
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<Option<Self>, ValidationError> {
        match (latitude, longitude) {
            (None, None) => Ok(None),
            (Some(latitude), Some(longitude)) => {
                if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
                    return Err(ValidationError::InvalidCoordinate {
                        name: "latitude",
                        value: latitude,
                    });
                }
                if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
                    return Err(ValidationError::InvalidCoordinate {
                        name: "longitude",
                        value: longitude,
                    });
                }
                Ok(Some(Self::new(latitude, longitude)))
            }
            _ => Err(ValidationError::PartialLocation),
        }
    }
}

/// Reasons a submission is rejected before it reaches the store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// No category was given.
    #[error("category is required")]
    MissingCategory,

    /// The category is not one of [`ReportCategory::all`].
    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    /// Description was empty or whitespace.
    #[error("description is required")]
    EmptyDescription,

    /// Only one of latitude/longitude was supplied.
    #[error("location must include both latitude and longitude")]
    PartialLocation,

    /// A coordinate was outside its valid range.
    #[error("invalid {name} {value}")]
    InvalidCoordinate {
        /// Which coordinate was rejected.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// The client-supplied submission time is ahead of the server clock
    /// by more than [`MAX_CLOCK_SKEW_SECS`].
    #[error("submittedAt {0} is in the future")]
    FutureTimestamp(DateTime<Utc>),
}

/// Raw, unvalidated report fields as handed over by a transport layer.
#[derive(Debug, Clone, Default)]
pub struct ReportSubmission {
    /// Category display name, e.g. `"Drug Activity"`.
    pub category: String,
    /// Free text description.
    pub description: String,
    /// Optional contact details. Blank means anonymous.
    pub contact_info: Option<String>,
    /// Optional latitude.
    pub latitude: Option<f64>,
    /// Optional longitude.
    pub longitude: Option<f64>,
    /// Reference to evidence held by the media collaborator.
    pub media_ref: Option<String>,
    /// Client-reported submission time.
    pub submitted_at: Option<DateTime<Utc>>,
}

impl ReportSubmission {
    /// Validates the submission, stamping it with `now` when the client
    /// did not supply a submission time.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the category is missing or
    /// unknown, the description is blank, the location is malformed, or
    /// the submission time lies in the future.
    pub fn validate(self, now: DateTime<Utc>) -> Result<NewReport, ValidationError> {
        let category = self.category.trim();
        if category.is_empty() {
            return Err(ValidationError::MissingCategory);
        }
        let category: ReportCategory = category
            .parse()
            .map_err(|_| ValidationError::UnknownCategory(category.to_string()))?;

        if self.description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }

        let location = Location::from_parts(self.latitude, self.longitude)?;

        let submitted_at = self.submitted_at.unwrap_or(now);
        if submitted_at > now + TimeDelta::seconds(MAX_CLOCK_SKEW_SECS) {
            return Err(ValidationError::FutureTimestamp(submitted_at));
        }

        Ok(NewReport {
            category,
            description: self.description,
            contact_info: non_blank(self.contact_info),
            location,
            media_ref: non_blank(self.media_ref),
            submitted_at,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// A validated report that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReport {
    /// Incident category.
    pub category: ReportCategory,
    /// Non-empty description.
    pub description: String,
    /// Contact details, `None` for anonymous reports.
    pub contact_info: Option<String>,
    /// Where the incident happened, if known.
    pub location: Option<Location>,
    /// Opaque evidence reference.
    pub media_ref: Option<String>,
    /// Submission time.
    pub submitted_at: DateTime<Utc>,
}

impl NewReport {
    /// Attaches the store-assigned id, producing a [`Report`] in the
    /// [`ReportStatus::Submitted`] state.
    #[must_use]
    pub fn into_report(self, id: ReportId) -> Report {
        Report {
            id,
            category: self.category,
            description: self.description,
            contact_info: self.contact_info,
            location: self.location,
            media_ref: self.media_ref,
            submitted_at: self.submitted_at,
            status: ReportStatus::Submitted,
        }
    }
}

/// A stored incident report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Unique id, immutable.
    pub id: ReportId,
    /// Incident category.
    pub category: ReportCategory,
    /// Description text.
    pub description: String,
    /// Contact details, `None` for anonymous reports.
    pub contact_info: Option<String>,
    /// Where the incident happened, if known.
    pub location: Option<Location>,
    /// Opaque evidence reference.
    pub media_ref: Option<String>,
    /// Submission time, immutable.
    pub submitted_at: DateTime<Utc>,
    /// Review status.
    pub status: ReportStatus,
}

impl Report {
    /// Returns a copy of this report with `status` replaced.
    #[must_use]
    pub fn with_status(&self, status: ReportStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    /// Whether the reporter left no contact details.
    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        self.contact_info.is_none()
    }
}
