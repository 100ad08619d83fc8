#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Hotspot detection parameters and result types.
//!
//! A hotspot is an ephemeral cluster of nearby, recent, geolocated
//! reports. It is recomputed from a store snapshot on every request and
//! never persisted, so nothing here has a lifecycle of its own.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, TimeDelta, Utc};
use safety_watch_report_models::{Location, ReportCategory, ReportId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default cluster radius in degrees (roughly 500 m at moderate
/// latitudes).
pub const DEFAULT_RADIUS: f64 = 0.005;

/// Default minimum cluster size, counting the anchor report.
pub const DEFAULT_MIN_REPORTS: usize = 3;

/// Default recency window in seconds (24 hours).
pub const DEFAULT_TIME_WINDOW_SECS: i64 = 24 * 60 * 60;

/// Environment variable pointing at a TOML config file.
pub const CONFIG_PATH_ENV: &str = "HOTSPOT_CONFIG";

/// Errors from loading or validating a [`HotspotConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for this schema.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A value was unparseable or out of range.
    #[error("Invalid value for {name}: {value}")]
    InvalidValue {
        /// Config key or environment variable.
        name: &'static str,
        /// The rejected value.
        value: String,
    },
}

/// Tuning constants for hotspot detection.
///
/// The radius is measured in raw degrees because distances are computed
/// on a flat latitude/longitude plane. Switching to a geodesic metric
/// requires re-deriving the radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HotspotConfig {
    /// Maximum planar distance, in degrees, between cluster members and
    /// the anchor report. Inclusive.
    pub radius: f64,
    /// Minimum number of reports, anchor included, that form a hotspot.
    pub min_reports: usize,
    /// Maximum report age. Inclusive.
    pub time_window: TimeDelta,
}

impl Default for HotspotConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            min_reports: DEFAULT_MIN_REPORTS,
            time_window: TimeDelta::seconds(DEFAULT_TIME_WINDOW_SECS),
        }
    }
}

/// On-disk shape of a config file. Missing keys fall back to defaults.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    radius: f64,
    min_reports: usize,
    time_window_secs: i64,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            min_reports: DEFAULT_MIN_REPORTS,
            time_window_secs: DEFAULT_TIME_WINDOW_SECS,
        }
    }
}

impl HotspotConfig {
    /// Builds a validated config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `radius` is not a positive
    /// finite number, `min_reports` is zero, or `time_window_secs` is not
    /// positive.
    pub fn new(
        radius: f64,
        min_reports: usize,
        time_window_secs: i64,
    ) -> Result<Self, ConfigError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(ConfigError::InvalidValue {
                name: "radius",
                value: radius.to_string(),
            });
        }
        if min_reports == 0 {
            return Err(ConfigError::InvalidValue {
                name: "min_reports",
                value: min_reports.to_string(),
            });
        }
        let time_window = (time_window_secs > 0)
            .then(|| TimeDelta::try_seconds(time_window_secs))
            .flatten()
            .ok_or_else(|| ConfigError::InvalidValue {
                name: "time_window_secs",
                value: time_window_secs.to_string(),
            })?;

        Ok(Self {
            radius,
            min_reports,
            time_window,
        })
    }

    /// Parses a TOML document with optional `radius`, `min_reports`, and
    /// `time_window_secs` keys.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the document is malformed or a value is
    /// out of range.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(contents)?;
        Self::new(raw.radius, raw.min_reports, raw.time_window_secs)
    }

    /// Reads a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Loads the config from the environment.
    ///
    /// Starts from the file named by `HOTSPOT_CONFIG` (or the defaults),
    /// then applies `HOTSPOT_RADIUS`, `HOTSPOT_MIN_REPORTS`, and
    /// `HOTSPOT_TIME_WINDOW_SECS` overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file or any override is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        base.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies per-field overrides looked up by environment variable name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if an override does not parse
    /// or the resulting config is out of range.
    pub fn with_overrides(
        self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let radius = parse_override(&lookup, "HOTSPOT_RADIUS")?.unwrap_or(self.radius);
        let min_reports =
            parse_override(&lookup, "HOTSPOT_MIN_REPORTS")?.unwrap_or(self.min_reports);
        let time_window_secs = parse_override(&lookup, "HOTSPOT_TIME_WINDOW_SECS")?
            .unwrap_or_else(|| self.time_window.num_seconds());
        Self::new(radius, min_reports, time_window_secs)
    }

    /// The time window in whole seconds.
    #[must_use]
    pub fn time_window_secs(&self) -> i64 {
        self.time_window.num_seconds()
    }
}

fn parse_override<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    lookup(name)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue { name, value })
        })
        .transpose()
}

/// Identifier minted for a detected cluster.
///
/// Ids are fresh per detection call: the same physical cluster observed
/// twice gets two different ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HotspotId(String);

impl HotspotId {
    /// Wraps a raw token.
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

impl fmt::Display for HotspotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Geometry and parameters of a cluster found at ingestion time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterInfo {
    /// Mean location of the previously stored neighbors. The new report
    /// itself is not part of this mean.
    pub center: Location,
    /// Neighbors plus the new report.
    pub report_count: usize,
    /// Radius used, in degrees.
    pub radius: f64,
    /// Time window used, in seconds.
    pub time_window_secs: i64,
}

/// A hotspot alert raised for a single new report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotspotAlert {
    /// Freshly minted cluster id.
    pub hotspot_id: HotspotId,
    /// Cluster details.
    pub cluster: ClusterInfo,
}

/// Outcome of incremental detection for one new report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetectionResult {
    /// Not part of a forming hotspot (or no location to check).
    Isolated,
    /// Completes or joins a hotspot.
    Hotspot(HotspotAlert),
}

impl DetectionResult {
    /// Whether a hotspot was detected.
    #[must_use]
    pub const fn is_hotspot(&self) -> bool {
        matches!(self, Self::Hotspot(_))
    }

    /// The alert, if a hotspot was detected.
    #[must_use]
    pub const fn alert(&self) -> Option<&HotspotAlert> {
        match self {
            Self::Hotspot(alert) => Some(alert),
            Self::Isolated => None,
        }
    }
}

/// An active cluster found by batch aggregation over the whole store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    /// Freshly minted cluster id.
    pub id: HotspotId,
    /// Mean location of every member, anchor included.
    pub center: Location,
    /// Number of members.
    pub report_count: usize,
    /// Member report ids, in insertion order.
    pub members: Vec<ReportId>,
    /// Distinct member categories, in order of first appearance.
    pub categories: Vec<ReportCategory>,
    /// Radius used, in degrees.
    pub radius: f64,
    /// Time window used, in seconds.
    pub time_window_secs: i64,
    /// The evaluation time this cluster was computed for.
    pub last_updated: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn defaults_match_calibration() {
        let config = HotspotConfig::default();
        assert!((config.radius - 0.005).abs() < f64::EPSILON);
        assert_eq!(config.min_reports, 3);
        assert_eq!(config.time_window_secs(), 86_400);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = HotspotConfig::from_toml_str("min_reports = 5\n").unwrap();
        assert_eq!(config.min_reports, 5);
        assert_eq!(config.time_window, HotspotConfig::default().time_window);
    }

    #[test]
    fn toml_rejects_unknown_keys_and_bad_values() {
        assert!(matches!(
            HotspotConfig::from_toml_str("radios = 0.01\n"),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            HotspotConfig::from_toml_str("radius = -1.0\n"),
            Err(ConfigError::InvalidValue { name: "radius", .. })
        ));
        assert!(matches!(
            HotspotConfig::from_toml_str("time_window_secs = 0\n"),
            Err(ConfigError::InvalidValue {
                name: "time_window_secs",
                ..
            })
        ));
    }

    #[test]
    fn overrides_replace_individual_fields() {
        let env: BTreeMap<&str, &str> = [
            ("HOTSPOT_RADIUS", "0.01"),
            ("HOTSPOT_TIME_WINDOW_SECS", "3600"),
        ]
        .into_iter()
        .collect();

        let config = HotspotConfig::default()
            .with_overrides(|key| env.get(key).map(ToString::to_string))
            .unwrap();

        assert!((config.radius - 0.01).abs() < f64::EPSILON);
        assert_eq!(config.min_reports, DEFAULT_MIN_REPORTS);
        assert_eq!(config.time_window_secs(), 3600);
    }

    #[test]
    fn unparseable_override_is_an_error() {
        let result = HotspotConfig::default().with_overrides(|key| {
            (key == "HOTSPOT_MIN_REPORTS").then(|| "three".to_string())
        });
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                name: "HOTSPOT_MIN_REPORTS",
                ..
            })
        ));
    }

    #[test]
    fn detection_result_serializes_with_kind_tag() {
        let json = serde_json::to_value(DetectionResult::Isolated).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "isolated" }));
    }
}
