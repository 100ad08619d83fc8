#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Hotspot detection over report snapshots.
//!
//! Everything in this crate is a pure function of a [`Snapshot`], an
//! evaluation time, and a [`HotspotConfig`]; nothing here locks or mutates
//! the store.
//!
//! - [`filter::filter_recent`] keeps geolocated reports inside the time
//!   window.
//! - [`geometry::distance`] is planar degree-space distance.
//! - [`HotspotDetector`] runs once per submission against the snapshot
//!   taken before that submission was stored.
//! - [`HotspotAggregator`] groups the whole recent set into clusters on
//!   demand.
//!
//! [`Snapshot`]: safety_watch_store::Snapshot
//! [`HotspotConfig`]: safety_watch_hotspot_models::HotspotConfig

pub mod aggregate;
pub mod detect;
pub mod filter;
pub mod geometry;
pub mod ids;

pub use aggregate::HotspotAggregator;
pub use detect::HotspotDetector;
pub use ids::{HotspotIdGenerator, RandomHotspotIds, SequentialHotspotIds};
