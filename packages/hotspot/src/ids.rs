//! Hotspot id generation.

use std::sync::atomic::{AtomicU64, Ordering};

use safety_watch_hotspot_models::HotspotId;

/// Prefix carried by every hotspot id.
pub const HOTSPOT_ID_PREFIX: &str = "HS-";

/// Source of hotspot ids. A new id is drawn for every detected cluster,
/// even when the same cluster was reported by an earlier call.
pub trait HotspotIdGenerator: Send + Sync {
    /// Produces the next id.
    fn next_id(&self) -> HotspotId;
}

/// `HS-` followed by six random uppercase hex characters.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomHotspotIds;

impl HotspotIdGenerator for RandomHotspotIds {
    fn next_id(&self) -> HotspotId {
        let hex = uuid::Uuid::new_v4().simple().to_string().to_uppercase();
        HotspotId::new(format!("{HOTSPOT_ID_PREFIX}{}", &hex[..6]))
    }
}

/// Deterministic `HS-000001`, `HS-000002`, ...
#[derive(Debug)]
pub struct SequentialHotspotIds {
    next: AtomicU64,
}

impl SequentialHotspotIds {
    /// Starts counting at 1.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }
}

impl Default for SequentialHotspotIds {
    fn default() -> Self {
        Self::new()
    }
}

impl HotspotIdGenerator for SequentialHotspotIds {
    fn next_id(&self) -> HotspotId {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        HotspotId::new(format!("{HOTSPOT_ID_PREFIX}{n:06}"))
    }
}
