//! OpenEVSE announce messages.
//!
//! A charger publishes a JSON announce on `<announce prefix>/<id>` describing
//! where its telemetry lives:
//!
//! ```json
//! {"id": "AABBCC", "mqtt": "openevse/AABBCC", "http": "http://1.2.3.4", "state": "connected"}
//! ```
//!
//! Only `id`, `mqtt` and `http` are used; other fields are ignored.

use serde::Deserialize;

use crate::error::{DiscoveryError, DiscoveryResult};

/// Decoded announce payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnnouncePayload {
    /// Stable device identifier
    pub id: String,

    /// Base topic under which the device publishes its sensors
    #[serde(rename = "mqtt")]
    pub base_topic: String,

    /// Local management UI URL
    #[serde(rename = "http")]
    pub http_url: String,
}

impl AnnouncePayload {
    pub fn new(
        id: impl Into<String>,
        base_topic: impl Into<String>,
        http_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            base_topic: base_topic.into(),
            http_url: http_url.into(),
        }
    }

    /// Decode a raw announce message body.
    pub fn decode(payload: &[u8]) -> DiscoveryResult<Self> {
        serde_json::from_slice(payload).map_err(DiscoveryError::InvalidAnnounce)
    }
}

/// Subscription filter for announces below `prefix`.
pub fn announce_subscription(prefix: &str) -> String {
    format!("{}/+", prefix.trim_end_matches('/'))
}

/// Check whether `topic` is exactly one level below the announce prefix.
pub fn is_announce_topic(prefix: &str, topic: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    topic
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('/'))
        .is_some_and(|leaf| !leaf.is_empty() && !leaf.contains('/'))
}
