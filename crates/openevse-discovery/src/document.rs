//! Discovery document synthesis.
//!
//! For every catalog entry the builder produces a canonical document (full
//! attribute names) and the topic it is published on:
//! `<discovery prefix>/<domain>/openevse-<id>-<key>/config`.

use serde_json::{json, Map, Value as JsonValue};

use crate::announce::AnnouncePayload;
use crate::catalog::{SensorCatalog, SensorDefinition};

/// Namespace prefix for object and unique ids.
pub const OBJECT_ID_PREFIX: &str = "openevse";

pub const MANUFACTURER: &str = "OpenEVSE LLC";
pub const MODEL: &str = "OpenEVSE";

/// Evaluated by the hub against the raw announce payload.
pub const AVAILABILITY_TEMPLATE: &str = r#"{{ value.find('"state":"connected"') >= 0 }}"#;
pub const PAYLOAD_AVAILABLE: &str = "True";
pub const PAYLOAD_NOT_AVAILABLE: &str = "False";

/// Ordered, nested attribute map.
pub type CanonicalDocument = Map<String, JsonValue>;

/// One document ready for rewriting and publishing.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryDocument {
    /// Catalog key the document was built from
    pub key: &'static str,

    /// Discovery topic
    pub topic: String,

    /// Document body
    pub body: CanonicalDocument,
}

/// Builds discovery documents from announces.
#[derive(Debug, Clone)]
pub struct DiscoveryBuilder {
    discovery_prefix: String,
    catalog: SensorCatalog,
}

impl DiscoveryBuilder {
    pub fn new(discovery_prefix: impl Into<String>, catalog: SensorCatalog) -> Self {
        Self {
            discovery_prefix: discovery_prefix.into(),
            catalog,
        }
    }

    /// Build one canonical document per catalog entry, in catalog order.
    pub fn build(&self, announce_topic: &str, payload: &AnnouncePayload) -> Vec<DiscoveryDocument> {
        self.catalog
            .entries()
            .iter()
            .map(|sensor| DiscoveryDocument {
                key: sensor.key,
                topic: self.discovery_topic(sensor, &payload.id),
                body: sensor_document(announce_topic, payload, sensor),
            })
            .collect()
    }

    /// `<prefix>/<domain>/openevse-<id>-<key>/config`
    pub fn discovery_topic(&self, sensor: &SensorDefinition, device_id: &str) -> String {
        format!(
            "{}/{}/{}/config",
            self.discovery_prefix,
            sensor.domain,
            object_id(device_id, sensor.key)
        )
    }
}

/// `openevse-<id>-<key>`, used as both unique id and topic node.
pub fn object_id(device_id: &str, key: &str) -> String {
    format!("{}-{}-{}", OBJECT_ID_PREFIX, device_id, key)
}

fn sensor_document(
    announce_topic: &str,
    payload: &AnnouncePayload,
    sensor: &SensorDefinition,
) -> CanonicalDocument {
    let device_name = format!("OpenEVSE {}", payload.id);

    let mut doc = Map::new();
    doc.insert("~".to_string(), json!(payload.base_topic));
    doc.insert(
        "name".to_string(),
        json!(format!("{} {}", device_name, sensor.display_name)),
    );
    doc.insert(
        "unique_id".to_string(),
        json!(object_id(&payload.id, sensor.key)),
    );
    doc.insert(
        "state_topic".to_string(),
        json!(format!("{}/{}", payload.base_topic, sensor.key)),
    );
    doc.insert("availability_topic".to_string(), json!(announce_topic));
    doc.insert(
        "availability_template".to_string(),
        json!(AVAILABILITY_TEMPLATE),
    );
    doc.insert("payload_available".to_string(), json!(PAYLOAD_AVAILABLE));
    doc.insert(
        "payload_not_available".to_string(),
        json!(PAYLOAD_NOT_AVAILABLE),
    );
    doc.insert(
        "device".to_string(),
        json!({
            "manufacturer": MANUFACTURER,
            "model": MODEL,
            "name": device_name,
            "identifiers": [payload.id],
            "connections": [["mac", payload.id]],
            "configuration_url": payload.http_url,
        }),
    );

    for (name, value) in &sensor.attributes {
        doc.insert(name.clone(), value.clone());
    }

    doc
}
