//! Sensor catalog.
//!
//! Each entry describes one OpenEVSE telemetry sub-topic and the discovery
//! attributes that shape its registration document. Attribute values are
//! passed to the hub verbatim; value templates in particular are opaque here.

use serde_json::{Map, Value as JsonValue};

/// Registration metadata for one sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorDefinition {
    /// Catalog key, also the sensor's topic suffix.
    pub key: &'static str,

    /// Registration domain (e.g. `sensor`).
    pub domain: &'static str,

    /// Human readable name appended to the device name.
    pub display_name: &'static str,

    /// Canonical attribute name -> value, merged into the document as-is.
    pub attributes: Map<String, JsonValue>,
}

impl SensorDefinition {
    pub fn new(key: &'static str, domain: &'static str, display_name: &'static str) -> Self {
        Self {
            key,
            domain,
            display_name,
            attributes: Map::new(),
        }
    }

    /// Add a discovery attribute.
    pub fn with_attribute(mut self, name: &str, value: impl Into<JsonValue>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn with_device_class(self, device_class: &str) -> Self {
        self.with_attribute("device_class", device_class)
    }

    pub fn with_unit(self, unit: &str) -> Self {
        self.with_attribute("unit_of_measurement", unit)
    }

    pub fn with_state_class(self, state_class: &str) -> Self {
        self.with_attribute("state_class", state_class)
    }

    pub fn with_value_template(self, template: &str) -> Self {
        self.with_attribute("value_template", template)
    }

    /// Rendered as the string `"true"`/`"false"`, as chargers have always sent it.
    pub fn with_enabled_by_default(self, enabled: bool) -> Self {
        self.with_attribute("enabled_by_default", enabled.to_string())
    }
}

/// Ordered, immutable set of sensor definitions.
#[derive(Debug, Clone)]
pub struct SensorCatalog {
    entries: Vec<SensorDefinition>,
}

impl SensorCatalog {
    pub fn new(entries: Vec<SensorDefinition>) -> Self {
        Self { entries }
    }

    /// The sensors an OpenEVSE charger reports.
    pub fn openevse() -> Self {
        Self::new(vec![
            SensorDefinition::new("amp", "sensor", "Amps")
                .with_device_class("current")
                .with_unit("A")
                .with_state_class("measurement")
                .with_value_template("{{ value | float / 1000 | round(2) }}"),
            SensorDefinition::new("pilot", "sensor", "Pilot Current")
                .with_device_class("current")
                .with_unit("A")
                .with_state_class("measurement")
                .with_enabled_by_default(false),
            SensorDefinition::new("session_energy", "sensor", "Session Energy")
                .with_device_class("power")
                .with_unit("kW")
                .with_state_class("measurement")
                .with_value_template("{{ value | float / 1000 | round(2) }}")
                .with_enabled_by_default(false),
            SensorDefinition::new("state", "sensor", "State").with_value_template(
                "{% set state_map = {1: 'Ready', 2: 'Connected', 3: 'Charging', 4: 'Error'} %}{{ state_map[int(value)] }}",
            ),
            SensorDefinition::new("temp", "sensor", "Temp")
                .with_device_class("temperature")
                .with_unit("°C")
                .with_state_class("measurement")
                .with_value_template("{{ value | float / 10 | round(2) }}"),
            SensorDefinition::new("total_energy", "sensor", "Total Energy")
                .with_device_class("power")
                .with_unit("kW")
                .with_state_class("measurement")
                .with_value_template("{{ value | float | round(2) }}")
                .with_enabled_by_default(false),
            SensorDefinition::new("voltage", "sensor", "Voltage")
                .with_device_class("voltage")
                .with_unit("V")
                .with_state_class("measurement")
                .with_enabled_by_default(false),
        ])
    }

    pub fn entries(&self) -> &[SensorDefinition] {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Option<&SensorDefinition> {
        self.entries.iter().find(|entry| entry.key == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SensorCatalog {
    fn default() -> Self {
        Self::openevse()
    }
}
