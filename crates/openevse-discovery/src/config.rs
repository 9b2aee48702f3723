//! Bridge configuration.
//!
//! Every setting has a default and can be overridden through the environment.

use std::time::Duration;

use crate::announce;
use crate::error::{DiscoveryError, DiscoveryResult};

/// Default values.
pub mod defaults {
    pub const ANNOUNCE_PREFIX: &str = "openevse/announce";
    pub const BROKER: &str = "mqtt";
    pub const PORT: u16 = 8883;
    pub const CLIENT_ID: &str = "openevse-mqtt-ha-discovery";
    pub const DISCOVERY_PREFIX: &str = "homeassistant";
    pub const KEEP_ALIVE_SECS: u64 = 60;
    /// Port on which TLS is enabled.
    pub const TLS_PORT: u16 = 8883;
}

/// Environment variable names.
pub mod env_vars {
    pub const ANNOUNCE_PREFIX: &str = "OPENEVSE_ANNOUNCE_MQTT_PREFIX";
    pub const BROKER: &str = "MQTT_BROKER";
    pub const PORT: &str = "MQTT_PORT";
    pub const CLIENT_ID: &str = "MQTT_CLIENT_ID";
    pub const USERNAME: &str = "MQTT_USERNAME";
    pub const PASSWORD: &str = "MQTT_PASSWORD";
    pub const DISCOVERY_PREFIX: &str = "HA_DISCOVERY_PREFIX";
}

/// Settings for the announce-to-discovery bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Announces are received on `<announce_prefix>/+`
    pub announce_prefix: String,

    /// Broker host
    pub broker: String,

    /// Broker port; 8883 enables TLS
    pub port: u16,

    /// MQTT client id
    pub client_id: String,

    pub username: Option<String>,

    pub password: Option<String>,

    /// Discovery documents are published below this prefix
    pub discovery_prefix: String,

    /// Keep-alive interval in seconds
    pub keep_alive: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            announce_prefix: defaults::ANNOUNCE_PREFIX.to_string(),
            broker: defaults::BROKER.to_string(),
            port: defaults::PORT,
            client_id: defaults::CLIENT_ID.to_string(),
            username: None,
            password: None,
            discovery_prefix: defaults::DISCOVERY_PREFIX.to_string(),
            keep_alive: defaults::KEEP_ALIVE_SECS,
        }
    }
}

impl BridgeConfig {
    /// Load from the process environment.
    pub fn from_env() -> DiscoveryResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using `lookup` to resolve variable names.
    pub fn from_lookup<F>(lookup: F) -> DiscoveryResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(prefix) = lookup(env_vars::ANNOUNCE_PREFIX) {
            config.announce_prefix = prefix;
        }
        if let Some(broker) = lookup(env_vars::BROKER) {
            config.broker = broker;
        }
        if let Some(port) = lookup(env_vars::PORT) {
            config.port = port.trim().parse().map_err(|_| {
                DiscoveryError::Configuration(format!(
                    "{} must be a port number, got '{}'",
                    env_vars::PORT,
                    port
                ))
            })?;
        }
        if let Some(client_id) = lookup(env_vars::CLIENT_ID) {
            config.client_id = client_id;
        }
        config.username = lookup(env_vars::USERNAME);
        config.password = lookup(env_vars::PASSWORD);
        if let Some(prefix) = lookup(env_vars::DISCOVERY_PREFIX) {
            config.discovery_prefix = prefix;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_broker(mut self, broker: impl Into<String>, port: u16) -> Self {
        self.broker = broker.into();
        self.port = port;
        self
    }

    pub fn with_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    pub fn with_announce_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.announce_prefix = prefix.into();
        self
    }

    pub fn with_discovery_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.discovery_prefix = prefix.into();
        self
    }

    /// Reject settings the bridge cannot run with.
    pub fn validate(&self) -> DiscoveryResult<()> {
        if self.broker.trim().is_empty() {
            return Err(DiscoveryError::Configuration(format!(
                "{} must be defined",
                env_vars::BROKER
            )));
        }
        if self.client_id.is_empty() {
            return Err(DiscoveryError::Configuration(
                "client id must not be empty".to_string(),
            ));
        }
        if self.announce_prefix.is_empty() || self.discovery_prefix.is_empty() {
            return Err(DiscoveryError::Configuration(
                "topic prefixes must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// TLS is used on the standard secure MQTT port only.
    pub fn uses_tls(&self) -> bool {
        self.port == defaults::TLS_PORT
    }

    /// Username and password, when both are set.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }

    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive)
    }

    pub fn broker_addr(&self) -> String {
        format!("{}:{}", self.broker, self.port)
    }

    pub fn announce_subscription(&self) -> String {
        announce::announce_subscription(&self.announce_prefix)
    }

    pub fn is_announce_topic(&self, topic: &str) -> bool {
        announce::is_announce_topic(&self.announce_prefix, topic)
    }
}
