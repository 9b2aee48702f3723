//! MQTT transport glue using rumqttc.

use async_trait::async_trait;
use rumqttc::{AsyncClient, MqttOptions, QoS, Transport};
use tracing::info;

use crate::config::BridgeConfig;
use crate::error::{DiscoveryError, DiscoveryResult};

/// Request channel capacity between the client handle and its event loop.
pub const REQUEST_CHANNEL_CAPACITY: usize = 10;

/// Build connection options from the bridge configuration.
pub fn mqtt_options(config: &BridgeConfig) -> MqttOptions {
    let mut options = MqttOptions::new(&config.client_id, &config.broker, config.port);
    options.set_keep_alive(config.keep_alive());

    if let Some((username, password)) = config.credentials() {
        info!("MQTT: Authentication enabled, connect as: {}", username);
        options.set_credentials(username, password);
    }

    if config.uses_tls() {
        info!("MQTT: Enable TLS.");
        options.set_transport(Transport::tls_with_default_config());
    }

    options
}

/// Sink for finished discovery documents.
#[async_trait]
pub trait DiscoveryPublisher: Send + Sync {
    /// Publish one serialized document.
    async fn publish(&self, topic: &str, payload: Vec<u8>, retain: bool) -> DiscoveryResult<()>;
}

#[async_trait]
impl DiscoveryPublisher for AsyncClient {
    async fn publish(&self, topic: &str, payload: Vec<u8>, retain: bool) -> DiscoveryResult<()> {
        AsyncClient::publish(self, topic, QoS::AtLeastOnce, retain, payload)
            .await
            .map_err(|e| DiscoveryError::Publish {
                topic: topic.to_string(),
                reason: e.to_string(),
            })
    }
}
