//! Announce dispatch loop.
//!
//! ## Flow
//!
//! 1. Subscribe to `<announce prefix>/+` on every (re)connect
//! 2. Decode each announce
//! 3. Build one canonical document per catalog entry
//! 4. Abbreviate keys and publish each document, retained
//!
//! Announces are handled one at a time, in arrival order. A bad announce or a
//! failed publish is logged and never stops the loop.

use std::time::Duration;

use rumqttc::{AsyncClient, ConnectReturnCode, Event, EventLoop, Packet, QoS};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::abbreviations::AbbreviationTables;
use crate::announce::AnnouncePayload;
use crate::catalog::SensorCatalog;
use crate::config::BridgeConfig;
use crate::document::{CanonicalDocument, DiscoveryBuilder};
use crate::error::{DiscoveryError, DiscoveryResult};
use crate::mqtt::{mqtt_options, DiscoveryPublisher, REQUEST_CHANNEL_CAPACITY};
use crate::rewrite::abbreviate_document;

/// Pause before polling again after a connection error.
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Announces buffered between the event loop and the dispatcher.
const ANNOUNCE_QUEUE_CAPACITY: usize = 100;

/// Outcome of handling one announce.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Topics that were handed to the transport
    pub published: Vec<String>,

    /// Topics whose publish failed
    pub failed: Vec<String>,
}

impl PublishReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Turns announces into published discovery documents.
pub struct DiscoveryBridge<P> {
    builder: DiscoveryBuilder,
    tables: AbbreviationTables,
    publisher: P,
}

impl<P: DiscoveryPublisher> DiscoveryBridge<P> {
    pub fn new(builder: DiscoveryBuilder, tables: AbbreviationTables, publisher: P) -> Self {
        Self {
            builder,
            tables,
            publisher,
        }
    }

    /// Bridge for the OpenEVSE catalog and Home Assistant abbreviations.
    pub fn openevse(discovery_prefix: impl Into<String>, publisher: P) -> Self {
        Self::new(
            DiscoveryBuilder::new(discovery_prefix, SensorCatalog::openevse()),
            AbbreviationTables::home_assistant(),
            publisher,
        )
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Decode an announce and return the abbreviated documents with their
    /// topics, in catalog order.
    pub fn render(
        &self,
        announce_topic: &str,
        payload: &[u8],
    ) -> DiscoveryResult<Vec<(String, CanonicalDocument)>> {
        let announce = AnnouncePayload::decode(payload)?;

        Ok(self
            .builder
            .build(announce_topic, &announce)
            .into_iter()
            .map(|doc| (doc.topic, abbreviate_document(&doc.body, &self.tables)))
            .collect())
    }

    /// Handle one raw announce message.
    ///
    /// Returns an error only when the announce cannot be decoded, in which
    /// case nothing is published.
    pub async fn handle_announce(
        &self,
        announce_topic: &str,
        payload: &[u8],
    ) -> DiscoveryResult<PublishReport> {
        debug!(
            "MQTT: Message received on {}: {}",
            announce_topic,
            String::from_utf8_lossy(payload)
        );

        let documents = self.render(announce_topic, payload)?;
        let mut report = PublishReport::default();

        for (topic, body) in documents {
            let result = match serde_json::to_vec(&body) {
                Ok(bytes) => self.publisher.publish(&topic, bytes, true).await,
                Err(e) => Err(DiscoveryError::Serialize(e)),
            };

            match result {
                Ok(()) => {
                    info!("MQTT: Published discovery, topic: {}", topic);
                    report.published.push(topic);
                }
                Err(e) => {
                    error!("MQTT: Error publishing discovery: {}", e);
                    report.failed.push(topic);
                }
            }
        }

        Ok(report)
    }
}

/// An announce forwarded from the event loop.
#[derive(Debug)]
struct RawAnnounce {
    topic: String,
    payload: Vec<u8>,
}

/// Connect to the broker and bridge announces until the connection task ends.
pub async fn run(config: BridgeConfig) -> DiscoveryResult<()> {
    config.validate()?;

    let (client, eventloop) = AsyncClient::new(mqtt_options(&config), REQUEST_CHANNEL_CAPACITY);
    let (announce_tx, mut announce_rx) = mpsc::channel(ANNOUNCE_QUEUE_CAPACITY);

    info!(
        "MQTT: Connect to {} ({})",
        config.broker_addr(),
        config.client_id
    );
    tokio::spawn(drive_event_loop(
        eventloop,
        client.clone(),
        config.clone(),
        announce_tx,
    ));

    let bridge = DiscoveryBridge::openevse(config.discovery_prefix.clone(), client);

    dispatch_announces(&bridge, &mut announce_rx).await;

    info!("MQTT: Connection closed");
    Ok(())
}

/// Handle queued announces in arrival order until the queue closes.
async fn dispatch_announces<P: DiscoveryPublisher>(
    bridge: &DiscoveryBridge<P>,
    announce_rx: &mut mpsc::Receiver<RawAnnounce>,
) {
    while let Some(announce) = announce_rx.recv().await {
        match bridge.handle_announce(&announce.topic, &announce.payload).await {
            Ok(report) if !report.is_complete() => warn!(
                "Announce on {}: {} of {} discovery documents failed",
                announce.topic,
                report.failed.len(),
                report.failed.len() + report.published.len()
            ),
            Ok(_) => {}
            Err(e) => error!("Dropped announce on {}: {}", announce.topic, e),
        }
    }
}

/// Queue a subscribe request without blocking the poll loop.
///
/// The request waits for space in the request channel instead of failing
/// when the dispatcher has filled it with publishes.
fn resubscribe(client: &AsyncClient, subscription: &str) -> JoinHandle<()> {
    let client = client.clone();
    let subscription = subscription.to_string();
    tokio::spawn(async move {
        if let Err(e) = client.subscribe(subscription, QoS::AtLeastOnce).await {
            error!("{}", DiscoveryError::Subscribe(e.to_string()));
        }
    })
}

/// Poll the connection, resubscribe on every ConnAck and forward announces.
async fn drive_event_loop(
    mut eventloop: EventLoop,
    client: AsyncClient,
    config: BridgeConfig,
    announce_tx: mpsc::Sender<RawAnnounce>,
) {
    let subscription = config.announce_subscription();

    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                if ack.code != ConnectReturnCode::Success {
                    error!("MQTT: Failed to connect, rc: {:?}", ack.code);
                    continue;
                }
                info!("MQTT: Connected to broker.");
                info!("MQTT: Subscribe: {}", subscription);
                resubscribe(&client, &subscription);
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                debug!(
                    "MQTT: Message topic: {}, qos: {:?}, retain flag: {}",
                    publish.topic, publish.qos, publish.retain
                );
                if !config.is_announce_topic(&publish.topic) {
                    continue;
                }
                let announce = RawAnnounce {
                    topic: publish.topic,
                    payload: publish.payload.to_vec(),
                };
                match announce_tx.try_send(announce) {
                    Ok(()) => {}
                    Err(TrySendError::Full(dropped)) => {
                        warn!("Announce queue full, dropping announce on {}", dropped.topic);
                    }
                    Err(TrySendError::Closed(_)) => break,
                }
            }
            Ok(_) => {}
            Err(e) => {
                error!("MQTT: Connection error: {}", e);
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use rumqttc::MqttOptions;
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    const ANNOUNCE_TOPIC: &str = "openevse/announce/AABBCC";
    const ANNOUNCE: &[u8] =
        br#"{"id":"AABBCC","mqtt":"openevse/AABBCC","http":"http://1.2.3.4"}"#;

    #[derive(Default)]
    struct RecordingPublisher {
        topics: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl DiscoveryPublisher for RecordingPublisher {
        async fn publish(
            &self,
            topic: &str,
            _payload: Vec<u8>,
            _retain: bool,
        ) -> DiscoveryResult<()> {
            self.topics.lock().unwrap().push(topic.to_string());
            Ok(())
        }
    }

    /// Counts ERROR events.
    struct ErrorCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for ErrorCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::ERROR {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn raw(payload: &[u8]) -> RawAnnounce {
        RawAnnounce {
            topic: ANNOUNCE_TOPIC.to_string(),
            payload: payload.to_vec(),
        }
    }

    #[tokio::test]
    async fn test_dispatch_drops_malformed_and_continues() {
        let errors = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(ErrorCounter(errors.clone()));
        let _guard = tracing::subscriber::set_default(subscriber);

        let bridge = DiscoveryBridge::openevse("homeassistant", RecordingPublisher::default());
        let (tx, mut rx) = mpsc::channel(4);
        tx.send(raw(br#"{"id":"AABBCC","http":"http://1.2.3.4"}"#))
            .await
            .unwrap();
        tx.send(raw(ANNOUNCE)).await.unwrap();
        drop(tx);

        dispatch_announces(&bridge, &mut rx).await;

        // One error for the malformed announce, none for the good one
        assert_eq!(errors.load(Ordering::SeqCst), 1);
        let topics = bridge.publisher().topics.lock().unwrap().clone();
        assert_eq!(topics.len(), SensorCatalog::openevse().len());
        assert_eq!(topics[0], "homeassistant/sensor/openevse-AABBCC-amp/config");
    }

    #[tokio::test]
    async fn test_resubscribe_waits_for_channel_space() {
        let options = MqttOptions::new("test-client", "localhost", 1883);
        let (client, _eventloop) = AsyncClient::new(options, 2);

        // Fill the request channel while nothing polls the event loop
        while client
            .try_publish("homeassistant/x/config", QoS::AtLeastOnce, true, b"{}".to_vec())
            .is_ok()
        {}
        assert!(client
            .try_subscribe("openevse/announce/+", QoS::AtLeastOnce)
            .is_err());

        let handle = resubscribe(&client, "openevse/announce/+");
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        // Still queued, not dropped
        assert!(!handle.is_finished());
        handle.abort();
    }
}
