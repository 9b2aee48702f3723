//! Command-line entry point for the OpenEVSE discovery bridge.

use anyhow::Result;
use clap::Parser;
use openevse_discovery::BridgeConfig;

/// Publish Home Assistant MQTT discovery documents for announced OpenEVSE chargers.
///
/// Settings are read from the environment (`MQTT_BROKER`, `MQTT_PORT`,
/// `MQTT_CLIENT_ID`, `MQTT_USERNAME`, `MQTT_PASSWORD`,
/// `OPENEVSE_ANNOUNCE_MQTT_PREFIX`, `HA_DISCOVERY_PREFIX`); flags override them.
#[derive(Parser, Debug)]
#[command(name = "openevse-discovery")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Announce topic prefix; subscribes to `<prefix>/+`.
    #[arg(long)]
    announce_prefix: Option<String>,

    /// MQTT broker host.
    #[arg(long)]
    broker: Option<String>,

    /// MQTT broker port; 8883 enables TLS.
    #[arg(short, long)]
    port: Option<u16>,

    /// MQTT client id.
    #[arg(long)]
    client_id: Option<String>,

    /// MQTT username (used only together with a password).
    #[arg(long)]
    username: Option<String>,

    /// MQTT password.
    #[arg(long)]
    password: Option<String>,

    /// Discovery topic prefix.
    #[arg(long)]
    discovery_prefix: Option<String>,

    /// Verbose output.
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Apply flags on top of `config`.
    fn apply(self, mut config: BridgeConfig) -> BridgeConfig {
        if let Some(prefix) = self.announce_prefix {
            config.announce_prefix = prefix;
        }
        if let Some(broker) = self.broker {
            config.broker = broker;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(client_id) = self.client_id {
            config.client_id = client_id;
        }
        if self.username.is_some() {
            config.username = self.username;
        }
        if self.password.is_some() {
            config.password = self.password;
        }
        if let Some(prefix) = self.discovery_prefix {
            config.discovery_prefix = prefix;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = args.apply(BridgeConfig::from_env()?);
    config.validate()?;

    openevse_discovery::run(config).await?;
    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    // JSON output for container environments
    let json_logging = std::env::var("OPENEVSE_DISCOVERY_LOG_JSON")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("openevse_discovery={}", level))
            .add_directive(tracing::Level::WARN.into())
    });

    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(false)
            .compact()
            .init();
    }
}
