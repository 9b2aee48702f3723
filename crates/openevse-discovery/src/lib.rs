//! OpenEVSE Home Assistant Discovery Bridge
//!
//! Listens for OpenEVSE announce messages and publishes one MQTT discovery
//! document per known sensor, so the hub creates the charger's entities
//! without manual setup.
//!
//! ## Architecture
//!
//! - **SensorCatalog**: static sensor definitions driving document generation
//! - **AbbreviationTables**: generic and `device` key abbreviations
//! - **DiscoveryBuilder**: announce + catalog -> canonical documents
//! - **abbreviate_document**: context-sensitive key rewriter
//! - **DiscoveryBridge**: decode, build, rewrite and publish per announce
//!
//! Catalog and tables are built once and only read afterwards; every document
//! is created fresh per announce.

pub mod abbreviations;
pub mod announce;
pub mod bridge;
pub mod catalog;
pub mod config;
pub mod document;
pub mod error;
pub mod mqtt;
pub mod rewrite;

// Re-exports for convenience
pub use abbreviations::{AbbreviationTable, AbbreviationTables};
pub use announce::AnnouncePayload;
pub use bridge::{run, DiscoveryBridge, PublishReport};
pub use catalog::{SensorCatalog, SensorDefinition};
pub use config::BridgeConfig;
pub use document::{CanonicalDocument, DiscoveryBuilder, DiscoveryDocument};
pub use error::{DiscoveryError, DiscoveryResult};
pub use mqtt::DiscoveryPublisher;
pub use rewrite::{abbreviate_document, expand_document};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
