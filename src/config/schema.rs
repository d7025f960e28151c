//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.
//!
//! The three backend identifiers keep their historical setting names by way
//! of TOML dotted keys:
//!
//! ```toml
//! images3.conf = "conf/images3.toml"
//! imageprocessor.conf = "conf/imageprocessor.toml"
//! mongodb.conf = "conf/mongodb.toml"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::provision::ConfigurationBundle;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// ImageS3 client settings file (`images3.conf`).
    pub images3: ConfReference,

    /// Image processor settings file (`imageprocessor.conf`).
    pub imageprocessor: ConfReference,

    /// Document store settings file (`mongodb.conf`).
    pub mongodb: ConfReference,

    /// Startup provisioning behaviour.
    pub provisioning: ProvisioningConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Static pages (the 404 fallback).
    pub assets: AssetsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl GatewayConfig {
    /// The three identifiers handed to the resource constructors.
    pub fn bundle(&self) -> ConfigurationBundle {
        ConfigurationBundle {
            images3_conf: PathBuf::from(&self.images3.conf),
            imageprocessor_conf: PathBuf::from(&self.imageprocessor.conf),
            mongodb_conf: PathBuf::from(&self.mongodb.conf),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:9000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:9000".to_string(),
        }
    }
}

/// A `<name>.conf` entry pointing at a settings file.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ConfReference {
    pub conf: String,
}

impl ConfReference {
    pub fn new(conf: impl Into<String>) -> Self {
        Self { conf: conf.into() }
    }
}

/// Provisioning configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProvisioningConfig {
    /// Upper bound for constructing every resource at startup.
    pub startup_timeout_secs: u64,

    /// Ping the backend once the client is built; failure aborts startup.
    pub verify_backend: bool,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            startup_timeout_secs: 30,
            verify_backend: false,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Static asset configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Directory holding `404.html`.
    pub static_dir: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            static_dir: "public".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default filter directives when `RUST_LOG` is unset.
    pub log_filter: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Prometheus exporter address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "images3_gateway=info,tower_http=info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9091".to_string(),
        }
    }
}
