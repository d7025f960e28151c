//! Startup orchestration.
//!
//! # Responsibilities
//! - Provision every shared resource from the validated configuration
//! - Bind the listener only once provisioning succeeded
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Provisioning is bounded by `provisioning.startup_timeout_secs`
//! - Listeners start last (traffic only when ready)

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::GatewayConfig;
use crate::provision::{self, ProvisionError, ServiceRegistry};

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("provisioning failed: {0}")]
    Provision(#[from] ProvisionError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Build the singleton registry before any request can be served.
pub async fn start(config: &GatewayConfig) -> Result<Arc<ServiceRegistry>, StartupError> {
    let registry = provision::initialize(
        config.bundle(),
        Duration::from_secs(config.provisioning.startup_timeout_secs),
        config.provisioning.verify_backend,
    )
    .await?;

    tracing::info!("Application has started");
    Ok(registry)
}

/// Bind the configured listener address.
pub async fn bind(config: &GatewayConfig) -> Result<TcpListener, StartupError> {
    let address = &config.listener.bind_address;
    TcpListener::bind(address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })
}
