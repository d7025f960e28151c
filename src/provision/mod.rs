//! Resource provisioning subsystem.
//!
//! # Data Flow
//! ```text
//! GatewayConfig::bundle()
//!     → ConfigurationBundle (images3.conf, imageprocessor.conf, mongodb.conf)
//!     → registry.rs (one OnceCell slot per resource type)
//!     → image_client.rs / data_mapper.rs (Resource::construct)
//!     → Arc<T> shared by every handler
//! ```
//!
//! # Design Decisions
//! - Eager: `initialize` builds every resource before the listener starts
//! - Lazy access still serialises construction per type
//! - A failed construction is never cached; the next caller retries
//! - Startup is bounded by a timeout; exceeding it is fatal

pub mod data_mapper;
pub mod image_client;
pub mod registry;

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::observability::metrics;

pub use data_mapper::DataMapper;
pub use image_client::{ClientError, ImageS3Client};
pub use registry::ServiceRegistry;

/// The three configuration identifiers read at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationBundle {
    pub images3_conf: PathBuf,
    pub imageprocessor_conf: PathBuf,
    pub mongodb_conf: PathBuf,
}

/// A long-lived value built once from the configuration bundle.
pub trait Resource: Send + Sync + Sized + 'static {
    /// Name used in logs and status output.
    const NAME: &'static str;

    fn construct(
        bundle: &ConfigurationBundle,
    ) -> impl Future<Output = Result<Self, ProvisionError>> + Send;
}

/// Errors that can occur while provisioning resources.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("failed to read {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid backend endpoint '{endpoint}': {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("backend unreachable: {0}")]
    BackendUnreachable(#[source] ClientError),

    #[error("provisioning timed out after {0:?}")]
    Timeout(Duration),

    #[error("registry slot for {0} holds a different type")]
    TypeMismatch(&'static str),
}

/// Build every process-wide resource up front.
///
/// Returns only once the ImageS3 client and data mapper exist, so request
/// handlers never race their construction. When `verify_backend` is set the
/// client must also answer a ping.
pub async fn initialize(
    bundle: ConfigurationBundle,
    startup_timeout: Duration,
    verify_backend: bool,
) -> Result<Arc<ServiceRegistry>, ProvisionError> {
    let registry = Arc::new(ServiceRegistry::new(bundle));

    let build = async {
        let client = registry.get::<ImageS3Client>().await?;
        registry.get::<DataMapper>().await?;

        if verify_backend {
            client
                .ping()
                .await
                .map_err(ProvisionError::BackendUnreachable)?;
            tracing::info!(endpoint = %client.endpoint(), "ImageS3 backend reachable");
        }
        Ok::<_, ProvisionError>(())
    };

    match tokio::time::timeout(startup_timeout, build).await {
        Ok(result) => result?,
        Err(_) => return Err(ProvisionError::Timeout(startup_timeout)),
    }

    let resources = registry.provisioned();
    metrics::record_provisioned(resources.len());
    tracing::info!(resources = ?resources, "Resources provisioned");
    Ok(registry)
}

/// Release the registry at process stop.
pub fn shutdown(registry: Arc<ServiceRegistry>) {
    tracing::info!(
        resources = ?registry.provisioned(),
        "Application shutdown..."
    );
    drop(registry);
}
