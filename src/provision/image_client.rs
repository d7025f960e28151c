//! ImageS3 backend client.
//!
//! # Responsibilities
//! - Load the three settings files named by the configuration bundle
//! - Hold one pooled HTTP connection to the image-processing backend
//! - Decode backend failure documents into [`ImageS3Error`]
//! - Provide a health probe for startup verification
//!
//! # Settings files
//! ```text
//! images3.conf         endpoint, request_timeout_secs
//! imageprocessor.conf  working_dir, max_image_bytes
//! mongodb.conf         url, database
//! ```

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::error::ImageS3Error;
use crate::provision::{ConfigurationBundle, ProvisionError, Resource};

/// Contents of `images3.conf`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImageS3Settings {
    /// Base URL of the backend API.
    pub endpoint: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    10
}

/// Contents of `imageprocessor.conf`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImageProcessorSettings {
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,

    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: u64,
}

fn default_working_dir() -> PathBuf {
    std::env::temp_dir().join("images3")
}

fn default_max_image_bytes() -> u64 {
    20 * 1024 * 1024
}

/// Contents of `mongodb.conf`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DocumentStoreSettings {
    pub url: String,
    pub database: String,
}

/// Errors from a single backend call.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The backend answered with a domain failure.
    #[error(transparent)]
    ImageS3(#[from] ImageS3Error),

    /// The request never completed or the reply was unreadable.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success reply without a recognisable failure document.
    #[error("backend returned {status}")]
    UnexpectedStatus { status: StatusCode },

    #[error("invalid request path '{path}': {source}")]
    InvalidPath {
        path: String,
        #[source]
        source: url::ParseError,
    },
}

/// Handle to the image-processing backend.
#[derive(Clone)]
pub struct ImageS3Client {
    http: reqwest::Client,
    endpoint: Url,
    processor: ImageProcessorSettings,
    store: DocumentStoreSettings,
}

impl ImageS3Client {
    /// Create a client from already-loaded settings.
    pub fn new(
        settings: ImageS3Settings,
        processor: ImageProcessorSettings,
        store: DocumentStoreSettings,
    ) -> Result<Self, ProvisionError> {
        // A base without a trailing slash would lose its last segment on join.
        let mut base = settings.endpoint.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let endpoint = Url::parse(&base).map_err(|source| ProvisionError::InvalidEndpoint {
            endpoint: settings.endpoint.clone(),
            source,
        })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .no_proxy()
            .build()
            .map_err(ProvisionError::Client)?;

        tracing::info!(
            endpoint = %endpoint,
            database = %store.database,
            working_dir = %processor.working_dir.display(),
            "ImageS3 client initialized"
        );

        Ok(Self {
            http,
            endpoint,
            processor,
            store,
        })
    }

    /// Backend base URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn processor(&self) -> &ImageProcessorSettings {
        &self.processor
    }

    pub fn document_store(&self) -> &DocumentStoreSettings {
        &self.store
    }

    /// Check that the backend answers `GET health`.
    pub async fn ping(&self) -> Result<(), ClientError> {
        let url = self.url("health")?;
        let response = self.http.get(url).send().await?;
        Self::check(response).await.map(|_| ())
    }

    /// `GET` a backend resource and decode its JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.url(path)?;
        tracing::debug!(url = %url, "ImageS3 GET");
        let response = Self::check(self.http.get(url).send().await?).await?;
        Ok(response.json::<T>().await?)
    }

    /// `DELETE` a backend resource.
    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        let url = self.url(path)?;
        tracing::debug!(url = %url, "ImageS3 DELETE");
        Self::check(self.http.delete(url).send().await?).await.map(|_| ())
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.endpoint
            .join(path.trim_start_matches('/'))
            .map_err(|source| ClientError::InvalidPath {
                path: path.to_string(),
                source,
            })
    }

    /// Pass successful replies through; decode the rest into a failure.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await?;
        match serde_json::from_slice::<ImageS3Error>(&body) {
            Ok(failure) => {
                tracing::debug!(status = %status, failure = %failure, "ImageS3 call failed");
                Err(ClientError::ImageS3(failure))
            }
            Err(_) => Err(ClientError::UnexpectedStatus { status }),
        }
    }
}

impl Resource for ImageS3Client {
    const NAME: &'static str = "ImageS3Client";

    async fn construct(bundle: &ConfigurationBundle) -> Result<Self, ProvisionError> {
        let settings: ImageS3Settings = read_settings(&bundle.images3_conf).await?;
        let processor: ImageProcessorSettings = read_settings(&bundle.imageprocessor_conf).await?;
        let store: DocumentStoreSettings = read_settings(&bundle.mongodb_conf).await?;
        Self::new(settings, processor, store)
    }
}

impl std::fmt::Debug for ImageS3Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageS3Client")
            .field("endpoint", &self.endpoint.as_str())
            .field("database", &self.store.database)
            .finish()
    }
}

async fn read_settings<T: DeserializeOwned>(path: &Path) -> Result<T, ProvisionError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ProvisionError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
    toml::from_str(&content).map_err(|source| ProvisionError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}
