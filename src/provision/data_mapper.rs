//! JSON data mapping shared by every handler.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::provision::{ConfigurationBundle, ProvisionError, Resource};

/// Serialises handler output and parses request bodies.
///
/// Built with default settings: compact output, strict parsing.
#[derive(Debug, Clone, Default)]
pub struct DataMapper;

impl DataMapper {
    pub fn to_string<T: Serialize + ?Sized>(&self, value: &T) -> serde_json::Result<String> {
        serde_json::to_string(value)
    }

    pub fn to_vec<T: Serialize + ?Sized>(&self, value: &T) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(value)
    }

    pub fn from_slice<T: DeserializeOwned>(&self, bytes: &[u8]) -> serde_json::Result<T> {
        serde_json::from_slice(bytes)
    }

    /// Render `value` as a `200 OK` JSON response.
    pub fn to_response<T: Serialize + ?Sized>(&self, value: &T) -> serde_json::Result<Response> {
        let body = self.to_vec(value)?;
        Ok((
            StatusCode::OK,
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            )],
            body,
        )
            .into_response())
    }
}

impl Resource for DataMapper {
    const NAME: &'static str = "DataMapper";

    async fn construct(_bundle: &ConfigurationBundle) -> Result<Self, ProvisionError> {
        Ok(Self)
    }
}
