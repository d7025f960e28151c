//! Gateway status endpoint.

use axum::extract::State;
use axum::response::Response;
use serde::Serialize;

use crate::http::extract::Provided;
use crate::http::failure::HandlerError;
use crate::http::server::AppState;
use crate::provision::{DataMapper, ImageS3Client};

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub backend: String,
    pub database: String,
    pub max_image_bytes: u64,
    pub resources: Vec<&'static str>,
}

pub async fn get_status(
    State(state): State<AppState>,
    Provided(client): Provided<ImageS3Client>,
    Provided(mapper): Provided<DataMapper>,
) -> Result<Response, HandlerError> {
    let status = SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        backend: client.endpoint().to_string(),
        database: client.document_store().database.clone(),
        max_image_bytes: client.processor().max_image_bytes,
        resources: state.registry.provisioned(),
    };

    Ok(mapper.to_response(&status)?)
}
