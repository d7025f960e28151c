//! Typed access to provisioned resources from handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::ops::Deref;
use std::sync::Arc;

use crate::http::failure::HandlerError;
use crate::http::server::AppState;
use crate::provision::Resource;

/// Extracts the registry's instance of `T`.
///
/// ```ignore
/// async fn handler(Provided(client): Provided<ImageS3Client>) { .. }
/// ```
#[derive(Debug)]
pub struct Provided<T>(pub Arc<T>);

impl<T> Deref for Provided<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: Resource> FromRequestParts<AppState> for Provided<T> {
    type Rejection = HandlerError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let resource = state.registry.get::<T>().await?;
        Ok(Self(resource))
    }
}
