//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Serve the static 404 page and redirect unmatched routes to it
//! - Bind server to listener with graceful shutdown

use axum::{http::HeaderName, routing::get, Router};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeFile,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::http::fallback::{route_not_found, NOT_FOUND_PAGE};
use crate::http::handlers::get_status;
use crate::provision::ServiceRegistry;

/// Header carrying the per-request correlation id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Application state injected into handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub registry: Arc<ServiceRegistry>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server over an already provisioned registry.
    pub fn new(config: &GatewayConfig, registry: Arc<ServiceRegistry>) -> Self {
        let state = AppState { registry };
        Self {
            router: build_router(config, state),
        }
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(config: &GatewayConfig, state: AppState) -> Router {
    let not_found_page = Path::new(&config.assets.static_dir).join("404.html");
    let request_id = HeaderName::from_static(X_REQUEST_ID);

    Router::new()
        .route("/status", get(get_status))
        .route_service(NOT_FOUND_PAGE, ServeFile::new(not_found_page))
        .fallback(route_not_found)
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}
