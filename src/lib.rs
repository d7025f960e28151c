//! ImageS3 web gateway library.
//!
//! Provisions the long-lived backend resources at startup and translates
//! handler failures into client-facing HTTP responses.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod provision;

pub use config::GatewayConfig;
pub use error::{ImageS3Error, TemplateIdentity};
pub use http::{HandlerError, HttpServer};
pub use lifecycle::Shutdown;
pub use provision::{DataMapper, ImageS3Client, ServiceRegistry};
