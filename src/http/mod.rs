//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout, trace)
//!     → handlers.rs (resources via extract.rs `Provided<T>`)
//!         ├─ Ok  → response
//!         └─ Err → failure.rs (classify cause → status + message)
//!     → no route matched → fallback.rs (redirect to /404.html)
//! ```

pub mod extract;
pub mod failure;
pub mod fallback;
pub mod handlers;
pub mod server;

pub use extract::Provided;
pub use failure::{translate, Cause, FailureCategory, HandlerError, TranslatedResponse};
pub use fallback::{route_not_found, NOT_FOUND_PAGE};
pub use server::{build_router, AppState, HttpServer, X_REQUEST_ID};
