//! Translation of handler failures into HTTP responses.
//!
//! # Responsibilities
//! - Wrap whatever a handler failed with in a [`HandlerError`]
//! - Classify the wrapped cause into a [`FailureCategory`]
//! - Produce the status and message the client sees
//!
//! # Categories (first match wins)
//! ```text
//! 1 DuplicatePlantName        400  ImagePlant name, '{name}' has been taken.
//! 2 DuplicateTemplateName     400  Template name, '{name}' has been taken.
//! 3 EntityNotFound            404  No such {entity_type} {{id}} found.
//! 4 TemplateRemovalForbidden  404  Remove template {{template_name}} is not allowed.
//! 5 GenericRuntime            400  the cause's own message
//! 6 Unknown                   500  empty body
//! ```
//!
//! # Design Decisions
//! - `translate` is pure; logging and metrics live in the `IntoResponse` adapter
//! - Only the cause is inspected, never the wrapper
//! - Server faults never leak detail to the client

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::fmt;

use crate::error::ImageS3Error;
use crate::observability::metrics;
use crate::provision::{ClientError, ProvisionError};

/// What a handler failed with.
#[derive(Debug)]
pub enum Cause {
    /// A domain failure surfaced by the backend.
    ImageS3(ImageS3Error),

    /// A runtime failure raised locally, treated as the caller's fault.
    Runtime(String),

    /// Anything else. Always answered with an empty 500.
    Unrecognized(Box<dyn std::error::Error + Send + Sync>),
}

/// The failure a handler returns; wraps the underlying cause, if any.
#[derive(Debug)]
pub struct HandlerError {
    cause: Option<Cause>,
}

impl HandlerError {
    pub fn new(cause: Cause) -> Self {
        Self { cause: Some(cause) }
    }

    /// A failure with no known cause.
    pub fn without_cause() -> Self {
        Self { cause: None }
    }

    /// A client-caused runtime failure carrying its own message.
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(Cause::Runtime(message.into()))
    }

    pub fn unrecognized(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::new(Cause::Unrecognized(Box::new(err)))
    }

    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            Some(Cause::ImageS3(e)) => write!(f, "handler failed: {e}"),
            Some(Cause::Runtime(message)) => write!(f, "handler failed: {message}"),
            Some(Cause::Unrecognized(e)) => write!(f, "handler failed: {e}"),
            None => f.write_str("handler failed"),
        }
    }
}

impl std::error::Error for HandlerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.cause {
            Some(Cause::ImageS3(e)) => Some(e),
            Some(Cause::Unrecognized(e)) => Some(&**e),
            Some(Cause::Runtime(_)) | None => None,
        }
    }
}

impl From<ImageS3Error> for HandlerError {
    fn from(err: ImageS3Error) -> Self {
        Self::new(Cause::ImageS3(err))
    }
}

impl From<ClientError> for HandlerError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::ImageS3(failure) => Self::new(Cause::ImageS3(failure)),
            other => Self::unrecognized(other),
        }
    }
}

impl From<ProvisionError> for HandlerError {
    fn from(err: ProvisionError) -> Self {
        Self::unrecognized(err)
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        Self::unrecognized(err)
    }
}

/// Failure categories in match order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FailureCategory {
    DuplicatePlantName,
    DuplicateTemplateName,
    EntityNotFound,
    TemplateRemovalForbidden,
    GenericRuntime,
    Unknown,
}

impl FailureCategory {
    /// Classify a cause. An absent cause is `Unknown`.
    pub fn of(cause: Option<&Cause>) -> Self {
        match cause {
            Some(Cause::ImageS3(ImageS3Error::DuplicatedImagePlantName { .. })) => {
                Self::DuplicatePlantName
            }
            Some(Cause::ImageS3(ImageS3Error::DuplicateTemplateName { .. })) => {
                Self::DuplicateTemplateName
            }
            Some(Cause::ImageS3(ImageS3Error::NoSuchEntityFound { .. })) => Self::EntityNotFound,
            Some(Cause::ImageS3(ImageS3Error::UnremovableTemplate { .. })) => {
                Self::TemplateRemovalForbidden
            }
            Some(Cause::ImageS3(ImageS3Error::Rejected { .. })) | Some(Cause::Runtime(_)) => {
                Self::GenericRuntime
            }
            Some(Cause::Unrecognized(_)) | None => Self::Unknown,
        }
    }

    pub fn status(self) -> StatusCode {
        match self {
            Self::DuplicatePlantName | Self::DuplicateTemplateName | Self::GenericRuntime => {
                StatusCode::BAD_REQUEST
            }
            Self::EntityNotFound | Self::TemplateRemovalForbidden => StatusCode::NOT_FOUND,
            Self::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::DuplicatePlantName => "duplicate_plant_name",
            Self::DuplicateTemplateName => "duplicate_template_name",
            Self::EntityNotFound => "entity_not_found",
            Self::TemplateRemovalForbidden => "template_removal_forbidden",
            Self::GenericRuntime => "generic_runtime",
            Self::Unknown => "unknown",
        }
    }
}

/// Status and body produced for one failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedResponse {
    pub category: FailureCategory,
    pub status: StatusCode,
    pub body: String,
}

/// Translate a failure cause into the response the client receives.
pub fn translate(cause: Option<&Cause>) -> TranslatedResponse {
    let category = FailureCategory::of(cause);
    let body = match cause {
        Some(Cause::ImageS3(failure)) => match failure {
            ImageS3Error::DuplicatedImagePlantName { name } => {
                format!("ImagePlant name, '{name}' has been taken.")
            }
            ImageS3Error::DuplicateTemplateName { name } => {
                format!("Template name, '{name}' has been taken.")
            }
            ImageS3Error::NoSuchEntityFound { entity_type, id } => {
                format!("No such {entity_type} {{{id}}} found.")
            }
            ImageS3Error::UnremovableTemplate { id } => {
                format!("Remove template {{{}}} is not allowed.", id.template_name)
            }
            ImageS3Error::Rejected { message } => message.clone(),
        },
        Some(Cause::Runtime(message)) => message.clone(),
        Some(Cause::Unrecognized(_)) | None => String::new(),
    };

    TranslatedResponse {
        category,
        status: category.status(),
        body,
    }
}

impl IntoResponse for TranslatedResponse {
    fn into_response(self) -> Response {
        (self.status, self.body).into_response()
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let translated = translate(self.cause());

        if translated.category == FailureCategory::Unknown {
            tracing::error!(error = %self, cause = ?self.cause(), "Unhandled handler failure");
        } else {
            tracing::info!(
                category = translated.category.as_str(),
                status = translated.status.as_u16(),
                message = %translated.body,
                "Request failed"
            );
        }
        metrics::record_failure(translated.category.as_str(), translated.status.as_u16());

        translated.into_response()
    }
}
