//! Domain failures raised by the ImageS3 backend.
//!
//! The backend reports a failed call as a JSON document tagged by `kind`:
//!
//! ```json
//! { "kind": "no_such_entity_found", "entity_type": "ImagePlant", "id": "plant-42" }
//! ```
//!
//! Each kind decodes into one variant of [`ImageS3Error`]. The HTTP layer
//! turns these into client-facing responses (see `http::failure`).

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identifies a template within an image plant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct TemplateIdentity {
    pub image_plant_id: String,
    pub template_name: String,
}

impl TemplateIdentity {
    pub fn new(image_plant_id: impl Into<String>, template_name: impl Into<String>) -> Self {
        Self {
            image_plant_id: image_plant_id.into(),
            template_name: template_name.into(),
        }
    }
}

impl fmt::Display for TemplateIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.image_plant_id, self.template_name)
    }
}

/// Failures surfaced by the image-processing backend.
#[derive(Debug, Clone, PartialEq, Eq, Error, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageS3Error {
    /// An image plant with this name already exists.
    #[error("image plant name '{name}' is already in use")]
    DuplicatedImagePlantName { name: String },

    /// A template with this name already exists in the plant.
    #[error("template name '{name}' is already in use")]
    DuplicateTemplateName { name: String },

    /// Lookup of an entity by id found nothing.
    #[error("no {entity_type} with id {id}")]
    NoSuchEntityFound { entity_type: String, id: String },

    /// The template is still referenced and cannot be removed.
    #[error("template {id} cannot be removed")]
    UnremovableTemplate { id: TemplateIdentity },

    /// Any other fault raised by the backend while serving the call,
    /// e.g. invalid parameters deeper in the call chain.
    #[error("{message}")]
    Rejected { message: String },
}

impl ImageS3Error {
    pub fn duplicated_image_plant_name(name: impl Into<String>) -> Self {
        Self::DuplicatedImagePlantName { name: name.into() }
    }

    pub fn duplicate_template_name(name: impl Into<String>) -> Self {
        Self::DuplicateTemplateName { name: name.into() }
    }

    pub fn no_such_entity(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NoSuchEntityFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    pub fn unremovable_template(id: TemplateIdentity) -> Self {
        Self::UnremovableTemplate { id }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}
