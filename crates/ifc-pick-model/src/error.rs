// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for picking, loading and inspection

use crate::{ElementRef, ModelId};
use thiserror::Error;

/// Result type alias for picking operations
pub type Result<T> = std::result::Result<T, PickError>;

/// Why a hit could not be mapped to an element
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotFoundReason {
    /// The model is not registered (or was never published)
    UnknownModel,
    /// The hit names a mesh the model does not have
    UnknownMesh,
    /// The loader has not finished building the element index
    IndexNotBuilt,
    /// The triangle is outside every indexed range
    TriangleOutOfRange,
}

impl std::fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            NotFoundReason::UnknownModel => "unknown model",
            NotFoundReason::UnknownMesh => "unknown mesh",
            NotFoundReason::IndexNotBuilt => "element index not built",
            NotFoundReason::TriangleOutOfRange => "triangle out of range",
        };
        f.write_str(text)
    }
}

/// Errors raised on the picking path
///
/// These are never shown to the user; callers treat them as "no hit".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PickError {
    /// The hit has no semantic mapping
    #[error("No element for triangle {triangle} of mesh {mesh} in {model_id}: {reason}")]
    NotFound {
        model_id: ModelId,
        mesh: usize,
        triangle: u32,
        reason: NotFoundReason,
    },
}

impl PickError {
    pub fn not_found(model_id: ModelId, mesh: usize, triangle: u32, reason: NotFoundReason) -> Self {
        PickError::NotFound {
            model_id,
            mesh,
            triangle,
            reason,
        }
    }
}

/// Errors raised while loading a model
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The selected file is not an IFC file the viewer accepts
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    /// The loader published geometry before its element index was ready
    #[error("Model geometry was published without an element index")]
    IndexNotBuilt,

    /// The loader rejected the file
    #[error("Failed to load {file}: {message}")]
    Failed { file: String, message: String },
}

impl LoadError {
    /// Create a new loader failure
    pub fn failed(file: impl Into<String>, msg: impl Into<String>) -> Self {
        LoadError::Failed {
            file: file.into(),
            message: msg.into(),
        }
    }
}

/// Errors raised by the metadata collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PropertyError {
    /// The element reference does not decode to an entity
    #[error("Malformed element reference {0}")]
    MalformedReference(ElementRef),

    /// The model is gone or its metadata is not accessible
    #[error("Properties unavailable for {0}")]
    Unavailable(ModelId),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl PropertyError {
    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        PropertyError::Other(msg.into())
    }
}

/// Errors surfaced by the selection inspector
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InspectionError {
    /// Fetching the property set failed
    #[error("Inspection of {element} failed: {source}")]
    InspectionFailed {
        element: ElementRef,
        #[source]
        source: PropertyError,
    },
}

impl InspectionError {
    pub fn failed(element: ElementRef, source: PropertyError) -> Self {
        InspectionError::InspectionFailed { element, source }
    }
}
