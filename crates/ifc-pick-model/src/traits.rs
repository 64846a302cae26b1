// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Collaborator traits
//!
//! The picking core drives three collaborators it does not implement:
//! the IFC loader, the metadata source and the renderer's subset mechanism.

use crate::{ElementId, LoadError, ModelGeometry, ModelId, PropertyError, PropertySet};
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;

/// IFC file flavours accepted by the file input
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IfcFileKind {
    /// STEP physical file (.ifc)
    Step,
    /// IFC-XML (.ifcXML)
    Xml,
    /// Zipped IFC (.ifcZIP)
    Zip,
}

impl IfcFileKind {
    /// Determine kind from a file extension (case-insensitive, no dot)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "ifc" => Some(IfcFileKind::Step),
            "ifcxml" => Some(IfcFileKind::Xml),
            "ifczip" => Some(IfcFileKind::Zip),
            _ => None,
        }
    }

    /// Determine kind from a file name
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        Self::from_extension(ext)
    }

    /// Canonical extension
    pub fn extension(&self) -> &'static str {
        match self {
            IfcFileKind::Step => "ifc",
            IfcFileKind::Xml => "ifcXML",
            IfcFileKind::Zip => "ifcZIP",
        }
    }
}

impl fmt::Display for IfcFileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".{}", self.extension())
    }
}

/// A file handed to the loader
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelSource {
    /// File name as selected by the user
    pub file_name: String,
    /// Location the loader reads from (object URL or path)
    pub url: String,
    /// Detected file flavour
    pub kind: IfcFileKind,
}

/// IFC loading collaborator
///
/// Parses a file and extracts its geometry. Implementations must only
/// resolve once every mesh's element index is built.
pub trait ModelLoader: Send + Sync {
    /// Load a model
    ///
    /// # Returns
    /// The model geometry on success, or a `LoadError` with a displayable message
    fn load(&self, source: ModelSource) -> BoxFuture<'static, Result<ModelGeometry, LoadError>>;
}

/// Metadata collaborator
///
/// Answers property queries for an element. The lookup may involve
/// decoding and take noticeable time, so it is asynchronous.
pub trait PropertySource: Send + Sync {
    /// Fetch the properties of one element
    fn item_properties(
        &self,
        model_id: ModelId,
        element_id: ElementId,
    ) -> BoxFuture<'static, Result<PropertySet, PropertyError>>;
}

/// Material used to draw the highlight subset
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightMaterial {
    /// RGB color, 0.0-1.0
    pub color: [f32; 3],
    /// Opacity, 0.0-1.0
    pub opacity: f32,
    /// Whether the material is blended
    pub transparent: bool,
    /// Whether the subset is depth tested (off draws it over everything)
    pub depth_test: bool,
}

impl HighlightMaterial {
    /// Build from a packed 0xRRGGBB color
    pub fn from_hex(hex: u32, opacity: f32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self {
            color: [channel(16), channel(8), channel(0)],
            opacity,
            transparent: opacity < 1.0,
            depth_test: false,
        }
    }
}

impl Default for HighlightMaterial {
    fn default() -> Self {
        // Pink pre-selection overlay
        Self::from_hex(0xff88ff, 0.6)
    }
}

/// Request to draw a subset of a model with a distinct material
#[derive(Clone, Debug, PartialEq)]
pub struct SubsetRequest<'a> {
    pub model_id: ModelId,
    pub ids: Vec<ElementId>,
    pub material: &'a HighlightMaterial,
    /// Drop any subset previously drawn with this material on this model
    pub remove_previous: bool,
}

/// Rendering collaborator's subset mechanism
pub trait OverlayRenderer {
    /// Draw the given elements with the request's material
    fn create_subset(&mut self, request: SubsetRequest<'_>);

    /// Remove the subset drawn with `material` on a model
    fn remove_subset(&mut self, model_id: ModelId, material: &HighlightMaterial);
}
