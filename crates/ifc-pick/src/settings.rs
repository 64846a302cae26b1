//! Viewer settings
//!
//! All settings deserialize from JSON with every field optional; missing
//! fields take the defaults below.

use ifc_pick_model::{HighlightMaterial, IfcFileKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reading settings
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Malformed JSON or wrong field types
    #[error("Invalid settings: {0}")]
    Json(#[from] serde_json::Error),

    /// An accepted extension is not an IFC flavour
    #[error("Unsupported extension in accepted_extensions: {0}")]
    UnknownExtension(String),
}

/// Projection kind for the pick camera
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionKind {
    #[default]
    Perspective,
    Orthographic,
}

/// Initial camera setup
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub projection: ProjectionKind,
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Visible height for orthographic projection
    pub ortho_height: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
    /// Eye position
    pub position: [f32; 3],
    /// Orbit target
    pub target: [f32; 3],
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            projection: ProjectionKind::Perspective,
            fov: 75.0,
            ortho_height: 20.0,
            near: 0.1,
            far: 2000.0,
            position: [8.0, 13.0, 15.0],
            target: [-2.0, 0.0, 0.0],
        }
    }
}

/// Picking settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickingSettings {
    /// Whether hover highlighting and double-click inspection are enabled
    pub enabled: bool,
    /// Stop at the nearest hit
    pub first_hit_only: bool,
    /// Ignore hits closer than this distance
    pub near: f32,
    /// Ignore hits farther than this distance (unbounded when unset)
    pub max_distance: Option<f32>,
    /// Drop the highlight when the pointer leaves the canvas
    pub clear_on_pointer_leave: bool,
    /// Material of the hover overlay
    pub highlight: HighlightMaterial,
}

impl Default for PickingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            first_hit_only: true,
            near: 0.0,
            max_distance: None,
            clear_on_pointer_leave: true,
            highlight: HighlightMaterial::default(),
        }
    }
}

impl PickingSettings {
    /// Far end of the accepted hit range
    pub fn far(&self) -> f32 {
        self.max_distance.unwrap_or(f32::INFINITY)
    }
}

/// Top-level viewer settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    pub camera: CameraSettings,
    pub picking: PickingSettings,
    /// File extensions offered by the file input
    pub accepted_extensions: Vec<String>,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            camera: CameraSettings::default(),
            picking: PickingSettings::default(),
            accepted_extensions: [IfcFileKind::Step, IfcFileKind::Xml, IfcFileKind::Zip]
                .iter()
                .map(|kind| kind.extension().to_string())
                .collect(),
        }
    }
}

impl ViewerSettings {
    /// Parse settings from JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: ViewerSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize settings to pretty JSON
    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that every accepted extension names an IFC flavour
    pub fn validate(&self) -> Result<(), SettingsError> {
        match self
            .accepted_extensions
            .iter()
            .find(|ext| IfcFileKind::from_extension(ext.trim_start_matches('.')).is_none())
        {
            Some(ext) => Err(SettingsError::UnknownExtension(ext.clone())),
            None => Ok(()),
        }
    }

    /// Check if a file kind is accepted by the file input
    pub fn accepts(&self, kind: IfcFileKind) -> bool {
        self.accepted_extensions
            .iter()
            .any(|ext| IfcFileKind::from_extension(ext.trim_start_matches('.')) == Some(kind))
    }

    /// Accept attribute value for an HTML file input (".ifc, .ifcXML, .ifcZIP")
    pub fn accept_attribute(&self) -> String {
        self.accepted_extensions
            .iter()
            .map(|ext| format!(".{}", ext.trim_start_matches('.')))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
