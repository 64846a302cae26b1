//! IFC-Pick - Pointer picking and element inspection for IFC viewers
//!
//! Turns pointer events on a rendered IFC model into semantic answers:
//! which element is under the pointer, keeping a single hover highlight in
//! sync with it, and what its properties are on double-click.
//!
//! # Architecture
//!
//! - [`RayCaster`] - Pointer position to world ray to ordered hits
//! - [`resolve`] - Hit to Express ID via the mesh's element index
//! - [`HighlightManager`] - At most one highlighted element
//! - [`SelectionInspector`] - Numbered property requests, stale ones dropped
//! - [`ViewerShell`] - Owns the state above and wires it to the host
//!
//! Loading, rendering and property decoding are collaborators supplied by
//! the host through the traits in [`ifc_pick_model`].
//!
//! # Example
//!
//! ```ignore
//! let mut shell = ViewerShell::new(settings, loader, properties, overlay, display);
//! shell.resize(1280.0, 720.0);
//!
//! let task = shell.open_file("house.ifc", url)?;
//! spawn(task);
//!
//! // every frame
//! shell.update();
//!
//! // input
//! shell.pointer_move(x, y);
//! if let Some(task) = shell.double_click(x, y) {
//!     spawn(task);
//! }
//! ```

pub mod bvh;
pub mod camera;
pub mod display;
pub mod highlight;
pub mod inspector;
pub mod raycast;
pub mod registry;
pub mod resolver;
pub mod settings;
pub mod shell;

pub use bvh::{Aabb, TriangleBvh};
pub use camera::{Camera, Projection, Ray};
pub use display::{DisplayState, PropertyDisplay, TextPanel};
pub use highlight::{HighlightManager, HighlightState, HighlightTransition};
pub use inspector::{InspectionCompletion, InspectionTask, SelectionInspector};
pub use raycast::{intersect_triangle, CanvasBounds, Hit, RayCaster};
pub use registry::{LoadedModel, ModelRegistry, PickMesh};
pub use resolver::{resolve, resolve_in, resolve_nearest};
pub use settings::{CameraSettings, PickingSettings, ProjectionKind, SettingsError, ViewerSettings};
pub use shell::{ShellTask, SubscriptionId, ViewerEvent, ViewerShell};

pub use ifc_pick_model;
