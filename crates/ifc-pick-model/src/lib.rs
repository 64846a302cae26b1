// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-Pick Model - Shared types and collaborator traits for element picking
//!
//! This crate holds the data that flows between the picking core and the
//! collaborators it depends on but does not implement: the IFC loader that
//! produces geometry, the metadata source that answers property queries, and
//! the renderer that draws highlight subsets.
//!
//! # Architecture
//!
//! - [`ModelGeometry`] / [`ModelMesh`] - Loaded geometry ready for picking
//! - [`ElementIndex`] - Triangle range to Express ID lookup
//! - [`PropertySet`] - Properties of a single element
//! - [`ModelLoader`] - Produces geometry from a user-selected file
//! - [`PropertySource`] - Answers property queries asynchronously
//! - [`OverlayRenderer`] - Creates and removes highlight subsets
//!
//! # Example
//!
//! ```ignore
//! use ifc_pick_model::{ElementIndex, ElementId, MeshData, ModelMesh};
//!
//! let mut index = ElementIndex::builder();
//! index.push(ElementId(42), 12); // first 12 triangles belong to #42
//! let mesh = ModelMesh::new(Arc::new(mesh_data)).with_index(index.build());
//! assert_eq!(mesh.element_at(3), Some(ElementId(42)));
//! ```

pub mod error;
pub mod geometry;
pub mod index;
pub mod properties;
pub mod traits;
pub mod types;

// Re-export all public types
pub use error::*;
pub use geometry::*;
pub use index::*;
pub use properties::*;
pub use traits::*;
pub use types::*;
