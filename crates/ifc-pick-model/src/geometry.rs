// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Loaded model geometry as seen by the picking code

use crate::{ElementId, ElementIndex, MeshData};
use std::sync::Arc;

/// Column-major identity matrix
pub const IDENTITY_TRANSFORM: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
];

/// One renderable mesh of a model
///
/// Mesh buffers and the element index are shared via `Arc` and never
/// mutated once the model is published.
#[derive(Clone, Debug)]
pub struct ModelMesh {
    /// Triangle buffers in mesh-local coordinates
    pub mesh: Arc<MeshData>,
    /// 4x4 local-to-world transformation matrix (column-major order)
    pub transform: [f32; 16],
    /// Triangle to element index, `None` until the loader has built it
    pub element_index: Option<Arc<ElementIndex>>,
}

impl ModelMesh {
    /// Create a mesh with identity transform and no index yet
    pub fn new(mesh: Arc<MeshData>) -> Self {
        Self {
            mesh,
            transform: IDENTITY_TRANSFORM,
            element_index: None,
        }
    }

    /// Set the local-to-world transform
    pub fn with_transform(mut self, transform: [f32; 16]) -> Self {
        self.transform = transform;
        self
    }

    /// Attach the element index
    pub fn with_index(mut self, index: ElementIndex) -> Self {
        self.element_index = Some(Arc::new(index));
        self
    }

    /// Check if the element index has been built
    pub fn is_indexed(&self) -> bool {
        self.element_index.is_some()
    }

    /// Element owning a triangle, if the index is built and covers it
    pub fn element_at(&self, triangle: u32) -> Option<ElementId> {
        self.element_index.as_ref()?.element_at(triangle)
    }

    /// Get triangle count
    pub fn triangle_count(&self) -> usize {
        self.mesh.triangle_count()
    }
}

/// Everything the loader hands over for one file
#[derive(Clone, Debug, Default)]
pub struct ModelGeometry {
    /// Display name (usually the file name)
    pub name: Option<String>,
    /// Meshes of the model
    pub meshes: Vec<ModelMesh>,
}

impl ModelGeometry {
    pub fn new(meshes: Vec<ModelMesh>) -> Self {
        Self { name: None, meshes }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Check that every mesh carries an element index
    pub fn is_fully_indexed(&self) -> bool {
        self.meshes.iter().all(ModelMesh::is_indexed)
    }

    /// Get total triangle count for all meshes
    pub fn total_triangle_count(&self) -> usize {
        self.meshes.iter().map(ModelMesh::triangle_count).sum()
    }
}
