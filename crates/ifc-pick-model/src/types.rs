// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core identifiers and mesh buffers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one loaded model
///
/// Several models can be loaded side by side; each gets its own id in the
/// order it was published.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Default, PartialOrd, Ord)]
pub struct ModelId(pub u32);

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "model {}", self.0)
    }
}

impl From<u32> for ModelId {
    fn from(id: u32) -> Self {
        ModelId(id)
    }
}

/// Express ID of a semantic element inside a model
///
/// Wraps the raw IFC entity number (e.g., #123 becomes ElementId(123))
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Default, PartialOrd, Ord)]
pub struct ElementId(pub u32);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for ElementId {
    fn from(id: u32) -> Self {
        ElementId(id)
    }
}

impl From<ElementId> for u32 {
    fn from(id: ElementId) -> Self {
        id.0
    }
}

impl From<ElementId> for u64 {
    fn from(id: ElementId) -> Self {
        id.0 as u64
    }
}

/// An element scoped to the model that owns it
///
/// Express IDs are only unique within one model, so everything that
/// highlights or inspects an element carries the pair.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct ElementRef {
    pub model_id: ModelId,
    pub element_id: ElementId,
}

impl ElementRef {
    pub fn new(model_id: ModelId, element_id: ElementId) -> Self {
        Self {
            model_id,
            element_id,
        }
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}", self.element_id, self.model_id)
    }
}

/// Triangle mesh buffers
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    /// Vertex positions (x, y, z, x, y, z, ...)
    pub positions: Vec<f32>,
    /// Vertex normals (may be empty)
    pub normals: Vec<f32>,
    /// Triangle list indices
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Create empty mesh data
    pub fn new() -> Self {
        Self::default()
    }

    /// Create mesh data from positions and indices
    pub fn from_buffers(positions: Vec<f32>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            normals: Vec::new(),
            indices,
        }
    }

    /// Check if mesh is empty
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.is_empty()
    }

    /// Get vertex count
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Get triangle count
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Position of a vertex, if it exists
    pub fn vertex(&self, index: u32) -> Option<[f32; 3]> {
        let start = index as usize * 3;
        let v = self.positions.get(start..start + 3)?;
        Some([v[0], v[1], v[2]])
    }

    /// Vertex indices of a triangle, if it exists
    pub fn triangle(&self, triangle_index: usize) -> Option<[u32; 3]> {
        let start = triangle_index.checked_mul(3)?;
        let t = self.indices.get(start..start + 3)?;
        Some([t[0], t[1], t[2]])
    }

    /// Corner positions of a triangle
    ///
    /// Returns `None` when the triangle or any of its vertices is out of range.
    pub fn triangle_positions(&self, triangle_index: usize) -> Option<[[f32; 3]; 3]> {
        let [a, b, c] = self.triangle(triangle_index)?;
        Some([self.vertex(a)?, self.vertex(b)?, self.vertex(c)?])
    }
}
