// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Triangle to element lookup
//!
//! The loader emits each element's triangles as one contiguous run inside
//! a mesh. The index records those runs so a hit triangle can be mapped
//! back to the element that produced it.

use crate::{ElementId, MeshData};
use serde::{Deserialize, Serialize};

/// A contiguous run of triangles owned by one element
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriangleRange {
    /// First triangle of the run
    pub start: u32,
    /// Number of triangles in the run
    pub count: u32,
    /// Owning element
    pub element: ElementId,
}

impl TriangleRange {
    /// One past the last triangle of the run
    pub fn end(&self) -> u32 {
        self.start + self.count
    }

    /// Check if the run covers a triangle
    pub fn contains(&self, triangle: u32) -> bool {
        triangle >= self.start && triangle < self.end()
    }
}

/// Read-only triangle to element index for one mesh
///
/// Ranges are sorted by start and never overlap, so lookup is a binary
/// search. Gaps are allowed; triangles in a gap have no owner.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementIndex {
    ranges: Vec<TriangleRange>,
}

impl ElementIndex {
    /// Start building an index from consecutive element runs
    pub fn builder() -> ElementIndexBuilder {
        ElementIndexBuilder::default()
    }

    /// Build an index from a per-vertex Express ID attribute
    ///
    /// Each triangle takes the id of its first vertex. Consecutive triangles
    /// with the same id are folded into one range. Returns `None` when the
    /// attribute does not cover every vertex referenced by `mesh`.
    pub fn from_vertex_ids(mesh: &MeshData, vertex_ids: &[u32]) -> Option<Self> {
        let mut builder = ElementIndexBuilder::default();
        for t in 0..mesh.triangle_count() {
            let [a, _, _] = mesh.triangle(t)?;
            let id = *vertex_ids.get(a as usize)?;
            builder.push(ElementId(id), 1);
        }
        Some(builder.build())
    }

    /// Element owning a triangle
    pub fn element_at(&self, triangle: u32) -> Option<ElementId> {
        let pos = self.ranges.partition_point(|r| r.end() <= triangle);
        self.ranges
            .get(pos)
            .filter(|r| r.contains(triangle))
            .map(|r| r.element)
    }

    /// Number of triangles covered by the index
    pub fn triangle_count(&self) -> u32 {
        self.ranges.last().map(TriangleRange::end).unwrap_or(0)
    }

    /// All ranges in triangle order
    pub fn ranges(&self) -> &[TriangleRange] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// Builder for [`ElementIndex`]
#[derive(Debug, Default)]
pub struct ElementIndexBuilder {
    ranges: Vec<TriangleRange>,
    cursor: u32,
}

impl ElementIndexBuilder {
    /// Append `count` triangles owned by `element` after the previous run
    pub fn push(&mut self, element: ElementId, count: u32) -> &mut Self {
        if count == 0 {
            return self;
        }
        match self.ranges.last_mut() {
            Some(last) if last.element == element && last.end() == self.cursor => {
                last.count += count;
            }
            _ => self.ranges.push(TriangleRange {
                start: self.cursor,
                count,
                element,
            }),
        }
        self.cursor += count;
        self
    }

    /// Skip triangles that belong to no element
    pub fn skip(&mut self, count: u32) -> &mut Self {
        self.cursor += count;
        self
    }

    pub fn build(self) -> ElementIndex {
        ElementIndex {
            ranges: self.ranges,
        }
    }
}
