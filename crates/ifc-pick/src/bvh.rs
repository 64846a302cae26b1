//! Triangle bounding volume hierarchy
//!
//! Built once per mesh when a model is published and queried on every
//! pointer move. Nodes split their triangles at the centroid median of the
//! longest axis until a leaf holds at most [`LEAF_SIZE`] triangles.

use ifc_pick_model::MeshData;
use nalgebra::{Point3, Vector3};

/// Maximum number of triangles in a leaf
pub const LEAF_SIZE: usize = 4;

/// Axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Aabb {
    pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
        Self {
            min: Point3::from(min),
            max: Point3::from(max),
        }
    }

    /// Box around a single point
    pub fn point(p: Point3<f32>) -> Self {
        Self { min: p, max: p }
    }

    /// Grow to contain `p`
    pub fn grow(&mut self, p: &Point3<f32>) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// Smallest box containing both
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Distance along the ray at which it enters the box (slab method)
    ///
    /// `direction` need not be unit length; the result is in units of it.
    pub fn ray_entry(&self, origin: &Point3<f32>, direction: &Vector3<f32>) -> Option<f32> {
        let mut t_enter = 0.0_f32;
        let mut t_exit = f32::INFINITY;
        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];
            if d == 0.0 {
                // Parallel to this slab: inside it or never
                if o < self.min[axis] || o > self.max[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let t0 = (self.min[axis] - o) * inv;
            let t1 = (self.max[axis] - o) * inv;
            t_enter = t_enter.max(t0.min(t1));
            t_exit = t_exit.min(t0.max(t1));
            if t_enter > t_exit {
                return None;
            }
        }
        Some(t_enter)
    }
}

#[derive(Clone, Copy, Debug)]
struct Node {
    bounds: Aabb,
    /// Leaf: first slot in `triangles`. Inner: index of the left child,
    /// the right child follows it.
    first: u32,
    /// Triangle count, 0 for inner nodes
    count: u32,
}

impl Node {
    fn is_leaf(&self) -> bool {
        self.count > 0
    }
}

#[derive(Clone, Copy)]
struct Item {
    triangle: u32,
    bounds: Aabb,
    centroid: Point3<f32>,
}

fn enclose(items: &[Item]) -> Aabb {
    items
        .iter()
        .skip(1)
        .fold(items[0].bounds, |acc, item| acc.union(&item.bounds))
}

/// Bounding volume hierarchy over the triangles of one mesh
#[derive(Clone, Debug)]
pub struct TriangleBvh {
    nodes: Vec<Node>,
    triangles: Vec<u32>,
}

impl TriangleBvh {
    /// Build over every triangle with valid vertices
    ///
    /// Returns `None` when the mesh has no such triangle.
    pub fn build(mesh: &MeshData) -> Option<Self> {
        let mut items: Vec<Item> = (0..mesh.triangle_count())
            .filter_map(|t| {
                let [a, b, c] = mesh.triangle_positions(t)?;
                let (a, b, c) = (Point3::from(a), Point3::from(b), Point3::from(c));
                let mut bounds = Aabb::point(a);
                bounds.grow(&b);
                bounds.grow(&c);
                let centroid = Point3::from((a.coords + b.coords + c.coords) / 3.0);
                Some(Item {
                    triangle: t as u32,
                    bounds,
                    centroid,
                })
            })
            .collect();
        if items.is_empty() {
            return None;
        }

        let mut nodes = Vec::with_capacity(2 * items.len().div_ceil(LEAF_SIZE));
        nodes.push(Node {
            bounds: enclose(&items),
            first: 0,
            count: items.len() as u32,
        });
        subdivide(&mut nodes, &mut items, 0);

        Some(Self {
            nodes,
            triangles: items.iter().map(|item| item.triangle).collect(),
        })
    }

    /// Bounds of all indexed triangles
    pub fn bounds(&self) -> Aabb {
        self.nodes[0].bounds
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Visit the triangles in leaves the ray enters within `limit`
    ///
    /// Nearer children are visited first. `visit` receives a triangle index
    /// and the current limit and returns the new limit, so a caller that
    /// only wants the nearest hit can shrink it as hits are found.
    pub fn traverse<F>(&self, origin: &Point3<f32>, direction: &Vector3<f32>, mut limit: f32, mut visit: F)
    where
        F: FnMut(u32, f32) -> f32,
    {
        let mut stack: Vec<(usize, f32)> = Vec::with_capacity(32);
        if let Some(entry) = self.nodes[0].bounds.ray_entry(origin, direction) {
            stack.push((0, entry));
        }

        while let Some((index, entry)) = stack.pop() {
            if entry > limit {
                continue;
            }
            let node = &self.nodes[index];
            if node.is_leaf() {
                let start = node.first as usize;
                for &triangle in &self.triangles[start..start + node.count as usize] {
                    limit = visit(triangle, limit);
                }
                continue;
            }

            let left = node.first as usize;
            let right = left + 1;
            let near = self.nodes[left].bounds.ray_entry(origin, direction);
            let far = self.nodes[right].bounds.ray_entry(origin, direction);
            let (first, second) = match (near, far) {
                (Some(l), Some(r)) if r < l => ((right, r), Some((left, l))),
                (Some(l), Some(r)) => ((left, l), Some((right, r))),
                (Some(l), None) => ((left, l), None),
                (None, Some(r)) => ((right, r), None),
                (None, None) => continue,
            };
            // Stack pops last-in first, so push the farther child first
            if let Some(second) = second {
                stack.push(second);
            }
            stack.push(first);
        }
    }
}

fn subdivide(nodes: &mut Vec<Node>, items: &mut [Item], index: usize) {
    let Node { first, count, .. } = nodes[index];
    let (first, count) = (first as usize, count as usize);
    if count <= LEAF_SIZE {
        return;
    }

    let slice = &mut items[first..first + count];
    let mut centroids = Aabb::point(slice[0].centroid);
    for item in slice.iter().skip(1) {
        centroids.grow(&item.centroid);
    }
    let extent = centroids.max - centroids.min;
    let axis = extent.imax();
    if extent[axis] <= 0.0 {
        // All centroids coincide
        return;
    }

    let mid = count / 2;
    slice.select_nth_unstable_by(mid, |a, b| a.centroid[axis].total_cmp(&b.centroid[axis]));

    let left = nodes.len();
    nodes.push(Node {
        bounds: enclose(&slice[..mid]),
        first: first as u32,
        count: mid as u32,
    });
    nodes.push(Node {
        bounds: enclose(&slice[mid..]),
        first: (first + mid) as u32,
        count: (count - mid) as u32,
    });
    nodes[index].first = left as u32;
    nodes[index].count = 0;

    subdivide(nodes, items, left);
    subdivide(nodes, items, left + 1);
}
