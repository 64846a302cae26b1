//! Ray casting from pointer position to model geometry
//!
//! Turns a pointer position into a world-space ray and intersects it with
//! the meshes of the loaded models only; helpers such as grids and axes are
//! never part of the input.

use crate::camera::{Camera, Ray};
use crate::registry::{LoadedModel, PickMesh};
use crate::settings::PickingSettings;
use ifc_pick_model::{MeshData, ModelId};
use nalgebra::{Point2, Point3, Vector3};
use std::sync::Arc;

/// On-screen rectangle of the canvas in client coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CanvasBounds {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl CanvasBounds {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Canvas anchored at the client origin
    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Map a client position to normalized device coordinates
    ///
    /// Screen Y grows downward, device Y grows upward. Returns `None` for a
    /// canvas without area.
    pub fn to_ndc(&self, client_x: f32, client_y: f32) -> Option<Point2<f32>> {
        let width = self.width();
        let height = self.height();
        if !(width > 0.0 && height > 0.0) {
            return None;
        }
        let x = ((client_x - self.left) / width) * 2.0 - 1.0;
        let y = -((client_y - self.top) / height) * 2.0 + 1.0;
        Some(Point2::new(x, y))
    }

    /// Check if a client position lies on the canvas
    pub fn contains(&self, client_x: f32, client_y: f32) -> bool {
        client_x >= self.left && client_x <= self.right && client_y >= self.top && client_y <= self.bottom
    }
}

/// A ray/mesh intersection
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    /// Model owning the mesh
    pub model_id: ModelId,
    /// Mesh index within the model
    pub mesh: usize,
    /// Triangle index within the mesh
    pub triangle_index: u32,
    /// Distance from the ray origin in world units
    pub distance: f32,
    /// Intersection point in world space
    pub point: Point3<f32>,
}

/// Ray caster configured from picking settings
#[derive(Clone, Debug)]
pub struct RayCaster {
    /// Stop at the nearest hit
    pub first_hit_only: bool,
    /// Minimum accepted hit distance
    pub near: f32,
    /// Maximum accepted hit distance
    pub far: f32,
}

impl Default for RayCaster {
    fn default() -> Self {
        Self::from_settings(&PickingSettings::default())
    }
}

impl RayCaster {
    pub fn from_settings(settings: &PickingSettings) -> Self {
        Self {
            first_hit_only: settings.first_hit_only,
            near: settings.near,
            far: settings.far(),
        }
    }

    /// Cast from a client pointer position
    ///
    /// Hits are sorted nearest first. With `first_hit_only` at most one hit
    /// is returned. No hit (or an unusable canvas or camera) gives an empty
    /// vector.
    pub fn cast(
        &self,
        client_x: f32,
        client_y: f32,
        canvas: &CanvasBounds,
        camera: &Camera,
        models: &[Arc<LoadedModel>],
    ) -> Vec<Hit> {
        let Some(ndc) = canvas.to_ndc(client_x, client_y) else {
            return Vec::new();
        };
        let Some(ray) = camera.ray_through(ndc) else {
            return Vec::new();
        };
        self.cast_ray(&ray, models)
    }

    /// Cast an explicit world-space ray
    pub fn cast_ray(&self, ray: &Ray, models: &[Arc<LoadedModel>]) -> Vec<Hit> {
        let mut hits: Vec<Hit> = Vec::new();

        for model in models {
            for (mesh_index, mesh, pick) in model.pickable_meshes() {
                let limit = if self.first_hit_only {
                    hits.first().map(|h| h.distance).unwrap_or(self.far)
                } else {
                    self.far
                };
                self.intersect_mesh(ray, model.id, mesh_index, &mesh.mesh, pick, limit, &mut hits);
            }
        }

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        if self.first_hit_only {
            hits.truncate(1);
        }
        hits
    }

    /// Collect intersections of one mesh closer than `limit`
    #[allow(clippy::too_many_arguments)]
    fn intersect_mesh(
        &self,
        ray: &Ray,
        model_id: ModelId,
        mesh_index: usize,
        mesh: &MeshData,
        pick: &PickMesh,
        limit: f32,
        hits: &mut Vec<Hit>,
    ) {
        // Work in mesh-local space. The direction is not renormalized, so the
        // ray parameter stays a world-space distance.
        let origin = pick.local_from_world.transform_point(&ray.origin);
        let direction = pick.local_from_world.transform_vector(&ray.direction);

        pick.bvh.traverse(&origin, &direction, limit, |triangle, limit| {
            let Some([a, b, c]) = mesh.triangle_positions(triangle as usize) else {
                return limit;
            };
            let Some(distance) = intersect_triangle(
                &origin,
                &direction,
                &Point3::from(a),
                &Point3::from(b),
                &Point3::from(c),
            ) else {
                return limit;
            };
            if distance < self.near || distance > limit {
                return limit;
            }
            let hit = Hit {
                model_id,
                mesh: mesh_index,
                triangle_index: triangle,
                distance,
                point: ray.at(distance),
            };
            if self.first_hit_only {
                hits.clear();
                hits.push(hit);
                distance
            } else {
                hits.push(hit);
                limit
            }
        });
    }
}

/// Möller–Trumbore ray/triangle intersection, double-sided
///
/// Returns the ray parameter of the intersection, if it lies in front of the
/// origin.
pub fn intersect_triangle(
    origin: &Point3<f32>,
    direction: &Vector3<f32>,
    a: &Point3<f32>,
    b: &Point3<f32>,
    c: &Point3<f32>,
) -> Option<f32> {
    let edge1 = b - a;
    let edge2 = c - a;
    let p = direction.cross(&edge2);
    let det = edge1.dot(&p);

    // Parallel to the triangle plane, or a degenerate triangle
    let scale = edge1.norm() * edge2.norm() * direction.norm();
    if det.abs() <= scale * 1e-7 {
        return None;
    }
    let inv_det = 1.0 / det;

    let s = origin - a;
    let u = s.dot(&p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(&edge1);
    let v = direction.dot(&q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(&q) * inv_det;
    (t >= 0.0).then_some(t)
}
