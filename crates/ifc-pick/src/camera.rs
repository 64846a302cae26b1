//! Camera model for picking
//!
//! Only the parts of the camera needed to turn a pointer position into a
//! world-space ray: eye, target, projection and clip planes. Navigation
//! stays with the host.

use crate::settings::{CameraSettings, ProjectionKind};
use nalgebra::{Isometry3, Matrix4, Orthographic3, Perspective3, Point2, Point3, Vector3};

/// Camera projection
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Projection {
    /// Perspective projection with vertical field of view in degrees
    Perspective { fov_y: f32 },
    /// Orthographic projection with the visible height in world units
    Orthographic { height: f32 },
}

/// A ray in world space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    /// Unit length
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Create a ray, normalizing the direction
    ///
    /// Returns `None` for a zero-length or non-finite direction, or a
    /// non-finite origin.
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Option<Self> {
        if !origin.coords.iter().chain(direction.iter()).all(|c| c.is_finite()) {
            return None;
        }
        let direction = direction.try_normalize(f32::EPSILON)?;
        Some(Self { origin, direction })
    }

    /// Point at distance `t` along the ray
    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }
}

/// Pick camera
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    /// Eye position
    pub position: Point3<f32>,
    /// Point the camera looks at
    pub target: Point3<f32>,
    /// Up direction
    pub up: Vector3<f32>,
    pub projection: Projection,
    /// Viewport width / height
    pub aspect: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_settings(&CameraSettings::default(), 1.0)
    }
}

impl Camera {
    /// Create a camera from settings and the current viewport aspect ratio
    pub fn from_settings(settings: &CameraSettings, aspect: f32) -> Self {
        let projection = match settings.projection {
            ProjectionKind::Perspective => Projection::Perspective { fov_y: settings.fov },
            ProjectionKind::Orthographic => Projection::Orthographic {
                height: settings.ortho_height,
            },
        };
        Self {
            position: Point3::from(settings.position),
            target: Point3::from(settings.target),
            up: Vector3::y(),
            projection,
            aspect,
            near: settings.near,
            far: settings.far,
        }
    }

    /// Update aspect ratio from viewport size
    ///
    /// Ignored for an empty viewport.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    /// Move the camera
    pub fn look_at(&mut self, position: Point3<f32>, target: Point3<f32>) {
        self.position = position;
        self.target = target;
    }

    /// Check the clip planes and aspect describe a non-empty frustum
    pub fn has_valid_frustum(&self) -> bool {
        let extent_ok = match self.projection {
            Projection::Perspective { fov_y } => fov_y > 0.0 && fov_y < 180.0,
            Projection::Orthographic { height } => height > 0.0,
        };
        extent_ok && self.aspect > 0.0 && self.far > self.near && self.near >= 0.0
    }

    /// Up direction actually used for the view
    ///
    /// Falls back to -Z, then X, when `up` is parallel to the view direction
    /// (a camera looking straight down or up).
    pub fn effective_up(&self) -> Vector3<f32> {
        let forward = self.target - self.position;
        [self.up, -Vector3::z(), Vector3::x()]
            .into_iter()
            .find(|up| {
                let tolerance = f32::EPSILON * forward.norm_squared() * up.norm_squared();
                forward.cross(up).norm_squared() > tolerance
            })
            .unwrap_or(self.up)
    }

    /// World-to-view matrix
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Isometry3::look_at_rh(&self.position, &self.target, &self.effective_up()).to_homogeneous()
    }

    /// View-to-clip matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        match self.projection {
            Projection::Perspective { fov_y } => {
                Perspective3::new(self.aspect, fov_y.to_radians(), self.near, self.far)
                    .to_homogeneous()
            }
            Projection::Orthographic { height } => {
                let half_h = height * 0.5;
                let half_w = half_h * self.aspect;
                Orthographic3::new(-half_w, half_w, -half_h, half_h, self.near, self.far)
                    .to_homogeneous()
            }
        }
    }

    /// World-to-clip matrix
    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    /// Project a world point to normalized device coordinates
    pub fn project(&self, point: &Point3<f32>) -> Point3<f32> {
        self.view_projection().transform_point(point)
    }

    /// Build the ray through a point in normalized device coordinates
    ///
    /// Returns `None` when the camera is degenerate (eye on target, empty
    /// frustum) or the unprojected ray is not finite.
    pub fn ray_through(&self, ndc: Point2<f32>) -> Option<Ray> {
        if !self.has_valid_frustum() {
            return None;
        }
        let forward = (self.target - self.position).try_normalize(f32::EPSILON)?;
        let clip_to_world = self.view_projection().try_inverse()?;

        match self.projection {
            Projection::Perspective { .. } => {
                let through = clip_to_world.transform_point(&Point3::new(ndc.x, ndc.y, 0.5));
                Ray::new(self.position, through - self.position)
            }
            Projection::Orthographic { .. } => {
                let origin = clip_to_world.transform_point(&Point3::new(ndc.x, ndc.y, -1.0));
                Ray::new(origin, forward)
            }
        }
    }
}
