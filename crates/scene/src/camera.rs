//! Camera view derivation for scene graph nodes.
//!
//! A [`Camera`] is attached to a node through [`NodeKind::Camera`]. Its
//! projection matrix is baked once when the camera is created; the view
//! matrix and basis vectors are re-derived from the node's world transform
//! every time the traversal recomputes that node.
//!
//! [`NodeKind::Camera`]: crate::NodeKind::Camera

use std::f32::consts::PI;

use glam::{Mat4, Vec3};

use crate::transform::{decompose, euler_angles};

/// Projection type for the camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Projection {
    /// Perspective projection
    Perspective {
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
    /// Orthographic projection
    Orthographic {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    },
}

impl Default for Projection {
    fn default() -> Self {
        Projection::Perspective {
            fov_y: 45.0_f32.to_radians(),
            aspect: 1.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Projection {
    /// Get the projection matrix (OpenGL clip conventions, depth in [-1, 1]).
    pub fn matrix(&self) -> Mat4 {
        match *self {
            Projection::Perspective {
                fov_y,
                aspect,
                near,
                far,
            } => Mat4::perspective_rh_gl(fov_y, aspect, near, far),
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => Mat4::orthographic_rh_gl(left, right, bottom, top, near, far),
        }
    }
}

/// View state derived for a camera node.
#[derive(Clone, Debug)]
pub struct Camera {
    projection: Projection,
    projection_matrix: Mat4,
    view_matrix: Mat4,
    view_projection_matrix: Mat4,
    forward: Vec3,
    up: Vec3,
    right: Vec3,
    target: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Projection::default())
    }
}

impl Camera {
    /// Create a camera with the given projection.
    ///
    /// View state stays at identity until the owning node is first
    /// traversed.
    pub fn new(projection: Projection) -> Self {
        Self {
            projection,
            projection_matrix: projection.matrix(),
            view_matrix: Mat4::IDENTITY,
            view_projection_matrix: Mat4::IDENTITY,
            forward: Vec3::Z,
            up: Vec3::Y,
            right: Vec3::X,
            target: Vec3::Z,
        }
    }

    /// Create a perspective camera. `fov_y` is in radians.
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self::new(Projection::Perspective {
            fov_y,
            aspect,
            near,
            far,
        })
    }

    /// Projection settings the camera was built with.
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Get the projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    /// Get the view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    /// Get the view-projection matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.view_projection_matrix
    }

    /// Get the forward direction vector.
    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    /// Get the up direction vector.
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Get the right direction vector.
    pub fn right(&self) -> Vec3 {
        self.right
    }

    /// Point one unit ahead of the eye along `forward`.
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Re-derive the view from the node's freshly computed world transform.
    ///
    /// `roll` is the node's raw local Z rotation. It is scaled by pi before
    /// being applied, and the resulting up vector has its Y component
    /// flipped; both are part of the established camera behavior.
    ///
    /// Returns `false` and leaves the previous view untouched when the world
    /// transform cannot be decomposed.
    pub(crate) fn derive_view(&mut self, world: &Mat4, roll: f32) -> bool {
        let Some(decomposed) = decompose(world) else {
            return false;
        };
        let euler = euler_angles(decomposed.rotation);
        let (pitch, yaw) = (euler.x, euler.y);

        let forward = -Vec3::new(-yaw.sin(), pitch.sin() * yaw.cos(), pitch.cos() * yaw.cos())
            .normalize();
        let mut up = forward.cross(Vec3::Y).cross(forward);
        let mut right = forward.cross(up);

        let (sin_roll, cos_roll) = (roll * PI).sin_cos();
        right = (right * cos_roll + up * sin_roll).normalize();
        up = forward.cross(right);
        up.y = -up.y;

        let eye = decomposed.translation;
        self.forward = forward;
        self.up = up;
        self.right = right;
        self.target = eye + forward;
        self.view_matrix = Mat4::look_at_rh(eye, self.target, up);
        self.view_projection_matrix = self.projection_matrix * self.view_matrix;
        true
    }
}
