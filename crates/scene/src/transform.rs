//! Local pose and 4x4 transform composition/decomposition.
//!
//! This module provides the [`Transform`] struct holding a node's local pose
//! (position, Euler rotation, scale) along with the free functions that turn
//! a pose into a matrix ([`compose`]) and a matrix back into its parts
//! ([`decompose`]).
//!
//! # Example
//!
//! ```
//! use scenegraph_scene::{Transform, decompose};
//! use glam::Vec3;
//!
//! let pose = Transform::new()
//!     .with_position(Vec3::new(1.0, 2.0, 3.0))
//!     .with_scale(Vec3::splat(2.0));
//!
//! let parts = decompose(&pose.local_matrix()).unwrap();
//! assert!(parts.translation.abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), 1e-5));
//! assert!(parts.scale.abs_diff_eq(Vec3::splat(2.0), 1e-5));
//! ```

use glam::{Mat4, Quat, Vec3, Vec4};

/// A local pose: position, rotation, and scale relative to the parent.
///
/// Rotation is stored as Euler angles in radians and applied in Y, X, Z
/// order. Gimbal lock is a property of this representation and is kept.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Position in local space (relative to parent if any)
    pub position: Vec3,
    /// Euler angles in radians
    pub rotation: Vec3,
    /// Scale factor
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform at the origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transform with the given position.
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Create a transform with the given Euler rotation.
    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Create a transform with the given scale.
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Get the local transformation matrix.
    ///
    /// This returns the transformation matrix in local space,
    /// not accounting for any parent transforms.
    pub fn local_matrix(&self) -> Mat4 {
        compose(self.position, self.rotation, self.scale)
    }
}

/// Build `T * Ry * Rx * Rz * S` from a pose.
///
/// The Y-X-Z order is fixed; inputs are not validated and NaN or zero scale
/// flows straight into the result.
pub fn compose(position: Vec3, rotation: Vec3, scale: Vec3) -> Mat4 {
    Mat4::from_translation(position)
        * Mat4::from_rotation_y(rotation.y)
        * Mat4::from_rotation_x(rotation.x)
        * Mat4::from_rotation_z(rotation.z)
        * Mat4::from_scale(scale)
}

/// The parts recovered from a 4x4 matrix by [`decompose`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecomposedTransform {
    pub scale: Vec3,
    pub rotation: Quat,
    pub translation: Vec3,
    /// Shear factors as (yz, xz, xy).
    pub skew: Vec3,
    /// Homogeneous perspective row; `(0, 0, 0, 1)` for affine input.
    pub perspective: Vec4,
}

impl Default for DecomposedTransform {
    fn default() -> Self {
        Self {
            scale: Vec3::ONE,
            rotation: Quat::IDENTITY,
            translation: Vec3::ZERO,
            skew: Vec3::ZERO,
            perspective: Vec4::W,
        }
    }
}

/// Split a matrix into scale, rotation, translation, skew and perspective.
///
/// This is the classic Graphics Gems "unmatrix" extraction: normalize by the
/// homogeneous term, solve out the perspective row, strip translation, then
/// Gram-Schmidt the upper 3x3 to separate scale and shear from an
/// orthonormal basis that is finally converted to a quaternion.
///
/// Returns `None` for matrices that cannot be decomposed (zero homogeneous
/// term or a singular upper-left block, e.g. zero scale).
pub fn decompose(matrix: &Mat4) -> Option<DecomposedTransform> {
    let mut local = *matrix;
    if local.w_axis.w == 0.0 {
        return None;
    }
    local = local * (1.0 / local.w_axis.w);

    // The perspective-free matrix is used to solve for the perspective row
    // and to check for singularity.
    let mut perspective_matrix = local;
    perspective_matrix.x_axis.w = 0.0;
    perspective_matrix.y_axis.w = 0.0;
    perspective_matrix.z_axis.w = 0.0;
    perspective_matrix.w_axis.w = 1.0;
    if perspective_matrix.determinant() == 0.0 {
        return None;
    }

    let perspective = if local.x_axis.w != 0.0 || local.y_axis.w != 0.0 || local.z_axis.w != 0.0
    {
        let rhs = Vec4::new(
            local.x_axis.w,
            local.y_axis.w,
            local.z_axis.w,
            local.w_axis.w,
        );
        let solved = perspective_matrix.inverse().transpose() * rhs;
        local.x_axis.w = 0.0;
        local.y_axis.w = 0.0;
        local.z_axis.w = 0.0;
        local.w_axis.w = 1.0;
        solved
    } else {
        Vec4::W
    };

    let translation = local.w_axis.truncate();

    let mut rows = [
        local.x_axis.truncate(),
        local.y_axis.truncate(),
        local.z_axis.truncate(),
    ];
    let mut scale = Vec3::ZERO;
    let mut skew = Vec3::ZERO;

    scale.x = rows[0].length();
    rows[0] /= scale.x;

    skew.z = rows[0].dot(rows[1]);
    rows[1] -= rows[0] * skew.z;

    scale.y = rows[1].length();
    rows[1] /= scale.y;
    skew.z /= scale.y;

    skew.y = rows[0].dot(rows[2]);
    rows[2] -= rows[0] * skew.y;
    skew.x = rows[1].dot(rows[2]);
    rows[2] -= rows[1] * skew.x;

    scale.z = rows[2].length();
    rows[2] /= scale.z;
    skew.y /= scale.z;
    skew.x /= scale.z;

    // A left-handed basis means one axis was mirrored; fold it into scale.
    if rows[0].dot(rows[1].cross(rows[2])) < 0.0 {
        scale = -scale;
        for row in &mut rows {
            *row = -*row;
        }
    }

    Some(DecomposedTransform {
        scale,
        rotation: basis_to_quat(&rows),
        translation,
        skew,
        perspective,
    })
}

/// Convert an orthonormal basis (given as matrix columns) into a quaternion.
fn basis_to_quat(rows: &[Vec3; 3]) -> Quat {
    let trace = rows[0].x + rows[1].y + rows[2].z;
    if trace > 0.0 {
        let root = (trace + 1.0).sqrt();
        let w = 0.5 * root;
        let root = 0.5 / root;
        return Quat::from_xyzw(
            root * (rows[1].z - rows[2].y),
            root * (rows[2].x - rows[0].z),
            root * (rows[0].y - rows[1].x),
            w,
        );
    }

    // Pick the largest diagonal term for numerical stability.
    const NEXT: [usize; 3] = [1, 2, 0];
    let mut i = 0;
    if rows[1].y > rows[0].x {
        i = 1;
    }
    if rows[2].z > rows[i][i] {
        i = 2;
    }
    let j = NEXT[i];
    let k = NEXT[j];

    let root = (rows[i][i] - rows[j][j] - rows[k][k] + 1.0).sqrt();
    let mut xyz = [0.0; 3];
    xyz[i] = 0.5 * root;
    let root = 0.5 / root;
    xyz[j] = root * (rows[i][j] + rows[j][i]);
    xyz[k] = root * (rows[i][k] + rows[k][i]);
    let w = root * (rows[j][k] - rows[k][j]);

    Quat::from_xyzw(xyz[0], xyz[1], xyz[2], w)
}

/// Euler angles (pitch, yaw, roll) of a quaternion, in radians.
///
/// Pitch comes from `atan2` over the full circle, yaw from `asin` and is
/// therefore limited to [-pi/2, pi/2]. The camera's basis derivation is
/// written against exactly this convention.
pub fn euler_angles(q: Quat) -> Vec3 {
    Vec3::new(pitch(q), yaw(q), roll(q))
}

fn pitch(q: Quat) -> f32 {
    let y = 2.0 * (q.y * q.z + q.w * q.x);
    let x = q.w * q.w - q.x * q.x - q.y * q.y + q.z * q.z;
    if x.abs() <= f32::EPSILON && y.abs() <= f32::EPSILON {
        // Singularity: avoid atan2(0, 0).
        return 2.0 * q.x.atan2(q.w);
    }
    y.atan2(x)
}

fn yaw(q: Quat) -> f32 {
    (-2.0 * (q.x * q.z - q.w * q.y)).clamp(-1.0, 1.0).asin()
}

fn roll(q: Quat) -> f32 {
    let y = 2.0 * (q.x * q.y + q.w * q.z);
    let x = q.w * q.w + q.x * q.x - q.y * q.y - q.z * q.z;
    y.atan2(x)
}

/// Get the normal matrix (inverse transpose) of a model matrix.
///
/// # Non-invertible transforms
///
/// If the matrix is not invertible (e.g., contains zero scale),
/// the identity matrix is returned as a fallback to avoid NaN/Inf values.
pub fn normal_matrix(model: &Mat4) -> Mat4 {
    const EPSILON: f32 = 1e-6;
    if model.determinant().abs() < EPSILON {
        Mat4::IDENTITY
    } else {
        model.inverse().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat3;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    const EPSILON: f32 = 1e-5;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn approx_eq_vec3(a: Vec3, b: Vec3) -> bool {
        approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z)
    }

    fn rotation_matrix(rotation: Vec3) -> Mat3 {
        Mat3::from_rotation_y(rotation.y)
            * Mat3::from_rotation_x(rotation.x)
            * Mat3::from_rotation_z(rotation.z)
    }

    fn same_rotation(a: Quat, b: Quat) -> bool {
        // q and -q encode the same rotation.
        a.dot(b).abs() > 1.0 - EPSILON
    }

    #[test]
    fn test_transform_default() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Vec3::ZERO);
        assert_eq!(t.scale, Vec3::ONE);
        assert_eq!(t.local_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_transform_builder() {
        let t = Transform::new()
            .with_position(Vec3::new(1.0, 2.0, 3.0))
            .with_rotation(Vec3::new(0.1, 0.2, 0.3))
            .with_scale(Vec3::splat(2.0));

        assert_eq!(t.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.rotation, Vec3::new(0.1, 0.2, 0.3));
        assert_eq!(t.scale, Vec3::splat(2.0));
    }

    #[test]
    fn test_compose_order_is_y_then_x_then_z() {
        let rotation = Vec3::new(0.3, 0.7, -0.4);
        let composed = compose(Vec3::ZERO, rotation, Vec3::ONE);
        let expected = Mat4::from_rotation_y(rotation.y)
            * Mat4::from_rotation_x(rotation.x)
            * Mat4::from_rotation_z(rotation.z);
        assert!(composed.abs_diff_eq(expected, EPSILON));

        // Any other order gives a different matrix for the same angles.
        let xyz = Mat4::from_rotation_x(rotation.x)
            * Mat4::from_rotation_y(rotation.y)
            * Mat4::from_rotation_z(rotation.z);
        assert!(!composed.abs_diff_eq(xyz, EPSILON));
    }

    #[test]
    fn test_compose_scales_before_rotating() {
        // Scale along X, then yaw 90 degrees: the stretched axis ends up on -Z.
        let m = compose(Vec3::ZERO, Vec3::new(0.0, FRAC_PI_2, 0.0), Vec3::new(3.0, 1.0, 1.0));
        let p = m.transform_point3(Vec3::X);
        assert!(approx_eq_vec3(p, Vec3::new(0.0, 0.0, -3.0)), "got {:?}", p);
    }

    #[test]
    fn test_compose_translation_last() {
        let m = compose(Vec3::new(5.0, 0.0, 0.0), Vec3::new(0.0, 0.0, PI), Vec3::ONE);
        let p = m.transform_point3(Vec3::X);
        assert!(approx_eq_vec3(p, Vec3::new(4.0, 0.0, 0.0)), "got {:?}", p);
    }

    #[test]
    fn test_decompose_translate_yaw() {
        let m = compose(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.0, FRAC_PI_2, 0.0), Vec3::ONE);
        let d = decompose(&m).unwrap();

        assert!(approx_eq_vec3(d.translation, Vec3::new(1.0, 2.0, 3.0)));
        assert!(approx_eq_vec3(d.scale, Vec3::ONE));
        assert!(approx_eq_vec3(d.skew, Vec3::ZERO));
        assert!(d.perspective.abs_diff_eq(Vec4::W, EPSILON));
        assert!(same_rotation(d.rotation, Quat::from_rotation_y(FRAC_PI_2)));
    }

    #[test]
    fn test_decompose_non_uniform_scale() {
        let rotation = Vec3::new(0.4, -1.1, 0.25);
        let scale = Vec3::new(2.0, 0.5, 3.0);
        let m = compose(Vec3::new(-4.0, 0.0, 9.0), rotation, scale);
        let d = decompose(&m).unwrap();

        assert!(approx_eq_vec3(d.scale, scale), "got {:?}", d.scale);
        assert!(approx_eq_vec3(d.skew, Vec3::ZERO), "got {:?}", d.skew);
        let expected = Quat::from_mat3(&rotation_matrix(rotation));
        assert!(same_rotation(d.rotation, expected));

        let rebuilt = Mat4::from_scale_rotation_translation(d.scale, d.rotation, d.translation);
        assert!(rebuilt.abs_diff_eq(m, 1e-4));
    }

    #[test]
    fn test_decompose_half_turn_uses_non_trace_branch() {
        // Trace of a 180 degree yaw is -1, which exercises the largest-diagonal path.
        let m = compose(Vec3::ZERO, Vec3::new(0.0, PI, 0.0), Vec3::ONE);
        let d = decompose(&m).unwrap();
        assert!(same_rotation(d.rotation, Quat::from_rotation_y(PI)));
    }

    #[test]
    fn test_decompose_mirrored_axis() {
        let m = Mat4::from_scale(Vec3::new(-1.0, 1.0, 1.0));
        let d = decompose(&m).unwrap();
        // A mirror is folded into the sign of every scale component.
        assert!(approx_eq_vec3(d.scale, Vec3::new(-1.0, -1.0, -1.0)));
        let rebuilt = Mat4::from_scale_rotation_translation(d.scale, d.rotation, d.translation);
        assert!(rebuilt.abs_diff_eq(m, EPSILON));
    }

    #[test]
    fn test_decompose_skew() {
        // x' = x + 0.5 y
        let m = Mat4::from_cols(Vec4::X, Vec4::new(0.5, 1.0, 0.0, 0.0), Vec4::Z, Vec4::W);
        let d = decompose(&m).unwrap();
        assert!(approx_eq(d.skew.z, 0.5), "got {:?}", d.skew);
        assert!(approx_eq(d.skew.x, 0.0));
        assert!(approx_eq(d.skew.y, 0.0));
    }

    #[test]
    fn test_decompose_perspective_row() {
        let mut m = Mat4::IDENTITY;
        m.z_axis.w = -1.0;
        m.w_axis.z = 0.5;
        let d = decompose(&m).unwrap();
        assert!(approx_eq(d.perspective.z, -1.0), "got {:?}", d.perspective);
    }

    #[test]
    fn test_decompose_singular() {
        assert!(decompose(&Mat4::from_scale(Vec3::ZERO)).is_none());
        assert!(decompose(&Mat4::ZERO).is_none());
    }

    #[test]
    fn test_euler_angles_single_axis() {
        let e = euler_angles(Quat::from_rotation_x(FRAC_PI_4));
        assert!(approx_eq_vec3(e, Vec3::new(FRAC_PI_4, 0.0, 0.0)), "got {:?}", e);

        let e = euler_angles(Quat::from_rotation_y(FRAC_PI_4));
        assert!(approx_eq_vec3(e, Vec3::new(0.0, FRAC_PI_4, 0.0)), "got {:?}", e);

        let e = euler_angles(Quat::from_rotation_z(-FRAC_PI_4));
        assert!(approx_eq_vec3(e, Vec3::new(0.0, 0.0, -FRAC_PI_4)), "got {:?}", e);
    }

    #[test]
    fn test_euler_angles_identity() {
        assert!(approx_eq_vec3(euler_angles(Quat::IDENTITY), Vec3::ZERO));
    }

    #[test]
    fn test_normal_matrix_identity() {
        assert_eq!(normal_matrix(&Mat4::IDENTITY), Mat4::IDENTITY);
    }

    #[test]
    fn test_normal_matrix_with_scale() {
        let model = compose(Vec3::ZERO, Vec3::ZERO, Vec3::new(1.0, 2.0, 1.0));
        assert_eq!(normal_matrix(&model), model.inverse().transpose());
    }

    #[test]
    fn test_normal_matrix_non_invertible() {
        let model = compose(Vec3::ZERO, Vec3::ZERO, Vec3::ZERO);
        let normal = normal_matrix(&model);

        // Should return identity matrix as fallback, not NaN
        assert_eq!(normal, Mat4::IDENTITY);
        assert!(!normal.is_nan());
    }
}
