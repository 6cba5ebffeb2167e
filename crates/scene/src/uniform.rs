//! Uniform buffer layouts for handing scene matrices to a renderer.
//!
//! All structures use `#[repr(C)]` for predictable memory layout and implement
//! `Pod` and `Zeroable` so they can be uploaded with `bytemuck::bytes_of`.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::node::Node;
use crate::transform::normal_matrix;

/// Camera uniform buffer data.
///
/// # Memory Layout
///
/// - Offset 0: view matrix (64 bytes)
/// - Offset 64: projection matrix (64 bytes)
/// - Offset 128: viewProjection matrix (64 bytes)
/// - Offset 192: camera position (12 bytes)
/// - Offset 204: padding (4 bytes)
/// - Total size: 208 bytes
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct CameraUniform {
    /// View matrix (world to view space).
    pub view: Mat4,
    /// Projection matrix (view to clip space).
    pub projection: Mat4,
    /// Combined view-projection matrix.
    pub view_projection: Mat4,
    /// Camera world position.
    pub camera_position: Vec3,
    /// Padding for 16-byte alignment.
    pub _padding: f32,
}

impl CameraUniform {
    /// Size of the struct in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Pack the current view state of a camera node.
    ///
    /// Returns `None` for nodes that are not cameras.
    pub fn from_node(node: &Node) -> Option<Self> {
        let camera = node.camera_state()?;
        Some(Self {
            view: camera.view_matrix(),
            projection: camera.projection_matrix(),
            view_projection: camera.view_projection_matrix(),
            camera_position: node.world_transform().w_axis.truncate(),
            _padding: 0.0,
        })
    }
}

/// Per-object uniform buffer data.
///
/// # Memory Layout
///
/// - Offset 0: model matrix (64 bytes)
/// - Offset 64: normal matrix (64 bytes)
/// - Offset 128: model-view-projection matrix (64 bytes)
/// - Total size: 192 bytes
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct ObjectUniform {
    /// Model matrix (object to world space).
    pub model: Mat4,
    /// Inverse transpose of the model matrix, for transforming normals.
    pub normal_matrix: Mat4,
    /// `view_projection * model`.
    pub model_view_projection: Mat4,
}

impl ObjectUniform {
    /// Size of the struct in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    pub fn new(model: Mat4, view_projection: Mat4) -> Self {
        Self {
            model,
            normal_matrix: normal_matrix(&model),
            model_view_projection: view_projection * model,
        }
    }

    /// Pack a node's world transform as seen through a camera node.
    ///
    /// Returns `None` if `camera` is not a camera node.
    pub fn from_nodes(node: &Node, camera: &Node) -> Option<Self> {
        let view_projection = camera.camera_state()?.view_projection_matrix();
        Some(Self::new(node.world_transform(), view_projection))
    }
}
