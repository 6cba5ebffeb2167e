//! Hierarchical transforms and camera derivation.
//!
//! This crate provides the scene graph:
//! - Pose composition and matrix decomposition
//! - Node tree with lazy, dirty-flag driven world transforms
//! - Camera nodes deriving view and view-projection matrices
//! - Per-frame node behaviors
//! - Uniform layouts for handing results to a renderer

pub mod behavior;
pub mod camera;
pub mod graph;
pub mod node;
pub mod transform;
pub mod uniform;

pub use behavior::{Behavior, Spin};
pub use camera::{Camera, Projection};
pub use graph::{Descendants, NodeId, SceneGraph};
pub use node::{Node, NodeKind};
pub use transform::{DecomposedTransform, Transform, compose, decompose, euler_angles, normal_matrix};
pub use uniform::{CameraUniform, ObjectUniform};
