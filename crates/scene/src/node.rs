//! Scene graph nodes.
//!
//! A [`Node`] carries a local pose plus the matrices cached from it. Nodes
//! live inside a [`SceneGraph`]; structure (parent/children) is edited
//! through the graph, pose through the node itself.
//!
//! [`SceneGraph`]: crate::SceneGraph

use std::fmt;

use glam::{Mat4, Vec3};

use crate::behavior::Behavior;
use crate::camera::{Camera, Projection};
use crate::graph::NodeId;
use crate::transform::{DecomposedTransform, Transform, decompose};

/// What a node does on top of carrying a transform.
#[derive(Clone, Debug, Default)]
pub enum NodeKind {
    /// A plain transform node
    #[default]
    Plain,
    /// A node that derives view/projection matrices from its world transform
    Camera(Camera),
}

/// An entity in the scene graph.
pub struct Node {
    /// Human-readable label; not required to be unique.
    pub name: String,
    transform: Transform,
    local_transform: Mat4,
    world_transform: Mat4,
    dirty: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    kind: NodeKind,
    pub(crate) behavior: Option<Box<dyn Behavior>>,
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("transform", &self.transform)
            .field("dirty", &self.dirty)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("kind", &self.kind)
            .field("has_behavior", &self.behavior.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new("Node")
    }
}

impl Node {
    /// Create a plain node at the origin with unit scale.
    ///
    /// Matrices start as identity and the node is dirty until its first
    /// traversal.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            local_transform: Mat4::IDENTITY,
            world_transform: Mat4::IDENTITY,
            dirty: true,
            parent: None,
            children: Vec::new(),
            kind: NodeKind::Plain,
            behavior: None,
        }
    }

    /// Create a camera node.
    pub fn camera(name: impl Into<String>, camera: Camera) -> Self {
        Self {
            kind: NodeKind::Camera(camera),
            ..Self::new(name)
        }
    }

    /// Create a perspective camera node with a 45 degree field of view,
    /// square aspect and clip planes at 0.1 and 100.
    pub fn default_camera(name: impl Into<String>) -> Self {
        Self::camera(name, Camera::new(Projection::default()))
    }

    /// Create a node with the given position.
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    /// Create a node with the given Euler rotation (radians).
    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.transform.rotation = rotation;
        self
    }

    /// Create a node with the given scale.
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.transform.scale = scale;
        self
    }

    /// Create a node with a full pose.
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Attach a per-frame behavior.
    pub fn with_behavior(mut self, behavior: impl Behavior + 'static) -> Self {
        self.behavior = Some(Box::new(behavior));
        self
    }

    /// Position in local space.
    pub fn pos(&self) -> Vec3 {
        self.transform.position
    }

    /// Euler rotation in local space.
    pub fn rot(&self) -> Vec3 {
        self.transform.rotation
    }

    /// Scale in local space.
    pub fn scale(&self) -> Vec3 {
        self.transform.scale
    }

    /// The full local pose.
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn set_pos(&mut self, position: Vec3) {
        self.transform.position = position;
        self.dirty = true;
    }

    pub fn set_rot(&mut self, rotation: Vec3) {
        self.transform.rotation = rotation;
        self.dirty = true;
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.transform.scale = scale;
        self.dirty = true;
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
        self.dirty = true;
    }

    /// Flag the cached matrices as stale without recomputing them.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Matrix mapping this node's space into its parent's space.
    pub fn local_transform(&self) -> Mat4 {
        self.local_transform
    }

    /// Matrix mapping this node's space into scene space.
    ///
    /// Only current after a traversal that followed the last mutation.
    pub fn world_transform(&self) -> Mat4 {
        self.world_transform
    }

    /// Decompose the cached world transform.
    ///
    /// Returns `None` when the world matrix is singular (e.g. zero scale).
    pub fn decomposed_transform(&self) -> Option<DecomposedTransform> {
        decompose(&self.world_transform)
    }

    /// Handle of the parent node, if attached.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child handles in insertion order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Camera state, if this is a camera node.
    pub fn camera_state(&self) -> Option<&Camera> {
        match &self.kind {
            NodeKind::Camera(camera) => Some(camera),
            NodeKind::Plain => None,
        }
    }

    pub fn is_camera(&self) -> bool {
        matches!(self.kind, NodeKind::Camera(_))
    }

    /// Rebuild local and world matrices and clear the dirty flag.
    ///
    /// Camera nodes additionally re-derive their view from the new world
    /// matrix.
    pub(crate) fn recompute(&mut self, parent_world: Option<Mat4>) {
        self.local_transform = self.transform.local_matrix();
        self.world_transform = match parent_world {
            Some(parent_world) => parent_world * self.local_transform,
            None => self.local_transform,
        };
        self.dirty = false;

        if let NodeKind::Camera(camera) = &mut self.kind
            && !camera.derive_view(&self.world_transform, self.transform.rotation.z)
        {
            tracing::warn!(
                "Camera \"{}\" has a singular world transform, keeping previous view",
                self.name
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_node_is_dirty_identity() {
        let node = Node::new("thing");
        assert_eq!(node.name, "thing");
        assert!(node.is_dirty());
        assert_eq!(node.local_transform(), Mat4::IDENTITY);
        assert_eq!(node.world_transform(), Mat4::IDENTITY);
        assert_eq!(node.pos(), Vec3::ZERO);
        assert_eq!(node.rot(), Vec3::ZERO);
        assert_eq!(node.scale(), Vec3::ONE);
        assert!(node.parent().is_none());
        assert!(node.children().is_empty());
        assert!(!node.is_camera());
    }

    #[test]
    fn test_builder_sets_pose() {
        let node = Node::new("thing")
            .with_position(Vec3::new(1.0, 2.0, 3.0))
            .with_rotation(Vec3::new(0.0, 1.0, 0.0))
            .with_scale(Vec3::splat(4.0));
        assert_eq!(node.pos(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(node.rot(), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(node.scale(), Vec3::splat(4.0));
    }

    #[test]
    fn test_setters_mark_dirty_without_recomputing() {
        let mut node = Node::new("thing");
        node.recompute(None);
        assert!(!node.is_dirty());

        node.set_pos(Vec3::new(5.0, 0.0, 0.0));
        assert!(node.is_dirty());
        assert_eq!(node.pos(), Vec3::new(5.0, 0.0, 0.0));
        // Cached matrices are untouched until the next recompute.
        assert_eq!(node.local_transform(), Mat4::IDENTITY);

        node.recompute(None);
        node.set_rot(Vec3::Y);
        assert!(node.is_dirty());

        node.recompute(None);
        node.set_scale(Vec3::splat(2.0));
        assert!(node.is_dirty());

        node.recompute(None);
        node.mark_dirty();
        assert!(node.is_dirty());
    }

    #[test]
    fn test_set_transform_replaces_pose() {
        let pose = Transform::new()
            .with_position(Vec3::Y)
            .with_scale(Vec3::splat(0.5));
        let mut node = Node::new("thing").with_transform(pose);
        assert_eq!(node.transform(), &pose);
        node.recompute(None);

        node.set_transform(Transform::default());
        assert!(node.is_dirty());
        assert_eq!(node.pos(), Vec3::ZERO);
    }

    #[test]
    fn test_recompute_without_parent() {
        let mut node = Node::new("thing").with_position(Vec3::new(1.0, 2.0, 3.0));
        node.recompute(None);
        assert_eq!(node.world_transform(), node.local_transform());
        assert_eq!(
            node.local_transform(),
            Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0))
        );
    }

    #[test]
    fn test_recompute_with_parent() {
        let parent_world = Mat4::from_translation(Vec3::new(-2.0, 0.0, 0.0));
        let mut node = Node::new("child").with_position(Vec3::new(2.0, 0.0, 0.0));
        node.recompute(Some(parent_world));
        assert_eq!(node.world_transform(), parent_world * node.local_transform());
        let origin = node.world_transform().transform_point3(Vec3::ZERO);
        assert!(origin.abs_diff_eq(Vec3::ZERO, 1e-6));
    }

    #[test]
    fn test_camera_node_derives_view_on_recompute() {
        let mut node = Node::default_camera("camera");
        assert!(node.is_camera());
        node.recompute(None);
        let camera = node.camera_state().unwrap();
        assert!(camera.forward().abs_diff_eq(Vec3::NEG_Z, 1e-5));
    }

    #[test]
    fn test_decomposed_transform_reads_world() {
        let mut node = Node::new("thing").with_position(Vec3::new(0.0, 7.0, 0.0));
        // Not traversed yet: the cached world matrix is still identity.
        let d = node.decomposed_transform().unwrap();
        assert_eq!(d.translation, Vec3::ZERO);

        node.recompute(None);
        let d = node.decomposed_transform().unwrap();
        assert!(d.translation.abs_diff_eq(Vec3::new(0.0, 7.0, 0.0), 1e-6));
    }
}
