//! Per-frame node behaviors.
//!
//! A [`Behavior`] is the extension point run by [`SceneGraph::update`] once
//! per frame with the elapsed time. Plain nodes have none, which makes their
//! update a no-op.
//!
//! [`SceneGraph::update`]: crate::SceneGraph::update

use glam::Vec3;

use crate::node::Node;

/// Frame-based logic attached to a node (animation, simple physics, ...).
pub trait Behavior {
    /// Advance by `delta` seconds. Pose setters on `node` mark it dirty.
    fn update(&mut self, node: &mut Node, delta: f32);
}

impl<F> Behavior for F
where
    F: FnMut(&mut Node, f32),
{
    fn update(&mut self, node: &mut Node, delta: f32) {
        self(node, delta)
    }
}

/// Rotates a node at a constant rate around each Euler axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spin {
    /// Radians per second for (x, y, z).
    pub angular_velocity: Vec3,
}

impl Spin {
    pub fn new(angular_velocity: Vec3) -> Self {
        Self { angular_velocity }
    }
}

impl Behavior for Spin {
    fn update(&mut self, node: &mut Node, delta: f32) {
        let rotation = node.rot() + self.angular_velocity * delta;
        node.set_rot(rotation);
    }
}
