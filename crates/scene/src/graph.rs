//! Node storage and the dirty-propagation traversal.
//!
//! The [`SceneGraph`] owns every node in a slot table. Each node owns its
//! children through the ordered `children` list; the `parent` link is a plain
//! [`NodeId`] used only for lookups. Removing a node from the table
//! ([`SceneGraph::despawn`]) destroys its whole subtree.
//!
//! # Example
//!
//! ```
//! use scenegraph_scene::{Node, SceneGraph};
//! use glam::Vec3;
//!
//! let mut graph = SceneGraph::new();
//! let root = graph.insert(Node::new("root"));
//! let parent = graph.insert(Node::new("parent").with_position(Vec3::new(-2.0, 0.0, 0.0)));
//! let child = graph.insert(Node::new("child").with_position(Vec3::new(2.0, 0.0, 0.0)));
//! graph.add(root, parent);
//! graph.add(parent, child);
//!
//! graph.update_world_transform(root);
//!
//! let world = graph[child].world_transform();
//! assert!(world.transform_point3(Vec3::ZERO).abs_diff_eq(Vec3::ZERO, 1e-6));
//! ```

use std::ops::{Index, IndexMut};

use crate::node::Node;

/// Handle to a node in a [`SceneGraph`].
///
/// Handles carry a generation, so a handle to a despawned node never
/// resolves to whatever node later reuses its slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Owner of all nodes and entry point for structural edits and traversal.
#[derive(Debug, Default)]
pub struct SceneGraph {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Take ownership of a detached node and return its handle.
    ///
    /// The node starts without a parent; use [`add`](Self::add) to attach it.
    pub fn insert(&mut self, mut node: Node) -> NodeId {
        node.parent = None;
        node.children.clear();
        tracing::debug!("Adding node \"{}\"", node.name);

        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeId {
                index,
                generation: 0,
            }
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    /// Attach `child` as the last child of `parent`.
    ///
    /// The child's parent link is overwritten and the child is marked dirty.
    /// A child that already has a parent is *not* detached first; call
    /// [`remove`](Self::remove) before reparenting. Unknown handles are
    /// treated as absent and the call is a no-op, as is any attachment that
    /// would make a node its own ancestor.
    pub fn add(&mut self, parent: NodeId, child: NodeId) {
        if !self.contains(parent) || !self.contains(child) {
            tracing::debug!(?parent, ?child, "Ignoring add with a stale node handle");
            return;
        }
        if self.subtree_contains(child, parent) {
            tracing::warn!(
                "Refusing to add \"{}\" under \"{}\": it would become its own ancestor",
                self[child].name,
                self[parent].name
            );
            return;
        }

        let node = &mut self[child];
        node.parent = Some(parent);
        node.mark_dirty();
        self[parent].children.push(child);
    }

    /// Detach a node from its parent, keeping sibling order intact.
    ///
    /// The detached node (and its subtree) stays in the graph as a new root
    /// and is marked dirty so its next traversal drops the old parent's
    /// transform. A node without a parent is left untouched and a warning is
    /// logged. Returns whether anything was detached.
    pub fn remove(&mut self, id: NodeId) -> bool {
        let Some(node) = self.get(id) else {
            return false;
        };
        let Some(parent) = node.parent else {
            tracing::warn!("Attempted to remove \"{}\", but it has no parent", node.name);
            return false;
        };

        self.unlink(parent, id);
        let node = &mut self[id];
        node.parent = None;
        node.mark_dirty();
        true
    }

    /// Destroy a node together with its entire subtree.
    ///
    /// The node is first detached from its parent (silently, if it has
    /// none). Returns the number of nodes destroyed.
    pub fn despawn(&mut self, id: NodeId) -> usize {
        let Some(parent) = self.get(id).map(|node| node.parent) else {
            return 0;
        };
        if let Some(parent) = parent {
            self.unlink(parent, id);
        }

        let mut destroyed = 0;
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let Some(slot) = self
                .slots
                .get_mut(id.index as usize)
                .filter(|slot| slot.generation == id.generation)
            else {
                continue;
            };
            let Some(node) = slot.node.take() else {
                continue;
            };
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index);
            self.len -= 1;
            destroyed += 1;

            tracing::debug!("Removing node \"{}\"", node.name);
            stack.extend(node.children.iter().copied());
        }
        destroyed
    }

    /// Recompute stale transforms in the subtree rooted at `root`.
    ///
    /// Every node in the subtree is visited once, parents before children
    /// and siblings in insertion order. A node whose dirty flag is set when
    /// visited rebuilds its local and world matrices (and camera view), and
    /// forces all of its children dirty. Clean nodes keep their matrices but
    /// their children are still visited.
    ///
    /// Call this once per frame on the root, after all mutations.
    pub fn update_world_transform(&mut self, root: NodeId) {
        let mut stack = vec![(root, false)];
        while let Some((id, parent_recomputed)) = stack.pop() {
            let Some(node) = self.get(id) else {
                continue;
            };
            let parent_world = node
                .parent
                .and_then(|parent| self.get(parent))
                .map(|parent| parent.world_transform());

            let Some(node) = self.get_mut(id) else {
                continue;
            };
            if parent_recomputed {
                node.mark_dirty();
            }
            let recomputed = node.is_dirty();
            if recomputed {
                node.recompute(parent_world);
                tracing::trace!("Recomputed transform of \"{}\"", node.name);
            }

            stack.extend(node.children.iter().rev().map(|&child| (child, recomputed)));
        }
    }

    /// Run every node's per-frame behavior in the subtree rooted at `root`.
    ///
    /// Behaviors may change their node's pose but cannot touch structure;
    /// the resulting dirty flags are picked up by the next
    /// [`update_world_transform`](Self::update_world_transform).
    pub fn update(&mut self, root: NodeId, delta: f32) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.get_mut(id) else {
                continue;
            };
            if let Some(mut behavior) = node.behavior.take() {
                behavior.update(node, delta);
                node.behavior = Some(behavior);
            }
            stack.extend(node.children.iter().rev().copied());
        }
    }

    /// Iterate the subtree rooted at `root` in traversal order.
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        Descendants {
            graph: self,
            stack: vec![root],
        }
    }

    /// Whether `needle` is `root` or lies anywhere beneath it.
    fn subtree_contains(&self, root: NodeId, needle: NodeId) -> bool {
        self.descendants(root).any(|(id, _)| id == needle)
    }

    fn unlink(&mut self, parent: NodeId, child: NodeId) {
        if let Some(parent) = self.get_mut(parent)
            && let Some(position) = parent.children.iter().position(|&id| id == child)
        {
            parent.children.remove(position);
        }
    }
}

impl Index<NodeId> for SceneGraph {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        match self.get(id) {
            Some(node) => node,
            None => panic!("stale node handle {:?}", id),
        }
    }
}

impl IndexMut<NodeId> for SceneGraph {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        match self.get_mut(id) {
            Some(node) => node,
            None => panic!("stale node handle {:?}", id),
        }
    }
}

/// Pre-order iterator over a subtree, see [`SceneGraph::descendants`].
pub struct Descendants<'a> {
    graph: &'a SceneGraph,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            if let Some(node) = self.graph.get(id) {
                self.stack.extend(node.children.iter().rev().copied());
                return Some((id, node));
            }
        }
        None
    }
}
