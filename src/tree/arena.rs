//! Index-addressed node storage
//!
//! Nodes are only ever referenced by [`NodeId`]; the arena may be compacted
//! and reallocated by the pruner without invalidating anything but the ids
//! it remaps.

use std::ops::Index;

use super::{Node, NodeId, LEAF_ALPHA};
use crate::TreeError;

/// Largest pixel count whose `2N` node slots still fit in a `u32` index.
pub const MAX_PIXELS: usize = (u32::MAX / 2) as usize;

/// Growable node array: leaves first, internal nodes appended in creation order.
#[derive(Debug, Clone)]
pub struct NodeArena {
    nodes: Vec<Node>,
    num_leaves: usize,
}

impl NodeArena {
    /// Reserve `2N` slots and create one leaf per pixel.
    pub fn with_leaves(num_leaves: usize) -> Result<Self, TreeError> {
        if num_leaves > MAX_PIXELS {
            return Err(TreeError::ImageTooLarge { pixels: num_leaves });
        }
        let capacity = 2 * num_leaves;
        let mut nodes = Vec::new();
        nodes
            .try_reserve_exact(capacity)
            .map_err(TreeError::allocation("node arena", capacity))?;
        nodes.resize(num_leaves, Node::leaf());
        Ok(Self { nodes, num_leaves })
    }

    /// Append an internal node at level `alpha` with no parent and zero area.
    ///
    /// Fails once the arena holds its `2N` reserved slots.
    pub fn try_allocate(&mut self, alpha: f64) -> Result<NodeId, TreeError> {
        let capacity = 2 * self.num_leaves;
        if self.nodes.len() >= capacity {
            return Err(TreeError::ArenaFull { capacity });
        }
        Ok(self.allocate(alpha))
    }

    /// Unchecked [`NodeArena::try_allocate`]; construction never exceeds `2N`.
    #[inline]
    pub(crate) fn allocate(&mut self, alpha: f64) -> NodeId {
        debug_assert!(self.nodes.len() < 2 * self.num_leaves);
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            alpha,
            area: 0,
        });
        id
    }

    /// Make `child` a child of `parent`, adding its area.
    #[inline]
    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(parent > child, "parents are created after their children");
        let area = self.nodes[child.index()].area;
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].area += area;
    }

    /// Whether `id` has no parent or a parent at a different alpha.
    #[inline]
    pub fn is_level_root(&self, id: NodeId) -> bool {
        let node = &self.nodes[id.index()];
        match node.parent {
            None => true,
            Some(parent) => node.alpha != self.nodes[parent.index()].alpha,
        }
    }

    /// Highest same-alpha ancestor of `id`, rewriting every traversed
    /// node's parent to it.
    pub fn find_level_root(&mut self, id: NodeId) -> NodeId {
        let root = self.level_root_of(id);
        let mut current = id;
        while current != root {
            let next = match self.nodes[current.index()].parent {
                Some(next) => next,
                None => break,
            };
            self.nodes[current.index()].parent = Some(root);
            current = next;
        }
        root
    }

    /// Highest same-alpha ancestor of `id`, without modifying the arena.
    pub fn level_root_of(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while !self.is_level_root(current) {
            match self.nodes[current.index()].parent {
                Some(parent) => current = parent,
                None => break,
            }
        }
        current
    }

    /// Number of nodes
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena is empty (zero-pixel image)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of leaves `N`
    #[inline]
    pub fn num_leaves(&self) -> usize {
        self.num_leaves
    }

    /// Reserved slots
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Node by id, if in range
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// All nodes in index order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut Vec<Node> {
        &mut self.nodes
    }
}

impl Index<NodeId> for NodeArena {
    type Output = Node;

    #[inline]
    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
}

impl Node {
    fn leaf() -> Self {
        Self {
            parent: None,
            alpha: LEAF_ALPHA,
            area: 1,
        }
    }
}
