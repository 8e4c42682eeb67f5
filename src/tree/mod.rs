//! Alpha-tree storage, construction and inspection
//!
//! Nodes live in one arena indexed by [`NodeId`]: leaves occupy `[0, N)` in
//! raster order and internal nodes follow in creation order, so a parent
//! always has a larger index than any of its children.

pub mod arena;
pub mod attributes;
pub mod builder;
pub mod prune;
pub mod union_find;

pub use arena::NodeArena;
pub use attributes::ColorStats;
pub use builder::TreeBuilder;
pub use prune::{prune, PruneReport};
pub use union_find::UnionFind;

use std::fmt;

use crate::grid::PixelGrid;
use crate::metric::EdgeWeight;
use crate::{TreeConfig, TreeError};

/// Alpha of every leaf; below any real edge weight.
pub const LEAF_ALPHA: f64 = -1.0;

/// Index of a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct NodeId(u32);

impl NodeId {
    /// Wrap an arena index. Indices above `u32::MAX` are rejected when the
    /// arena is sized, so this conversion never truncates in practice.
    #[inline]
    pub fn new(index: usize) -> Self {
        debug_assert!(index <= u32::MAX as usize);
        Self(index as u32)
    }

    /// Position in the arena
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<NodeId> for usize {
    fn from(id: NodeId) -> usize {
        id.index()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One tree node.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct Node {
    /// Parent node; `None` for a root
    pub parent: Option<NodeId>,
    /// Level at which this flat zone formed ([`LEAF_ALPHA`] for pixels)
    pub alpha: f64,
    /// Number of pixels below this node
    pub area: usize,
}

/// Shape figures of a built tree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct TreeSummary {
    /// Pixels `N`
    pub leaves: usize,
    /// Total nodes `S`
    pub nodes: usize,
    /// `S - N`
    pub internal: usize,
    /// Number of trees (1 unless edges were excluded)
    pub roots: usize,
    /// Alpha of the last root, if any
    pub root_alpha: Option<f64>,
    /// Longest leaf-to-root path, counting both ends
    pub max_depth: usize,
}

/// A built alpha-tree with colour statistics.
#[derive(Debug, Clone)]
pub struct AlphaTree {
    width: usize,
    height: usize,
    channels: usize,
    arena: NodeArena,
    stats: ColorStats,
}

impl AlphaTree {
    /// Build, prune and aggregate the tree of `grid`.
    pub fn build<W: EdgeWeight + ?Sized>(
        grid: &PixelGrid<'_>,
        weight: &W,
        config: &TreeConfig,
    ) -> Result<Self, TreeError> {
        TreeBuilder::new(*grid, config).build(weight)
    }

    /// Wrap an arena built for `grid` (pruned or not) and aggregate its
    /// colour statistics. The arena must hold one leaf per pixel.
    pub fn from_arena(grid: &PixelGrid<'_>, arena: NodeArena) -> Result<Self, TreeError> {
        if arena.num_leaves() != grid.len() {
            return Err(TreeError::BufferSizeMismatch {
                expected: arena.num_leaves() * grid.channels(),
                actual: grid.as_bytes().len(),
            });
        }
        let stats = ColorStats::aggregate(&arena, grid)?;
        Ok(Self::from_parts(grid, arena, stats))
    }

    pub(crate) fn from_parts(grid: &PixelGrid<'_>, arena: NodeArena, stats: ColorStats) -> Self {
        Self {
            width: grid.width(),
            height: grid.height(),
            channels: grid.channels(),
            arena,
            stats,
        }
    }

    /// Image width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height
    pub fn height(&self) -> usize {
        self.height
    }

    /// Channels per pixel
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of nodes `S`
    #[inline]
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Whether the tree has no nodes (zero-pixel image)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Number of leaves `N`
    #[inline]
    pub fn num_leaves(&self) -> usize {
        self.arena.num_leaves()
    }

    /// Whether `id` is a pixel
    #[inline]
    pub fn is_leaf(&self, id: NodeId) -> bool {
        id.index() < self.arena.num_leaves()
    }

    /// Node by id, if in range
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id)
    }

    /// All nodes in index order
    pub fn nodes(&self) -> &[Node] {
        self.arena.nodes()
    }

    /// Underlying arena
    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    /// Parent of `id`
    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].parent
    }

    /// Alpha of `id`
    #[inline]
    pub fn alpha(&self, id: NodeId) -> f64 {
        self.arena[id].alpha
    }

    /// Area of `id`
    #[inline]
    pub fn area(&self, id: NodeId) -> usize {
        self.arena[id].area
    }

    /// Whether `id` has no parent or a parent at a different alpha.
    #[inline]
    pub fn is_level_root(&self, id: NodeId) -> bool {
        self.arena.is_level_root(id)
    }

    /// Highest same-alpha ancestor of `id` (no path compression).
    pub fn level_root_of(&self, id: NodeId) -> NodeId {
        self.arena.level_root_of(id)
    }

    /// Alpha at which `id` merges with the rest of the image; `None` for a
    /// root. A parent and its level root share one alpha, so this is simply
    /// the parent's alpha.
    #[inline]
    pub fn salience(&self, id: NodeId) -> Option<f64> {
        self.parent(id).map(|parent| self.alpha(parent))
    }

    /// Colour statistics
    pub fn stats(&self) -> &ColorStats {
        &self.stats
    }

    /// Mean colour of `id` written into `out`.
    pub fn mean_color_into(&self, id: NodeId, out: &mut [u8]) {
        self.stats.mean_into(id, self.area(id), out);
    }

    /// Root of the tree, or `None` if it is empty or a forest.
    pub fn root(&self) -> Option<NodeId> {
        let mut roots = self.roots();
        match (roots.next(), roots.next()) {
            (Some(root), None) => Some(root),
            _ => None,
        }
    }

    /// Every parentless node in index order.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.arena
            .nodes()
            .iter()
            .enumerate()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(i, _)| NodeId::new(i))
    }

    /// Root of the tree containing `id`.
    pub fn root_of(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// Children of every node, indexed by node.
    pub fn children(&self) -> Vec<Vec<NodeId>> {
        let mut children = vec![Vec::new(); self.len()];
        for (i, node) in self.arena.nodes().iter().enumerate() {
            if let Some(parent) = node.parent {
                children[parent.index()].push(NodeId::new(i));
            }
        }
        children
    }

    /// Nodes on the path from `id` to its root, counting both ends.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 1;
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            depth += 1;
            current = parent;
        }
        depth
    }

    /// Depth of every node, computed top-down in one descending pass.
    pub fn depths(&self) -> Vec<usize> {
        let nodes = self.arena.nodes();
        let mut depths = vec![1usize; nodes.len()];
        for i in (0..nodes.len()).rev() {
            if let Some(parent) = nodes[i].parent {
                depths[i] = depths[parent.index()] + 1;
            }
        }
        depths
    }

    /// Shape figures for reporting.
    pub fn summary(&self) -> TreeSummary {
        let roots: Vec<NodeId> = self.roots().collect();
        TreeSummary {
            leaves: self.num_leaves(),
            nodes: self.len(),
            internal: self.len() - self.num_leaves(),
            roots: roots.len(),
            root_alpha: roots.last().map(|&root| self.alpha(root)),
            max_depth: self.depths().into_iter().max().unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::{Euclidean, Manhattan};

    fn id(index: usize) -> NodeId {
        NodeId::new(index)
    }

    #[test]
    fn test_two_pixel_tree() {
        let data = [0u8, 0, 0, 10, 0, 0];
        let grid = PixelGrid::new(2, 1, 3, &data).unwrap();
        let tree = AlphaTree::build(&grid, &Euclidean, &TreeConfig::default()).unwrap();

        assert_eq!(tree.len(), 3);
        assert_eq!(tree.root(), Some(id(2)));
        assert_eq!(tree.alpha(id(2)), 10.0);
        assert_eq!(tree.area(id(2)), 2);
        assert_eq!(tree.salience(id(0)), Some(10.0));
        assert_eq!(tree.salience(id(2)), None);

        let mut mean = [0u8; 3];
        tree.mean_color_into(id(2), &mut mean);
        assert_eq!(mean, [5, 0, 0]);
    }

    #[test]
    fn test_inspection_helpers() {
        // 0 0 9 : leaves 0,1 join at 0, then 2 joins at 9.
        let data = [0u8, 0, 9];
        let grid = PixelGrid::new(3, 1, 1, &data).unwrap();
        let tree = AlphaTree::build(&grid, &Manhattan, &TreeConfig::default()).unwrap();

        assert_eq!(tree.len(), 5);
        assert_eq!(tree.children()[3], vec![id(0), id(1)]);
        assert_eq!(tree.children()[4], vec![id(2), id(3)]);
        assert_eq!(tree.depth(id(0)), 3);
        assert_eq!(tree.depth(id(4)), 1);
        assert_eq!(tree.depths(), vec![3, 3, 2, 2, 1]);
        assert_eq!(tree.root_of(id(1)), id(4));

        let summary = tree.summary();
        assert_eq!(
            summary,
            TreeSummary {
                leaves: 3,
                nodes: 5,
                internal: 2,
                roots: 1,
                root_alpha: Some(9.0),
                max_depth: 3,
            }
        );
    }

    #[test]
    fn test_empty_and_single_pixel() {
        let empty = PixelGrid::new(0, 0, 3, &[]).unwrap();
        let tree = AlphaTree::build(&empty, &Euclidean, &TreeConfig::default()).unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
        assert_eq!(tree.summary().max_depth, 0);

        let one = [7u8, 8, 9];
        let grid = PixelGrid::new(1, 1, 3, &one).unwrap();
        let tree = AlphaTree::build(&grid, &Euclidean, &TreeConfig::default()).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root(), Some(id(0)));
        assert_eq!(tree.alpha(id(0)), LEAF_ALPHA);
    }

    #[test]
    fn test_from_arena_rejects_other_leaf_count() {
        let data = [0u8, 0, 9];
        let grid = PixelGrid::new(3, 1, 1, &data).unwrap();

        let short = NodeArena::with_leaves(2).unwrap();
        assert!(matches!(
            AlphaTree::from_arena(&grid, short),
            Err(TreeError::BufferSizeMismatch {
                expected: 2,
                actual: 3
            })
        ));

        let mut arena = NodeArena::with_leaves(3).unwrap();
        let root = arena.try_allocate(9.0).unwrap();
        for leaf in 0..3 {
            arena.attach(root, id(leaf));
        }
        let tree = AlphaTree::from_arena(&grid, arena).unwrap();
        assert_eq!(tree.area(root), 3);
    }

    #[test]
    fn test_node_id_display() {
        assert_eq!(id(42).to_string(), "#42");
        assert_eq!(usize::from(id(7)), 7);
    }
}
