//! Kruskal-style alpha-tree construction
//!
//! Edges are consumed in ascending alpha. Each edge joining two different
//! components either creates a new node at the edge's alpha (the components'
//! roots become its children) or, if the higher-indexed root already sits at
//! that alpha, absorbs the other root into it.

use tracing::{debug, info};

use super::arena::NodeArena;
use super::attributes::ColorStats;
use super::prune::{prune, PruneReport};
use super::union_find::UnionFind;
use super::{AlphaTree, NodeId};
use crate::edges::{Edge, EdgeEnumerator, EdgeQueue};
use crate::grid::PixelGrid;
use crate::metric::EdgeWeight;
use crate::{TreeConfig, TreeError};

/// Builds alpha-trees for one grid and configuration.
#[derive(Debug, Clone, Copy)]
pub struct TreeBuilder<'a> {
    grid: PixelGrid<'a>,
    config: &'a TreeConfig,
}

/// Arena and union-find evolving together during construction.
struct Construction {
    arena: NodeArena,
    sets: UnionFind,
    created: usize,
}

impl Construction {
    fn new(num_leaves: usize) -> Result<Self, TreeError> {
        let arena = NodeArena::with_leaves(num_leaves)?;
        let mut sets = UnionFind::with_capacity(arena.capacity())?;
        for _ in 0..num_leaves {
            sets.make_set();
        }
        Ok(Self {
            arena,
            sets,
            created: 0,
        })
    }

    fn allocate(&mut self, alpha: f64) -> NodeId {
        let id = self.arena.allocate(alpha);
        let set = self.sets.make_set();
        debug_assert_eq!(id, set);
        self.created += 1;
        id
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.arena.attach(parent, child);
        self.sets.link(child, parent);
    }

    fn process_edge(&mut self, edge: Edge) {
        let mut root1 = self.sets.find(NodeId::new(edge.p));
        let mut root2 = self.sets.find(NodeId::new(edge.q));
        if root1 == root2 {
            return;
        }
        if root1 < root2 {
            std::mem::swap(&mut root1, &mut root2);
        }

        if self.arena[root1].alpha < edge.alpha {
            let parent = self.allocate(edge.alpha);
            self.attach(parent, root1);
            self.attach(parent, root2);
        } else {
            self.attach(root1, root2);
        }
    }
}

impl<'a> TreeBuilder<'a> {
    /// Create a builder.
    pub fn new(grid: PixelGrid<'a>, config: &'a TreeConfig) -> Self {
        Self { grid, config }
    }

    /// Run construction only, returning the unpruned arena.
    ///
    /// Same-alpha chains are left in place; every node still satisfies
    /// `parent > node` and area additivity.
    pub fn construct<W: EdgeWeight + ?Sized>(&self, weight: &W) -> Result<NodeArena, TreeError> {
        self.config.validate()?;
        weight.check_grid(&self.grid)?;

        let num_pixels = self.grid.len();
        info!(
            width = self.grid.width(),
            height = self.grid.height(),
            channels = self.grid.channels(),
            pixels = num_pixels,
            "building alpha-tree"
        );

        let mut state = Construction::new(num_pixels)?;
        debug!(leaves = num_pixels, "created leaf nodes");

        let mut queue = EdgeQueue::with_capacity(self.config.queue_capacity(num_pixels))?;
        let enumerator =
            EdgeEnumerator::new(self.grid, self.config.connectivity, weight, self.config.edge_mode);
        let stats = enumerator.run(&mut queue, |edge| state.process_edge(edge));
        debug!(
            generated = stats.generated,
            queued = stats.queued,
            premerged = stats.merged,
            discarded = stats.discarded,
            "enumerated edges"
        );

        while let Some(edge) = queue.pop_min() {
            state.process_edge(edge);
        }
        debug!(created = state.created, nodes = state.arena.len(), "processed edge queue");

        Ok(state.arena)
    }

    /// Construct, prune and aggregate, also returning the pruning remap.
    pub fn build_with_report<W: EdgeWeight + ?Sized>(
        &self,
        weight: &W,
    ) -> Result<(AlphaTree, PruneReport), TreeError> {
        let mut arena = self.construct(weight)?;
        let report = prune(&mut arena)?;
        let stats = ColorStats::aggregate(&arena, &self.grid)?;
        let tree = AlphaTree::from_parts(&self.grid, arena, stats);
        info!(
            nodes = tree.len(),
            pruned = report.removed,
            "alpha-tree built"
        );
        Ok((tree, report))
    }

    /// Construct, prune and aggregate.
    pub fn build<W: EdgeWeight + ?Sized>(&self, weight: &W) -> Result<AlphaTree, TreeError> {
        self.build_with_report(weight).map(|(tree, _)| tree)
    }
}
