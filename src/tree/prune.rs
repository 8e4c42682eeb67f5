//! Removal of redundant same-alpha nodes
//!
//! Only level roots survive. Survivors are compacted towards the front of
//! the arena in index order, which keeps leaves at `[0, N)` and preserves
//! `parent > node`.

use bitvec::prelude::*;
use tracing::debug;

use super::arena::NodeArena;
use super::NodeId;
use crate::TreeError;

/// Outcome of a pruning pass.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct PruneReport {
    /// Nodes dropped from the arena
    pub removed: usize,
    /// Old index to new index; `None` for removed nodes
    pub remap: Vec<Option<NodeId>>,
}

impl PruneReport {
    /// New id of an old node, if it survived.
    pub fn new_id(&self, old: NodeId) -> Option<NodeId> {
        self.remap.get(old.index()).copied().flatten()
    }
}

/// Drop every node that is not a level root and shrink the arena to fit.
pub fn prune(arena: &mut NodeArena) -> Result<PruneReport, TreeError> {
    let len = arena.len();
    let num_leaves = arena.num_leaves();

    let mut keep = bitvec![0; len];
    keep[..num_leaves].fill(true);

    let mut remap: Vec<Option<NodeId>> = Vec::new();
    remap
        .try_reserve_exact(len)
        .map_err(TreeError::allocation("prune remap", len))?;

    // Survivorship is decided front to back: a node's parent always has a
    // larger index, so it is marked before the loop reaches it.
    let mut kept = 0usize;
    for i in 0..len {
        if !keep[i] {
            remap.push(None);
            continue;
        }
        let id = NodeId::new(i);
        if let Some(parent) = arena[id].parent {
            let level_root = arena.find_level_root(parent);
            arena.nodes_mut()[i].parent = Some(level_root);
            keep.set(level_root.index(), true);
        }
        remap.push(Some(NodeId::new(kept)));
        kept += 1;
    }

    let nodes = arena.nodes_mut();
    for i in keep.iter_ones() {
        let Some(target) = remap[i] else { continue };
        let mut node = nodes[i];
        debug_assert!(node.parent.map_or(true, |p| remap[p.index()].is_some()));
        node.parent = node.parent.and_then(|p| remap[p.index()]);
        nodes[target.index()] = node;
    }
    nodes.truncate(kept);
    nodes.shrink_to_fit();

    let removed = len - kept;
    debug!(removed, remaining = kept, "pruned same-alpha nodes");
    Ok(PruneReport { removed, remap })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LEAF_ALPHA;

    fn id(index: usize) -> NodeId {
        NodeId::new(index)
    }

    /// Leaves 0, 1, 2; n3 and n4 at alpha 1 (n3 under n4), root n5 at 2.
    fn chained_arena() -> NodeArena {
        let mut arena = NodeArena::with_leaves(3).unwrap();
        let n3 = arena.allocate(1.0);
        let n4 = arena.allocate(1.0);
        let n5 = arena.allocate(2.0);
        arena.attach(n3, id(0));
        arena.attach(n3, id(1));
        arena.attach(n4, n3);
        arena.attach(n5, n4);
        arena.attach(n5, id(2));
        arena
    }

    #[test]
    fn test_prune_removes_same_alpha_chain() {
        let mut arena = chained_arena();
        let report = prune(&mut arena).unwrap();

        assert_eq!(report.removed, 1);
        assert_eq!(
            report.remap,
            vec![Some(id(0)), Some(id(1)), Some(id(2)), None, Some(id(3)), Some(id(4))]
        );
        assert_eq!(arena.len(), 5);
        assert_eq!(arena.capacity(), 5);

        let nodes = arena.nodes();
        assert_eq!(nodes[0].parent, Some(id(3)));
        assert_eq!(nodes[1].parent, Some(id(3)));
        assert_eq!(nodes[2].parent, Some(id(4)));
        assert_eq!(nodes[3].parent, Some(id(4)));
        assert_eq!(nodes[3].alpha, 1.0);
        assert_eq!(nodes[3].area, 2);
        assert_eq!(nodes[4].parent, None);
        assert_eq!(nodes[4].area, 3);
        assert!(nodes[..3].iter().all(|n| n.alpha == LEAF_ALPHA));
    }

    #[test]
    fn test_prune_is_noop_on_clean_tree() {
        let mut arena = chained_arena();
        prune(&mut arena).unwrap();
        let before = arena.nodes().to_vec();

        let report = prune(&mut arena).unwrap();
        assert_eq!(report.removed, 0);
        assert_eq!(arena.nodes(), &before[..]);
        assert_eq!(report.new_id(id(4)), Some(id(4)));
    }

    #[test]
    fn test_prune_empty_arena() {
        let mut arena = NodeArena::with_leaves(0).unwrap();
        let report = prune(&mut arena).unwrap();
        assert_eq!(report.removed, 0);
        assert!(report.remap.is_empty());
    }
}
