//! Disjoint sets over node indices, used only while the tree is built
//!
//! Sets are linked child-to-parent exactly as the tree is, so the
//! representative of a pixel is always the current root of its component.

use super::NodeId;
use crate::TreeError;

/// Union-find array; `None` marks a representative.
#[derive(Debug, Clone)]
pub struct UnionFind {
    sets: Vec<Option<NodeId>>,
}

impl UnionFind {
    /// Reserve room for `capacity` sets without creating any.
    pub fn with_capacity(capacity: usize) -> Result<Self, TreeError> {
        let mut sets = Vec::new();
        sets.try_reserve_exact(capacity)
            .map_err(TreeError::allocation("union-find", capacity))?;
        Ok(Self { sets })
    }

    /// Add a singleton set and return its index.
    #[inline]
    pub fn make_set(&mut self) -> NodeId {
        let id = NodeId::new(self.sets.len());
        self.sets.push(None);
        id
    }

    /// Representative of `id`'s set.
    ///
    /// Walks to the representative first, then points every entry on the
    /// walked path directly at it.
    pub fn find(&mut self, id: NodeId) -> NodeId {
        let mut root = id;
        while let Some(next) = self.sets[root.index()] {
            root = next;
        }

        let mut current = id;
        while let Some(next) = self.sets[current.index()] {
            if next != root {
                self.sets[current.index()] = Some(root);
            }
            current = next;
        }
        root
    }

    /// Merge `child`'s set into `parent`'s. Both must be representatives.
    #[inline]
    pub fn link(&mut self, child: NodeId, parent: NodeId) {
        debug_assert!(self.sets[child.index()].is_none());
        self.sets[child.index()] = Some(parent);
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Whether no sets exist
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_and_link() {
        let mut sets = UnionFind::with_capacity(8).unwrap();
        let ids: Vec<NodeId> = (0..4).map(|_| sets.make_set()).collect();
        assert_eq!(sets.len(), 4);
        for &id in &ids {
            assert_eq!(sets.find(id), id);
        }

        let joined = sets.make_set();
        sets.link(ids[0], joined);
        sets.link(ids[1], joined);
        assert_eq!(sets.find(ids[0]), joined);
        assert_eq!(sets.find(ids[1]), joined);
        assert_eq!(sets.find(ids[2]), ids[2]);
    }

    #[test]
    fn test_find_compresses_long_chain() {
        let mut sets = UnionFind::with_capacity(6).unwrap();
        let ids: Vec<NodeId> = (0..6).map(|_| sets.make_set()).collect();
        for pair in ids.windows(2) {
            sets.link(pair[0], pair[1]);
        }

        assert_eq!(sets.find(ids[0]), ids[5]);
        // Every entry on the path now points straight at the root.
        for &id in &ids[..5] {
            assert_eq!(sets.sets[id.index()], Some(ids[5]));
        }
    }
}
