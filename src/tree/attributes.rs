//! Per-node colour statistics
//!
//! Stored as flat `S × channels` arrays so one node's statistics are a
//! contiguous slice.

use super::arena::NodeArena;
use super::NodeId;
use crate::grid::PixelGrid;
use crate::TreeError;

/// Channel sums, minima and maxima for every node.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorStats {
    channels: usize,
    sum: Vec<f64>,
    min: Vec<u8>,
    max: Vec<u8>,
}

fn reserve_filled<T: Clone>(value: T, len: usize, what: &'static str) -> Result<Vec<T>, TreeError> {
    let mut values = Vec::new();
    values
        .try_reserve_exact(len)
        .map_err(TreeError::allocation(what, len))?;
    values.resize(len, value);
    Ok(values)
}

impl ColorStats {
    /// Aggregate statistics bottom-up in one ascending pass.
    ///
    /// Every parent has a larger index than its children, so a node's totals
    /// are complete by the time it is folded into its parent.
    pub fn aggregate(arena: &NodeArena, grid: &PixelGrid<'_>) -> Result<Self, TreeError> {
        let channels = grid.channels();
        let len = arena.len() * channels;
        let mut sum = reserve_filled(0.0f64, len, "colour sums")?;
        let mut min = reserve_filled(u8::MAX, len, "colour minima")?;
        let mut max = reserve_filled(0u8, len, "colour maxima")?;

        #[cfg(debug_assertions)]
        let mut child_area = vec![0usize; arena.len()];

        for (i, node) in arena.nodes().iter().enumerate() {
            let own = i * channels..(i + 1) * channels;
            if i < arena.num_leaves() {
                for (c, &value) in grid.pixel(i).iter().enumerate() {
                    sum[own.start + c] = value as f64;
                    min[own.start + c] = value;
                    max[own.start + c] = value;
                }
            } else {
                #[cfg(debug_assertions)]
                debug_assert_eq!(child_area[i], node.area, "area of node {i}");
            }

            let Some(parent) = node.parent else { continue };
            #[cfg(debug_assertions)]
            {
                child_area[parent.index()] += node.area;
            }
            let up = parent.index() * channels;
            for c in 0..channels {
                sum[up + c] += sum[own.start + c];
                min[up + c] = min[up + c].min(min[own.start + c]);
                max[up + c] = max[up + c].max(max[own.start + c]);
            }
        }

        Ok(Self {
            channels,
            sum,
            min,
            max,
        })
    }

    /// Channels per node
    pub fn channels(&self) -> usize {
        self.channels
    }

    fn range(&self, node: NodeId) -> std::ops::Range<usize> {
        node.index() * self.channels..(node.index() + 1) * self.channels
    }

    /// Channel sums of `node`
    pub fn sum(&self, node: NodeId) -> &[f64] {
        &self.sum[self.range(node)]
    }

    /// Channel minima of `node`
    pub fn min(&self, node: NodeId) -> &[u8] {
        &self.min[self.range(node)]
    }

    /// Channel maxima of `node`
    pub fn max(&self, node: NodeId) -> &[u8] {
        &self.max[self.range(node)]
    }

    /// Write `round(sum / area)` per channel into `out`, clamped to `u8`.
    pub fn mean_into(&self, node: NodeId, area: usize, out: &mut [u8]) {
        let divisor = area.max(1) as f64;
        for (dst, &total) in out.iter_mut().zip(self.sum(node)) {
            *dst = (total / divisor).round().clamp(0.0, 255.0) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_two_pixels() {
        let data = [0u8, 4, 200, 10, 8, 100];
        let grid = PixelGrid::new(2, 1, 3, &data).unwrap();
        let mut arena = NodeArena::with_leaves(2).unwrap();
        let root = arena.allocate(10.0);
        arena.attach(root, NodeId::new(0));
        arena.attach(root, NodeId::new(1));

        let stats = ColorStats::aggregate(&arena, &grid).unwrap();
        assert_eq!(stats.sum(root), &[10.0, 12.0, 300.0]);
        assert_eq!(stats.min(root), &[0, 4, 100]);
        assert_eq!(stats.max(root), &[10, 8, 200]);
        assert_eq!(stats.sum(NodeId::new(1)), &[10.0, 8.0, 100.0]);

        let mut mean = [0u8; 3];
        stats.mean_into(root, 2, &mut mean);
        assert_eq!(mean, [5, 6, 150]);
    }

    #[test]
    fn test_mean_rounds_to_nearest() {
        let data = [1u8, 2, 2];
        let grid = PixelGrid::new(3, 1, 1, &data).unwrap();
        let mut arena = NodeArena::with_leaves(3).unwrap();
        let root = arena.allocate(1.0);
        for leaf in 0..3 {
            arena.attach(root, NodeId::new(leaf));
        }

        let stats = ColorStats::aggregate(&arena, &grid).unwrap();
        let mut mean = [0u8; 1];
        stats.mean_into(root, 3, &mut mean);
        // 5 / 3 = 1.67
        assert_eq!(mean, [2]);
    }
}
