#![allow(dead_code)]

use alphatree::metric::Euclidean;
use alphatree::{AlphaTree, NodeId, PixelGrid, TreeConfig};

/// Deterministic pseudo-random bytes (xorshift), `len` long.
pub fn noise(len: usize, seed: u32) -> Vec<u8> {
    let mut state = seed.max(1);
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect()
}

/// `width × height` RGB image split into a dark left half and a bright right half.
pub fn two_halves(width: usize, height: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height * 3);
    for _ in 0..height {
        for x in 0..width {
            let value = if x < width / 2 { 20 } else { 220 };
            data.extend_from_slice(&[value, value, value]);
        }
    }
    data
}

/// Build with the Euclidean metric.
pub fn build(width: usize, height: usize, channels: usize, data: &[u8], config: &TreeConfig) -> AlphaTree {
    let grid = PixelGrid::new(width, height, channels, data).expect("grid matches buffer");
    AlphaTree::build(&grid, &Euclidean, config).expect("tree builds")
}

/// Check the structural invariants every pruned tree satisfies, returning a
/// description of the first violation.
pub fn check_structure(tree: &AlphaTree) -> Result<(), String> {
    let n = tree.num_leaves();
    let s = tree.len();
    if n > 0 && s > 2 * n - 1 {
        return Err(format!("{s} nodes for {n} leaves"));
    }

    let mut child_area = vec![0usize; s];
    for (i, node) in tree.nodes().iter().enumerate() {
        if i < n && node.area != 1 {
            return Err(format!("leaf {i} has area {}", node.area));
        }
        if let Some(parent) = node.parent {
            if parent.index() <= i {
                return Err(format!("node {i} has parent {parent} below it"));
            }
            if tree.alpha(parent) <= node.alpha {
                return Err(format!(
                    "node {i} alpha {} not below parent alpha {}",
                    node.alpha,
                    tree.alpha(parent)
                ));
            }
            child_area[parent.index()] += node.area;
        }
    }
    for i in n..s {
        let id = NodeId::new(i);
        if child_area[i] != tree.area(id) {
            return Err(format!("node {i} area {} != children {}", tree.area(id), child_area[i]));
        }
    }
    Ok(())
}
