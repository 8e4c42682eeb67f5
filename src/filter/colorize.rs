//! Region colouring for filtered output

use std::fmt;

use crate::tree::{AlphaTree, NodeId};

/// Produces the output colour of a resolved region.
///
/// Called once per distinct region per query; the result is copied to every
/// pixel of that region.
pub trait Colorizer: fmt::Debug {
    /// Write the colour of `region` into `out` (one byte per channel).
    fn paint(&self, tree: &AlphaTree, region: NodeId, out: &mut [u8]);
}

impl<C: Colorizer + ?Sized> Colorizer for Box<C> {
    fn paint(&self, tree: &AlphaTree, region: NodeId, out: &mut [u8]) {
        (**self).paint(tree, region, out)
    }
}

/// Mean colour of the region's pixels.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanColor;

impl Colorizer for MeanColor {
    #[inline]
    fn paint(&self, tree: &AlphaTree, region: NodeId, out: &mut [u8]) {
        tree.mean_color_into(region, out);
    }
}

/// Pseudo-random colour per region, stable for a given seed.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegionPalette {
    seed: u64,
}

impl RegionPalette {
    /// Palette keyed by `seed`.
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl Colorizer for RegionPalette {
    fn paint(&self, _tree: &AlphaTree, region: NodeId, out: &mut [u8]) {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.seed.to_le_bytes());
        hasher.update(&(region.index() as u64).to_le_bytes());
        let mut reader = hasher.finalize_xof();
        reader.fill(out);
    }
}

/// Grey level `255 / depth`, so the root is white and deep regions dark.
#[derive(Debug, Clone)]
pub struct DepthShade {
    depths: Vec<usize>,
}

impl DepthShade {
    /// Precompute node depths for `tree`.
    pub fn new(tree: &AlphaTree) -> Self {
        Self {
            depths: tree.depths(),
        }
    }
}

impl Colorizer for DepthShade {
    fn paint(&self, _tree: &AlphaTree, region: NodeId, out: &mut [u8]) {
        let depth = self.depths.get(region.index()).copied().unwrap_or(1).max(1);
        out.fill((255 / depth) as u8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::PixelGrid;
    use crate::metric::Manhattan;
    use crate::TreeConfig;

    fn tree() -> AlphaTree {
        let data = [0u8, 0, 9];
        let grid = PixelGrid::new(3, 1, 1, &data).unwrap();
        AlphaTree::build(&grid, &Manhattan, &TreeConfig::default()).unwrap()
    }

    #[test]
    fn test_mean_color() {
        let tree = tree();
        let mut out = [0u8];
        MeanColor.paint(&tree, NodeId::new(4), &mut out);
        assert_eq!(out, [3]);
    }

    #[test]
    fn test_palette_is_seeded_and_stable() {
        let tree = tree();
        let mut a = [0u8; 3];
        let mut b = [0u8; 3];
        let mut c = [0u8; 3];
        RegionPalette::new(7).paint(&tree, NodeId::new(3), &mut a);
        RegionPalette::new(7).paint(&tree, NodeId::new(3), &mut b);
        RegionPalette::new(8).paint(&tree, NodeId::new(3), &mut c);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_depth_shade() {
        let tree = tree();
        let shade = DepthShade::new(&tree);
        let mut out = [0u8; 2];
        shade.paint(&tree, NodeId::new(4), &mut out);
        assert_eq!(out, [255, 255]);
        shade.paint(&tree, NodeId::new(3), &mut out);
        assert_eq!(out, [127, 127]);
        shade.paint(&tree, NodeId::new(0), &mut out);
        assert_eq!(out, [85, 85]);
    }
}
