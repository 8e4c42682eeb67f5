//! Threshold filtering of a built tree
//!
//! For every pixel the engine finds the lowest ancestor (inclusive) that the
//! selector accepts at λ and paints the pixel with that region's colour. When
//! no ancestor qualifies the pixel falls back to its root.
//!
//! Resolved ancestors are memoized per node. Since selectors are monotone in
//! λ, a memo entry stays a valid starting point for any later query with a
//! larger or equal λ: everything below it is known to be rejected. A smaller
//! λ invalidates the memo and starts over.

pub mod colorize;
pub mod select;

pub use colorize::{Colorizer, DepthShade, MeanColor, RegionPalette};
pub use select::{AlphaSelector, AreaSelector, FilterMode, SalienceSelector, Selector};

use bitvec::prelude::*;
use tracing::{debug, warn};

use crate::tree::{AlphaTree, NodeId};
use crate::TreeError;

/// Memo of resolved ancestors, reusable across engines over the same tree.
///
/// The cache remembers the selector that filled it; handing it to an engine
/// with a different selector clears it.
#[derive(Debug, Clone)]
pub struct FilterCache<S> {
    resolved: Vec<Option<NodeId>>,
    last_lambda: Option<f64>,
    trail: Vec<NodeId>,
    selector: Option<S>,
}

impl<S> FilterCache<S> {
    /// Empty cache for a tree of `len` nodes.
    pub fn new(len: usize) -> Self {
        Self {
            resolved: vec![None; len],
            last_lambda: None,
            trail: Vec::new(),
            selector: None,
        }
    }

    /// Forget every memoized answer.
    pub fn reset(&mut self) {
        self.resolved.fill(None);
        self.last_lambda = None;
    }

    /// Threshold of the previous query, if any
    pub fn last_lambda(&self) -> Option<f64> {
        self.last_lambda
    }

    /// Selector the memo was filled with, once returned by
    /// [`FilterEngine::into_cache`].
    pub fn selector(&self) -> Option<&S> {
        self.selector.as_ref()
    }

    /// Memoized ancestor of `node`, if one has been resolved.
    pub fn resolved(&self, node: NodeId) -> Option<NodeId> {
        self.resolved.get(node.index()).copied().flatten()
    }

    fn fit(&mut self, len: usize) {
        if self.resolved.len() != len {
            self.resolved = vec![None; len];
            self.last_lambda = None;
        }
    }
}

/// Runs threshold queries against one tree.
#[derive(Debug)]
pub struct FilterEngine<'t, S: Selector, C: Colorizer> {
    tree: &'t AlphaTree,
    selector: S,
    colorizer: C,
    cache: FilterCache<S>,
}

impl<'t, S: Selector + PartialEq, C: Colorizer> FilterEngine<'t, S, C> {
    /// Engine with an empty cache.
    pub fn new(tree: &'t AlphaTree, selector: S, colorizer: C) -> Self {
        Self::with_cache(tree, selector, colorizer, FilterCache::new(tree.len()))
    }

    /// Engine resuming from a cache built by an earlier engine over the same
    /// tree. A cache sized for another tree, or filled with a different
    /// selector, is cleared.
    pub fn with_cache(
        tree: &'t AlphaTree,
        selector: S,
        colorizer: C,
        mut cache: FilterCache<S>,
    ) -> Self {
        cache.fit(tree.len());
        if let Some(previous) = cache.selector.take() {
            if previous != selector {
                warn!(?previous, current = ?selector, "filter selector changed, resetting cache");
                cache.reset();
            }
        }
        Self {
            tree,
            selector,
            colorizer,
            cache,
        }
    }

    /// Give the cache back for later reuse, tagged with this engine's selector.
    pub fn into_cache(self) -> FilterCache<S> {
        let mut cache = self.cache;
        cache.selector = Some(self.selector);
        cache
    }

    /// The tree being filtered
    pub fn tree(&self) -> &'t AlphaTree {
        self.tree
    }

    /// Region criterion
    pub fn selector(&self) -> &S {
        &self.selector
    }

    /// Current cache state
    pub fn cache(&self) -> &FilterCache<S> {
        &self.cache
    }

    /// Forget all memoized answers.
    pub fn reset(&mut self) {
        self.cache.reset();
    }

    fn prepare(&mut self, lambda: f64) -> Result<(), TreeError> {
        if lambda.is_nan() {
            return Err(TreeError::InvalidLambda(lambda));
        }
        if let Some(previous) = self.cache.last_lambda {
            if lambda < previous {
                warn!(previous, lambda, "filter threshold decreased, resetting cache");
                self.cache.reset();
            }
        }
        self.cache.last_lambda = Some(lambda);
        Ok(())
    }

    /// Region that `node` belongs to at `lambda`.
    fn resolve_node(&mut self, node: NodeId, lambda: f64) -> NodeId {
        let tree = self.tree;
        let cache = &mut self.cache;
        cache.trail.clear();

        let mut current = node;
        while !self.selector.selects(tree, current, lambda) {
            let next = match cache.resolved[current.index()] {
                Some(memo) if memo != current => Some(memo),
                _ => tree.parent(current),
            };
            let Some(next) = next else { break };
            cache.trail.push(current);
            current = next;
        }

        for &visited in &cache.trail {
            cache.resolved[visited.index()] = Some(current);
        }
        current
    }

    /// Region of every pixel at `lambda`, in raster order.
    pub fn resolve(&mut self, lambda: f64) -> Result<Vec<NodeId>, TreeError> {
        self.prepare(lambda)?;
        let regions = (0..self.tree.num_leaves())
            .map(|leaf| self.resolve_node(NodeId::new(leaf), lambda))
            .collect();
        Ok(regions)
    }

    /// Filtered image at `lambda`, laid out like the input buffer.
    pub fn filter(&mut self, lambda: f64) -> Result<Vec<u8>, TreeError> {
        let regions = self.resolve(lambda)?;
        let tree = self.tree;
        let channels = tree.channels();

        let mut palette = vec![0u8; tree.len() * channels];
        let mut painted = bitvec![0; tree.len()];
        let mut out = vec![0u8; regions.len() * channels];
        for (pixel, region) in out.chunks_exact_mut(channels).zip(&regions) {
            let r = region.index();
            let colour = &mut palette[r * channels..(r + 1) * channels];
            if !painted[r] {
                self.colorizer.paint(tree, *region, colour);
                painted.set(r, true);
            }
            pixel.copy_from_slice(colour);
        }
        debug!(lambda, regions = painted.count_ones(), "filtered image");
        Ok(out)
    }

    /// Number of distinct regions at `lambda`.
    pub fn region_count(&mut self, lambda: f64) -> Result<usize, TreeError> {
        let regions = self.resolve(lambda)?;
        let mut seen = bitvec![0; self.tree.len()];
        for region in regions {
            seen.set(region.index(), true);
        }
        Ok(seen.count_ones())
    }
}
