//! # Alpha-tree construction and threshold filtering
//!
//! This library builds the alpha-tree (a.k.a. salience tree) of an image: a
//! component tree whose leaves are pixels and whose internal nodes are flat
//! zones merged in increasing order of inter-pixel dissimilarity.
//!
//! ## Core Algorithm
//!
//! 1. **Edge enumeration**: weigh every 4- or 8-adjacent pixel pair with a metric
//! 2. **Kruskal-style merging**: pop edges in ascending alpha, union flat zones
//! 3. **Pruning**: drop redundant same-alpha nodes, compact the arena to `S` nodes
//! 4. **Aggregation**: area and per-channel colour statistics, bottom-up
//! 5. **Filtering**: collapse the tree at a threshold λ with a memoized ascent
//!
//! ## Usage Example
//!
//! ```
//! use alphatree::{AlphaTree, PixelGrid, TreeConfig};
//! use alphatree::metric::Euclidean;
//! use alphatree::filter::{AreaSelector, FilterEngine, MeanColor};
//!
//! let pixels = [0u8, 0, 0, 10, 0, 0];
//! let grid = PixelGrid::new(2, 1, 3, &pixels)?;
//! let tree = AlphaTree::build(&grid, &Euclidean, &TreeConfig::default())?;
//! assert_eq!(tree.len(), 3);
//!
//! let mut engine = FilterEngine::new(&tree, AreaSelector, MeanColor);
//! assert_eq!(engine.filter(2.0)?, vec![5, 0, 0, 5, 0, 0]);
//! # Ok::<(), alphatree::TreeError>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]
#![allow(clippy::new_without_default)]

// Core modules - each implements one stage of the pipeline
pub mod grid;       // Pixel buffers and checked neighbour lookup
pub mod metric;     // Dissimilarity metrics and edge weights
pub mod edges;      // Edge enumeration and the min-alpha queue
pub mod tree;       // Node arena, construction, pruning, attributes
pub mod filter;     // Threshold-collapse queries
/// Python bindings for exposing the tree to external runtimes.
#[cfg(feature = "python-bindings")]
pub mod python_bindings;

// Re-exports for convenience
pub use grid::{Connectivity, PixelGrid};
pub use metric::{Dissimilarity, EdgeWeight};
pub use tree::{AlphaTree, Node, NodeId, TreeSummary, LEAF_ALPHA};

use std::collections::TryReserveError;
use thiserror::Error;

/// How edges are routed between immediate merging and the edge queue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeMode {
    /// Every in-bounds edge is queued; the effective `lambda_min` is 0.
    Full,

    /// Edges with `alpha <= lambda_min` are merged immediately at `lambda_min`.
    PreMerge {
        /// Level below which edges are resolved without queueing.
        lambda_min: f64,
        /// Discard edges above `lambda_min` (builds a zone-restricted forest).
        exclude_top: bool,
    },
}

impl EdgeMode {
    /// Effective minimum alpha of internal nodes.
    pub fn lambda_min(&self) -> f64 {
        match *self {
            EdgeMode::Full => 0.0,
            EdgeMode::PreMerge { lambda_min, .. } => lambda_min,
        }
    }

    /// Whether edges above `lambda_min` are dropped.
    pub fn exclude_top(&self) -> bool {
        matches!(self, EdgeMode::PreMerge { exclude_top: true, .. })
    }
}

/// Construction parameters for an alpha-tree.
#[derive(Debug, Clone)]
pub struct TreeConfig {
    /// Pixel adjacency model
    pub connectivity: Connectivity,

    /// Edge routing (full queue or pre-merge below `lambda_min`)
    pub edge_mode: EdgeMode,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            connectivity: Connectivity::Four,
            edge_mode: EdgeMode::Full,
        }
    }
}

impl TreeConfig {
    /// Create a full-mode configuration from a neighbour count (4 or 8).
    pub fn new(connectivity: u8) -> Result<Self, TreeError> {
        Ok(Self {
            connectivity: Connectivity::try_from(connectivity)?,
            edge_mode: EdgeMode::Full,
        })
    }

    /// Switch to pre-merge mode with the given `lambda_min`.
    ///
    /// `lambda_min` must be finite and non-negative so that internal nodes
    /// always sit strictly above [`LEAF_ALPHA`].
    pub fn with_lambda_min(mut self, lambda_min: f64) -> Result<Self, TreeError> {
        if !lambda_min.is_finite() || lambda_min < 0.0 {
            return Err(TreeError::InvalidLambdaMin(lambda_min));
        }
        let exclude_top = self.edge_mode.exclude_top();
        self.edge_mode = EdgeMode::PreMerge {
            lambda_min,
            exclude_top,
        };
        Ok(self)
    }

    /// Drop edges above `lambda_min` (switches to pre-merge mode if needed).
    pub fn with_exclude_top(mut self, exclude_top: bool) -> Self {
        let lambda_min = self.edge_mode.lambda_min();
        self.edge_mode = EdgeMode::PreMerge {
            lambda_min,
            exclude_top,
        };
        self
    }

    /// Replace the edge mode wholesale; checked by [`TreeConfig::validate`].
    pub fn with_edge_mode(mut self, edge_mode: EdgeMode) -> Self {
        self.edge_mode = edge_mode;
        self
    }

    /// Set the connectivity.
    pub fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    /// Validate an explicitly assembled configuration.
    pub fn validate(&self) -> Result<(), TreeError> {
        let lambda_min = self.edge_mode.lambda_min();
        if !lambda_min.is_finite() || lambda_min < 0.0 {
            return Err(TreeError::InvalidLambdaMin(lambda_min));
        }
        Ok(())
    }

    /// Edge-queue capacity for `num_pixels` leaves: `(connectivity / 2) * N`.
    pub fn queue_capacity(&self, num_pixels: usize) -> usize {
        self.connectivity.edges_per_pixel() * num_pixels
    }
}

/// Errors that can occur while building or querying a tree
#[derive(Error, Debug)]
pub enum TreeError {
    /// Connectivity other than 4 or 8
    #[error("invalid connectivity {0}: expected 4 or 8")]
    InvalidConnectivity(u8),

    /// Pixel grid declared with zero channels
    #[error("pixel grid must have at least one channel")]
    ZeroChannels,

    /// Pixel buffer length does not match `width * height * channels`
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    BufferSizeMismatch {
        /// Bytes required by the declared dimensions
        expected: usize,
        /// Bytes actually supplied
        actual: usize,
    },

    /// Image has more pixels than `u32` node indices can address
    #[error("image of {pixels} pixels exceeds the node index range")]
    ImageTooLarge {
        /// Number of pixels requested
        pixels: usize,
    },

    /// Width, height and channel count overflow `usize` when multiplied
    #[error("image dimensions {width}x{height}x{channels} overflow the address space")]
    DimensionOverflow {
        /// Declared width
        width: usize,
        /// Declared height
        height: usize,
        /// Declared channel count
        channels: usize,
    },

    /// Arena already holds its `2N` node slots
    #[error("node arena is full at {capacity} nodes")]
    ArenaFull {
        /// Reserved node slots
        capacity: usize,
    },

    /// `lambda_min` must be finite and non-negative
    #[error("invalid lambda_min {0}: must be finite and >= 0")]
    InvalidLambdaMin(f64),

    /// Filter threshold was NaN
    #[error("invalid filter threshold {0}")]
    InvalidLambda(f64),

    /// Metric parameters do not fit the grid
    #[error("invalid metric configuration: {0}")]
    InvalidMetric(String),

    /// Arena, union-find or queue reservation failed
    #[error("failed to reserve {requested} entries for {what}: {source}")]
    Allocation {
        /// Structure being allocated
        what: &'static str,
        /// Number of entries requested
        requested: usize,
        /// Underlying reservation error
        #[source]
        source: TryReserveError,
    },
}

impl TreeError {
    /// Helper for metric configuration errors.
    pub fn invalid_metric(msg: impl Into<String>) -> Self {
        TreeError::InvalidMetric(msg.into())
    }

    pub(crate) fn allocation(
        what: &'static str,
        requested: usize,
    ) -> impl FnOnce(TryReserveError) -> Self {
        move |source| TreeError::Allocation {
            what,
            requested,
            source,
        }
    }
}
