//! Dissimilarity metrics and edge weights
//!
//! A [`Dissimilarity`] compares two pixels; an [`EdgeWeight`] weighs an edge
//! between two adjacent grid positions and is what the edge enumerator
//! consumes. Every pixel metric in this module is also an edge weight;
//! grid-aware variants (see [`strength`]) look at the pixels around the edge.

mod distance;
pub mod strength;

pub use distance::{Cosine, Euclidean, Manhattan, Minkowski, WeightedEuclidean};
pub use strength::{OrthogonalStrength, TextureAdjusted};

use std::fmt;

use crate::grid::PixelGrid;
use crate::TreeError;

/// Pure, symmetric, non-negative distance between two pixels.
pub trait Dissimilarity: fmt::Debug + Send + Sync {
    /// Distance between `a` and `b` (both `channels` long).
    fn alpha(&self, a: &[u8], b: &[u8]) -> f64;

    /// Largest value `alpha` can return for 8-bit pixels of `channels` channels.
    fn upper_bound(&self, channels: usize) -> f64;

    /// Reject parameters that do not fit `channels`.
    fn check_channels(&self, _channels: usize) -> Result<(), TreeError> {
        Ok(())
    }
}

/// Weight of the edge between adjacent pixels `p` and `q`.
pub trait EdgeWeight: fmt::Debug + Send + Sync {
    /// Alpha of edge `(p, q)`; `p` precedes `q` in raster order.
    fn weight(&self, grid: &PixelGrid<'_>, p: usize, q: usize) -> f64;

    /// Reject parameters that do not fit `grid`.
    fn check_grid(&self, _grid: &PixelGrid<'_>) -> Result<(), TreeError> {
        Ok(())
    }
}

macro_rules! pairwise_edge_weight {
    ($($ty:ty),* $(,)?) => {
        $(
            impl EdgeWeight for $ty {
                #[inline]
                fn weight(&self, grid: &PixelGrid<'_>, p: usize, q: usize) -> f64 {
                    self.alpha(grid.pixel(p), grid.pixel(q))
                }

                fn check_grid(&self, grid: &PixelGrid<'_>) -> Result<(), TreeError> {
                    self.check_channels(grid.channels())
                }
            }
        )*
    };
}

pairwise_edge_weight!(
    Euclidean,
    WeightedEuclidean,
    Manhattan,
    Cosine,
    Minkowski,
    Box<dyn Dissimilarity>,
);

impl<D: Dissimilarity> EdgeWeight for Normalized<D> {
    #[inline]
    fn weight(&self, grid: &PixelGrid<'_>, p: usize, q: usize) -> f64 {
        self.alpha(grid.pixel(p), grid.pixel(q))
    }

    fn check_grid(&self, grid: &PixelGrid<'_>) -> Result<(), TreeError> {
        self.check_channels(grid.channels())
    }
}

impl Dissimilarity for Box<dyn Dissimilarity> {
    fn alpha(&self, a: &[u8], b: &[u8]) -> f64 {
        (**self).alpha(a, b)
    }

    fn upper_bound(&self, channels: usize) -> f64 {
        (**self).upper_bound(channels)
    }

    fn check_channels(&self, channels: usize) -> Result<(), TreeError> {
        (**self).check_channels(channels)
    }
}

impl EdgeWeight for Box<dyn EdgeWeight> {
    fn weight(&self, grid: &PixelGrid<'_>, p: usize, q: usize) -> f64 {
        (**self).weight(grid, p, q)
    }

    fn check_grid(&self, grid: &PixelGrid<'_>) -> Result<(), TreeError> {
        (**self).check_grid(grid)
    }
}

/// Linearly maps a metric from `[0, upper_bound]` onto `[lower, upper]`.
#[derive(Debug, Clone)]
pub struct Normalized<D> {
    inner: D,
    lower: f64,
    upper: f64,
}

impl<D: Dissimilarity> Normalized<D> {
    /// Map `inner` onto `[lower, upper]`; requires `0 <= lower <= upper`.
    pub fn new(inner: D, lower: f64, upper: f64) -> Result<Self, TreeError> {
        if !(lower.is_finite() && upper.is_finite()) || lower < 0.0 || upper < lower {
            return Err(TreeError::invalid_metric(format!(
                "normalisation range [{lower}, {upper}] must be finite, non-negative and ordered"
            )));
        }
        Ok(Self {
            inner,
            lower,
            upper,
        })
    }
}

impl<D: Dissimilarity> Dissimilarity for Normalized<D> {
    fn alpha(&self, a: &[u8], b: &[u8]) -> f64 {
        let bound = self.inner.upper_bound(a.len());
        if bound <= 0.0 {
            return self.lower;
        }
        self.lower + (self.upper - self.lower) / bound * self.inner.alpha(a, b)
    }

    fn upper_bound(&self, _channels: usize) -> f64 {
        self.upper
    }

    fn check_channels(&self, channels: usize) -> Result<(), TreeError> {
        self.inner.check_channels(channels)
    }
}

/// Runtime-selectable pixel metric (used by the CLI and bindings).
#[derive(Debug, Clone, PartialEq)]
pub enum MetricKind {
    /// [`Euclidean`]
    Euclidean,
    /// [`WeightedEuclidean`] with per-channel weights
    Weighted(Vec<f64>),
    /// [`Manhattan`]
    Manhattan,
    /// [`Cosine`]
    Cosine,
    /// [`Minkowski`] of order `p` (`f64::INFINITY` for Chebyshev)
    Minkowski(f64),
}

impl MetricKind {
    /// Build the boxed metric.
    pub fn into_metric(self) -> Result<Box<dyn Dissimilarity>, TreeError> {
        Ok(match self {
            MetricKind::Euclidean => Box::new(Euclidean),
            MetricKind::Weighted(weights) => Box::new(WeightedEuclidean::new(weights)?),
            MetricKind::Manhattan => Box::new(Manhattan),
            MetricKind::Cosine => Box::new(Cosine),
            MetricKind::Minkowski(p) => Box::new(Minkowski::new(p)?),
        })
    }

    /// Parse a metric name (`euclidean`, `manhattan`, `cosine`, `chebyshev`,
    /// `minkowski` with `p`, `weighted` with `weights`).
    pub fn from_name(
        name: &str,
        p: Option<f64>,
        weights: Option<Vec<f64>>,
    ) -> Result<Self, TreeError> {
        match name.to_ascii_lowercase().as_str() {
            "euclidean" => Ok(MetricKind::Euclidean),
            "manhattan" => Ok(MetricKind::Manhattan),
            "cosine" => Ok(MetricKind::Cosine),
            "chebyshev" => Ok(MetricKind::Minkowski(f64::INFINITY)),
            "minkowski" => Ok(MetricKind::Minkowski(p.unwrap_or(2.0))),
            "weighted" => weights
                .map(MetricKind::Weighted)
                .ok_or_else(|| TreeError::invalid_metric("weighted metric requires weights")),
            other => Err(TreeError::invalid_metric(format!("unknown metric '{other}'"))),
        }
    }
}
