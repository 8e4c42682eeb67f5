//! Grid-aware edge weights
//!
//! These weights look beyond the two endpoints of an edge, either at the
//! pixels flanking it or at an externally computed per-pixel texture response.

use super::{Dissimilarity, EdgeWeight};
use crate::grid::PixelGrid;
use crate::TreeError;

/// Edge strength that adds the gradient across the edge's flanks.
///
/// For an edge `p → q` with direction `d` and orthogonal step `o`:
///
/// ```text
/// weight = main · D(p, q) + orthogonal · min(D(p - o, p + o), D(q - o, q + o))
/// ```
///
/// Flank coordinates are clamped to the grid, so border edges compare a
/// pixel with itself on the missing side.
#[derive(Debug, Clone)]
pub struct OrthogonalStrength<D> {
    metric: D,
    main_weight: f64,
    orthogonal_weight: f64,
}

impl<D: Dissimilarity> OrthogonalStrength<D> {
    /// Combine `metric` with explicit weights (both finite and `>= 0`).
    pub fn new(metric: D, main_weight: f64, orthogonal_weight: f64) -> Result<Self, TreeError> {
        for w in [main_weight, orthogonal_weight] {
            if !w.is_finite() || w < 0.0 {
                return Err(TreeError::invalid_metric(format!(
                    "edge strength weight {w} must be finite and >= 0"
                )));
            }
        }
        Ok(Self {
            metric,
            main_weight,
            orthogonal_weight,
        })
    }

    /// Unit weights for both terms.
    pub fn unit(metric: D) -> Self {
        Self {
            metric,
            main_weight: 1.0,
            orthogonal_weight: 1.0,
        }
    }

    fn flank(&self, grid: &PixelGrid<'_>, e: usize, ox: isize, oy: isize) -> f64 {
        match (
            grid.clamped_neighbor(e, -ox, -oy),
            grid.clamped_neighbor(e, ox, oy),
        ) {
            (Some(a), Some(b)) => self.metric.alpha(grid.pixel(a), grid.pixel(b)),
            _ => 0.0,
        }
    }
}

impl<D: Dissimilarity> EdgeWeight for OrthogonalStrength<D> {
    fn weight(&self, grid: &PixelGrid<'_>, p: usize, q: usize) -> f64 {
        let main = self.metric.alpha(grid.pixel(p), grid.pixel(q));
        let (Some((px, py)), Some((qx, qy))) = (grid.point_of(p), grid.point_of(q)) else {
            return self.main_weight * main;
        };
        let dx = qx as isize - px as isize;
        let dy = qy as isize - py as isize;
        let (ox, oy) = (-dy, dx);
        let across = self
            .flank(grid, p, ox, oy)
            .min(self.flank(grid, q, ox, oy));
        self.main_weight * main + self.orthogonal_weight * across
    }

    fn check_grid(&self, grid: &PixelGrid<'_>) -> Result<(), TreeError> {
        self.metric.check_channels(grid.channels())
    }
}

/// Adds `omega · |texture[p] - texture[q]|` to an inner edge weight.
///
/// `texture` is one response per pixel in raster order, typically the
/// magnitude of a bank of oriented filters computed outside this crate.
#[derive(Debug, Clone)]
pub struct TextureAdjusted<W> {
    inner: W,
    texture: Vec<f64>,
    omega: f64,
}

impl<W: EdgeWeight> TextureAdjusted<W> {
    /// Wrap `inner`; `omega` and every response must be finite, `omega >= 0`.
    pub fn new(inner: W, texture: Vec<f64>, omega: f64) -> Result<Self, TreeError> {
        if !omega.is_finite() || omega < 0.0 {
            return Err(TreeError::invalid_metric(format!(
                "texture factor {omega} must be finite and >= 0"
            )));
        }
        if texture.iter().any(|t| !t.is_finite()) {
            return Err(TreeError::invalid_metric("texture responses must be finite"));
        }
        Ok(Self {
            inner,
            texture,
            omega,
        })
    }
}

impl<W: EdgeWeight> EdgeWeight for TextureAdjusted<W> {
    #[inline]
    fn weight(&self, grid: &PixelGrid<'_>, p: usize, q: usize) -> f64 {
        self.inner.weight(grid, p, q) + self.omega * (self.texture[p] - self.texture[q]).abs()
    }

    fn check_grid(&self, grid: &PixelGrid<'_>) -> Result<(), TreeError> {
        if self.texture.len() != grid.len() {
            return Err(TreeError::invalid_metric(format!(
                "texture has {} responses for {} pixels",
                self.texture.len(),
                grid.len()
            )));
        }
        self.inner.check_grid(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::{Euclidean, Manhattan};

    // 3x3 grey image:
    //   0  0  0
    //   0 10 20
    //   0  0  0
    const GREY: [u8; 9] = [0, 0, 0, 0, 10, 20, 0, 0, 0];

    #[test]
    fn test_orthogonal_strength_horizontal_edge() {
        let grid = PixelGrid::new(3, 3, 1, &GREY).unwrap();
        let strength = OrthogonalStrength::unit(Manhattan);

        // Edge (1,1) -> (2,1): main = 10, flanks are vertical pairs around
        // both endpoints, all 0 - 0.
        assert_eq!(strength.weight(&grid, 4, 5), 10.0);

        // Edge (1,0) -> (1,1): main = 10, horizontal flanks:
        // around (1,0): |0 - 0| = 0, around (1,1): |0 - 20| = 20 -> min 0.
        assert_eq!(strength.weight(&grid, 1, 4), 10.0);
    }

    #[test]
    fn test_orthogonal_strength_counts_flank_gradient() {
        // Two columns; the left one is a vertical ramp.
        //   0 0
        //  30 0
        //  60 0
        let data = [0u8, 0, 30, 0, 60, 0];
        let grid = PixelGrid::new(2, 3, 1, &data).unwrap();
        let strength = OrthogonalStrength::new(Manhattan, 1.0, 0.5).unwrap();

        // Edge (0,1) -> (1,1): main = 30; flank around (0,1) is |0 - 60| = 60,
        // flank around (1,1) is 0 -> min 0.
        assert_eq!(strength.weight(&grid, 2, 3), 30.0);

        assert!(OrthogonalStrength::new(Manhattan, -1.0, 0.0).is_err());
    }

    #[test]
    fn test_texture_adjusted_adds_response_difference() {
        let data = [0u8, 0, 0, 3, 4, 0];
        let grid = PixelGrid::new(2, 1, 3, &data).unwrap();
        let weight = TextureAdjusted::new(Euclidean, vec![1.0, 3.5], 2.0).unwrap();

        assert!(weight.check_grid(&grid).is_ok());
        assert_eq!(weight.weight(&grid, 0, 1), 5.0 + 2.0 * 2.5);

        let short = TextureAdjusted::new(Euclidean, vec![1.0], 2.0).unwrap();
        assert!(short.check_grid(&grid).is_err());
        assert!(TextureAdjusted::new(Euclidean, vec![1.0, 2.0], f64::NAN).is_err());
    }
}
