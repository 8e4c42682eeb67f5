//! Edge enumeration over the pixel grid
//!
//! Every pixel emits forward edges only (right, down and, under
//! eight-connectivity, down-left and down-right), so each adjacent pair is
//! visited exactly once. Out-of-grid neighbours are skipped.

use super::{Edge, EdgeQueue};
use crate::grid::{Connectivity, PixelGrid};
use crate::metric::EdgeWeight;
use crate::EdgeMode;

/// What happens to an edge once it has been weighed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeDisposition {
    /// Merge immediately at the given effective alpha.
    Merge(f64),
    /// Push onto the edge queue.
    Queue,
    /// Drop (above `lambda_min` with `exclude_top`).
    Discard,
}

/// Counters reported after enumeration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnumerationStats {
    /// In-bounds edges weighed
    pub generated: usize,
    /// Edges pushed onto the queue
    pub queued: usize,
    /// Edges merged without queueing
    pub merged: usize,
    /// Edges dropped by `exclude_top`
    pub discarded: usize,
}

/// Walks the grid and weighs every adjacent pixel pair.
#[derive(Debug)]
pub struct EdgeEnumerator<'a, W: EdgeWeight + ?Sized> {
    grid: PixelGrid<'a>,
    connectivity: Connectivity,
    weight: &'a W,
    mode: EdgeMode,
}

impl<'a, W: EdgeWeight + ?Sized> EdgeEnumerator<'a, W> {
    /// Create an enumerator.
    pub fn new(
        grid: PixelGrid<'a>,
        connectivity: Connectivity,
        weight: &'a W,
        mode: EdgeMode,
    ) -> Self {
        Self {
            grid,
            connectivity,
            weight,
            mode,
        }
    }

    /// Route an edge of weight `alpha` according to the edge mode.
    #[inline]
    pub fn classify(&self, alpha: f64) -> EdgeDisposition {
        match self.mode {
            EdgeMode::Full => EdgeDisposition::Queue,
            EdgeMode::PreMerge {
                lambda_min,
                exclude_top,
            } => {
                if alpha <= lambda_min {
                    EdgeDisposition::Merge(lambda_min)
                } else if exclude_top {
                    EdgeDisposition::Discard
                } else {
                    EdgeDisposition::Queue
                }
            }
        }
    }

    /// Append the forward edges of row `y` to `out`.
    pub fn row_edges(&self, y: usize, out: &mut Vec<Edge>) {
        let offsets = self.connectivity.forward_offsets();
        let row_start = y * self.grid.width();
        for p in row_start..row_start + self.grid.width() {
            for &(dx, dy) in offsets {
                if let Some(q) = self.grid.neighbor(p, dx, dy) {
                    out.push(Edge::new(p, q, self.weight.weight(&self.grid, p, q)));
                }
            }
        }
    }

    /// Visit every in-bounds edge in raster order.
    #[cfg(not(feature = "parallel"))]
    pub fn for_each_edge(&self, mut visit: impl FnMut(Edge)) {
        let mut row = Vec::with_capacity(self.grid.width() * self.connectivity.edges_per_pixel());
        for y in 0..self.grid.height() {
            row.clear();
            self.row_edges(y, &mut row);
            row.iter().copied().for_each(&mut visit);
        }
    }

    /// Visit every in-bounds edge in raster order.
    ///
    /// Rows are weighed in parallel and replayed in order, so the visit
    /// sequence matches the serial build exactly.
    #[cfg(feature = "parallel")]
    pub fn for_each_edge(&self, mut visit: impl FnMut(Edge)) {
        use rayon::prelude::*;

        let per_row = self.grid.width() * self.connectivity.edges_per_pixel();
        let rows: Vec<Vec<Edge>> = (0..self.grid.height())
            .into_par_iter()
            .map(|y| {
                let mut row = Vec::with_capacity(per_row);
                self.row_edges(y, &mut row);
                row
            })
            .collect();
        rows.into_iter().flatten().for_each(&mut visit);
    }

    /// Weigh all edges, pushing queued ones onto `queue` and handing
    /// pre-merged ones (with their effective alpha) to `merge`.
    pub fn run(&self, queue: &mut EdgeQueue, mut merge: impl FnMut(Edge)) -> EnumerationStats {
        let mut stats = EnumerationStats::default();
        self.for_each_edge(|edge| {
            stats.generated += 1;
            match self.classify(edge.alpha) {
                EdgeDisposition::Merge(level) => {
                    stats.merged += 1;
                    merge(Edge::new(edge.p, edge.q, level));
                }
                EdgeDisposition::Queue => {
                    stats.queued += 1;
                    queue.push(edge.p, edge.q, edge.alpha);
                }
                EdgeDisposition::Discard => stats.discarded += 1,
            }
        });
        stats
    }
}
