//! Weighted pixel edges and the ascending-alpha edge queue

mod enumerate;

pub use enumerate::{EdgeDisposition, EdgeEnumerator, EnumerationStats};

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::TreeError;

/// Edge between two adjacent pixels (leaf indices).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// Earlier pixel in raster order
    pub p: usize,
    /// Later pixel in raster order
    pub q: usize,
    /// Dissimilarity between the two pixels
    pub alpha: f64,
}

impl Edge {
    /// Create an edge.
    pub fn new(p: usize, q: usize, alpha: f64) -> Self {
        Self { p, q, alpha }
    }
}

/// Heap entry ordered so that `BinaryHeap` pops the smallest alpha first.
#[derive(Debug, Clone, Copy)]
struct MinEdge(Edge);

impl PartialEq for MinEdge {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MinEdge {}

impl PartialOrd for MinEdge {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MinEdge {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: smaller alpha is "greater". Ties fall back to pixel order
        // so that identical inputs always pop in the same sequence.
        other
            .0
            .alpha
            .total_cmp(&self.0.alpha)
            .then_with(|| other.0.p.cmp(&self.0.p))
            .then_with(|| other.0.q.cmp(&self.0.q))
    }
}

/// Min-priority queue of edges keyed by alpha, reserved up front.
#[derive(Debug)]
pub struct EdgeQueue {
    heap: BinaryHeap<MinEdge>,
}

impl EdgeQueue {
    /// Create a queue with room for `capacity` edges.
    pub fn with_capacity(capacity: usize) -> Result<Self, TreeError> {
        let mut storage: Vec<MinEdge> = Vec::new();
        storage
            .try_reserve_exact(capacity)
            .map_err(TreeError::allocation("edge queue", capacity))?;
        Ok(Self {
            heap: BinaryHeap::from(storage),
        })
    }

    /// Enqueue edge `(p, q)` at level `alpha`.
    #[inline]
    pub fn push(&mut self, p: usize, q: usize, alpha: f64) {
        debug_assert!(
            self.heap.len() < self.heap.capacity(),
            "edge queue grew past its reservation"
        );
        self.heap.push(MinEdge(Edge::new(p, q, alpha)));
    }

    /// Remove and return the edge with the smallest alpha.
    #[inline]
    pub fn pop_min(&mut self) -> Option<Edge> {
        self.heap.pop().map(|entry| entry.0)
    }

    /// Smallest alpha currently queued.
    pub fn peek_alpha(&self) -> Option<f64> {
        self.heap.peek().map(|entry| entry.0.alpha)
    }

    /// Whether no edges are queued
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Number of queued edges
    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Reserved capacity
    pub fn capacity(&self) -> usize {
        self.heap.capacity()
    }
}
