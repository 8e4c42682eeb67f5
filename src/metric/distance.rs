//! Pixel-to-pixel distances
//!
//! All metrics treat pixels as vectors of `f64` channel values in `[0, 255]`.

use super::Dissimilarity;
use crate::TreeError;

const CHANNEL_MAX: f64 = 255.0;

/// `sqrt(Σ (a - b)²)`
#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean;

impl Dissimilarity for Euclidean {
    #[inline]
    fn alpha(&self, a: &[u8], b: &[u8]) -> f64 {
        a.iter()
            .zip(b)
            .map(|(&x, &y)| {
                let d = x as f64 - y as f64;
                d * d
            })
            .sum::<f64>()
            .sqrt()
    }

    fn upper_bound(&self, channels: usize) -> f64 {
        (channels as f64).sqrt() * CHANNEL_MAX
    }
}

/// `sqrt(Σ wᵢ (aᵢ - bᵢ)²)` with one non-negative weight per channel.
#[derive(Debug, Clone)]
pub struct WeightedEuclidean {
    weights: Vec<f64>,
}

impl WeightedEuclidean {
    /// Create from per-channel weights (finite, `>= 0`).
    pub fn new(weights: Vec<f64>) -> Result<Self, TreeError> {
        if weights.is_empty() {
            return Err(TreeError::invalid_metric("weights must be non-empty"));
        }
        if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(TreeError::invalid_metric(format!(
                "weight {bad} must be finite and >= 0"
            )));
        }
        Ok(Self { weights })
    }

    /// Per-channel weights
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

impl Dissimilarity for WeightedEuclidean {
    #[inline]
    fn alpha(&self, a: &[u8], b: &[u8]) -> f64 {
        a.iter()
            .zip(b)
            .zip(&self.weights)
            .map(|((&x, &y), &w)| {
                let d = x as f64 - y as f64;
                w * d * d
            })
            .sum::<f64>()
            .sqrt()
    }

    fn upper_bound(&self, _channels: usize) -> f64 {
        self.weights.iter().sum::<f64>().sqrt() * CHANNEL_MAX
    }

    fn check_channels(&self, channels: usize) -> Result<(), TreeError> {
        if self.weights.len() != channels {
            return Err(TreeError::invalid_metric(format!(
                "{} weights given for {channels} channels",
                self.weights.len()
            )));
        }
        Ok(())
    }
}

/// `Σ |a - b|`
#[derive(Debug, Clone, Copy, Default)]
pub struct Manhattan;

impl Dissimilarity for Manhattan {
    #[inline]
    fn alpha(&self, a: &[u8], b: &[u8]) -> f64 {
        a.iter()
            .zip(b)
            .map(|(&x, &y)| x.abs_diff(y) as f64)
            .sum()
    }

    fn upper_bound(&self, channels: usize) -> f64 {
        channels as f64 * CHANNEL_MAX
    }
}

/// `1 - |a·b| / (|a| |b|)`
///
/// Brightness-invariant, so distinct pixels on the same ray (e.g. `(1,1,1)`
/// and `(2,2,2)`) have distance 0. A zero vector has no direction: two zero
/// vectors are at distance 0, a zero and a non-zero vector at distance 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cosine;

impl Dissimilarity for Cosine {
    fn alpha(&self, a: &[u8], b: &[u8]) -> f64 {
        let mut dot = 0.0;
        let mut norm_a = 0.0;
        let mut norm_b = 0.0;
        for (&x, &y) in a.iter().zip(b) {
            let (x, y) = (x as f64, y as f64);
            dot += x * y;
            norm_a += x * x;
            norm_b += y * y;
        }
        match (norm_a == 0.0, norm_b == 0.0) {
            (true, true) => 0.0,
            (true, false) | (false, true) => 1.0,
            (false, false) => {
                let cosine = (dot / (norm_a.sqrt() * norm_b.sqrt())).abs();
                (1.0 - cosine).max(0.0)
            }
        }
    }

    fn upper_bound(&self, _channels: usize) -> f64 {
        1.0
    }
}

/// `(Σ |a - b|ᵖ)^(1/p)`; `p = ∞` gives the Chebyshev (max) distance.
#[derive(Debug, Clone, Copy)]
pub struct Minkowski {
    p: f64,
}

impl Minkowski {
    /// Create an order-`p` metric; `p` must be `>= 1` (or `+∞`).
    pub fn new(p: f64) -> Result<Self, TreeError> {
        if p.is_nan() || p < 1.0 {
            return Err(TreeError::invalid_metric(format!(
                "Minkowski order {p} must be >= 1"
            )));
        }
        Ok(Self { p })
    }

    /// Order `p`
    pub fn order(&self) -> f64 {
        self.p
    }
}

impl Dissimilarity for Minkowski {
    fn alpha(&self, a: &[u8], b: &[u8]) -> f64 {
        let diffs = a.iter().zip(b).map(|(&x, &y)| x.abs_diff(y) as f64);
        if self.p.is_infinite() {
            return diffs.fold(0.0, f64::max);
        }
        diffs.map(|d| d.powf(self.p)).sum::<f64>().powf(self.p.recip())
    }

    fn upper_bound(&self, channels: usize) -> f64 {
        if self.p.is_infinite() {
            CHANNEL_MAX
        } else {
            (channels as f64).powf(self.p.recip()) * CHANNEL_MAX
        }
    }
}
