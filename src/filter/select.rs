//! Region selection criteria
//!
//! A selector decides whether a node is kept as a whole region at threshold
//! λ. Every selector must be monotone in λ: a node rejected at some λ is
//! rejected at every larger λ. The filter cache relies on this.

use std::fmt;

use crate::tree::{AlphaTree, NodeId};

/// Predicate choosing the regions that survive a threshold.
pub trait Selector: fmt::Debug {
    /// Whether `node` forms a region at threshold `lambda`.
    ///
    /// Implementations only ever accept level roots, so a tree and its
    /// pruned form resolve every pixel to the same region.
    fn selects(&self, tree: &AlphaTree, node: NodeId, lambda: f64) -> bool;
}

/// Keeps regions of at least λ pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AreaSelector;

impl Selector for AreaSelector {
    #[inline]
    fn selects(&self, tree: &AlphaTree, node: NodeId, lambda: f64) -> bool {
        tree.area(node) as f64 >= lambda && tree.is_level_root(node)
    }
}

/// Keeps regions whose contrast with the surrounding zone is at least λ.
///
/// A root has no surrounding zone and is never selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SalienceSelector;

impl Selector for SalienceSelector {
    #[inline]
    fn selects(&self, tree: &AlphaTree, node: NodeId, lambda: f64) -> bool {
        tree.salience(node).is_some_and(|s| s >= lambda) && tree.is_level_root(node)
    }
}

/// Keeps the largest regions formed at alpha at most λ.
///
/// Selects the lowest node whose parent formed above λ, which is the
/// highest ancestor with `alpha <= λ` along the pixel's path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlphaSelector;

impl Selector for AlphaSelector {
    #[inline]
    fn selects(&self, tree: &AlphaTree, node: NodeId, lambda: f64) -> bool {
        tree.salience(node).is_some_and(|s| s > lambda) && tree.is_level_root(node)
    }
}

/// Runtime choice among the built-in selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    /// [`AreaSelector`]
    Area,
    /// [`SalienceSelector`]
    Salience,
    /// [`AlphaSelector`]
    Alpha,
}

impl FilterMode {
    /// Parse a mode name (`area`, `salience`, `alpha`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "area" => Some(FilterMode::Area),
            "salience" => Some(FilterMode::Salience),
            "alpha" => Some(FilterMode::Alpha),
            _ => None,
        }
    }
}

impl Selector for FilterMode {
    #[inline]
    fn selects(&self, tree: &AlphaTree, node: NodeId, lambda: f64) -> bool {
        match self {
            FilterMode::Area => AreaSelector.selects(tree, node, lambda),
            FilterMode::Salience => SalienceSelector.selects(tree, node, lambda),
            FilterMode::Alpha => AlphaSelector.selects(tree, node, lambda),
        }
    }
}
