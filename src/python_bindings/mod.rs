//! Python bindings that expose tree construction and filtering via PyO3.
use pyo3::{
    exceptions::{PyRuntimeError, PyValueError},
    prelude::*,
    types::{PyBytes, PyModule},
};

use crate::filter::{FilterCache, FilterEngine, FilterMode, MeanColor};
use crate::metric::MetricKind;
use crate::{AlphaTree, PixelGrid, TreeConfig, TreeError};

fn to_py_err(err: TreeError) -> PyErr {
    match err {
        TreeError::Allocation { .. } => PyRuntimeError::new_err(err.to_string()),
        other => PyValueError::new_err(other.to_string()),
    }
}

/// Python-facing alpha-tree with a filter cache kept between calls.
#[pyclass]
#[derive(Debug)]
pub struct PyAlphaTree {
    tree: AlphaTree,
    cache: Option<FilterCache<FilterMode>>,
}

#[pymethods]
impl PyAlphaTree {
    #[new]
    #[pyo3(signature = (width, height, channels, data, connectivity=4, metric="euclidean", lambda_min=None, exclude_top=false, p=None, weights=None))]
    /// Build the tree of a raw interleaved 8-bit image.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        width: usize,
        height: usize,
        channels: usize,
        data: &[u8],
        connectivity: u8,
        metric: &str,
        lambda_min: Option<f64>,
        exclude_top: bool,
        p: Option<f64>,
        weights: Option<Vec<f64>>,
    ) -> PyResult<Self> {
        let grid = PixelGrid::new(width, height, channels, data).map_err(to_py_err)?;
        let mut config = TreeConfig::new(connectivity).map_err(to_py_err)?;
        if let Some(lambda_min) = lambda_min {
            config = config.with_lambda_min(lambda_min).map_err(to_py_err)?;
        }
        if exclude_top {
            config = config.with_exclude_top(true);
        }
        let metric = MetricKind::from_name(metric, p, weights)
            .and_then(MetricKind::into_metric)
            .map_err(to_py_err)?;
        let tree = AlphaTree::build(&grid, &metric, &config).map_err(to_py_err)?;
        Ok(Self { tree, cache: None })
    }

    /// Number of nodes.
    pub fn __len__(&self) -> usize {
        self.tree.len()
    }

    /// Parent index of every node (`None` for roots).
    pub fn parents(&self) -> Vec<Option<usize>> {
        self.tree
            .nodes()
            .iter()
            .map(|node| node.parent.map(|p| p.index()))
            .collect()
    }

    /// Alpha of every node.
    pub fn alphas(&self) -> Vec<f64> {
        self.tree.nodes().iter().map(|node| node.alpha).collect()
    }

    /// Area of every node.
    pub fn areas(&self) -> Vec<usize> {
        self.tree.nodes().iter().map(|node| node.area).collect()
    }

    /// Mean-colour image at threshold `lam`.
    ///
    /// Args:
    ///     mode: `"area"`, `"salience"` or `"alpha"`.
    ///     lam: Threshold.
    ///
    /// Returns:
    ///     Raw bytes in the input layout.
    pub fn filter<'py>(&mut self, py: Python<'py>, mode: &str, lam: f64) -> PyResult<Bound<'py, PyBytes>> {
        let mut engine = self.engine(mode)?;
        let pixels = engine.filter(lam).map_err(to_py_err);
        self.cache = Some(engine.into_cache());
        Ok(PyBytes::new(py, &pixels?))
    }

    /// Number of regions at threshold `lam`.
    pub fn region_count(&mut self, mode: &str, lam: f64) -> PyResult<usize> {
        let mut engine = self.engine(mode)?;
        let count = engine.region_count(lam).map_err(to_py_err);
        self.cache = Some(engine.into_cache());
        count
    }
}

impl PyAlphaTree {
    fn engine(&mut self, mode: &str) -> PyResult<FilterEngine<'_, FilterMode, MeanColor>> {
        let mode = FilterMode::from_name(mode)
            .ok_or_else(|| PyValueError::new_err(format!("unknown filter mode '{mode}'")))?;
        let cache = self
            .cache
            .take()
            .unwrap_or_else(|| FilterCache::new(self.tree.len()));
        Ok(FilterEngine::with_cache(&self.tree, mode, MeanColor, cache))
    }
}

/// Create Python module.
#[pymodule]
pub fn alphatree_py(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyAlphaTree>()?;
    Ok(())
}
