use numpy::ndarray::{Array1, Array2};
use numpy::{IntoPyArray, PyArray1, PyArray2, PyReadonlyArray2};
use pyo3::exceptions::{PyMemoryError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::carp::{mine, CarpError, CarpenterConfig, Mode, Supp, TransactionBag};

impl From<CarpError> for PyErr {
    fn from(err: CarpError) -> PyErr {
        match err {
            CarpError::InvalidArgument(_) => PyValueError::new_err(err.to_string()),
            CarpError::OutOfMemory { .. } => PyMemoryError::new_err(err.to_string()),
            CarpError::Report(_) => PyRuntimeError::new_err(err.to_string()),
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn build_config(
    target: &str,
    supp: f64,
    zmin: usize,
    zmax: Option<usize>,
    eval: &str,
    thresh: f64,
    algo: &str,
    mode: &str,
    border: Option<Vec<Supp>>,
) -> PyResult<CarpenterConfig> {
    let config = CarpenterConfig::new(target.parse()?, supp)
        .with_size(zmin, zmax)
        .with_eval(eval.parse()?, thresh)
        .with_algo(algo.parse()?)
        .with_mode(Mode::from_flags(mode)?)
        .with_border(border.unwrap_or_default());
    config.validate()?;
    Ok(config)
}

/// Closed or maximal item sets of a list of transactions, as
/// `(items, support)` pairs.
#[pyfunction]
#[pyo3(name = "carpenter", signature = (tracts, target="c", supp=10.0, zmin=1, zmax=None, eval="x", thresh=10.0, algo="a", mode="", border=None, weights=None))]
#[allow(clippy::too_many_arguments)]
fn carpenter_py(
    py: Python<'_>,
    tracts: Vec<Vec<usize>>,
    target: &str,
    supp: f64,
    zmin: usize,
    zmax: Option<usize>,
    eval: &str,
    thresh: f64,
    algo: &str,
    mode: &str,
    border: Option<Vec<Supp>>,
    weights: Option<Vec<Supp>>,
) -> PyResult<Vec<(Vec<usize>, Supp)>> {
    let config = build_config(target, supp, zmin, zmax, eval, thresh, algo, mode, border)?;
    let bag = match weights {
        Some(weights) if weights.len() != tracts.len() => {
            return Err(PyValueError::new_err("weights must match the number of transactions"));
        }
        Some(weights) => TransactionBag::from_weighted(tracts.into_iter().zip(weights)),
        None => TransactionBag::from_transactions(tracts),
    };

    let found = py.allow_threads(|| mine(bag, &config))?;
    Ok(found.iter().map(|(items, supp)| (items.to_vec(), supp)).collect())
}

/// Closed or maximal item sets of a dense 0/1 matrix (rows are
/// transactions), grouped by size: one `(items, supports)` pair of arrays
/// per item set size.
#[pyfunction]
#[pyo3(name = "carpenter_dense", signature = (matrix, target="c", supp=10.0, zmin=1, zmax=None, eval="x", thresh=10.0, algo="a", mode="", border=None))]
#[allow(clippy::too_many_arguments)]
fn carpenter_dense_py<'py>(
    py: Python<'py>,
    matrix: PyReadonlyArray2<'py, i32>,
    target: &str,
    supp: f64,
    zmin: usize,
    zmax: Option<usize>,
    eval: &str,
    thresh: f64,
    algo: &str,
    mode: &str,
    border: Option<Vec<Supp>>,
) -> PyResult<Vec<(Bound<'py, PyArray2<usize>>, Bound<'py, PyArray1<usize>>)>> {
    let config = build_config(target, supp, zmin, zmax, eval, thresh, algo, mode, border)?;
    let bag = TransactionBag::from_dense(matrix.as_array());
    let found = py.allow_threads(|| mine(bag, &config))?;

    let mut result = Vec::new();
    for level in found.levels() {
        let itemset_size = level.itemset_size;
        let num_itemsets = level.len();
        let mut data = vec![0usize; num_itemsets * itemset_size];
        for (i, itemset) in level.iter_itemsets().enumerate() {
            data[i * itemset_size..(i + 1) * itemset_size].copy_from_slice(itemset);
        }

        let items = Array2::from_shape_vec((num_itemsets, itemset_size), data)
            .map_err(|_| PyValueError::new_err("Failed to create array"))?;
        let supports = Array1::from_vec(level.supports().to_vec());
        result.push((items.into_pyarray(py), supports.into_pyarray(py)));
    }

    Ok(result)
}

#[pymodule]
fn carpenter(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(carpenter_py, m)?)?;
    m.add_function(wrap_pyfunction!(carpenter_dense_py, m)?)?;
    Ok(())
}
