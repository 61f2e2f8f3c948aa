use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{IntoPyDict, PyDict};

use crate::error::MiningError;
use crate::itemsets::pairs::PairCounts;
use crate::round::{mine_dataset, Algorithm, RoundParams, UNBOUNDED};
use crate::types::{Count, Pair};

impl From<MiningError> for PyErr {
    fn from(err: MiningError) -> PyErr {
        let message = err.to_string();
        match err {
            MiningError::DatasetUnavailable { .. } | MiningError::Io(_) => PyIOError::new_err(message),
            _ => PyValueError::new_err(message),
        }
    }
}

pub fn convert_pair_counts(py: Python, pair_counts: &PairCounts) -> Py<PyDict> {
    pair_counts
        .iter()
        .collect::<Vec<(Pair, Count)>>()
        .into_py_dict(py)
        .into()
}

/// Run one A-Priori or PCY round over a dataset file.
///
/// Returns `({(a, b): count}, baskets_observed)`.
#[pyfunction]
#[pyo3(text_signature = "(path, basket_limit, support, first_round, pcy, /)")]
pub fn run_round(
    py: Python,
    path: &str,
    basket_limit: Option<usize>,
    support: f64,
    first_round: bool,
    pcy: bool,
) -> PyResult<(Py<PyDict>, usize)> {
    let algorithm = if pcy { Algorithm::Pcy } else { Algorithm::Apriori };
    let params = RoundParams {
        basket_limit: basket_limit.unwrap_or(UNBOUNDED),
        support,
        first_round,
    };

    let outcome = py.allow_threads(|| mine_dataset(path, algorithm, params))?;
    Ok((
        convert_pair_counts(py, &outcome.frequent_pairs),
        outcome.baskets_observed,
    ))
}

#[pymodule]
fn freqpairs(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(run_round, m)?)?;
    Ok(())
}
