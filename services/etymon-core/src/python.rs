//! Python bindings via PyO3, for the pandas side of the research pipeline.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::error::EtymonError;
use crate::graph::RelatednessGraph;
use crate::metric::GraphemeDistance;
use crate::score::GradedScorer;
use crate::select::{select_nearest, ScanPolicy};
use crate::types::LanguageSet;

fn to_py_err(err: EtymonError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn graph_from_py(matrix: Vec<Vec<Option<f64>>>) -> PyResult<RelatednessGraph> {
    let rows: Vec<Vec<f64>> = matrix
        .into_iter()
        .map(|row| row.into_iter().map(|w| w.unwrap_or(f64::INFINITY)).collect())
        .collect();
    RelatednessGraph::from_rows(&rows).map_err(to_py_err)
}

// ============================================================================
// SELECTION
// ============================================================================

/// Returns `(language index, rendering, distance)` or `None`
#[pyfunction]
fn py_select_nearest(
    headword: &str,
    renderings: Vec<Option<String>>,
) -> PyResult<Option<(usize, String, f64)>> {
    let candidates = renderings
        .iter()
        .enumerate()
        .map(|(idx, r)| (idx, r.as_deref()));
    let estimate = select_nearest(&GraphemeDistance, headword, candidates, ScanPolicy::Full);
    Ok(estimate.map(|e| (e.language, e.rendering, e.distance)))
}

// ============================================================================
// GRAPH AND SCORING
// ============================================================================

/// `None` entries mean "no direct edge"
#[pyfunction]
fn py_shortest_paths(matrix: Vec<Vec<Option<f64>>>) -> PyResult<Vec<Vec<f64>>> {
    Ok(graph_from_py(matrix)?.shortest_paths().to_rows())
}

/// Returns `(dynamic score, percentage)`; `None` labels are unscored
#[pyfunction]
fn py_dynamic_score(
    languages: Vec<String>,
    matrix: Vec<Vec<Option<f64>>>,
    pairs: Vec<(Option<String>, Option<String>)>,
) -> PyResult<(f64, Option<f64>)> {
    let languages = LanguageSet::from_names(languages).map_err(to_py_err)?;
    let scorer = GradedScorer::new(languages, &graph_from_py(matrix)?).map_err(to_py_err)?;

    let mut tally = scorer.tally();
    for pair in pairs {
        match pair {
            (Some(predicted), Some(actual)) => {
                tally
                    .add_labels(&predicted, &actual)
                    .map_err(to_py_err)?;
            }
            _ => tally.skip(),
        }
    }

    let report = tally.finish();
    Ok((report.dynamic_score, report.dynamic_score_percentage))
}

// ============================================================================
// MODULE DEFINITION
// ============================================================================

#[pymodule]
fn etymon_core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(py_select_nearest, m)?)?;
    m.add_function(wrap_pyfunction!(py_shortest_paths, m)?)?;
    m.add_function(wrap_pyfunction!(py_dynamic_score, m)?)?;
    Ok(())
}
