//! # Python Bindings for rsaga (`rsaga_lib`)
//!
//! This module uses PyO3 to expose the SAGA solver to Python, with the keyword
//! arguments Python users already know: `SAGA(step=None, epoch_size=None,
//! rand_type="unif", tol=0., max_iter=100, verbose=True, print_every=10,
//! record_every=1, seed=-1, variance_reduction="last")`.

use ndarray::{Array1, Array2};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use std::sync::Arc;

use crate::error::SolverError;
use crate::model::{GeneralizedLinear, ModelLinReg, ModelLogReg};
use crate::optim::{Saga, SagaConfig, SagaParams};
use crate::prox::Penalty;
use crate::utils::{self, SerializationError};

// --- Helper to Convert Rust Errors to Python Exceptions ---

impl std::convert::From<SolverError> for PyErr {
    fn from(err: SolverError) -> PyErr {
        match err {
            SolverError::Configuration(_)
            | SolverError::IncompatibleModel(_)
            | SolverError::ShapeMismatch { .. }
            | SolverError::Ndarray(_) => PyValueError::new_err(err.to_string()),
            SolverError::UninitializedSolver(_) => PyRuntimeError::new_err(err.to_string()),
        }
    }
}

impl std::convert::From<SerializationError> for PyErr {
    fn from(err: SerializationError) -> PyErr {
        PyRuntimeError::new_err(err.to_string())
    }
}

/// Packs nested Python lists into an `n × d` matrix.
fn to_matrix(rows: Vec<Vec<f64>>) -> PyResult<Array2<f64>> {
    let n = rows.len();
    let d = rows.first().map_or(0, |r| r.len());
    if let Some(bad) = rows.iter().position(|r| r.len() != d) {
        return Err(PyValueError::new_err(format!(
            "features must be rectangular: row {} has {} columns, expected {}",
            bad,
            rows[bad].len(),
            d
        )));
    }
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((n, d), flat).map_err(|e| PyValueError::new_err(e.to_string()))
}

// --- Solver Python Wrapper (`rsaga_lib.SAGA`) ---

#[pyclass(name = "SAGA")]
pub struct PySaga {
    solver: Saga,
    // Coordinates [0, n_features) are penalized; the intercept, if any, is not
    n_features: Option<usize>,
    // Kept so the operator can be rebuilt for each new model
    penalty: Option<Penalty>,
}

impl PySaga {
    fn refresh_prox(&mut self) {
        if let Some(penalty) = self.penalty {
            let n_penalized = self.n_features.unwrap_or(usize::MAX);
            self.solver.set_prox_dyn(penalty.build(n_penalized));
        }
    }
}

#[pymethods]
impl PySaga {
    #[new]
    #[pyo3(signature = (step=None, epoch_size=None, rand_type="unif", tol=0.0, max_iter=100, verbose=true, print_every=10, record_every=1, seed=-1, variance_reduction="last"))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        step: Option<f64>,
        epoch_size: Option<i64>,
        rand_type: &str,
        tol: f64,
        max_iter: i64,
        verbose: bool,
        print_every: i64,
        record_every: i64,
        seed: i64,
        variance_reduction: &str,
    ) -> PyResult<Self> {
        let params = SagaParams {
            step,
            epoch_size,
            rand_type: rand_type.to_string(),
            tol,
            max_iter,
            verbose,
            print_every,
            record_every,
            seed,
            variance_reduction: variance_reduction.to_string(),
        };
        let config = SagaConfig::try_from(params)?;
        Ok(PySaga {
            solver: Saga::new(config)?,
            n_features: None,
            penalty: None,
        })
    }

    #[getter]
    fn variance_reduction(&self) -> &'static str {
        self.solver.variance_reduction().as_str()
    }

    #[setter]
    fn set_variance_reduction(&mut self, val: &str) -> PyResult<()> {
        self.solver.set_variance_reduction_str(val)?;
        Ok(())
    }

    #[getter]
    fn step(&self) -> Option<f64> {
        self.solver.step()
    }

    #[getter]
    fn epoch_size(&self) -> usize {
        self.solver.epoch_size()
    }

    /// Fits a `"linreg"` or `"logreg"` model on the given data.
    #[pyo3(signature = (model, features, labels, fit_intercept=true))]
    fn set_model(&mut self, model: &str, features: Vec<Vec<f64>>, labels: Vec<f64>, fit_intercept: bool) -> PyResult<()> {
        let features = to_matrix(features)?;
        let n_features = features.ncols();
        let labels = Array1::from(labels);
        let model: Arc<dyn GeneralizedLinear> = match model {
            "linreg" => Arc::new(ModelLinReg::new(features, labels, fit_intercept)?),
            "logreg" => Arc::new(ModelLogReg::new(features, labels, fit_intercept)?),
            other => {
                return Err(PyValueError::new_err(format!(
                    "model should be one of \"linreg, logreg\", got \"{}\"",
                    other
                )))
            }
        };
        self.solver.set_model_dyn(model)?;
        self.n_features = Some(n_features);
        self.refresh_prox();
        Ok(())
    }

    /// Sets the penalty: `"zero"`, `"l1"` or `"l2sq"`.
    #[pyo3(signature = (prox="zero", strength=0.0, positive=false))]
    fn set_prox(&mut self, prox: &str, strength: f64, positive: bool) -> PyResult<()> {
        self.penalty = Some(Penalty::from_name(prox, strength, positive)?);
        self.refresh_prox();
        Ok(())
    }

    /// Runs the solver and returns the solution as a list.
    #[pyo3(signature = (x0=None))]
    fn solve(&mut self, x0: Option<Vec<f64>>) -> PyResult<Vec<f64>> {
        let x0 = x0.map(Array1::from);
        let report = self.solver.solve(x0.as_ref().map(|x| x.view()))?;
        Ok(report.solution.to_vec())
    }

    /// Recorded `(epoch, objective, rel_obj)` triples of the last solve.
    #[getter]
    fn history(&self) -> Vec<(usize, f64, f64)> {
        self.solver
            .history()
            .entries()
            .iter()
            .map(|e| (e.epoch, e.objective, e.rel_obj))
            .collect()
    }

    /// Saves the history of the last solve in bincode format.
    fn save_history(&self, path: String) -> PyResult<()> {
        utils::save_history(self.solver.history(), path)?;
        Ok(())
    }

    fn __repr__(&self) -> String {
        format!("{:?}", self.solver)
    }
}

// --- Main Python Module Definition (`rsaga_lib`) ---
#[pymodule]
fn rsaga_lib(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySaga>()?;
    Ok(())
}
