//! # Models (`model`)
//!
//! First-order information providers consumed by the solvers. A model owns a
//! fixed dataset and exposes per-sample losses and gradients as pure functions
//! of the coefficients, so one model can be shared (via `Arc`) by several
//! solver instances.

use ndarray::{Array1, ArrayView1, ArrayView2};

use crate::error::{Result, SolverError};

// --- Submodules ---
pub mod linreg;
pub mod logreg;

pub use linreg::ModelLinReg;
pub use logreg::ModelLogReg;

// --- Model Trait ---

/// Finite-sum objective `f(x) = (1/n) Σ f_i(x)`.
///
/// Implementations must be reentrant: `loss_i` and `grad_i` only read the
/// dataset and never mutate internal state.
pub trait Model: Send + Sync {
    /// Number of samples `n` in the finite sum.
    fn n_samples(&self) -> usize;

    /// Number of raw features in the dataset.
    fn n_features(&self) -> usize;

    /// Dimension of the coefficient vector the solver iterates on.
    fn n_coeffs(&self) -> usize {
        self.n_features()
    }

    /// Loss of sample `i` at `coeffs`.
    fn loss_i(&self, i: usize, coeffs: ArrayView1<f64>) -> f64;

    /// Gradient of the loss of sample `i` at `coeffs`, of length `n_coeffs()`.
    fn grad_i(&self, i: usize, coeffs: ArrayView1<f64>) -> Array1<f64>;

    /// Mean loss over all samples.
    fn loss(&self, coeffs: ArrayView1<f64>) -> f64 {
        let n = self.n_samples();
        if n == 0 {
            return 0.0;
        }
        (0..n).map(|i| self.loss_i(i, coeffs)).sum::<f64>() / n as f64
    }

    /// Full gradient: mean of the per-sample gradients.
    fn grad(&self, coeffs: ArrayView1<f64>) -> Array1<f64> {
        let n = self.n_samples();
        let mut out = Array1::zeros(self.n_coeffs());
        for i in 0..n {
            out += &self.grad_i(i, coeffs);
        }
        if n > 0 {
            out /= n as f64;
        }
        out
    }

    /// Largest per-sample Lipschitz constant of `grad_i`, when known.
    fn lipschitz_max(&self) -> Option<f64> {
        None
    }
}

/// Models of the form `f_i(x) = φ(y_i, ⟨a_i, w⟩ + b)`, the family SAGA is
/// offered for. Requiring this trait is the compile-time half of the
/// capability check done by [`crate::optim::Saga::set_model`].
pub trait GeneralizedLinear: Model {
    /// Feature matrix, one sample per row.
    fn features(&self) -> ArrayView2<'_, f64>;

    /// Labels, one per sample.
    fn labels(&self) -> ArrayView1<'_, f64>;

    /// Whether the last coefficient is an (unpenalized) intercept.
    fn fit_intercept(&self) -> bool;

    /// Inner product `⟨a_i, w⟩ + b` of sample `i` with `coeffs`.
    fn inner_prod(&self, i: usize, coeffs: ArrayView1<f64>) -> f64 {
        let n_features = self.n_features();
        let features = self.features();
        let z = features.row(i).dot(&coeffs.slice(ndarray::s![..n_features]));
        if self.fit_intercept() {
            z + coeffs[n_features]
        } else {
            z
        }
    }
}

// --- Shared helpers for the concrete models ---

/// Validates the dataset shapes shared by every generalized linear model.
pub(crate) fn check_dataset(features: ArrayView2<f64>, labels: ArrayView1<f64>) -> Result<()> {
    if features.nrows() != labels.len() {
        return Err(SolverError::ShapeMismatch {
            expected: vec![features.nrows()],
            got: vec![labels.len()],
        });
    }
    Ok(())
}

/// Applies a scalar derivative to the sample row: `d · a_i` (plus `d` for the intercept).
pub(crate) fn scaled_row<M: GeneralizedLinear + ?Sized>(model: &M, i: usize, d: f64) -> Array1<f64> {
    let mut out = Array1::zeros(model.n_coeffs());
    let n_features = model.n_features();
    out.slice_mut(ndarray::s![..n_features])
        .scaled_add(d, &model.features().row(i));
    if model.fit_intercept() {
        out[n_features] = d;
    }
    out
}

/// Squared norm of each feature row, plus one for the intercept column.
pub(crate) fn row_sq_norms(features: ArrayView2<f64>, fit_intercept: bool) -> Array1<f64> {
    let extra = if fit_intercept { 1.0 } else { 0.0 };
    features
        .rows()
        .into_iter()
        .map(|row| row.dot(&row) + extra)
        .collect()
}
