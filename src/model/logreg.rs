//! # Binary Logistic Regression Model

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use super::{check_dataset, row_sq_norms, scaled_row, GeneralizedLinear, Model};
use crate::error::{Result, SolverError};

/// `f_i(w) = log(1 + exp(−y_i (⟨a_i, w⟩ + b)))` with labels in {−1, +1}.
#[derive(Debug, Clone)]
pub struct ModelLogReg {
    features: Array2<f64>,
    labels: Array1<f64>,
    fit_intercept: bool,
    sq_norms: Array1<f64>,
}

impl ModelLogReg {
    /// Creates a logistic model. Every label must be exactly `-1.0` or `1.0`.
    pub fn new(features: Array2<f64>, labels: Array1<f64>, fit_intercept: bool) -> Result<Self> {
        check_dataset(features.view(), labels.view())?;
        if let Some(bad) = labels.iter().find(|&&y| y != 1.0 && y != -1.0) {
            return Err(SolverError::IncompatibleModel(format!(
                "logistic regression labels must be -1 or 1, got {}",
                bad
            )));
        }
        let sq_norms = row_sq_norms(features.view(), fit_intercept);
        Ok(ModelLogReg {
            features,
            labels,
            fit_intercept,
            sq_norms,
        })
    }
}

/// Numerically stable `1 / (1 + exp(-t))`.
fn sigmoid(t: f64) -> f64 {
    if t >= 0.0 {
        1.0 / (1.0 + (-t).exp())
    } else {
        let e = t.exp();
        e / (1.0 + e)
    }
}

/// Numerically stable `log(1 + exp(-t))`.
fn logistic_loss(t: f64) -> f64 {
    if t > 0.0 {
        (-t).exp().ln_1p()
    } else {
        -t + t.exp().ln_1p()
    }
}

impl Model for ModelLogReg {
    fn n_samples(&self) -> usize {
        self.labels.len()
    }

    fn n_features(&self) -> usize {
        self.features.ncols()
    }

    fn n_coeffs(&self) -> usize {
        self.n_features() + usize::from(self.fit_intercept)
    }

    fn loss_i(&self, i: usize, coeffs: ArrayView1<f64>) -> f64 {
        logistic_loss(self.labels[i] * self.inner_prod(i, coeffs))
    }

    fn grad_i(&self, i: usize, coeffs: ArrayView1<f64>) -> Array1<f64> {
        let y = self.labels[i];
        let d = -y * sigmoid(-y * self.inner_prod(i, coeffs));
        scaled_row(self, i, d)
    }

    fn lipschitz_max(&self) -> Option<f64> {
        self.sq_norms.iter().cloned().reduce(f64::max).map(|l| l / 4.0)
    }
}

impl GeneralizedLinear for ModelLogReg {
    fn features(&self) -> ArrayView2<'_, f64> {
        self.features.view()
    }

    fn labels(&self) -> ArrayView1<'_, f64> {
        self.labels.view()
    }

    fn fit_intercept(&self) -> bool {
        self.fit_intercept
    }
}
