//! # Least-Squares Linear Regression Model

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use super::{check_dataset, row_sq_norms, scaled_row, GeneralizedLinear, Model};
use crate::error::Result;

/// `f_i(w) = ½ (y_i − ⟨a_i, w⟩ − b)²`
#[derive(Debug, Clone)]
pub struct ModelLinReg {
    features: Array2<f64>,
    labels: Array1<f64>,
    fit_intercept: bool,
    // ‖a_i‖² (+1 with intercept), the per-sample Lipschitz constants
    sq_norms: Array1<f64>,
}

impl ModelLinReg {
    /// Creates a least-squares model over `features` (n × d) and `labels` (n).
    pub fn new(features: Array2<f64>, labels: Array1<f64>, fit_intercept: bool) -> Result<Self> {
        check_dataset(features.view(), labels.view())?;
        let sq_norms = row_sq_norms(features.view(), fit_intercept);
        Ok(ModelLinReg {
            features,
            labels,
            fit_intercept,
            sq_norms,
        })
    }
}

impl Model for ModelLinReg {
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
        let residual = self.inner_prod(i, coeffs) - self.labels[i];
        0.5 * residual * residual
    }

    fn grad_i(&self, i: usize, coeffs: ArrayView1<f64>) -> Array1<f64> {
        let residual = self.inner_prod(i, coeffs) - self.labels[i];
        scaled_row(self, i, residual)
    }

    fn lipschitz_max(&self) -> Option<f64> {
        self.sq_norms.iter().cloned().reduce(f64::max)
    }
}

impl GeneralizedLinear for ModelLinReg {
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

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn grad_matches_residual_times_row() {
        let model = ModelLinReg::new(array![[1.0, 2.0], [3.0, -1.0]], array![1.0, 0.5], true).unwrap();
        let w = array![0.5, -0.5, 0.25];
        // z_0 = 0.5 - 1.0 + 0.25 = -0.25, residual = -1.25
        let g = model.grad_i(0, w.view());
        assert_abs_diff_eq!(g, array![-1.25, -2.5, -1.25], epsilon = 1e-12);
        assert_abs_diff_eq!(model.loss_i(0, w.view()), 0.5 * 1.5625, epsilon = 1e-12);
    }

    #[test]
    fn lipschitz_is_largest_row_norm() {
        let model = ModelLinReg::new(array![[1.0, 2.0], [3.0, -1.0]], array![1.0, 0.5], false).unwrap();
        assert_abs_diff_eq!(model.lipschitz_max().unwrap(), 10.0);
        assert_eq!(model.n_coeffs(), 2);
    }

    #[test]
    fn rejects_label_count_mismatch() {
        let result = ModelLinReg::new(array![[1.0], [2.0]], array![1.0], false);
        assert!(result.is_err());
    }
}
