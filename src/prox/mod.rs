//! # Proximal Operators (`prox`)
//!
//! The non-smooth term `g` of the composite objective `f(x) + g(x)` enters the
//! solvers only through its proximal map and its value.

use ndarray::{s, Array1, ArrayView1};
use std::sync::Arc;

use crate::error::{Result, SolverError};

// --- Submodules ---
pub mod l1;
pub mod l2sq;

pub use l1::ProxL1;
pub use l2sq::ProxL2Sq;

// --- Prox Trait ---

/// Proximal operator of a regularizer `g`.
pub trait Prox: Send + Sync {
    /// `argmin_z ½‖z − x‖² + step · g(z)`.
    ///
    /// As `step → 0` this must reduce to the identity.
    fn call(&self, coeffs: ArrayView1<f64>, step: f64) -> Array1<f64>;

    /// `g(coeffs)`, used when evaluating the objective.
    fn value(&self, coeffs: ArrayView1<f64>) -> f64;
}

/// `g = 0`: the proximal map is the identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProxZero;

impl ProxZero {
    pub fn new() -> Self {
        ProxZero
    }
}

impl Prox for ProxZero {
    fn call(&self, coeffs: ArrayView1<f64>, _step: f64) -> Array1<f64> {
        coeffs.to_owned()
    }

    fn value(&self, _coeffs: ArrayView1<f64>) -> f64 {
        0.0
    }
}

// --- Penalty description ---

/// A regularizer chosen by name, turned into a [`Prox`] once the coordinates
/// to penalize are known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Penalty {
    Zero,
    L1 { strength: f64, positive: bool },
    L2Sq { strength: f64 },
}

impl Penalty {
    pub const ALLOWED: &'static str = "zero, l1, l2sq";

    pub fn from_name(name: &str, strength: f64, positive: bool) -> Result<Self> {
        match name {
            "zero" => Ok(Penalty::Zero),
            "l1" => Ok(Penalty::L1 { strength, positive }),
            "l2sq" => Ok(Penalty::L2Sq { strength }),
            other => Err(SolverError::Configuration(format!(
                "prox should be one of \"{}\", got \"{}\"",
                Self::ALLOWED,
                other
            ))),
        }
    }

    /// Builds the operator acting on `[0, n_penalized)`, the remaining
    /// coordinates (an intercept) being left untouched.
    pub fn build(&self, n_penalized: usize) -> Arc<dyn Prox> {
        match *self {
            Penalty::Zero => Arc::new(ProxZero::new()),
            Penalty::L1 { strength, positive } => {
                Arc::new(ProxL1::new(strength).positive(positive).with_range(0, n_penalized))
            }
            Penalty::L2Sq { strength } => Arc::new(ProxL2Sq::new(strength).with_range(0, n_penalized)),
        }
    }
}

// --- Range helpers ---

/// Resolves an optional `[start, end)` coordinate range against a vector length.
pub(crate) fn resolve_range(range: Option<(usize, usize)>, len: usize) -> (usize, usize) {
    match range {
        Some((start, end)) => {
            let end = end.min(len);
            (start.min(end), end)
        }
        None => (0, len),
    }
}

/// Copies `coeffs` and applies `f` to every coordinate inside `range`.
pub(crate) fn map_range<F>(coeffs: ArrayView1<f64>, range: Option<(usize, usize)>, f: F) -> Array1<f64>
where
    F: Fn(f64) -> f64,
{
    let mut out = coeffs.to_owned();
    let (start, end) = resolve_range(range, out.len());
    out.slice_mut(s![start..end]).mapv_inplace(f);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn zero_prox_is_identity() {
        let x = array![1.0, -2.0, 3.0];
        assert_eq!(ProxZero::new().call(x.view(), 10.0), x);
        assert_eq!(ProxZero.value(x.view()), 0.0);
    }

    #[test]
    fn penalty_leaves_trailing_intercept_alone() {
        let x = array![2.0, -4.0, 6.0, 8.0];
        let ridge = Penalty::from_name("l2sq", 1.0, false).unwrap().build(3);
        assert_eq!(ridge.call(x.view(), 1.0), array![1.0, -2.0, 3.0, 8.0]);
        assert_eq!(ridge.value(x.view()), 28.0);

        let lasso = Penalty::from_name("l1", 1.0, true).unwrap().build(3);
        assert_eq!(lasso.call(x.view(), 1.0), array![1.0, 0.0, 5.0, 8.0]);

        // rebuilt for a wider model, the range follows
        let wider = Penalty::L2Sq { strength: 1.0 }.build(4);
        assert_eq!(wider.call(x.view(), 1.0), array![1.0, -2.0, 3.0, 4.0]);
    }

    #[test]
    fn unknown_penalty_names_allowed_set() {
        let err = Penalty::from_name("elasticnet", 1.0, false).unwrap_err();
        assert!(err.to_string().contains("zero, l1, l2sq"), "{}", err);
    }

    #[test]
    fn range_is_clamped_to_length() {
        assert_eq!(resolve_range(Some((1, 10)), 4), (1, 4));
        assert_eq!(resolve_range(Some((6, 10)), 4), (4, 4));
        assert_eq!(resolve_range(None, 4), (0, 4));
    }
}
