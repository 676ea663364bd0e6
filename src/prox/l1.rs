//! # L1 Proximal Operator (soft thresholding)

use ndarray::{s, Array1, ArrayView1};

use super::{map_range, resolve_range, Prox};

/// `g(x) = strength · ‖x[range]‖₁`, optionally restricted to `x[range] ≥ 0`.
#[derive(Debug, Clone, Copy)]
pub struct ProxL1 {
    strength: f64,
    range: Option<(usize, usize)>,
    positive: bool,
}

impl ProxL1 {
    pub fn new(strength: f64) -> Self {
        ProxL1 {
            strength,
            range: None,
            positive: false,
        }
    }

    /// Restricts the penalty to coordinates `[start, end)`.
    pub fn with_range(mut self, start: usize, end: usize) -> Self {
        self.range = Some((start, end));
        self
    }

    /// Additionally projects the penalized coordinates onto the non-negative orthant.
    pub fn positive(mut self, positive: bool) -> Self {
        self.positive = positive;
        self
    }
}

impl Prox for ProxL1 {
    fn call(&self, coeffs: ArrayView1<f64>, step: f64) -> Array1<f64> {
        let thresh = step * self.strength;
        let positive = self.positive;
        map_range(coeffs, self.range, |x| {
            let shrunk = x.signum() * (x.abs() - thresh).max(0.0);
            if positive {
                shrunk.max(0.0)
            } else {
                shrunk
            }
        })
    }

    fn value(&self, coeffs: ArrayView1<f64>) -> f64 {
        let (start, end) = resolve_range(self.range, coeffs.len());
        self.strength * coeffs.slice(s![start..end]).iter().map(|x| x.abs()).sum::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn soft_thresholds_inside_range_only() {
        let prox = ProxL1::new(1.0).with_range(0, 2);
        let out = prox.call(array![3.0, -0.5, 7.0].view(), 1.0);
        assert_eq!(out, array![2.0, 0.0, 7.0]);
        assert_eq!(prox.value(array![3.0, -0.5, 7.0].view()), 3.5);
    }

    #[test]
    fn positive_projection() {
        let prox = ProxL1::new(0.5).positive(true);
        let out = prox.call(array![2.0, -2.0].view(), 1.0);
        assert_eq!(out, array![1.5, 0.0]);
    }

    #[test]
    fn vanishing_step_is_identity() {
        let x = array![0.3, -1.2];
        assert_eq!(ProxL1::new(4.0).call(x.view(), 0.0), x);
    }
}
