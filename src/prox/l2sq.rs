//! # Squared L2 (ridge) Proximal Operator

use ndarray::{s, Array1, ArrayView1};

use super::{map_range, resolve_range, Prox};

/// `g(x) = ½ · strength · ‖x[range]‖²`.
#[derive(Debug, Clone, Copy)]
pub struct ProxL2Sq {
    strength: f64,
    range: Option<(usize, usize)>,
}

impl ProxL2Sq {
    pub fn new(strength: f64) -> Self {
        ProxL2Sq {
            strength,
            range: None,
        }
    }

    /// Restricts the penalty to coordinates `[start, end)`.
    pub fn with_range(mut self, start: usize, end: usize) -> Self {
        self.range = Some((start, end));
        self
    }
}

impl Prox for ProxL2Sq {
    fn call(&self, coeffs: ArrayView1<f64>, step: f64) -> Array1<f64> {
        let scale = 1.0 / (1.0 + step * self.strength);
        map_range(coeffs, self.range, |x| x * scale)
    }

    fn value(&self, coeffs: ArrayView1<f64>) -> f64 {
        let (start, end) = resolve_range(self.range, coeffs.len());
        let part = coeffs.slice(s![start..end]);
        0.5 * self.strength * part.dot(&part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn shrinks_towards_zero() {
        let prox = ProxL2Sq::new(1.0);
        let out = prox.call(array![2.0, -4.0].view(), 1.0);
        assert_abs_diff_eq!(out, array![1.0, -2.0], epsilon = 1e-12);
        assert_abs_diff_eq!(prox.value(array![2.0, -4.0].view()), 10.0, epsilon = 1e-12);
    }

    #[test]
    fn intercept_left_untouched() {
        let prox = ProxL2Sq::new(1.0).with_range(0, 1);
        let out = prox.call(array![2.0, 5.0].view(), 1.0);
        assert_abs_diff_eq!(out, array![1.0, 5.0], epsilon = 1e-12);
    }
}
