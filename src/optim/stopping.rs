//! # Stopping Criterion

use ndarray::ArrayView1;

/// Outcome of an epoch-boundary check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopCheck {
    pub rel_delta: f64,
    pub rel_obj: f64,
    /// `rel_obj < tol`.
    pub converged: bool,
    /// The epoch ceiling has been reached.
    pub exhausted: bool,
}

impl StopCheck {
    pub fn should_stop(&self) -> bool {
        self.converged || self.exhausted
    }
}

/// Relative-change test evaluated once per epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoppingCriterion {
    tol: f64,
    max_iter: usize,
}

impl StoppingCriterion {
    pub fn new(tol: f64, max_iter: usize) -> Self {
        StoppingCriterion { tol, max_iter }
    }

    pub fn tol(&self) -> f64 {
        self.tol
    }

    pub fn max_iter(&self) -> usize {
        self.max_iter
    }

    /// `‖new − prev‖ / max(‖new‖, 1)`
    pub fn rel_delta(prev: ArrayView1<f64>, new: ArrayView1<f64>) -> f64 {
        let diff = &new - &prev;
        let norm_new = new.dot(&new).sqrt();
        diff.dot(&diff).sqrt() / norm_new.max(1.0)
    }

    /// `|new − prev| / |prev|`, or the absolute change when `prev == 0`.
    pub fn rel_obj(prev: f64, new: f64) -> f64 {
        let change = (new - prev).abs();
        if prev == 0.0 {
            change
        } else {
            change / prev.abs()
        }
    }

    /// Checks the end of epoch `epoch` (1-based).
    pub fn check(
        &self,
        epoch: usize,
        prev_iterate: ArrayView1<f64>,
        new_iterate: ArrayView1<f64>,
        prev_objective: f64,
        new_objective: f64,
    ) -> StopCheck {
        let rel_delta = Self::rel_delta(prev_iterate, new_iterate);
        let rel_obj = Self::rel_obj(prev_objective, new_objective);
        StopCheck {
            rel_delta,
            rel_obj,
            converged: rel_obj < self.tol,
            exhausted: epoch >= self.max_iter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn zero_tol_never_converges() {
        let criterion = StoppingCriterion::new(0.0, 10);
        let x = array![1.0, 2.0];
        let check = criterion.check(3, x.view(), x.view(), 1.0, 1.0);
        assert_eq!(check.rel_obj, 0.0);
        assert!(!check.converged);
        assert!(!check.should_stop());
    }

    #[test]
    fn ceiling_always_stops() {
        let criterion = StoppingCriterion::new(0.0, 5);
        let check = criterion.check(5, array![0.0].view(), array![10.0].view(), 1.0, 100.0);
        assert!(check.exhausted && check.should_stop());
    }

    #[test]
    fn small_relative_change_converges() {
        let criterion = StoppingCriterion::new(1e-3, 100);
        let check = criterion.check(1, array![1.0].view(), array![1.0].view(), 2.0, 2.001);
        assert!(check.converged);
    }

    #[test]
    fn rel_delta_uses_unit_floor() {
        let d = StoppingCriterion::rel_delta(array![0.0, 0.0].view(), array![0.3, 0.4].view());
        assert!((d - 0.5).abs() < 1e-12);
        let d = StoppingCriterion::rel_delta(array![0.0, 0.0].view(), array![3.0, 4.0].view());
        assert!((d - 1.0).abs() < 1e-12);
    }
}
