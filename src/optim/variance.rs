//! # Variance Reduction Tracker
//!
//! Maintains the phase iterate: the point an epoch hands over to the next one.
//! Accumulation happens in `on_step`; `on_epoch_end` finalizes it.

use ndarray::{Array1, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::VarianceReduction;

#[derive(Debug, Clone)]
pub struct VarianceReductionTracker {
    strategy: VarianceReduction,
    rng: StdRng,
    // Reference point of the current epoch
    phase_iterate: Array1<f64>,
    // Per-epoch accumulation: last iterate, running sum, or reservoir sample
    accumulator: Array1<f64>,
    n_steps: usize,
}

impl VarianceReductionTracker {
    /// Tracker whose first phase iterate is `initial`.
    pub fn new(strategy: VarianceReduction, initial: ArrayView1<f64>, rng: StdRng) -> Self {
        VarianceReductionTracker {
            strategy,
            rng,
            phase_iterate: initial.to_owned(),
            accumulator: Array1::zeros(initial.len()),
            n_steps: 0,
        }
    }

    /// Convenience constructor seeding its own generator.
    pub fn with_seed(strategy: VarianceReduction, initial: ArrayView1<f64>, seed: u64) -> Self {
        Self::new(strategy, initial, StdRng::seed_from_u64(seed))
    }

    pub fn strategy(&self) -> VarianceReduction {
        self.strategy
    }

    /// Phase iterate of the epoch in progress.
    pub fn phase_iterate(&self) -> ArrayView1<'_, f64> {
        self.phase_iterate.view()
    }

    /// Records the iterate produced by one step of the current epoch.
    pub fn on_step(&mut self, iterate: ArrayView1<f64>) {
        self.n_steps += 1;
        match self.strategy {
            VarianceReduction::Last => self.accumulator.assign(&iterate),
            VarianceReduction::Avg => self.accumulator += &iterate,
            VarianceReduction::Rand => {
                // Reservoir of size one: after k steps each of them is kept with probability 1/k
                if self.rng.gen_range(0..self.n_steps) == 0 {
                    self.accumulator.assign(&iterate);
                }
            }
        }
    }

    /// Closes the epoch, returning the phase iterate for the next one.
    ///
    /// An epoch without steps keeps the previous phase iterate.
    pub fn on_epoch_end(&mut self) -> ArrayView1<'_, f64> {
        if self.n_steps > 0 {
            match self.strategy {
                VarianceReduction::Last | VarianceReduction::Rand => {
                    self.phase_iterate.assign(&self.accumulator);
                }
                VarianceReduction::Avg => {
                    self.phase_iterate.assign(&self.accumulator);
                    self.phase_iterate /= self.n_steps as f64;
                }
            }
        }
        self.accumulator.fill(0.0);
        self.n_steps = 0;
        self.phase_iterate.view()
    }
}
