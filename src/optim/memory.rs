//! # Gradient Memory
//!
//! Table of the last gradient computed for every sample, together with the
//! running mean of the table. Rows are allocated the first time a sample is
//! visited; an unvisited row reads as the zero vector.

use ndarray::{Array1, ArrayView1};

use crate::error::{Result, SolverError};

#[derive(Debug, Clone)]
pub struct GradientMemory {
    rows: Vec<Option<Array1<f64>>>,
    average: Array1<f64>,
    zero: Array1<f64>,
    n_visited: usize,
}

impl GradientMemory {
    /// Empty memory for `n_samples` gradients of dimension `dim`.
    pub fn new(n_samples: usize, dim: usize) -> Self {
        GradientMemory {
            rows: vec![None; n_samples],
            average: Array1::zeros(dim),
            zero: Array1::zeros(dim),
            n_visited: 0,
        }
    }

    pub fn n_samples(&self) -> usize {
        self.rows.len()
    }

    pub fn dim(&self) -> usize {
        self.average.len()
    }

    /// Number of samples whose gradient has been stored at least once.
    pub fn n_visited(&self) -> usize {
        self.n_visited
    }

    /// Last stored gradient of sample `i`, zero if never stored.
    pub fn get(&self, i: usize) -> ArrayView1<'_, f64> {
        match &self.rows[i] {
            Some(row) => row.view(),
            None => self.zero.view(),
        }
    }

    /// Mean of all rows.
    pub fn average(&self) -> ArrayView1<'_, f64> {
        self.average.view()
    }

    /// Replaces row `i` and updates the mean in O(dim):
    /// `average += (new − old) / n`.
    pub fn update(&mut self, i: usize, gradient: Array1<f64>) -> Result<()> {
        if gradient.len() != self.dim() {
            return Err(SolverError::ShapeMismatch {
                expected: vec![self.dim()],
                got: vec![gradient.len()],
            });
        }
        let inv_n = 1.0 / self.rows.len() as f64;
        let slot = &mut self.rows[i];
        if let Some(row) = slot {
            self.average.scaled_add(-inv_n, &*row);
            self.average.scaled_add(inv_n, &gradient);
            *row = gradient;
        } else {
            self.average.scaled_add(inv_n, &gradient);
            *slot = Some(gradient);
            self.n_visited += 1;
        }
        Ok(())
    }

    /// Forgets every stored gradient.
    pub fn reset(&mut self) {
        self.rows.iter_mut().for_each(|row| *row = None);
        self.average.fill(0.0);
        self.n_visited = 0;
    }
}
