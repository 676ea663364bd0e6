//! # Solver Configuration
//!
//! `SagaConfig` is the typed, validated configuration. `SagaParams` is the raw
//! surface (strings, signed integers) that callers such as the Python bindings
//! fill in; converting it is where configuration errors are reported.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SolverError};

// --- Sampling policy ---

/// How the sampler draws sample indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RandType {
    /// i.i.d. uniform draws with replacement.
    #[default]
    Unif,
    /// Sequential walk through a fresh random permutation, reshuffled once exhausted.
    Perm,
}

impl RandType {
    pub const ALLOWED: &'static str = "unif, perm";

    pub fn as_str(&self) -> &'static str {
        match self {
            RandType::Unif => "unif",
            RandType::Perm => "perm",
        }
    }
}

impl FromStr for RandType {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "unif" => Ok(RandType::Unif),
            "perm" => Ok(RandType::Perm),
            other => Err(SolverError::Configuration(format!(
                "rand_type should be one of \"{}\", got \"{}\"",
                Self::ALLOWED,
                other
            ))),
        }
    }
}

impl fmt::Display for RandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Variance reduction strategy ---

/// Which point of the previous epoch becomes the phase iterate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VarianceReduction {
    /// The last iterate of the previous epoch.
    #[default]
    Last,
    /// The average of the iterates visited during the previous epoch.
    Avg,
    /// One iterate of the previous epoch, picked uniformly at random.
    Rand,
}

impl VarianceReduction {
    pub const ALLOWED: &'static str = "last, avg, rand";

    pub fn as_str(&self) -> &'static str {
        match self {
            VarianceReduction::Last => "last",
            VarianceReduction::Avg => "avg",
            VarianceReduction::Rand => "rand",
        }
    }
}

impl FromStr for VarianceReduction {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "last" => Ok(VarianceReduction::Last),
            "avg" => Ok(VarianceReduction::Avg),
            "rand" => Ok(VarianceReduction::Rand),
            other => Err(SolverError::Configuration(format!(
                "variance_reduction should be one of \"{}\", got \"{}\"",
                Self::ALLOWED,
                other
            ))),
        }
    }
}

impl fmt::Display for VarianceReduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Typed configuration ---

/// Immutable configuration of a [`super::Saga`] solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SagaConfig {
    /// Step size. `None` lets `set_model` derive `1 / (3 L_max)`.
    pub step: Option<f64>,
    /// Steps per epoch. `None` or `Some(0)` means one pass over the data.
    pub epoch_size: Option<usize>,
    pub rand_type: RandType,
    /// Relative objective change below which the solve stops. `0` disables it.
    pub tol: f64,
    /// Maximum number of epochs.
    pub max_iter: usize,
    /// Emit progress lines through the `log` facade.
    pub verbose: bool,
    pub print_every: usize,
    pub record_every: usize,
    /// `None` draws the seed from the OS entropy source.
    pub seed: Option<u64>,
    pub variance_reduction: VarianceReduction,
}

impl Default for SagaConfig {
    fn default() -> Self {
        SagaConfig {
            step: None,
            epoch_size: None,
            rand_type: RandType::Unif,
            tol: 0.0,
            max_iter: 100,
            verbose: true,
            print_every: 10,
            record_every: 1,
            seed: None,
            variance_reduction: VarianceReduction::Last,
        }
    }
}

impl SagaConfig {
    /// Checks the numeric parameters the type system cannot rule out.
    pub fn validate(&self) -> Result<()> {
        if let Some(step) = self.step {
            if !(step.is_finite() && step > 0.0) {
                return Err(SolverError::Configuration(format!(
                    "step must be strictly positive, got {}",
                    step
                )));
            }
        }
        if !(self.tol.is_finite() && self.tol >= 0.0) {
            return Err(SolverError::Configuration(format!(
                "tol must be non-negative, got {}",
                self.tol
            )));
        }
        if self.print_every == 0 {
            return Err(SolverError::Configuration("print_every must be at least 1".into()));
        }
        if self.record_every == 0 {
            return Err(SolverError::Configuration("record_every must be at least 1".into()));
        }
        Ok(())
    }

    /// Number of steps per epoch for a dataset of `n_samples`.
    pub fn resolved_epoch_size(&self, n_samples: usize) -> usize {
        match self.epoch_size {
            Some(size) if size > 0 => size,
            _ => n_samples,
        }
    }
}

// --- Raw parameter surface ---

/// Unvalidated parameters, as supplied by a user-facing layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SagaParams {
    pub step: Option<f64>,
    pub epoch_size: Option<i64>,
    pub rand_type: String,
    pub tol: f64,
    pub max_iter: i64,
    pub verbose: bool,
    pub print_every: i64,
    pub record_every: i64,
    /// Negative means "seed from entropy".
    pub seed: i64,
    pub variance_reduction: String,
}

impl Default for SagaParams {
    fn default() -> Self {
        SagaParams {
            step: None,
            epoch_size: None,
            rand_type: "unif".to_string(),
            tol: 0.0,
            max_iter: 100,
            verbose: true,
            print_every: 10,
            record_every: 1,
            seed: -1,
            variance_reduction: "last".to_string(),
        }
    }
}

fn non_negative(name: &str, value: i64) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| SolverError::Configuration(format!("{} must be non-negative, got {}", name, value)))
}

impl TryFrom<SagaParams> for SagaConfig {
    type Error = SolverError;

    fn try_from(params: SagaParams) -> Result<Self> {
        // A non-positive epoch size falls back to the dataset size
        let epoch_size = params.epoch_size.map(|size| usize::try_from(size).unwrap_or(0));
        let config = SagaConfig {
            step: params.step,
            epoch_size,
            rand_type: params.rand_type.parse()?,
            tol: params.tol,
            max_iter: non_negative("max_iter", params.max_iter)?,
            verbose: params.verbose,
            print_every: non_negative("print_every", params.print_every)?,
            record_every: non_negative("record_every", params.record_every)?,
            seed: u64::try_from(params.seed).ok(),
            variance_reduction: params.variance_reduction.parse()?,
        };
        config.validate()?;
        Ok(config)
    }
}
