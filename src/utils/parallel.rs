//! # Parallelism Utilities (CPU Threading)
//!
//! A single SAGA run is strictly sequential: every step reads the iterate and
//! the gradient memory written by the previous one. What can run in parallel
//! is a set of independent solver instances, each owning its own memory,
//! iterate and sampler, here spread over the `rayon` thread pool. The model is
//! shared read-only through an `Arc`.

use ndarray::Array1;
use rayon::prelude::*;
use std::sync::Arc;

use crate::error::Result;
use crate::model::GeneralizedLinear;
use crate::optim::{Saga, SagaConfig, SolveReport};
use crate::prox::Prox;

/// Solves the same problem once per configuration, in parallel.
///
/// `make_prox` is called once per instance. Results keep the order of `configs`.
pub fn solve_independent<F>(
    model: Arc<dyn GeneralizedLinear>,
    make_prox: F,
    configs: Vec<SagaConfig>,
    x0: Option<Array1<f64>>,
) -> Vec<Result<SolveReport>>
where
    F: Fn() -> Arc<dyn Prox> + Sync,
{
    configs
        .into_par_iter()
        .map(|config| {
            let mut solver = Saga::new(config)?;
            solver.set_model_dyn(Arc::clone(&model))?.set_prox_dyn(make_prox());
            solver.solve(x0.as_ref().map(|x| x.view()))
        })
        .collect()
}

/// The same configuration run under each of `seeds`.
pub fn seeded_configs(base: &SagaConfig, seeds: &[u64]) -> Vec<SagaConfig> {
    seeds
        .iter()
        .map(|&seed| SagaConfig {
            seed: Some(seed),
            ..base.clone()
        })
        .collect()
}
