//! # rsaga Core Library
//!
//! This crate provides a Rust implementation of the SAGA incremental gradient
//! method for composite problems `min (1/n) Σ f_i(x) + g(x)`, together with the
//! generalized linear models and proximal operators it is usually paired with.
//! It's designed to be used both directly in Rust and via Python bindings.
//!
//! ```ignore
//! let model = Arc::new(ModelLinReg::new(features, labels, true)?);
//! let mut solver = Saga::new(SagaConfig { max_iter: 50, ..SagaConfig::default() })?;
//! solver.set_model(model)?.set_prox(ProxL2Sq::new(1e-2));
//! let report = solver.solve(None)?;
//! ```

pub mod bindings; // PyO3 module, behind the `python` feature
pub mod error;
pub mod model;
pub mod optim;
pub mod prox;
pub mod utils;

pub mod prelude {
    pub use crate::error::{Result, SolverError};
    pub use crate::model::{GeneralizedLinear, Model, ModelLinReg, ModelLogReg};
    pub use crate::optim::{RandType, Saga, SagaConfig, SagaParams, SolveReport, SolveStatus, SolverState, VarianceReduction};
    pub use crate::prox::{Penalty, Prox, ProxL1, ProxL2Sq, ProxZero};
    pub use crate::utils::{History, HistoryEntry, Recorder};
}
