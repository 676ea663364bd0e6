//! # Optimization Algorithms (`optim`)
//!
//! The SAGA incremental gradient solver and the components it is assembled
//! from: index sampling, the gradient memory, the phase-iterate tracker and
//! the per-epoch stopping test.

// --- Submodules ---
pub mod config;
pub mod memory;
pub mod saga;
pub mod sampler;
pub mod stopping;
pub mod variance;

// Re-export the solver surface
pub use config::{RandType, SagaConfig, SagaParams, VarianceReduction};
pub use memory::GradientMemory;
pub use saga::{variance_reduced_direction, variance_reduced_direction_into, Divergence, Saga, SolveReport, SolveStatus, SolverState};
pub use sampler::RandomSampler;
pub use stopping::{StopCheck, StoppingCriterion};
pub use variance::VarianceReductionTracker;
