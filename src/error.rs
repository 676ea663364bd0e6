//! # Solver Errors
//!
//! Error type shared by the configuration layer, the model/prox plumbing and
//! the SAGA engine. Numerical divergence is not an error; it ends a solve with
//! a [`crate::optim::SolveReport`] whose status is `Diverged`.

#[derive(thiserror::Error, Debug, Clone)]
pub enum SolverError {
    /// Invalid construction parameter (unknown enum string, negative tol, ...).
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// The model lacks what SAGA needs from a gradient provider.
    #[error("Incompatible model: {0}")]
    IncompatibleModel(String),
    /// `solve` was called before a model and a prox were attached.
    #[error("Solver is not initialized: {0}")]
    UninitializedSolver(String),
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },
    #[error("ndarray error: {0}")]
    Ndarray(#[from] ndarray::ShapeError),
}

pub type Result<T> = std::result::Result<T, SolverError>;
