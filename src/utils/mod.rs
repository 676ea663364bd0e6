//! # Utility Functions (`utils`)
//!
//! History recording, persistence, and running independent solvers in parallel.

pub mod history;
pub mod parallel;
pub mod serialization;

pub use history::{History, HistoryEntry, Recorder};
pub use parallel::{seeded_configs, solve_independent};
pub use serialization::{load_history, load_solution, save_history, save_solution, SerializationError};
