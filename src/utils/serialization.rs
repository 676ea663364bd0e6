//! # Persistence Utilities
//!
//! Saving and loading solver histories and solution vectors.
//! Uses `serde` for serialization and `bincode` as the binary format.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use super::history::History;

// --- Error Type ---
#[derive(thiserror::Error, Debug)]
pub enum SerializationError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization Error (Bincode): {0}")]
    Bincode(#[from] bincode::Error),
    #[error("Solution length mismatch during loading: expected {expected}, got {got}")]
    ShapeMismatch { expected: usize, got: usize },
}

// --- Serializable solution wrapper ---
// Stored as a flat Vec with its declared length so truncated files are caught.
#[derive(Serialize, Deserialize, Debug)]
struct SerializableSolution {
    len: usize,
    data: Vec<f64>,
}

/// Writes a history to `path`.
pub fn save_history<P: AsRef<Path>>(history: &History, path: P) -> Result<(), SerializationError> {
    let writer = BufWriter::new(File::create(path.as_ref())?);
    bincode::serialize_into(writer, history)?;
    Ok(())
}

/// Reads a history written by [`save_history`].
pub fn load_history<P: AsRef<Path>>(path: P) -> Result<History, SerializationError> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    Ok(bincode::deserialize_from(reader)?)
}

/// Writes a coefficient vector to `path`.
pub fn save_solution<P: AsRef<Path>>(solution: &Array1<f64>, path: P) -> Result<(), SerializationError> {
    let wrapper = SerializableSolution {
        len: solution.len(),
        data: solution.iter().cloned().collect(),
    };
    let writer = BufWriter::new(File::create(path.as_ref())?);
    bincode::serialize_into(writer, &wrapper)?;
    Ok(())
}

/// Reads a coefficient vector written by [`save_solution`].
pub fn load_solution<P: AsRef<Path>>(path: P) -> Result<Array1<f64>, SerializationError> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    let wrapper: SerializableSolution = bincode::deserialize_from(reader)?;
    if wrapper.data.len() != wrapper.len {
        return Err(SerializationError::ShapeMismatch {
            expected: wrapper.len,
            got: wrapper.data.len(),
        });
    }
    Ok(Array1::from(wrapper.data))
}
