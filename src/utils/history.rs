//! # Solver History
//!
//! Append-only trace of epoch-boundary snapshots. The solver pushes entries
//! through the [`Recorder`] trait and never reads them back.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// One recorded epoch boundary. Epoch `0` is the initial point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub epoch: usize,
    pub objective: f64,
    pub rel_delta: f64,
    pub rel_obj: f64,
    pub iterate: Array1<f64>,
}

/// Sink for history entries.
pub trait Recorder {
    fn record(&mut self, entry: HistoryEntry);
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        History::default()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recorded epoch numbers, in order.
    pub fn epochs(&self) -> Vec<usize> {
        self.entries.iter().map(|e| e.epoch).collect()
    }

    /// Recorded objective values, in order.
    pub fn objectives(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.objective).collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Recorder for History {
    fn record(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }
}
