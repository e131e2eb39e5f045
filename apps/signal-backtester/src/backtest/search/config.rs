//! Configuration for holdout hyperparameter search.

use serde::{Deserialize, Serialize};

/// Configuration for holdout hyperparameter search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Trailing training rows held out to score candidates.
    pub validation_rows: usize,

    /// Minimum candidate count before scoring runs in parallel.
    pub min_parallel_candidates: usize,

    /// Whether to log per-candidate progress.
    pub track_progress: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            validation_rows: 50,
            min_parallel_candidates: 4,
            track_progress: false,
        }
    }
}
