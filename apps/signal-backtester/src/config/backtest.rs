//! Training and search settings.

use serde::{Deserialize, Serialize};

use crate::backtest::SearchConfig;

/// Training and search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestSettings {
    /// Trailing training rows used to score hyperparameter candidates.
    #[serde(default = "default_validation_rows")]
    pub validation_rows: usize,
    /// Train the models of one period concurrently.
    #[serde(default)]
    pub parallel_models: bool,
    /// Rayon worker threads (0 = one per core).
    #[serde(default)]
    pub max_threads: usize,
    /// Candidate count from which grid scoring runs in parallel.
    #[serde(default = "default_min_parallel_candidates")]
    pub min_parallel_candidates: usize,
    /// Log every scored candidate at debug level.
    #[serde(default)]
    pub track_progress: bool,
}

impl Default for BacktestSettings {
    fn default() -> Self {
        Self {
            validation_rows: default_validation_rows(),
            parallel_models: false,
            max_threads: 0,
            min_parallel_candidates: default_min_parallel_candidates(),
            track_progress: false,
        }
    }
}

impl BacktestSettings {
    /// Search configuration for the trainer.
    #[must_use]
    pub const fn search_config(&self) -> SearchConfig {
        SearchConfig {
            validation_rows: self.validation_rows,
            min_parallel_candidates: self.min_parallel_candidates,
            track_progress: self.track_progress,
        }
    }
}

const fn default_validation_rows() -> usize {
    50
}

const fn default_min_parallel_candidates() -> usize {
    4
}
