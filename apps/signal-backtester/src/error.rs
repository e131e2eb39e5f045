//! Error types for the walk-forward backtester.
//!
//! Every variant is a local precondition violation detected before the
//! expensive part of an operation runs. None of them are retried internally:
//! the failing operation (schedule definition, period training, metric
//! computation) is aborted and the error is returned to the caller.
//!
//! | Variant | Raised by |
//! |---------|-----------|
//! | `Range` | Period splitter, evaluation span, annualization with zero observations |
//! | `DateNotFound` | Date bounds absent from the dataset index |
//! | `InsufficientData` | Trainer, when the training range cannot hold the validation fold |
//! | `UnknownModel` | Orchestrator, for names that were never registered |
//! | `NoPeriods` | Orchestrator, when running or evaluating without a schedule |
//! | `LengthMismatch` | Returns/metrics functions and the reporter |
//! | `InvalidDataset` | Dataset construction and the CSV loader |
//! | `Estimator` | Trainer, wrapping a failing fit/predict call |
//! | `NumericOverflow` | Annualized return outside the decimal range |
//!
//! A Sharpe ratio with zero volatility is deliberately *not* an error: it is
//! reported as an explicit undefined value (`None`).

use thiserror::Error;

use crate::backtest::EstimatorError;

/// Errors raised by the backtesting core.
#[derive(Debug, Error)]
pub enum BacktestError {
    /// Train/test bounds are empty, out of order, overlapping or outside the dataset.
    #[error("RANGE_ERROR: {message}")]
    Range {
        /// Description of the violated bound.
        message: String,
    },

    /// A date bound does not exist in the dataset index.
    #[error("RANGE_ERROR: date {date} not found in dataset index")]
    DateNotFound {
        /// The missing date (ISO 8601).
        date: String,
    },

    /// The training range is too short for the fixed validation fold.
    #[error(
        "INSUFFICIENT_DATA: training range has {train_rows} rows, validation fold needs {validation_rows} plus at least one fitting row"
    )]
    InsufficientData {
        /// Rows available in the training range.
        train_rows: usize,
        /// Configured validation fold size.
        validation_rows: usize,
    },

    /// A requested model name is not registered.
    #[error("UNKNOWN_MODEL: no model registered under '{name}'")]
    UnknownModel {
        /// The unknown name.
        name: String,
    },

    /// An operation needs at least one backtest period.
    #[error("NO_PERIODS: no backtest periods defined")]
    NoPeriods,

    /// Two aligned sequences have different lengths.
    #[error("LENGTH_MISMATCH: {what} has {got} entries, expected {expected}")]
    LengthMismatch {
        /// What was being aligned.
        what: String,
        /// Expected length.
        expected: usize,
        /// Actual length.
        got: usize,
    },

    /// The dataset violates its construction invariants.
    #[error("INVALID_DATASET: {0}")]
    InvalidDataset(String),

    /// An estimator failed to fit or predict.
    #[error("ESTIMATOR_ERROR: model '{model}': {source}")]
    Estimator {
        /// Model slot name.
        model: String,
        /// Underlying estimator failure.
        #[source]
        source: EstimatorError,
    },

    /// A metric is not representable in decimal arithmetic.
    #[error("NUMERIC_OVERFLOW: {metric} is out of range")]
    NumericOverflow {
        /// Metric name.
        metric: String,
    },

    /// Reading a data file failed.
    #[error("IO_ERROR: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing a CSV data file failed.
    #[error("CSV_ERROR: {0}")]
    Csv(#[from] csv::Error),

    /// Writing a report document failed.
    #[error("SERIALIZATION_ERROR: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BacktestError {
    /// Build a `Range` error from any message.
    pub fn range(message: impl Into<String>) -> Self {
        Self::Range {
            message: message.into(),
        }
    }

    /// Build a `LengthMismatch` error.
    pub fn length_mismatch(what: impl Into<String>, expected: usize, got: usize) -> Self {
        Self::LengthMismatch {
            what: what.into(),
            expected,
            got,
        }
    }

    /// Stable reason string for the error kind.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Range { .. } | Self::DateNotFound { .. } => "RANGE_ERROR",
            Self::InsufficientData { .. } => "INSUFFICIENT_DATA",
            Self::UnknownModel { .. } => "UNKNOWN_MODEL",
            Self::NoPeriods => "NO_PERIODS",
            Self::LengthMismatch { .. } => "LENGTH_MISMATCH",
            Self::InvalidDataset(_) => "INVALID_DATASET",
            Self::Estimator { .. } => "ESTIMATOR_ERROR",
            Self::NumericOverflow { .. } => "NUMERIC_OVERFLOW",
            Self::Io(_) => "IO_ERROR",
            Self::Csv(_) => "CSV_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }
}

/// Result alias for backtesting operations.
pub type BacktestResult<T> = Result<T, BacktestError>;
