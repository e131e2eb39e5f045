// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::items_after_statements
    )
)]

//! Signal Backtester - Rust Core Library
//!
//! Walk-forward evaluation harness for trading-signal classifiers.
//!
//! # Pipeline
//!
//! - **Dataset**: time-ordered feature rows, direction labels, realized returns, dates
//! - **Periods**: single, rolling and anchored train/test window schedules
//! - **Trainer**: leakage-free scaling, holdout hyperparameter search, refit, predict
//! - **Metrics**: classification quality and compounded/annualized profitability
//! - **Report**: per-model tables plus a buy-and-hold benchmark, handed to a sink
//!
//! # Example
//!
//! ```ignore
//! use signal_backtester::backtest::{Backtester, ModelSlot, RangeSpec, SplitMode};
//!
//! let mut backtester = Backtester::new(dataset, "BTC-USD", trainer);
//! backtester.register_models(vec![ModelSlot::new("knn", Box::new(knn), grid, true)]);
//! backtester.define_periods(&RangeSpec::by_index(0, 100, 250), SplitMode::Rolling { window: 50 })?;
//! backtester.run_backtest(&["knn"])?;
//! backtester.evaluate(&["knn"], &["knn"], &mut ConsoleSink::stdout())?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Core
// =============================================================================

/// Walk-forward backtesting engine.
pub mod backtest;

/// Error types.
pub mod error;

// =============================================================================
// Adapters
// =============================================================================

/// Reference estimators used by the command-line runner.
pub mod estimators;

/// YAML configuration loading.
pub mod config;

/// Tracing subscriber setup.
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use backtest::{
    BacktestPeriod, Backtester, Dataset, Direction, EvaluationReport, ModelSlot, RangeSpec,
    SplitMode, Trainer,
};
pub use error::{BacktestError, BacktestResult};
