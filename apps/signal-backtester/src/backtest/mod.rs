//! Walk-forward backtesting engine for trading-signal classifiers.
//!
//! This module provides everything between a loaded dataset and a report:
//!
//! - **Periods**: single, rolling and anchored train/test schedules
//! - **Trainer**: train-only scaling, holdout hyperparameter search, refit
//! - **Slots**: per-model predictions accumulated across periods
//! - **Metrics**: classification quality, compounded and annualized returns
//! - **Reports**: model tables, buy-and-hold benchmark, cumulative-return curves
//!
//! # Example
//!
//! ```ignore
//! use signal_backtester::backtest::{
//!     Backtester, ConsoleSink, ModelSlot, ParameterGrid, RangeSpec, SplitMode, Trainer,
//!     load_csv,
//! };
//!
//! let dataset = load_csv("data/btc.csv")?;
//! let mut backtester = Backtester::new(dataset, "BTC-USD", Trainer::default());
//! backtester.register_models(vec![ModelSlot::new("knn", knn, grid, true)]);
//! backtester.define_periods(&RangeSpec::by_index(0, 500, 750), SplitMode::Rolling { window: 50 })?;
//! backtester.run_backtest(&["knn"])?;
//! let report = backtester.evaluate(&["knn"], &["knn"], &mut ConsoleSink::stdout())?;
//! ```

mod dataset;
mod engine;
mod estimator;
mod loader;
mod logging;
mod metrics;
mod periods;
mod report;
mod scaler;
mod search;
mod slot;
mod trainer;

pub use dataset::{Dataset, Direction};
pub use engine::Backtester;
pub use estimator::{
    Estimator, EstimatorError, ParamSet, ParamValue, ParameterGrid, ParameterGridBuilder,
    check_training_input, describe_params,
};
pub use loader::{load_csv, load_csv_from_str};
pub use logging::{
    BacktestEvent, BacktestLogger, CandidateSelectedEvent, ModelEvaluatedEvent,
    PeriodFinishedEvent, PeriodStartedEvent, ScheduleDefinedEvent, SharpeUndefinedEvent,
};
pub use metrics::{
    ClassificationMetrics, ConfusionCounts, ProfitabilityMetrics, accuracy, annualized_return,
    annualized_volatility, cumulative_returns, daily_returns, format_decimal, format_pct,
    format_ratio, sharpe_ratio,
};
pub use periods::{BacktestPeriod, PeriodSplitter, RangeSpec, SplitMode};
pub use report::{
    BENCHMARK_NAME, BenchmarkRow, ClassificationRow, ConsoleSink, EvaluationReport,
    EvaluationSpan, JsonFileSink, MetricsReporter, ProfitabilityRow, ReportSink, ReturnCurve,
    TuningHistory,
};
pub use scaler::StandardScaler;
pub use search::{
    CandidateScore, HoldoutFold, HoldoutSearch, Progress, ProgressTracker, SearchConfig,
    SearchOutcome,
};
pub use slot::{ModelSlot, TuningRecord};
pub use trainer::Trainer;
