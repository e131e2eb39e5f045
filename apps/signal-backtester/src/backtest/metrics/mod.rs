//! Evaluation metrics for out-of-sample predictions.
//!
//! - Classification: accuracy, precision, recall, F1 (positive class `+1`)
//! - Profitability: daily and cumulative strategy returns, annualized
//!   return, annualized volatility, Sharpe ratio

mod classification;
mod constants;
mod format;
mod math;
mod returns;

pub use classification::{ClassificationMetrics, ConfusionCounts, accuracy};
pub use format::{format_decimal, format_pct, format_ratio};
pub use returns::{
    ProfitabilityMetrics, annualized_return, annualized_volatility, cumulative_returns,
    daily_returns, sharpe_ratio,
};
