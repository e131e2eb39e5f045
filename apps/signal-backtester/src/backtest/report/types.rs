//! Evaluation report types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::backtest::metrics::{ClassificationMetrics, ProfitabilityMetrics};
use crate::backtest::slot::TuningRecord;

/// Row label of the passive benchmark.
pub const BENCHMARK_NAME: &str = "Buy and Hold";

/// Contiguous out-of-sample span covered by the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationSpan {
    /// First test row.
    pub start_row: usize,
    /// One past the last test row.
    pub end_row: usize,
    /// Date of the first test row.
    pub first_date: NaiveDate,
    /// Date of the last test row.
    pub last_date: NaiveDate,
}

impl EvaluationSpan {
    /// Number of observations in the span.
    #[must_use]
    pub const fn observations(&self) -> usize {
        self.end_row - self.start_row
    }
}

/// Classification table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRow {
    /// Model name.
    pub model: String,
    /// Metrics against the true labels.
    #[serde(flatten)]
    pub metrics: ClassificationMetrics,
}

/// Profitability table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitabilityRow {
    /// Model name.
    pub model: String,
    /// Metrics of the long/flat strategy.
    #[serde(flatten)]
    pub metrics: ProfitabilityMetrics,
}

/// Benchmark row: always long over the span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkRow {
    /// Row label.
    pub name: String,
    /// Classification metrics of all-up predictions.
    pub classification: ClassificationMetrics,
    /// Profitability of holding the asset throughout.
    pub profitability: ProfitabilityMetrics,
}

/// Cumulative-return series for plotting; starts at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnCurve {
    /// Curve label.
    pub label: String,
    /// Cumulative return after each step, `observations + 1` points.
    pub values: Vec<Decimal>,
}

impl ReturnCurve {
    /// Last value of the curve.
    #[must_use]
    pub fn final_value(&self) -> Decimal {
        self.values.last().copied().unwrap_or(Decimal::ZERO)
    }
}

/// Per-period hyperparameter selections of one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuningHistory {
    /// Model name.
    pub model: String,
    /// One record per period, in period order.
    pub records: Vec<TuningRecord>,
}

/// Full evaluation of a backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Asset the dataset describes.
    pub asset: String,
    /// Evaluated span.
    pub span: EvaluationSpan,
    /// Classification rows, in requested model order.
    pub classification: Vec<ClassificationRow>,
    /// Profitability rows, in requested model order.
    pub profitability: Vec<ProfitabilityRow>,
    /// Buy-and-hold benchmark.
    pub benchmark: BenchmarkRow,
    /// Model cumulative-return curves, in requested model order.
    pub curves: Vec<ReturnCurve>,
    /// Benchmark cumulative-return curve.
    pub benchmark_curve: ReturnCurve,
    /// Hyperparameter selections per model.
    pub tuning: Vec<TuningHistory>,
}

impl EvaluationReport {
    /// Number of evaluated models.
    #[must_use]
    pub fn model_count(&self) -> usize {
        self.classification.len()
    }

    /// Curves of `names` (unknown names skipped) followed by the benchmark curve.
    #[must_use]
    pub fn plot_curves(&self, names: &[&str]) -> Vec<&ReturnCurve> {
        names
            .iter()
            .filter_map(|name| self.curves.iter().find(|c| c.label == *name))
            .chain(std::iter::once(&self.benchmark_curve))
            .collect()
    }

    /// Plot title.
    #[must_use]
    pub fn plot_title(&self) -> String {
        format!("Cumulative return for {}", self.asset)
    }
}
