//! Builds evaluation reports from accumulated slot predictions.

use std::ops::Range;

use super::types::{
    BENCHMARK_NAME, BenchmarkRow, ClassificationRow, EvaluationReport, EvaluationSpan,
    ProfitabilityRow, ReturnCurve, TuningHistory,
};
use crate::backtest::dataset::{Dataset, Direction};
use crate::backtest::metrics::{ClassificationMetrics, ProfitabilityMetrics, cumulative_returns};
use crate::backtest::periods::BacktestPeriod;
use crate::backtest::slot::ModelSlot;
use crate::error::{BacktestError, BacktestResult};

/// Computes metrics over the out-of-sample span of a schedule.
#[derive(Debug, Clone, Copy)]
pub struct MetricsReporter<'a> {
    dataset: &'a Dataset,
    periods: &'a [BacktestPeriod],
}

impl<'a> MetricsReporter<'a> {
    /// Create a reporter for `periods` over `dataset`.
    #[must_use]
    pub const fn new(dataset: &'a Dataset, periods: &'a [BacktestPeriod]) -> Self {
        Self { dataset, periods }
    }

    /// Rows from the first period's test start to the last period's test end.
    ///
    /// # Errors
    ///
    /// Returns `NoPeriods` for an empty schedule and `Range` when the span
    /// is empty or leaves the dataset.
    pub fn span(&self) -> BacktestResult<EvaluationSpan> {
        let (Some(first), Some(last)) = (self.periods.first(), self.periods.last()) else {
            return Err(BacktestError::NoPeriods);
        };
        let rows = first.test.start..last.test.end;
        self.dataset.check_range(&rows, "evaluation span")?;

        let dates = self.dataset.dates();
        Ok(EvaluationSpan {
            start_row: rows.start,
            end_row: rows.end,
            first_date: dates[rows.start],
            last_date: dates[rows.end - 1],
        })
    }

    /// Build the report for `slots`, in the given order.
    ///
    /// # Errors
    ///
    /// Returns `NoPeriods` for an empty schedule, `LengthMismatch` when a
    /// slot's predictions do not cover the span exactly, and metric errors
    /// such as `NumericOverflow`.
    pub fn build(&self, asset: &str, slots: &[&ModelSlot]) -> BacktestResult<EvaluationReport> {
        let span = self.span()?;
        let rows: Range<usize> = span.start_row..span.end_row;
        let labels = self.dataset.label_rows(rows.clone());
        let returns = self.dataset.return_rows(rows);

        let mut classification = Vec::with_capacity(slots.len());
        let mut profitability = Vec::with_capacity(slots.len());
        let mut curves = Vec::with_capacity(slots.len());
        let mut tuning = Vec::with_capacity(slots.len());

        for slot in slots {
            let predictions = slot.predictions();
            if predictions.len() != span.observations() {
                return Err(BacktestError::length_mismatch(
                    format!("predictions of model '{}'", slot.name()),
                    span.observations(),
                    predictions.len(),
                ));
            }

            classification.push(ClassificationRow {
                model: slot.name().to_string(),
                metrics: ClassificationMetrics::compute(labels, predictions)?,
            });
            profitability.push(ProfitabilityRow {
                model: slot.name().to_string(),
                metrics: ProfitabilityMetrics::compute(returns, predictions)?,
            });
            curves.push(ReturnCurve {
                label: slot.name().to_string(),
                values: cumulative_returns(returns, predictions)?,
            });
            tuning.push(TuningHistory {
                model: slot.name().to_string(),
                records: slot.tuning_history().to_vec(),
            });
        }

        let hold = vec![Direction::Up; span.observations()];
        let benchmark = BenchmarkRow {
            name: BENCHMARK_NAME.to_string(),
            classification: ClassificationMetrics::compute(labels, &hold)?,
            profitability: ProfitabilityMetrics::compute(returns, &hold)?,
        };
        let benchmark_curve = ReturnCurve {
            label: "BnH".to_string(),
            values: cumulative_returns(returns, &hold)?,
        };

        Ok(EvaluationReport {
            asset: asset.to_string(),
            span,
            classification,
            profitability,
            benchmark,
            curves,
            benchmark_curve,
            tuning,
        })
    }
}
