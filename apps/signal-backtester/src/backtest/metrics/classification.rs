//! Classification quality of direction predictions.
//!
//! The positive class is `+1` (up). Precision, recall and F1 fall back to
//! zero when their denominators are zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::backtest::dataset::Direction;
use crate::error::{BacktestError, BacktestResult};

/// Confusion matrix counts for the `+1` class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionCounts {
    /// Predicted up, was up.
    pub true_positives: u64,
    /// Predicted up, was down.
    pub false_positives: u64,
    /// Predicted down, was down.
    pub true_negatives: u64,
    /// Predicted down, was up.
    pub false_negatives: u64,
}

impl ConfusionCounts {
    /// Tally predictions against true labels.
    ///
    /// # Errors
    ///
    /// Returns `LengthMismatch` when the inputs differ in length.
    pub fn tally(labels: &[Direction], predictions: &[Direction]) -> BacktestResult<Self> {
        if labels.len() != predictions.len() {
            return Err(BacktestError::length_mismatch(
                "predictions",
                labels.len(),
                predictions.len(),
            ));
        }

        let mut counts = Self::default();
        for (truth, predicted) in labels.iter().zip(predictions) {
            match (predicted, truth) {
                (Direction::Up, Direction::Up) => counts.true_positives += 1,
                (Direction::Up, Direction::Down) => counts.false_positives += 1,
                (Direction::Down, Direction::Down) => counts.true_negatives += 1,
                (Direction::Down, Direction::Up) => counts.false_negatives += 1,
            }
        }
        Ok(counts)
    }

    /// Total observations.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }
}

fn ratio(numerator: u64, denominator: u64) -> Decimal {
    if denominator == 0 {
        return Decimal::ZERO;
    }
    Decimal::from(numerator) / Decimal::from(denominator)
}

/// Accuracy, precision, recall and F1 for one prediction sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    /// Share of correct predictions.
    pub accuracy: Decimal,
    /// TP / (TP + FP).
    pub precision: Decimal,
    /// TP / (TP + FN).
    pub recall: Decimal,
    /// Harmonic mean of precision and recall.
    pub f1_score: Decimal,
}

impl ClassificationMetrics {
    /// Compute the metrics from confusion counts.
    #[must_use]
    pub fn from_counts(counts: &ConfusionCounts) -> Self {
        let accuracy = ratio(counts.true_positives + counts.true_negatives, counts.total());
        let precision = ratio(
            counts.true_positives,
            counts.true_positives + counts.false_positives,
        );
        let recall = ratio(
            counts.true_positives,
            counts.true_positives + counts.false_negatives,
        );
        // 2PR / (P + R) expressed in counts
        let f1_score = ratio(
            2 * counts.true_positives,
            2 * counts.true_positives + counts.false_positives + counts.false_negatives,
        );

        Self {
            accuracy,
            precision,
            recall,
            f1_score,
        }
    }

    /// Compute the metrics for `predictions` against `labels`.
    ///
    /// # Errors
    ///
    /// Returns `LengthMismatch` when the inputs differ in length.
    pub fn compute(labels: &[Direction], predictions: &[Direction]) -> BacktestResult<Self> {
        Ok(Self::from_counts(&ConfusionCounts::tally(labels, predictions)?))
    }
}

/// Share of matching predictions. Zero for empty input.
///
/// # Errors
///
/// Returns `LengthMismatch` when the inputs differ in length.
pub fn accuracy(labels: &[Direction], predictions: &[Direction]) -> BacktestResult<Decimal> {
    let counts = ConfusionCounts::tally(labels, predictions)?;
    Ok(ratio(
        counts.true_positives + counts.true_negatives,
        counts.total(),
    ))
}
