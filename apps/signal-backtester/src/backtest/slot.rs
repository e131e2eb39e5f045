//! Per-candidate model state accumulated across periods.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::dataset::Direction;
use super::estimator::{Estimator, ParamSet, ParameterGrid};
use super::periods::BacktestPeriod;

/// Selection outcome for one processed period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuningRecord {
    /// Period that was trained.
    pub period: BacktestPeriod,
    /// Winning hyperparameters.
    pub params: ParamSet,
    /// Validation-fold accuracy of the winner.
    pub validation_accuracy: Decimal,
    /// Number of candidates scored.
    pub candidates: usize,
}

/// A named candidate model and its out-of-sample history.
///
/// The trainer mutates a slot once per period: the estimator is replaced by
/// the tuned, refit configuration and that period's test predictions are
/// appended. Predictions therefore stay in period order.
#[derive(Debug, Clone)]
pub struct ModelSlot {
    name: String,
    estimator: Box<dyn Estimator>,
    grid: ParameterGrid,
    scaling: bool,
    predictions: Vec<Direction>,
    tuning_history: Vec<TuningRecord>,
}

impl ModelSlot {
    /// Create a new slot with empty predictions.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        estimator: Box<dyn Estimator>,
        grid: ParameterGrid,
        scaling: bool,
    ) -> Self {
        Self {
            name: name.into(),
            estimator,
            grid,
            scaling,
            predictions: Vec::new(),
            tuning_history: Vec::new(),
        }
    }

    /// Unique slot name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current estimator (the last tuned configuration after a run).
    #[must_use]
    pub fn estimator(&self) -> &dyn Estimator {
        self.estimator.as_ref()
    }

    /// Hyperparameter search space.
    #[must_use]
    pub const fn grid(&self) -> &ParameterGrid {
        &self.grid
    }

    /// Whether features are standardized before fitting.
    #[must_use]
    pub const fn scaling(&self) -> bool {
        self.scaling
    }

    /// Out-of-sample predictions, concatenated in period order.
    #[must_use]
    pub fn predictions(&self) -> &[Direction] {
        &self.predictions
    }

    /// One record per processed period.
    #[must_use]
    pub fn tuning_history(&self) -> &[TuningRecord] {
        &self.tuning_history
    }

    /// Drop accumulated predictions and tuning history.
    pub fn reset(&mut self) {
        self.predictions.clear();
        self.tuning_history.clear();
    }

    /// Record the outcome of one period.
    pub(crate) fn commit(
        &mut self,
        estimator: Box<dyn Estimator>,
        predictions: &[Direction],
        record: TuningRecord,
    ) {
        self.estimator = estimator;
        self.predictions.extend_from_slice(predictions);
        self.tuning_history.push(record);
    }
}
