//! Holdout hyperparameter search using Rayon.

use std::time::Instant;

use ndarray::ArrayView2;
use rayon::prelude::*;
use tracing::{Level, debug, span};

use super::config::SearchConfig;
use super::result::{CandidateScore, SearchOutcome};
use crate::backtest::dataset::Direction;
use crate::backtest::estimator::{
    Estimator, EstimatorError, ParamSet, ParameterGrid, describe_params,
};
use crate::backtest::metrics::accuracy;

/// Rows used to fit candidates and rows used to score them.
#[derive(Debug, Clone, Copy)]
pub struct HoldoutFold<'a> {
    /// Leading training rows.
    pub fit_features: ArrayView2<'a, f64>,
    /// Labels of the leading training rows.
    pub fit_labels: &'a [Direction],
    /// Trailing validation rows.
    pub validation_features: ArrayView2<'a, f64>,
    /// Labels of the validation rows.
    pub validation_labels: &'a [Direction],
}

/// Scores every grid candidate on a single fixed validation fold.
#[derive(Debug, Clone)]
pub struct HoldoutSearch {
    config: SearchConfig,
}

impl HoldoutSearch {
    /// Create a new holdout search.
    #[must_use]
    pub const fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    /// Access the search configuration.
    #[must_use]
    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Fit a clone of `base` for every combination of `grid` on the fit rows
    /// and score it on the validation rows.
    ///
    /// Scores are returned in grid order whether or not scoring ran in
    /// parallel, so selection is deterministic.
    ///
    /// # Errors
    ///
    /// Returns the first estimator failure in grid order.
    #[allow(clippy::cast_possible_truncation)]
    pub fn run(
        &self,
        base: &dyn Estimator,
        grid: &ParameterGrid,
        fold: &HoldoutFold<'_>,
    ) -> Result<SearchOutcome, EstimatorError> {
        let combinations = grid.combinations();
        let start_time = Instant::now();

        let scores: Vec<Result<CandidateScore, EstimatorError>> =
            if combinations.len() >= self.config.min_parallel_candidates {
                combinations
                    .par_iter()
                    .enumerate()
                    .map(|(index, params)| self.score_candidate(base, index, params, fold))
                    .collect()
            } else {
                combinations
                    .iter()
                    .enumerate()
                    .map(|(index, params)| self.score_candidate(base, index, params, fold))
                    .collect()
            };
        let scores = scores.into_iter().collect::<Result<Vec<_>, _>>()?;

        let elapsed_ms = start_time.elapsed().as_millis() as u64;
        // the grid always yields at least one combination
        SearchOutcome::from_scores(scores, elapsed_ms).ok_or(EstimatorError::EmptyTrainingSet)
    }

    fn score_candidate(
        &self,
        base: &dyn Estimator,
        index: usize,
        params: &ParamSet,
        fold: &HoldoutFold<'_>,
    ) -> Result<CandidateScore, EstimatorError> {
        let _span = span!(Level::DEBUG, "candidate", index = index);

        let mut candidate = base.boxed_clone();
        candidate.set_params(params)?;
        candidate.fit(fold.fit_features, fold.fit_labels)?;
        let predicted = candidate.predict(fold.validation_features)?;

        let score = accuracy(fold.validation_labels, &predicted).map_err(|_| {
            EstimatorError::ShapeMismatch {
                expected: fold.validation_labels.len(),
                got: predicted.len(),
            }
        })?;

        if self.config.track_progress {
            debug!(
                index = index,
                params = %describe_params(params),
                accuracy = %score,
                "Candidate scored"
            );
        }

        Ok(CandidateScore {
            index,
            params: params.clone(),
            accuracy: score,
        })
    }
}
