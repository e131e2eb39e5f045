//! Result types for holdout search.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::backtest::estimator::ParamSet;

/// Validation score of one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    /// Position in grid order.
    pub index: usize,
    /// Candidate hyperparameters.
    pub params: ParamSet,
    /// Accuracy on the validation fold.
    pub accuracy: Decimal,
}

/// Outcome of scoring every grid candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// All candidate scores, in grid order.
    pub scores: Vec<CandidateScore>,
    /// Index of the winner in `scores`.
    pub best_index: usize,
    /// Wall time spent scoring, in milliseconds.
    pub total_time_ms: u64,
}

impl SearchOutcome {
    /// Pick the highest accuracy; the earliest candidate wins ties.
    ///
    /// Returns `None` for an empty score list.
    #[must_use]
    pub fn from_scores(scores: Vec<CandidateScore>, total_time_ms: u64) -> Option<Self> {
        let best_index = scores
            .iter()
            .enumerate()
            .fold(None::<(usize, Decimal)>, |best, (i, score)| match best {
                Some((_, top)) if score.accuracy <= top => best,
                _ => Some((i, score.accuracy)),
            })
            .map(|(i, _)| i)?;

        Some(Self {
            scores,
            best_index,
            total_time_ms,
        })
    }

    /// The winning candidate.
    #[must_use]
    pub fn best(&self) -> &CandidateScore {
        &self.scores[self.best_index]
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::backtest::estimator::ParamValue;

    fn score(index: usize, accuracy: Decimal) -> CandidateScore {
        let mut params = ParamSet::new();
        params.insert("k".to_string(), ParamValue::Int(index as i64));
        CandidateScore {
            index,
            params,
            accuracy,
        }
    }

    #[test]
    fn test_best_is_highest_accuracy() {
        let outcome = SearchOutcome::from_scores(
            vec![score(0, dec!(0.5)), score(1, dec!(0.7)), score(2, dec!(0.6))],
            3,
        )
        .unwrap();
        assert_eq!(outcome.best_index, 1);
        assert_eq!(outcome.best().accuracy, dec!(0.7));
    }

    #[test]
    fn test_tie_goes_to_earliest() {
        let outcome = SearchOutcome::from_scores(
            vec![score(0, dec!(0.4)), score(1, dec!(0.6)), score(2, dec!(0.60))],
            0,
        )
        .unwrap();
        assert_eq!(outcome.best_index, 1);
    }

    #[test]
    fn test_empty_scores() {
        assert!(SearchOutcome::from_scores(vec![], 0).is_none());
    }
}
