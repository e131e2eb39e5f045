//! Estimator capability consumed by the trainer.
//!
//! The trainer never looks inside a learning algorithm. Anything that can be
//! fit on feature rows and direction labels, predict directions for new rows
//! and expose its hyperparameters can be backtested.

mod grid;
mod params;

use std::fmt;

use ndarray::ArrayView2;
use thiserror::Error;

use super::dataset::Direction;

pub use grid::{ParameterGrid, ParameterGridBuilder};
pub use params::{ParamSet, ParamValue, describe_params};

/// Errors raised by estimators.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EstimatorError {
    /// `predict` called before a successful `fit`.
    #[error("NOT_FITTED: estimator must be fit before predicting")]
    NotFitted,

    /// Training set has no rows.
    #[error("EMPTY_TRAINING_SET: cannot fit on zero rows")]
    EmptyTrainingSet,

    /// Feature matrix and labels (or fitted width) disagree.
    #[error("SHAPE_MISMATCH: expected {expected}, got {got}")]
    ShapeMismatch {
        /// Expected size.
        expected: usize,
        /// Actual size.
        got: usize,
    },

    /// Parameter name not recognised by the estimator.
    #[error("UNKNOWN_PARAMETER: '{name}'")]
    UnknownParameter {
        /// Parameter name.
        name: String,
    },

    /// Parameter value out of range or of the wrong type.
    #[error("INVALID_PARAMETER: '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// What is wrong with the value.
        message: String,
    },
}

impl EstimatorError {
    /// Build an `InvalidParameter` error.
    pub fn invalid(name: &str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            message: message.into(),
        }
    }
}

/// A trainable direction classifier.
///
/// `fit` replaces any previously learned state. `set_params` changes
/// hyperparameters and invalidates learned state.
pub trait Estimator: Send + Sync + fmt::Debug {
    /// Short algorithm name for logs.
    fn kind(&self) -> &'static str;

    /// Learn from `features` (one row per observation) and `labels`.
    ///
    /// # Errors
    ///
    /// Returns an error for empty or misaligned input.
    fn fit(
        &mut self,
        features: ArrayView2<'_, f64>,
        labels: &[Direction],
    ) -> Result<(), EstimatorError>;

    /// Predict one direction per row of `features`.
    ///
    /// # Errors
    ///
    /// Returns `NotFitted` before `fit`, or a shape error for a feature width
    /// that differs from training.
    fn predict(&self, features: ArrayView2<'_, f64>) -> Result<Vec<Direction>, EstimatorError>;

    /// Current hyperparameters.
    fn params(&self) -> ParamSet;

    /// Apply a (possibly partial) set of hyperparameters.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown names or invalid values.
    fn set_params(&mut self, params: &ParamSet) -> Result<(), EstimatorError>;

    /// Clone into a new box.
    fn boxed_clone(&self) -> Box<dyn Estimator>;
}

impl Clone for Box<dyn Estimator> {
    fn clone(&self) -> Self {
        self.boxed_clone()
    }
}

/// Check that `features` and `labels` describe the same non-empty set of rows.
///
/// # Errors
///
/// Returns `EmptyTrainingSet` or `ShapeMismatch`.
pub fn check_training_input(
    features: ArrayView2<'_, f64>,
    labels: &[Direction],
) -> Result<(), EstimatorError> {
    if features.nrows() == 0 {
        return Err(EstimatorError::EmptyTrainingSet);
    }
    if features.nrows() != labels.len() {
        return Err(EstimatorError::ShapeMismatch {
            expected: features.nrows(),
            got: labels.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use ndarray::{Array2, array};

    use super::*;

    #[test]
    fn test_check_training_input() {
        let features = array![[1.0], [2.0]];
        assert!(check_training_input(features.view(), &[Direction::Up, Direction::Down]).is_ok());
        assert_eq!(
            check_training_input(features.view(), &[Direction::Up]),
            Err(EstimatorError::ShapeMismatch {
                expected: 2,
                got: 1
            })
        );
        let empty: Array2<f64> = Array2::zeros((0, 1));
        assert_eq!(
            check_training_input(empty.view(), &[]),
            Err(EstimatorError::EmptyTrainingSet)
        );
    }

    #[test]
    fn test_error_display() {
        let err = EstimatorError::invalid("n_neighbors", "must be positive");
        assert_eq!(
            err.to_string(),
            "INVALID_PARAMETER: 'n_neighbors': must be positive"
        );
    }
}
