//! Reference estimators.
//!
//! Small, dependency-free classifiers implementing [`Estimator`] so the
//! command-line runner has something to backtest:
//!
//! - [`KnnClassifier`]: k-nearest-neighbours majority vote
//! - [`LogisticRegression`]: L2-regularized logistic regression
//! - [`VotingClassifier`]: hard-vote ensemble over other estimators
//!
//! [`Estimator`]: crate::backtest::Estimator

mod knn;
mod logistic;
mod voting;

pub use knn::{KnnClassifier, Weighting};
pub use logistic::LogisticRegression;
pub use voting::VotingClassifier;
