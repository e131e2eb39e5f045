//! Candidate model configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::backtest::{Estimator, ModelSlot, ParamSet, ParamValue, ParameterGrid};
use crate::estimators::{KnnClassifier, LogisticRegression, VotingClassifier};

/// Reference estimator kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// k-nearest neighbours.
    Knn,
    /// Logistic regression.
    Logistic,
    /// Hard-vote ensemble over other configured models.
    Voting,
}

/// One candidate model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Unique slot name.
    pub name: String,
    /// Estimator kind.
    pub kind: ModelKind,
    /// Standardize features on the training rows before fitting.
    #[serde(default)]
    pub scaling: bool,
    /// Fixed hyperparameters applied before any search.
    #[serde(default)]
    pub params: ParamSet,
    /// Candidate values searched per period. Parameters expand in name order.
    #[serde(default)]
    pub grid: BTreeMap<String, Vec<ParamValue>>,
    /// Member model names (`voting` only).
    #[serde(default)]
    pub members: Vec<String>,
}

impl ModelConfig {
    /// Search grid for this model.
    #[must_use]
    pub fn parameter_grid(&self) -> ParameterGrid {
        self.grid
            .iter()
            .map(|(name, values)| (name.clone(), values.clone()))
            .collect()
    }

    /// Build the configured estimator with its fixed parameters applied.
    ///
    /// Voting members are built from their own entries in `all`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for rejected parameters or unknown members.
    pub fn build_estimator(&self, all: &[Self]) -> Result<Box<dyn Estimator>, ConfigError> {
        let mut estimator: Box<dyn Estimator> = match self.kind {
            ModelKind::Knn => Box::new(KnnClassifier::default()),
            ModelKind::Logistic => Box::new(LogisticRegression::default()),
            ModelKind::Voting => {
                let members = self
                    .members
                    .iter()
                    .map(|name| -> Result<(String, Box<dyn Estimator>), ConfigError> {
                        let member = all.iter().find(|m| &m.name == name).ok_or_else(|| {
                            ConfigError::ValidationError(format!(
                                "model '{}' lists unknown member '{name}'",
                                self.name
                            ))
                        })?;
                        Ok((name.clone(), member.build_estimator(all)?))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Box::new(VotingClassifier::new(members))
            }
        };

        if !self.params.is_empty() {
            estimator.set_params(&self.params).map_err(|e| {
                ConfigError::ValidationError(format!("model '{}': {e}", self.name))
            })?;
        }
        Ok(estimator)
    }

    /// Build the backtest slot for this model.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` when the estimator cannot be built.
    pub fn build_slot(&self, all: &[Self]) -> Result<ModelSlot, ConfigError> {
        Ok(ModelSlot::new(
            self.name.clone(),
            self.build_estimator(all)?,
            self.parameter_grid(),
            self.scaling,
        ))
    }
}

/// Build one slot per configured model, in config order.
///
/// # Errors
///
/// Returns `ValidationError` when any estimator cannot be built.
pub fn build_slots(models: &[ModelConfig]) -> Result<Vec<ModelSlot>, ConfigError> {
    models.iter().map(|model| model.build_slot(models)).collect()
}
