//! Hyperparameter grid for holdout search.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::params::{ParamSet, ParamValue};

/// Candidate values per hyperparameter, expanded in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterGrid {
    parameters: HashMap<String, Vec<ParamValue>>,
    order: Vec<String>,
}

impl ParameterGrid {
    /// Create a new parameter grid builder.
    #[must_use]
    pub fn builder() -> ParameterGridBuilder {
        ParameterGridBuilder::new()
    }

    /// Grid with no parameters: a single candidate that keeps the estimator's
    /// current settings.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Total number of candidate combinations. An empty grid has one.
    #[must_use]
    pub fn total_combinations(&self) -> usize {
        self.parameters.values().map(Vec::len).product()
    }

    /// Generate all combinations.
    ///
    /// The last-added parameter varies fastest, so the first combination pairs
    /// every parameter's first value.
    #[must_use]
    pub fn combinations(&self) -> Vec<ParamSet> {
        let mut result = vec![ParamSet::new()];

        for param_name in &self.order {
            let Some(values) = self.parameters.get(param_name) else {
                continue;
            };

            let mut expanded = Vec::with_capacity(result.len() * values.len());
            for combo in &result {
                for value in values {
                    let mut next = combo.clone();
                    next.insert(param_name.clone(), value.clone());
                    expanded.push(next);
                }
            }
            result = expanded;
        }

        result
    }

    /// Whether the grid has no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Parameter names in expansion order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.order
    }
}

/// Builder for parameter grids.
#[derive(Debug, Default)]
pub struct ParameterGridBuilder {
    parameters: HashMap<String, Vec<ParamValue>>,
    order: Vec<String>,
}

impl ParameterGridBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add candidate values for `name`. Re-adding a name replaces its values
    /// and keeps its original position.
    #[must_use]
    pub fn add_param(mut self, name: &str, values: Vec<ParamValue>) -> Self {
        if !self.parameters.contains_key(name) {
            self.order.push(name.to_string());
        }
        self.parameters.insert(name.to_string(), values);
        self
    }

    /// Add integer parameter values.
    #[must_use]
    pub fn add_int_param(self, name: &str, values: Vec<i64>) -> Self {
        self.add_param(name, values.into_iter().map(ParamValue::Int).collect())
    }

    /// Add float parameter values.
    #[must_use]
    pub fn add_float_param(self, name: &str, values: Vec<f64>) -> Self {
        self.add_param(name, values.into_iter().map(ParamValue::Float).collect())
    }

    /// Add string parameter values.
    #[must_use]
    pub fn add_string_param(self, name: &str, values: Vec<&str>) -> Self {
        self.add_param(
            name,
            values
                .into_iter()
                .map(|s| ParamValue::String(s.to_string()))
                .collect(),
        )
    }

    /// Build the parameter grid.
    #[must_use]
    pub fn build(self) -> ParameterGrid {
        ParameterGrid {
            parameters: self.parameters,
            order: self.order,
        }
    }
}

impl<S: Into<String>> FromIterator<(S, Vec<ParamValue>)> for ParameterGrid {
    fn from_iter<I: IntoIterator<Item = (S, Vec<ParamValue>)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(ParameterGridBuilder::new(), |builder, (name, values)| {
                let name: String = name.into();
                builder.add_param(&name, values)
            })
            .build()
    }
}
