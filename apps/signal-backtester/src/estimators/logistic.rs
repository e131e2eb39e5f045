//! L2-regularized logistic regression fit by batch gradient descent.

use ndarray::{Array1, ArrayView2};
use tracing::trace;

use crate::backtest::{
    Direction, Estimator, EstimatorError, ParamSet, ParamValue, check_training_input,
};

const TOLERANCE: f64 = 1e-6;

/// Logistic regression over direction labels (`Up` = 1, `Down` = 0).
///
/// Hyperparameters: `C` (inverse regularization strength, > 0),
/// `max_iter` (>= 1), `learning_rate` (> 0). Predicts `Up` when the
/// probability is strictly above one half.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    c: f64,
    max_iter: usize,
    learning_rate: f64,
    weights: Option<Array1<f64>>,
    bias: f64,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl LogisticRegression {
    /// Create an unfitted model with inverse regularization strength `c`.
    #[must_use]
    pub const fn new(c: f64) -> Self {
        Self {
            c,
            max_iter: 500,
            learning_rate: 0.1,
            weights: None,
            bias: 0.0,
        }
    }

    fn sigmoid(z: f64) -> f64 {
        if z >= 0.0 {
            1.0 / (1.0 + (-z).exp())
        } else {
            let exp_z = z.exp();
            exp_z / (1.0 + exp_z)
        }
    }

    /// Probability of `Up` per row.
    ///
    /// # Errors
    ///
    /// Returns `NotFitted` before `fit` and `ShapeMismatch` for a different width.
    pub fn predict_proba(
        &self,
        features: ArrayView2<'_, f64>,
    ) -> Result<Array1<f64>, EstimatorError> {
        let weights = self.weights.as_ref().ok_or(EstimatorError::NotFitted)?;
        if features.ncols() != weights.len() {
            return Err(EstimatorError::ShapeMismatch {
                expected: weights.len(),
                got: features.ncols(),
            });
        }
        Ok((features.dot(weights) + self.bias).mapv(Self::sigmoid))
    }
}

impl Estimator for LogisticRegression {
    fn kind(&self) -> &'static str {
        "logistic"
    }

    fn fit(
        &mut self,
        features: ArrayView2<'_, f64>,
        labels: &[Direction],
    ) -> Result<(), EstimatorError> {
        check_training_input(features, labels)?;

        let n = features.nrows() as f64;
        let alpha = 1.0 / (self.c * n);
        let targets: Array1<f64> = labels
            .iter()
            .map(|d| if d.is_up() { 1.0 } else { 0.0 })
            .collect();

        let mut weights = Array1::<f64>::zeros(features.ncols());
        let mut bias = 0.0;
        for iter in 0..self.max_iter {
            let probabilities = (features.dot(&weights) + bias).mapv(Self::sigmoid);
            let errors = &probabilities - &targets;
            let grad_w = features.t().dot(&errors) / n + &weights * alpha;
            let grad_b = errors.sum() / n;

            weights = &weights - &(&grad_w * self.learning_rate);
            bias -= self.learning_rate * grad_b;

            let step = grad_w.iter().map(|g| g.abs()).fold(grad_b.abs(), f64::max);
            if step < TOLERANCE {
                trace!(iter = iter, "Logistic regression converged");
                break;
            }
        }

        self.weights = Some(weights);
        self.bias = bias;
        Ok(())
    }

    fn predict(&self, features: ArrayView2<'_, f64>) -> Result<Vec<Direction>, EstimatorError> {
        Ok(self
            .predict_proba(features)?
            .iter()
            .map(|p| if *p > 0.5 { Direction::Up } else { Direction::Down })
            .collect())
    }

    fn params(&self) -> ParamSet {
        let mut params = ParamSet::new();
        params.insert("C".to_string(), ParamValue::Float(self.c));
        params.insert("max_iter".to_string(), ParamValue::Int(self.max_iter as i64));
        params.insert(
            "learning_rate".to_string(),
            ParamValue::Float(self.learning_rate),
        );
        params
    }

    fn set_params(&mut self, params: &ParamSet) -> Result<(), EstimatorError> {
        let positive = |name: &str, value: &ParamValue| {
            value
                .as_float()
                .filter(|v| *v > 0.0 && v.is_finite())
                .ok_or_else(|| EstimatorError::invalid(name, "expected a positive number"))
        };
        for (name, value) in params {
            match name.as_str() {
                "C" => self.c = positive(name.as_str(), value)?,
                "learning_rate" => self.learning_rate = positive(name.as_str(), value)?,
                "max_iter" => {
                    let iterations = value
                        .as_int()
                        .filter(|v| *v >= 1)
                        .ok_or_else(|| EstimatorError::invalid(name, "expected an integer >= 1"))?;
                    self.max_iter = iterations as usize;
                }
                _ => return Err(EstimatorError::UnknownParameter { name: name.clone() }),
            }
        }
        self.weights = None;
        self.bias = 0.0;
        Ok(())
    }

    fn boxed_clone(&self) -> Box<dyn Estimator> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{Array2, array};

    use super::*;
    use crate::backtest::Direction::{Down, Up};

    fn separable() -> (Array2<f64>, Vec<Direction>) {
        let x = array![[-2.0], [-1.5], [-1.0], [-0.5], [0.5], [1.0], [1.5], [2.0]];
        let y = vec![Down, Down, Down, Down, Up, Up, Up, Up];
        (x, y)
    }

    #[test]
    fn test_fits_separable_data() {
        let (x, y) = separable();
        let mut model = LogisticRegression::new(10.0);
        model.fit(x.view(), &y).unwrap();

        assert_eq!(model.predict(x.view()).unwrap(), y);
        let proba = model.predict_proba(array![[3.0], [-3.0]].view()).unwrap();
        assert!(proba[0] > 0.9);
        assert!(proba[1] < 0.1);
    }

    #[test]
    fn test_strong_regularization_shrinks_weights() {
        let (x, y) = separable();
        let mut loose = LogisticRegression::new(100.0);
        let mut tight = LogisticRegression::new(0.1);
        loose.fit(x.view(), &y).unwrap();
        tight.fit(x.view(), &y).unwrap();

        let w = |m: &LogisticRegression| m.weights.as_ref().unwrap()[0].abs();
        assert!(w(&tight) < w(&loose));
    }

    #[test]
    fn test_predict_before_fit() {
        let model = LogisticRegression::default();
        assert_eq!(
            model.predict(array![[1.0]].view()),
            Err(EstimatorError::NotFitted)
        );
    }

    #[test]
    fn test_set_params_validates() {
        let mut model = LogisticRegression::default();
        let mut params = ParamSet::new();
        params.insert("C".to_string(), ParamValue::Float(0.5));
        params.insert("max_iter".to_string(), ParamValue::Int(50));
        model.set_params(&params).unwrap();
        assert_eq!(model.params().get("C"), Some(&ParamValue::Float(0.5)));
        assert_eq!(model.params().get("max_iter"), Some(&ParamValue::Int(50)));

        params.insert("C".to_string(), ParamValue::Float(-1.0));
        assert!(matches!(
            model.set_params(&params),
            Err(EstimatorError::InvalidParameter { .. })
        ));
        let mut unknown = ParamSet::new();
        unknown.insert("penalty".to_string(), ParamValue::String("l1".to_string()));
        assert!(model.set_params(&unknown).is_err());
    }
}
