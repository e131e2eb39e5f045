//! Per-period training: scaling, holdout search, refit, predict.

use ndarray::{Array2, Axis, Slice};

use super::dataset::{Dataset, Direction};
use super::estimator::EstimatorError;
use super::periods::BacktestPeriod;
use super::scaler::StandardScaler;
use super::search::{HoldoutFold, HoldoutSearch, SearchConfig};
use super::slot::{ModelSlot, TuningRecord};
use crate::error::{BacktestError, BacktestResult};

/// Trains one model slot on one period.
#[derive(Debug, Clone)]
pub struct Trainer {
    search: HoldoutSearch,
}

impl Default for Trainer {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl Trainer {
    /// Create a new trainer.
    #[must_use]
    pub const fn new(config: SearchConfig) -> Self {
        Self {
            search: HoldoutSearch::new(config),
        }
    }

    /// Rows held out at the end of every training range.
    #[must_use]
    pub const fn validation_rows(&self) -> usize {
        self.search.config().validation_rows
    }

    /// Tune, refit and predict `slot` on `period`.
    ///
    /// The last `validation_rows` training rows score every grid candidate,
    /// the winner is refit on the whole training range and predicts the test
    /// range. The slot's estimator is replaced by the refit winner and the
    /// predictions are appended to it. Nothing in the test range is seen
    /// before prediction.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientData` when the training range cannot hold the
    /// validation fold plus one fitting row, `Range` for bounds outside the
    /// dataset and `Estimator` when the estimator fails.
    pub fn run(
        &self,
        slot: &mut ModelSlot,
        period: &BacktestPeriod,
        dataset: &Dataset,
    ) -> BacktestResult<Vec<Direction>> {
        period.check_bounds(dataset)?;

        let validation_rows = self.validation_rows();
        let train_rows = period.train_len();
        if train_rows <= validation_rows {
            return Err(BacktestError::InsufficientData {
                train_rows,
                validation_rows,
            });
        }

        let raw_train = dataset.feature_rows(period.train.clone());
        let raw_test = dataset.feature_rows(period.test.clone());
        let (train_x, test_x): (Array2<f64>, Array2<f64>) = if slot.scaling() {
            let scaler = StandardScaler::fit(raw_train)?;
            (scaler.transform(raw_train)?, scaler.transform(raw_test)?)
        } else {
            (raw_train.to_owned(), raw_test.to_owned())
        };
        let train_y = dataset.label_rows(period.train.clone());

        let split = train_rows - validation_rows;
        let fold = HoldoutFold {
            fit_features: train_x.slice_axis(Axis(0), Slice::from(..split)),
            fit_labels: &train_y[..split],
            validation_features: train_x.slice_axis(Axis(0), Slice::from(split..)),
            validation_labels: &train_y[split..],
        };

        let model = slot.name().to_string();
        let wrap = |source: EstimatorError| BacktestError::Estimator {
            model: model.clone(),
            source,
        };

        let outcome = self
            .search
            .run(slot.estimator(), slot.grid(), &fold)
            .map_err(wrap)?;
        let best = outcome.best();

        let mut tuned = slot.estimator().boxed_clone();
        tuned.set_params(&best.params).map_err(wrap)?;
        tuned.fit(train_x.view(), train_y).map_err(wrap)?;
        let predictions = tuned.predict(test_x.view()).map_err(wrap)?;
        if predictions.len() != period.test_len() {
            return Err(BacktestError::length_mismatch(
                format!("predictions of model '{model}'"),
                period.test_len(),
                predictions.len(),
            ));
        }

        let record = TuningRecord {
            period: period.clone(),
            params: best.params.clone(),
            validation_accuracy: best.accuracy,
            candidates: outcome.scores.len(),
        };
        slot.commit(tuned, &predictions, record);

        Ok(predictions)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::{Duration, NaiveDate};
    use ndarray::{Array2, ArrayView2};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::backtest::estimator::{Estimator, ParamSet, ParamValue, ParameterGrid};

    /// Predicts the sign of the first feature minus `offset` and records
    /// the largest feature value it was fit on.
    #[derive(Debug, Clone)]
    struct Spy {
        offset: f64,
        seen_max: Arc<Mutex<f64>>,
        fitted: bool,
    }

    impl Spy {
        fn new() -> Self {
            Self {
                offset: 0.0,
                seen_max: Arc::new(Mutex::new(f64::NEG_INFINITY)),
                fitted: false,
            }
        }
    }

    impl Estimator for Spy {
        fn kind(&self) -> &'static str {
            "spy"
        }
        fn fit(&mut self, x: ArrayView2<'_, f64>, y: &[Direction]) -> Result<(), EstimatorError> {
            crate::backtest::estimator::check_training_input(x, y)?;
            let max = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let mut seen = self.seen_max.lock().unwrap();
            *seen = seen.max(max);
            self.fitted = true;
            Ok(())
        }
        fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Vec<Direction>, EstimatorError> {
            if !self.fitted {
                return Err(EstimatorError::NotFitted);
            }
            Ok(x.column(0)
                .iter()
                .map(|v| {
                    if *v - self.offset > 0.0 {
                        Direction::Up
                    } else {
                        Direction::Down
                    }
                })
                .collect())
        }
        fn params(&self) -> ParamSet {
            let mut params = ParamSet::new();
            params.insert("offset".to_string(), ParamValue::Float(self.offset));
            params
        }
        fn set_params(&mut self, params: &ParamSet) -> Result<(), EstimatorError> {
            if let Some(value) = params.get("offset") {
                self.offset = value
                    .as_float()
                    .ok_or_else(|| EstimatorError::invalid("offset", "expected number"))?;
            }
            self.fitted = false;
            Ok(())
        }
        fn boxed_clone(&self) -> Box<dyn Estimator> {
            Box::new(self.clone())
        }
    }

    /// Feature = row index, label up when the index is at least 10.
    fn ramp(rows: usize) -> Dataset {
        let start = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
        let features =
            Array2::from_shape_vec((rows, 1), (0..rows).map(|i| i as f64).collect()).unwrap();
        let labels = (0..rows)
            .map(|i| if i >= 10 { Direction::Up } else { Direction::Down })
            .collect();
        Dataset::new(
            features,
            labels,
            vec![Decimal::ZERO; rows],
            (0..rows).map(|i| start + Duration::days(i as i64)).collect(),
        )
        .unwrap()
    }

    fn trainer(validation_rows: usize) -> Trainer {
        Trainer::new(SearchConfig {
            validation_rows,
            ..SearchConfig::default()
        })
    }

    #[test]
    fn test_run_selects_refits_and_appends() {
        let data = ramp(30);
        let spy = Spy::new();
        let seen = Arc::clone(&spy.seen_max);
        let grid = ParameterGrid::builder()
            .add_float_param("offset", vec![0.0, 9.5, 20.0])
            .build();
        let mut slot = ModelSlot::new("spy", Box::new(spy), grid, false);

        // fit rows 0..5, validation rows 5..20 straddle the label change at 10
        let period = BacktestPeriod::new(0..20, 20..25).unwrap();
        let predictions = trainer(15).run(&mut slot, &period, &data).unwrap();

        assert_eq!(predictions, vec![Direction::Up; 5]);
        assert_eq!(slot.predictions(), predictions.as_slice());
        let record = &slot.tuning_history()[0];
        assert_eq!(record.params.get("offset"), Some(&ParamValue::Float(9.5)));
        assert_eq!(record.validation_accuracy, dec!(1));
        assert_eq!(record.candidates, 3);
        assert_eq!(
            slot.estimator().params().get("offset"),
            Some(&ParamValue::Float(9.5))
        );
        // the refit saw the full training range but nothing from the test range
        assert_eq!(*seen.lock().unwrap(), 19.0);
    }

    #[test]
    fn test_insufficient_training_rows() {
        let data = ramp(30);
        let mut slot =
            ModelSlot::new("spy", Box::new(Spy::new()), ParameterGrid::empty(), false);
        let period = BacktestPeriod::new(0..5, 5..10).unwrap();

        let result = trainer(5).run(&mut slot, &period, &data);
        assert!(matches!(
            result,
            Err(BacktestError::InsufficientData {
                train_rows: 5,
                validation_rows: 5
            })
        ));
        assert!(slot.predictions().is_empty());
    }

    #[test]
    fn test_scaling_uses_training_statistics() {
        let data = ramp(30);
        let spy = Spy::new();
        let seen = Arc::clone(&spy.seen_max);
        let mut slot = ModelSlot::new("spy", Box::new(spy), ParameterGrid::empty(), true);
        let period = BacktestPeriod::new(0..20, 20..30).unwrap();

        let predictions = trainer(5).run(&mut slot, &period, &data).unwrap();

        // rows 0..20 scaled by their own mean 9.5: test rows are all above it
        assert_eq!(predictions, vec![Direction::Up; 10]);
        let max_seen = *seen.lock().unwrap();
        let pop_std = (((0..20).map(|i| (f64::from(i) - 9.5).powi(2)).sum::<f64>()) / 20.0).sqrt();
        assert!((max_seen - (19.0 - 9.5) / pop_std).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_bounds_period() {
        let data = ramp(30);
        let mut slot =
            ModelSlot::new("spy", Box::new(Spy::new()), ParameterGrid::empty(), false);
        let period = BacktestPeriod::new(0..20, 20..40).unwrap();
        assert!(matches!(
            trainer(5).run(&mut slot, &period, &data),
            Err(BacktestError::Range { .. })
        ));
    }

    #[test]
    fn test_estimator_failure_names_model() {
        let data = ramp(30);
        let grid = ParameterGrid::builder()
            .add_string_param("offset", vec!["wide"])
            .build();
        let mut slot = ModelSlot::new("spy", Box::new(Spy::new()), grid, false);
        let period = BacktestPeriod::new(0..20, 20..25).unwrap();

        let Err(BacktestError::Estimator { model, .. }) = trainer(5).run(&mut slot, &period, &data)
        else {
            panic!("string offset should fail");
        };
        assert_eq!(model, "spy");
    }
}
