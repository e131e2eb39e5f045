//! Walk-forward backtest orchestrator.

use std::collections::{BTreeMap, HashSet};
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info};

use super::dataset::{Dataset, Direction};
use super::estimator::describe_params;
use super::logging::{
    BacktestEvent, BacktestLogger, CandidateSelectedEvent, ModelEvaluatedEvent,
    PeriodFinishedEvent, PeriodStartedEvent, ScheduleDefinedEvent, SharpeUndefinedEvent,
};
use super::periods::{BacktestPeriod, PeriodSplitter, RangeSpec, SplitMode};
use super::report::{EvaluationReport, MetricsReporter, ReportSink};
use super::search::ProgressTracker;
use super::slot::ModelSlot;
use super::trainer::Trainer;
use crate::error::{BacktestError, BacktestResult};

/// Drives the trainer over a period schedule and evaluates the results.
///
/// Periods are processed strictly in order. Within a period every requested
/// model is trained independently, concurrently when `parallel_models` is set.
#[derive(Debug)]
pub struct Backtester {
    dataset: Dataset,
    asset_name: String,
    trainer: Trainer,
    slots: BTreeMap<String, ModelSlot>,
    periods: Vec<BacktestPeriod>,
    parallel_models: bool,
    logger: BacktestLogger,
}

impl Backtester {
    /// Create a backtester with no models and no periods.
    pub fn new(dataset: Dataset, asset_name: impl Into<String>, trainer: Trainer) -> Self {
        Self {
            dataset,
            asset_name: asset_name.into(),
            trainer,
            slots: BTreeMap::new(),
            periods: Vec::new(),
            parallel_models: false,
            logger: BacktestLogger::new(true),
        }
    }

    /// Train the models of one period concurrently.
    #[must_use]
    pub const fn with_parallel_models(mut self, parallel_models: bool) -> Self {
        self.parallel_models = parallel_models;
        self
    }

    /// Dataset under test.
    #[must_use]
    pub const fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Asset name used in report headers.
    #[must_use]
    pub fn asset_name(&self) -> &str {
        &self.asset_name
    }

    /// Scheduled periods, in time order.
    #[must_use]
    pub fn periods(&self) -> &[BacktestPeriod] {
        &self.periods
    }

    /// Registered slot by name.
    #[must_use]
    pub fn slot(&self, name: &str) -> Option<&ModelSlot> {
        self.slots.get(name)
    }

    /// Registered model names, sorted.
    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    /// Lifecycle events recorded so far.
    #[must_use]
    pub fn events(&self) -> &[BacktestEvent] {
        self.logger.events()
    }

    /// Add slots, replacing any slot already registered under the same name.
    pub fn register_models(&mut self, slots: Vec<ModelSlot>) {
        for slot in slots {
            let name = slot.name().to_string();
            if self.slots.insert(name.clone(), slot).is_some() {
                debug!(model = %name, "Model slot replaced");
            }
        }
    }

    /// Split the dataset per `spec` and `mode` and append the periods.
    ///
    /// Returns the number of periods added.
    ///
    /// # Errors
    ///
    /// Returns `Range` or `DateNotFound` when the bounds are invalid, the
    /// schedule is empty or its first test row precedes the end of the
    /// periods already defined. Nothing is appended on error.
    pub fn define_periods(&mut self, spec: &RangeSpec, mode: SplitMode) -> BacktestResult<usize> {
        let added = PeriodSplitter::new(&self.dataset).split(spec, mode)?;
        if let (Some(last), Some(first)) = (self.periods.last(), added.first())
            && first.test.start < last.test.end
        {
            return Err(BacktestError::range(format!(
                "test rows from {} overlap the scheduled periods ending at row {}",
                first.test.start, last.test.end
            )));
        }
        let count = added.len();
        let first_test_row = added.first().map_or(0, |p| p.test.start);
        let last_test_row = added.last().map_or(0, |p| p.test.end);
        self.periods.extend(added);

        self.logger
            .log(BacktestEvent::ScheduleDefined(ScheduleDefinedEvent {
                mode: mode.to_string(),
                periods_added: count,
                total_periods: self.periods.len(),
                first_test_row,
                last_test_row,
            }));
        Ok(count)
    }

    /// Drop every scheduled period.
    pub fn clear_periods(&mut self) {
        self.periods.clear();
    }

    fn check_models(&self, names: &[&str]) -> BacktestResult<()> {
        for name in names {
            if !self.slots.contains_key(*name) {
                return Err(BacktestError::UnknownModel {
                    name: (*name).to_string(),
                });
            }
        }
        Ok(())
    }

    /// Train every named model over every scheduled period.
    ///
    /// Previous predictions of the named slots are discarded first. On
    /// error the slots keep whatever the completed periods produced.
    ///
    /// # Errors
    ///
    /// Returns `UnknownModel` or `NoPeriods` before any training, and the
    /// first trainer error otherwise.
    pub fn run_backtest(&mut self, model_names: &[&str]) -> BacktestResult<()> {
        self.check_models(model_names)?;
        if self.periods.is_empty() {
            return Err(BacktestError::NoPeriods);
        }

        let mut seen = HashSet::new();
        let names: Vec<&str> = model_names
            .iter()
            .copied()
            .filter(|name| seen.insert(*name))
            .collect();
        for name in &names {
            if let Some(slot) = self.slots.get_mut(*name) {
                slot.reset();
            }
        }

        info!(
            asset = %self.asset_name,
            models = names.len(),
            periods = self.periods.len(),
            parallel_models = self.parallel_models,
            "Backtest started"
        );

        let tracker = ProgressTracker::new(self.periods.len() as u64);
        for index in 0..self.periods.len() {
            let period = self.periods[index].clone();
            let started = Instant::now();
            let event = self.period_started(index, &period, names.len());
            self.logger.log(BacktestEvent::PeriodStarted(event));

            self.train_period(&names, &period)?;

            for name in &names {
                if let Some(record) = self
                    .slots
                    .get(*name)
                    .and_then(|slot| slot.tuning_history().last())
                {
                    let event = CandidateSelectedEvent {
                        period: index,
                        model: (*name).to_string(),
                        params: describe_params(&record.params),
                        validation_accuracy: record.validation_accuracy,
                        candidates: record.candidates,
                    };
                    self.logger.log(BacktestEvent::CandidateSelected(event));
                }
            }

            tracker.job_completed();
            let progress = tracker.progress();
            debug!(progress = %progress, "Backtest progress");
            self.logger
                .log(BacktestEvent::PeriodFinished(PeriodFinishedEvent {
                    index,
                    progress_pct: progress.percentage(),
                    eta_secs: progress.eta_secs,
                    duration_ms: started.elapsed().as_millis() as u64,
                }));
        }

        info!(asset = %self.asset_name, "Backtest finished");
        Ok(())
    }

    fn period_started(
        &self,
        index: usize,
        period: &BacktestPeriod,
        model_count: usize,
    ) -> PeriodStartedEvent {
        let dates = self.dataset.dates();
        let date = |row: usize| dates.get(row).map(ToString::to_string).unwrap_or_default();
        PeriodStartedEvent {
            index,
            train_start: date(period.train.start),
            train_end: date(period.train.end.saturating_sub(1)),
            test_start: date(period.test.start),
            test_end: date(period.test.end.saturating_sub(1)),
            model_count,
        }
    }

    fn train_period(&mut self, names: &[&str], period: &BacktestPeriod) -> BacktestResult<()> {
        let wanted: HashSet<&str> = names.iter().copied().collect();
        let mut slots: Vec<&mut ModelSlot> = self
            .slots
            .values_mut()
            .filter(|slot| wanted.contains(slot.name()))
            .collect();

        let trainer = &self.trainer;
        let dataset = &self.dataset;
        let results: Vec<BacktestResult<Vec<Direction>>> = if self.parallel_models {
            slots
                .par_iter_mut()
                .map(|slot| trainer.run(slot, period, dataset))
                .collect()
        } else {
            slots
                .iter_mut()
                .map(|slot| trainer.run(slot, period, dataset))
                .collect()
        };

        results.into_iter().try_for_each(|result| result.map(drop))
    }

    /// Score the named models over the schedule's out-of-sample span.
    ///
    /// The report goes to `sink.publish`; the curves of `plot_models` plus
    /// the benchmark go to `sink.plot`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownModel` for unregistered names or plot models outside
    /// `model_names`, `NoPeriods` without a schedule, `LengthMismatch` when a
    /// model has not been run over the whole schedule, and sink errors.
    pub fn evaluate(
        &mut self,
        model_names: &[&str],
        plot_models: &[&str],
        sink: &mut dyn ReportSink,
    ) -> BacktestResult<EvaluationReport> {
        self.check_models(model_names)?;
        if let Some(name) = plot_models.iter().find(|p| !model_names.contains(*p)) {
            return Err(BacktestError::UnknownModel {
                name: (*name).to_string(),
            });
        }

        let slots: Vec<&ModelSlot> = model_names
            .iter()
            .filter_map(|name| self.slots.get(*name))
            .collect();
        let report =
            MetricsReporter::new(&self.dataset, &self.periods).build(&self.asset_name, &slots)?;

        let benchmark = (
            &report.benchmark.name,
            &report.benchmark.classification,
            &report.benchmark.profitability,
        );
        for (model, classification, profitability) in report
            .classification
            .iter()
            .zip(&report.profitability)
            .map(|(c, p)| (&c.model, &c.metrics, &p.metrics))
            .chain(std::iter::once(benchmark))
        {
            self.logger
                .log(BacktestEvent::ModelEvaluated(ModelEvaluatedEvent {
                    model: model.clone(),
                    accuracy: classification.accuracy,
                    cumulative_return: profitability.cumulative_return,
                    sharpe_ratio: profitability.sharpe_ratio,
                }));
            if profitability.sharpe_ratio.is_none() {
                self.logger
                    .log(BacktestEvent::SharpeUndefined(SharpeUndefinedEvent {
                        model: model.clone(),
                        annualized_return: profitability.annualized_return,
                    }));
            }
        }

        sink.publish(&report)?;
        sink.plot(&report.plot_title(), &report.plot_curves(plot_models))?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};
    use ndarray::{Array2, ArrayView2};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::backtest::estimator::{
        Estimator, EstimatorError, ParamSet, ParamValue, ParameterGrid,
    };
    use crate::backtest::report::ReturnCurve;

    /// Predicts `Up` when the first feature exceeds `threshold`.
    #[derive(Debug, Clone)]
    struct Threshold {
        threshold: f64,
        fitted: bool,
    }

    impl Threshold {
        fn boxed() -> Box<dyn Estimator> {
            Box::new(Self {
                threshold: 0.0,
                fitted: false,
            })
        }
    }

    impl Estimator for Threshold {
        fn kind(&self) -> &'static str {
            "threshold"
        }
        fn fit(&mut self, x: ArrayView2<'_, f64>, y: &[Direction]) -> Result<(), EstimatorError> {
            crate::backtest::estimator::check_training_input(x, y)?;
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
                    if *v > self.threshold {
                        Direction::Up
                    } else {
                        Direction::Down
                    }
                })
                .collect())
        }
        fn params(&self) -> ParamSet {
            let mut params = ParamSet::new();
            params.insert("threshold".to_string(), ParamValue::Float(self.threshold));
            params
        }
        fn set_params(&mut self, params: &ParamSet) -> Result<(), EstimatorError> {
            if let Some(value) = params.get("threshold") {
                self.threshold = value
                    .as_float()
                    .ok_or_else(|| EstimatorError::invalid("threshold", "expected number"))?;
            }
            self.fitted = false;
            Ok(())
        }
        fn boxed_clone(&self) -> Box<dyn Estimator> {
            Box::new(self.clone())
        }
    }

    /// The feature is the next return itself, so a zero threshold is perfect.
    fn dataset(rows: usize) -> Dataset {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let returns: Vec<Decimal> = (0..rows)
            .map(|i| if i % 3 == 0 { dec!(-0.01) } else { dec!(0.02) })
            .collect();
        let features = Array2::from_shape_vec(
            (rows, 1),
            returns
                .iter()
                .map(|r| if r.is_sign_negative() { -1.0 } else { 1.0 })
                .collect(),
        )
        .unwrap();
        Dataset::new(
            features,
            returns.iter().map(|r| Direction::from_return(*r)).collect(),
            returns,
            (0..rows).map(|i| start + Duration::days(i as i64)).collect(),
        )
        .unwrap()
    }

    fn backtester() -> Backtester {
        let trainer = Trainer::new(crate::backtest::search::SearchConfig {
            validation_rows: 10,
            ..Default::default()
        });
        let mut backtester = Backtester::new(dataset(60), "TEST", trainer);
        let grid = ParameterGrid::builder()
            .add_float_param("threshold", vec![2.0, 0.0])
            .build();
        backtester.register_models(vec![
            ModelSlot::new("tuned", Threshold::boxed(), grid, false),
            ModelSlot::new("scaled", Threshold::boxed(), ParameterGrid::empty(), true),
        ]);
        backtester
    }

    #[derive(Default)]
    struct Recorder {
        published: Vec<EvaluationReport>,
        plots: Vec<(String, Vec<String>)>,
    }

    impl ReportSink for Recorder {
        fn publish(&mut self, report: &EvaluationReport) -> BacktestResult<()> {
            self.published.push(report.clone());
            Ok(())
        }
        fn plot(&mut self, title: &str, curves: &[&ReturnCurve]) -> BacktestResult<()> {
            self.plots.push((
                title.to_string(),
                curves.iter().map(|c| c.label.clone()).collect(),
            ));
            Ok(())
        }
    }

    #[test]
    fn test_define_periods_appends() {
        let mut bt = backtester();
        let added = bt
            .define_periods(&RangeSpec::by_index(0, 20, 40), SplitMode::Rolling { window: 10 })
            .unwrap();
        assert_eq!(added, 2);
        let added = bt
            .define_periods(&RangeSpec::by_index(20, 40, 50), SplitMode::Single)
            .unwrap();
        assert_eq!(added, 1);
        assert_eq!(bt.periods().len(), 3);
        assert!(matches!(bt.events()[0], BacktestEvent::ScheduleDefined(_)));
    }

    #[test]
    fn test_define_periods_rejects_overlapping_schedule() {
        let mut bt = backtester();
        bt.define_periods(&RangeSpec::by_index(0, 20, 40), SplitMode::Rolling { window: 10 })
            .unwrap();

        let result = bt.define_periods(&RangeSpec::by_index(0, 30, 45), SplitMode::Single);

        assert!(matches!(result, Err(BacktestError::Range { .. })));
        assert_eq!(bt.periods().len(), 2);
        assert_eq!(bt.periods().last().map(|p| p.test.end), Some(40));
    }

    #[test]
    fn test_run_requires_known_models_and_periods() {
        let mut bt = backtester();
        assert!(matches!(
            bt.run_backtest(&["tuned"]),
            Err(BacktestError::NoPeriods)
        ));
        bt.define_periods(&RangeSpec::by_index(0, 20, 40), SplitMode::Rolling { window: 10 })
            .unwrap();
        let Err(BacktestError::UnknownModel { name }) = bt.run_backtest(&["tuned", "ghost"]) else {
            panic!("ghost is not registered");
        };
        assert_eq!(name, "ghost");
        assert!(bt.slot("tuned").unwrap().predictions().is_empty());
    }

    #[test]
    fn test_run_and_evaluate() {
        let mut bt = backtester();
        bt.define_periods(&RangeSpec::by_index(0, 20, 60), SplitMode::Rolling { window: 10 })
            .unwrap();
        bt.run_backtest(&["tuned", "scaled"]).unwrap();

        let tuned = bt.slot("tuned").unwrap();
        assert_eq!(tuned.predictions().len(), 40);
        assert_eq!(tuned.tuning_history().len(), 4);
        assert!(
            tuned
                .tuning_history()
                .iter()
                .all(|r| r.params.get("threshold") == Some(&ParamValue::Float(0.0)))
        );

        let mut sink = Recorder::default();
        let report = bt.evaluate(&["tuned", "scaled"], &["tuned"], &mut sink).unwrap();

        assert_eq!(report.span.start_row, 20);
        assert_eq!(report.span.observations(), 40);
        assert_eq!(report.classification[0].metrics.accuracy, dec!(1));
        assert_eq!(sink.published.len(), 1);
        assert_eq!(
            sink.plots,
            vec![(
                "Cumulative return for TEST".to_string(),
                vec!["tuned".to_string(), "BnH".to_string()]
            )]
        );
        // a perfect signal beats holding through the down days
        assert!(
            report.profitability[0].metrics.cumulative_return
                > report.benchmark.profitability.cumulative_return
        );
        assert!(
            bt.events()
                .iter()
                .any(|e| matches!(e, BacktestEvent::ModelEvaluated(m) if m.model == "Buy and Hold"))
        );
    }

    #[test]
    fn test_parallel_models_match_sequential() {
        let spec = RangeSpec::by_index(0, 20, 60);
        let mode = SplitMode::Anchored { window: 10 };

        let mut sequential = backtester();
        sequential.define_periods(&spec, mode).unwrap();
        sequential.run_backtest(&["tuned", "scaled"]).unwrap();

        let mut parallel = backtester().with_parallel_models(true);
        parallel.define_periods(&spec, mode).unwrap();
        parallel.run_backtest(&["tuned", "scaled"]).unwrap();

        for name in ["tuned", "scaled"] {
            assert_eq!(
                sequential.slot(name).unwrap().predictions(),
                parallel.slot(name).unwrap().predictions()
            );
        }
    }

    #[test]
    fn test_rerun_replaces_predictions() {
        let mut bt = backtester();
        bt.define_periods(&RangeSpec::by_index(0, 20, 40), SplitMode::Rolling { window: 10 })
            .unwrap();
        bt.run_backtest(&["tuned"]).unwrap();
        bt.run_backtest(&["tuned", "tuned"]).unwrap();
        assert_eq!(bt.slot("tuned").unwrap().predictions().len(), 20);
    }

    #[test]
    fn test_evaluate_before_run_is_length_mismatch() {
        let mut bt = backtester();
        bt.define_periods(&RangeSpec::by_index(0, 20, 40), SplitMode::Single)
            .unwrap();
        let result = bt.evaluate(&["tuned"], &[], &mut Recorder::default());
        assert!(matches!(result, Err(BacktestError::LengthMismatch { .. })));
    }

    #[test]
    fn test_plot_model_must_be_evaluated() {
        let mut bt = backtester();
        bt.define_periods(&RangeSpec::by_index(0, 20, 40), SplitMode::Single)
            .unwrap();
        bt.run_backtest(&["tuned", "scaled"]).unwrap();
        let result = bt.evaluate(&["tuned"], &["scaled"], &mut Recorder::default());
        assert!(matches!(result, Err(BacktestError::UnknownModel { .. })));
    }

    #[test]
    fn test_register_overwrites_by_name() {
        let mut bt = backtester();
        bt.register_models(vec![ModelSlot::new(
            "tuned",
            Threshold::boxed(),
            ParameterGrid::empty(),
            true,
        )]);
        assert!(bt.slot("tuned").unwrap().scaling());
        assert_eq!(bt.model_names().count(), 2);
    }
}
