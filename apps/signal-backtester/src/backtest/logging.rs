//! Backtest lifecycle logging.
//!
//! Provides structured logging for every step of a walk-forward run:
//! - Schedule definition with period count and covered rows
//! - Period start/finish with train/test bounds and progress
//! - Hyperparameter selection per model and period
//! - Evaluation summary per model
//! - Degenerate metrics (undefined Sharpe ratio)
//!
//! # Log Levels
//!
//! - **INFO**: Normal operations (schedule, periods, evaluation)
//! - **WARN**: Degenerate metrics
//! - **DEBUG**: Per-model selection details

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

// ============================================
// Event Types
// ============================================

/// Backtest lifecycle event for structured logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum BacktestEvent {
    /// Period schedule defined.
    ScheduleDefined(ScheduleDefinedEvent),
    /// Period training started.
    PeriodStarted(PeriodStartedEvent),
    /// Period training finished for all models.
    PeriodFinished(PeriodFinishedEvent),
    /// Hyperparameters selected for one model in one period.
    CandidateSelected(CandidateSelectedEvent),
    /// Evaluation finished for one model.
    ModelEvaluated(ModelEvaluatedEvent),
    /// Sharpe ratio undefined because volatility is zero.
    SharpeUndefined(SharpeUndefinedEvent),
}

/// Schedule defined event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleDefinedEvent {
    /// Split mode description.
    pub mode: String,
    /// Periods added by this call.
    pub periods_added: usize,
    /// Total periods after this call.
    pub total_periods: usize,
    /// First test row.
    pub first_test_row: usize,
    /// One past the last test row.
    pub last_test_row: usize,
}

/// Period started event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodStartedEvent {
    /// Period index (0-based).
    pub index: usize,
    /// Training start date (ISO 8601).
    pub train_start: String,
    /// Last training date (ISO 8601).
    pub train_end: String,
    /// Test start date (ISO 8601).
    pub test_start: String,
    /// Last test date (ISO 8601).
    pub test_end: String,
    /// Models trained in this period.
    pub model_count: usize,
}

/// Period finished event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodFinishedEvent {
    /// Period index (0-based).
    pub index: usize,
    /// Completion percentage across the whole run.
    pub progress_pct: f64,
    /// Estimated seconds remaining.
    pub eta_secs: u64,
    /// Duration of this period in milliseconds.
    pub duration_ms: u64,
}

/// Candidate selected event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSelectedEvent {
    /// Period index (0-based).
    pub period: usize,
    /// Model slot name.
    pub model: String,
    /// Winning parameters, rendered.
    pub params: String,
    /// Validation accuracy of the winner.
    pub validation_accuracy: Decimal,
    /// Candidates scored.
    pub candidates: usize,
}

/// Model evaluated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEvaluatedEvent {
    /// Model name.
    pub model: String,
    /// Out-of-sample accuracy.
    pub accuracy: Decimal,
    /// Final cumulative return.
    pub cumulative_return: Decimal,
    /// Sharpe ratio, `None` when undefined.
    pub sharpe_ratio: Option<Decimal>,
}

/// Sharpe undefined event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharpeUndefinedEvent {
    /// Model name.
    pub model: String,
    /// Annualized return that could not be risk-adjusted.
    pub annualized_return: Decimal,
}

// ============================================
// Logging Functions
// ============================================

/// Log schedule definition.
pub fn log_schedule_defined(event: &ScheduleDefinedEvent) {
    info!(
        mode = %event.mode,
        periods_added = event.periods_added,
        total_periods = event.total_periods,
        first_test_row = event.first_test_row,
        last_test_row = event.last_test_row,
        "Backtest periods defined"
    );
}

/// Log period start.
pub fn log_period_started(event: &PeriodStartedEvent) {
    info!(
        index = event.index,
        train_start = %event.train_start,
        train_end = %event.train_end,
        test_start = %event.test_start,
        test_end = %event.test_end,
        model_count = event.model_count,
        "Period training started"
    );
}

/// Log period completion.
pub fn log_period_finished(event: &PeriodFinishedEvent) {
    info!(
        index = event.index,
        progress_pct = event.progress_pct,
        eta_secs = event.eta_secs,
        duration_ms = event.duration_ms,
        "Period training finished"
    );
}

/// Log candidate selection.
pub fn log_candidate_selected(event: &CandidateSelectedEvent) {
    debug!(
        period = event.period,
        model = %event.model,
        params = %event.params,
        validation_accuracy = %event.validation_accuracy,
        candidates = event.candidates,
        "Hyperparameters selected"
    );
}

/// Log model evaluation.
pub fn log_model_evaluated(event: &ModelEvaluatedEvent) {
    info!(
        model = %event.model,
        accuracy = %event.accuracy,
        cumulative_return = %event.cumulative_return,
        sharpe_ratio = ?event.sharpe_ratio,
        "Model evaluated"
    );
}

/// Log an undefined Sharpe ratio.
pub fn log_sharpe_undefined(event: &SharpeUndefinedEvent) {
    warn!(
        model = %event.model,
        annualized_return = %event.annualized_return,
        "Sharpe ratio undefined: zero volatility"
    );
}

// ============================================
// Event Journal
// ============================================

/// Records lifecycle events and optionally forwards them to tracing.
#[derive(Debug, Default)]
pub struct BacktestLogger {
    events: Vec<BacktestEvent>,
    log_to_tracing: bool,
}

impl BacktestLogger {
    /// Create a new backtest logger.
    #[must_use]
    pub const fn new(log_to_tracing: bool) -> Self {
        Self {
            events: Vec::new(),
            log_to_tracing,
        }
    }

    /// Log an event.
    pub fn log(&mut self, event: BacktestEvent) {
        if self.log_to_tracing {
            emit_to_tracing(&event);
        }
        self.events.push(event);
    }

    /// Get all logged events.
    #[must_use]
    pub fn events(&self) -> &[BacktestEvent] {
        &self.events
    }

    /// Get event count.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Serialize all events as a JSON array.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.events)
    }
}

fn emit_to_tracing(event: &BacktestEvent) {
    match event {
        BacktestEvent::ScheduleDefined(e) => log_schedule_defined(e),
        BacktestEvent::PeriodStarted(e) => log_period_started(e),
        BacktestEvent::PeriodFinished(e) => log_period_finished(e),
        BacktestEvent::CandidateSelected(e) => log_candidate_selected(e),
        BacktestEvent::ModelEvaluated(e) => log_model_evaluated(e),
        BacktestEvent::SharpeUndefined(e) => log_sharpe_undefined(e),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn selected(model: &str) -> BacktestEvent {
        BacktestEvent::CandidateSelected(CandidateSelectedEvent {
            period: 0,
            model: model.to_string(),
            params: "n_neighbors=5".to_string(),
            validation_accuracy: dec!(0.56),
            candidates: 4,
        })
    }

    #[test]
    fn test_backtest_logger() {
        let mut logger = BacktestLogger::new(false);
        logger.log(selected("knn"));
        logger.log(BacktestEvent::SharpeUndefined(SharpeUndefinedEvent {
            model: "flat".to_string(),
            annualized_return: Decimal::ZERO,
        }));

        assert_eq!(logger.event_count(), 2);
        assert!(matches!(
            logger.events()[1],
            BacktestEvent::SharpeUndefined(_)
        ));
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let json = serde_json::to_string(&selected("knn")).unwrap();
        assert!(json.contains(r#""event_type":"candidate_selected""#));
        assert!(json.contains(r#""model":"knn""#));
    }

    #[test]
    fn test_logger_to_json() {
        let mut logger = BacktestLogger::new(true);
        logger.log(BacktestEvent::ScheduleDefined(ScheduleDefinedEvent {
            mode: "rolling".to_string(),
            periods_added: 3,
            total_periods: 3,
            first_test_row: 100,
            last_test_row: 250,
        }));
        let json = logger.to_json().unwrap();
        assert!(json.starts_with('['));
        assert!(json.contains("schedule_defined"));
    }
}
