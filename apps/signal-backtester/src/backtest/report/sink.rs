//! Output sinks for evaluation reports and cumulative-return curves.

use std::fmt::Write as _;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};
use tracing::info;

use super::types::{EvaluationReport, ReturnCurve};
use crate::backtest::metrics::{format_decimal, format_pct, format_ratio};
use crate::error::BacktestResult;

/// Destination for evaluation tables and plot data.
pub trait ReportSink {
    /// Publish the classification, profitability and benchmark tables.
    ///
    /// # Errors
    ///
    /// Returns an error when the destination cannot be written.
    fn publish(&mut self, report: &EvaluationReport) -> BacktestResult<()>;

    /// Hand over the curves to plot under `title`.
    ///
    /// # Errors
    ///
    /// Returns an error when the destination cannot be written.
    fn plot(&mut self, title: &str, curves: &[&ReturnCurve]) -> BacktestResult<()>;
}

// ============================================
// Console
// ============================================

/// Writes plain-text tables to any writer.
#[derive(Debug)]
pub struct ConsoleSink<W: Write> {
    out: W,
}

impl ConsoleSink<io::Stdout> {
    /// Sink writing to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleSink<W> {
    /// Sink writing to `out`.
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

const MODEL_COLUMN: usize = 16;

fn render_report(report: &EvaluationReport) -> String {
    let mut text = String::new();
    let span = &report.span;
    let _ = writeln!(text, "Backtest evaluation for {}", report.asset);
    let _ = writeln!(
        text,
        "Span: {} to {} ({} observations, {} models)",
        span.first_date,
        span.last_date,
        span.observations(),
        report.model_count()
    );

    let _ = writeln!(text, "\nClassification");
    let _ = writeln!(
        text,
        "{:<MODEL_COLUMN$} {:>10} {:>10} {:>10} {:>10}",
        "Model", "Accuracy", "Precision", "Recall", "F1 Score"
    );
    let benchmark_classification = (
        report.benchmark.name.as_str(),
        &report.benchmark.classification,
    );
    for (model, metrics) in report
        .classification
        .iter()
        .map(|row| (row.model.as_str(), &row.metrics))
        .chain(std::iter::once(benchmark_classification))
    {
        let _ = writeln!(
            text,
            "{:<MODEL_COLUMN$} {:>10} {:>10} {:>10} {:>10}",
            model,
            format_decimal(metrics.accuracy),
            format_decimal(metrics.precision),
            format_decimal(metrics.recall),
            format_decimal(metrics.f1_score),
        );
    }

    let _ = writeln!(text, "\nProfitability");
    let _ = writeln!(
        text,
        "{:<MODEL_COLUMN$} {:>10} {:>10} {:>10} {:>8}",
        "Model", "CR", "AR", "AV", "SR"
    );
    let benchmark_profitability = (report.benchmark.name.as_str(), &report.benchmark.profitability);
    for (model, metrics) in report
        .profitability
        .iter()
        .map(|row| (row.model.as_str(), &row.metrics))
        .chain(std::iter::once(benchmark_profitability))
    {
        let _ = writeln!(
            text,
            "{:<MODEL_COLUMN$} {:>10} {:>10} {:>10} {:>8}",
            model,
            format_pct(metrics.cumulative_return),
            format_pct(metrics.annualized_return),
            format_pct(metrics.annualized_volatility),
            format_ratio(metrics.sharpe_ratio),
        );
    }
    text
}

fn render_curves(title: &str, curves: &[&ReturnCurve]) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "\n{title}");
    let _ = writeln!(
        text,
        "{:<MODEL_COLUMN$} {:>8} {:>10} {:>10} {:>10}",
        "Curve", "Points", "Min", "Max", "Final"
    );
    for curve in curves {
        let min = curve.values.iter().copied().min().unwrap_or_default();
        let max = curve.values.iter().copied().max().unwrap_or_default();
        let _ = writeln!(
            text,
            "{:<MODEL_COLUMN$} {:>8} {:>10} {:>10} {:>10}",
            curve.label,
            curve.values.len(),
            format_pct(min),
            format_pct(max),
            format_pct(curve.final_value()),
        );
    }
    text
}

impl<W: Write> ReportSink for ConsoleSink<W> {
    fn publish(&mut self, report: &EvaluationReport) -> BacktestResult<()> {
        self.out.write_all(render_report(report).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    fn plot(&mut self, title: &str, curves: &[&ReturnCurve]) -> BacktestResult<()> {
        self.out.write_all(render_curves(title, curves).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

// ============================================
// JSON file
// ============================================

/// Writes the report, and the plot data once handed over, to a JSON file.
///
/// The file is rewritten on every call so it is always a complete document.
#[derive(Debug)]
pub struct JsonFileSink {
    path: PathBuf,
    document: Map<String, Value>,
}

impl JsonFileSink {
    /// Sink writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            document: Map::new(),
        }
    }

    /// Output path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> BacktestResult<()> {
        let body = serde_json::to_string_pretty(&self.document)?;
        std::fs::write(&self.path, body)?;
        info!(path = %self.path.display(), "Report written");
        Ok(())
    }
}

impl ReportSink for JsonFileSink {
    fn publish(&mut self, report: &EvaluationReport) -> BacktestResult<()> {
        self.document
            .insert("report".to_string(), serde_json::to_value(report)?);
        self.flush()
    }

    fn plot(&mut self, title: &str, curves: &[&ReturnCurve]) -> BacktestResult<()> {
        self.document.insert(
            "plot".to_string(),
            json!({ "title": title, "curves": curves }),
        );
        self.flush()
    }
}
