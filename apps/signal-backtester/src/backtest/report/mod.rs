//! Evaluation reports.
//!
//! The reporter scores every requested slot over the span from the first
//! period's test start to the last period's test end, alongside an always-long
//! benchmark. Sinks render the resulting tables and curves.

mod reporter;
mod sink;
mod types;

pub use reporter::MetricsReporter;
pub use sink::{ConsoleSink, JsonFileSink, ReportSink};
pub use types::{
    BENCHMARK_NAME, BenchmarkRow, ClassificationRow, EvaluationReport, EvaluationSpan,
    ProfitabilityRow, ReturnCurve, TuningHistory,
};
