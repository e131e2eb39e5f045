//! Report output configuration.

use serde::{Deserialize, Serialize};

/// Report output configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Models to evaluate; empty means every configured model.
    #[serde(default)]
    pub evaluate: Vec<String>,
    /// Models whose cumulative-return curves are plotted with the benchmark.
    #[serde(default)]
    pub plot: Vec<String>,
    /// Optional JSON file for the report and plot data.
    #[serde(default)]
    pub json_output: Option<String>,
}

impl ReportConfig {
    /// JSON output path, if one is set and non-empty.
    #[must_use]
    pub fn json_path(&self) -> Option<&str> {
        self.json_output
            .as_deref()
            .map(str::trim)
            .filter(|path| !path.is_empty())
    }
}
