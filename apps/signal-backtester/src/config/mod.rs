//! Configuration module for the backtest runner.
//!
//! Provides YAML configuration loading, validation, and environment
//! variable interpolation for the command-line runner.
//!
//! # Usage
//!
//! ```rust,ignore
//! use signal_backtester::config::{load_config, build_slots};
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! let slots = build_slots(&config.models)?;
//! println!("schedule: {:?}", config.schedule.range_spec());
//! ```

mod backtest;
mod data;
mod models;
mod report;
mod schedule;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backtest::SplitMode;

pub use backtest::BacktestSettings;
pub use data::DataConfig;
pub use models::{ModelConfig, ModelKind, build_slots};
pub use report::ReportConfig;
pub use schedule::{ScheduleBounds, ScheduleConfig};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Market-data source.
    #[serde(default)]
    pub data: DataConfig,
    /// Training and search settings.
    #[serde(default)]
    pub backtest: BacktestSettings,
    /// Period schedule.
    #[serde(default)]
    pub schedule: ScheduleConfig,
    /// Candidate models.
    pub models: Vec<ModelConfig>,
    /// Report output.
    #[serde(default)]
    pub report: ReportConfig,
}

impl Config {
    /// Names of the models to evaluate, in config order.
    #[must_use]
    pub fn evaluation_models(&self) -> Vec<&str> {
        if self.report.evaluate.is_empty() {
            self.models.iter().map(|m| m.name.as_str()).collect()
        } else {
            self.report.evaluate.iter().map(String::as_str).collect()
        }
    }

    /// Names of the models whose curves are plotted.
    #[must_use]
    pub fn plot_models(&self) -> Vec<&str> {
        self.report.plot.iter().map(String::as_str).collect()
    }
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or("config.yaml");

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map(|m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.map_or_else(String::new, str::to_string),
        }
    })
    .into_owned()
}

/// Validate configuration values.
///
/// # Errors
///
/// Returns `ValidationError` describing the first invalid value.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let invalid = |message: String| Err(ConfigError::ValidationError(message));

    if config.data.path.trim().is_empty() {
        return invalid("data.path must not be empty".to_string());
    }

    if config.backtest.validation_rows == 0 {
        return invalid("backtest.validation_rows must be at least 1".to_string());
    }

    match config.schedule.split {
        SplitMode::Rolling { window: 0 } | SplitMode::Anchored { window: 0 } => {
            return invalid("schedule.split.window must be positive".to_string());
        }
        _ => {}
    }
    if let ScheduleBounds::ByIndex {
        train_start,
        train_end,
        test_end,
    } = config.schedule.bounds
        && !(train_start < train_end && train_end < test_end)
    {
        return invalid(
            "schedule.bounds must satisfy train_start < train_end < test_end".to_string(),
        );
    }

    if config.models.is_empty() {
        return invalid("at least one model must be configured".to_string());
    }
    let mut names = HashSet::new();
    for model in &config.models {
        if model.name.trim().is_empty() {
            return invalid("model names must not be empty".to_string());
        }
        if !names.insert(model.name.as_str()) {
            return invalid(format!("duplicate model name '{}'", model.name));
        }
        if let Some((param, _)) = model.grid.iter().find(|(_, values)| values.is_empty()) {
            return invalid(format!(
                "model '{}' grid parameter '{param}' has no values",
                model.name
            ));
        }
    }

    for model in &config.models {
        validate_members(model, config)?;
    }

    for name in config.evaluation_models() {
        if !names.contains(name) {
            return invalid(format!("report.evaluate lists unknown model '{name}'"));
        }
    }
    let evaluated = config.evaluation_models();
    for name in config.plot_models() {
        if !evaluated.contains(&name) {
            return invalid(format!(
                "report.plot lists '{name}', which is not evaluated"
            ));
        }
    }

    Ok(())
}

fn validate_members(model: &ModelConfig, config: &Config) -> Result<(), ConfigError> {
    let invalid = |message: String| Err(ConfigError::ValidationError(message));

    if model.kind != ModelKind::Voting {
        if !model.members.is_empty() {
            return invalid(format!(
                "model '{}' is not a voting model but lists members",
                model.name
            ));
        }
        return Ok(());
    }

    if model.members.is_empty() {
        return invalid(format!("voting model '{}' needs members", model.name));
    }
    for member in &model.members {
        match config.models.iter().find(|m| &m.name == member) {
            None => {
                return invalid(format!(
                    "voting model '{}' lists unknown member '{member}'",
                    model.name
                ));
            }
            Some(m) if m.kind == ModelKind::Voting => {
                return invalid(format!(
                    "voting model '{}' cannot contain voting model '{member}'",
                    model.name
                ));
            }
            Some(_) => {}
        }
    }
    Ok(())
}
