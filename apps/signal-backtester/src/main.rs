//! Signal Backtester Binary
//!
//! Runs a walk-forward backtest described by a YAML config file.
//!
//! # Usage
//!
//! ```bash
//! BACKTEST_CONFIG=demos/config.yaml cargo run --bin signal-backtester
//! ```
//!
//! # Environment Variables
//!
//! ## Optional
//! - `BACKTEST_CONFIG`: Config file path (default: config.yaml)
//! - `RUST_LOG`: Log level (default: info)
//! - `LOG_ANSI`: Set to `false` for plain log output

use anyhow::Context;
use signal_backtester::backtest::{Backtester, ConsoleSink, JsonFileSink, Trainer, load_csv};
use signal_backtester::config::{Config, build_slots, load_config};
use signal_backtester::telemetry::init_tracing;

/// Default config file path.
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

fn main() {
    load_dotenv();
    init_tracing();

    if let Err(e) = run() {
        tracing::error!(error = %format!("{e:#}"), "Backtest failed");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let config_path =
        std::env::var("BACKTEST_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = load_config(Some(&config_path))
        .with_context(|| format!("Failed to load config: {config_path}"))?;
    log_config(&config, &config_path);

    if config.backtest.max_threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.backtest.max_threads)
            .build_global()
            .context("Failed to configure worker threads")?;
    }

    let dataset = load_csv(&config.data.path)
        .with_context(|| format!("Failed to load dataset: {}", config.data.path))?;
    let slots = build_slots(&config.models).context("Failed to build models")?;

    let trainer = Trainer::new(config.backtest.search_config());
    let mut backtester = Backtester::new(dataset, config.data.asset_name.clone(), trainer)
        .with_parallel_models(config.backtest.parallel_models);
    backtester.register_models(slots);

    let periods = backtester
        .define_periods(&config.schedule.range_spec(), config.schedule.split)
        .context("Failed to define backtest periods")?;
    tracing::info!(periods, split = %config.schedule.split, "Schedule ready");

    let models = config.evaluation_models();
    let plot = config.plot_models();

    backtester
        .run_backtest(&models)
        .context("Walk-forward run failed")?;

    let mut console = ConsoleSink::stdout();
    backtester
        .evaluate(&models, &plot, &mut console)
        .context("Evaluation failed")?;

    if let Some(path) = config.report.json_path() {
        let mut sink = JsonFileSink::new(path);
        backtester
            .evaluate(&models, &plot, &mut sink)
            .with_context(|| format!("Failed to write report: {path}"))?;
    }

    Ok(())
}

fn log_config(config: &Config, path: &str) {
    tracing::info!(
        path,
        data = %config.data.path,
        asset = %config.data.asset_name,
        models = config.models.len(),
        validation_rows = config.backtest.validation_rows,
        parallel_models = config.backtest.parallel_models,
        "Configuration loaded"
    );
}

/// Load `.env` from the working directory or the nearest ancestor.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}
