//! Tracing Setup
//!
//! Console tracing for the backtest runner.
//!
//! # Configuration
//!
//! - `RUST_LOG`: Filter directives (default: `signal_backtester=info`)
//! - `LOG_ANSI`: Set to `false` to disable colored output
//!
//! # Usage
//!
//! ```rust,ignore
//! use signal_backtester::telemetry::init_tracing;
//!
//! fn main() {
//!     init_tracing();
//!     tracing::info!("Backtest starting");
//! }
//! ```

use tracing_subscriber::EnvFilter;

/// Directive applied on top of `RUST_LOG`.
pub const DEFAULT_DIRECTIVE: &str = "signal_backtester=info";

/// Build the subscriber filter from `RUST_LOG` plus the crate default.
///
/// Uses a static directive string that is a compile-time constant guaranteed to parse.
#[allow(clippy::expect_used)]
#[must_use]
pub fn env_filter() -> EnvFilter {
    EnvFilter::from_default_env().add_directive(
        DEFAULT_DIRECTIVE
            .parse()
            .expect("static directive 'signal_backtester=info' is valid"),
    )
}

/// Initialize the global tracing subscriber.
///
/// Returns `false` when a subscriber was already installed.
pub fn init_tracing() -> bool {
    let ansi = std::env::var("LOG_ANSI")
        .map(|v| v != "false")
        .unwrap_or(true);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .with_ansi(ansi)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_parses() {
        let filter = env_filter();
        assert!(filter.to_string().contains("signal_backtester=info"));
    }

    #[test]
    fn test_second_init_is_rejected() {
        let _ = init_tracing();
        assert!(!init_tracing());
    }
}
