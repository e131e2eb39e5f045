//! Formatting helpers for report tables.

use rust_decimal::Decimal;

use super::constants::HUNDRED;

/// Format a decimal as a percentage string.
#[must_use]
pub fn format_pct(value: Decimal) -> String {
    format!("{:.2}%", value * HUNDRED)
}

/// Format a decimal with 4 decimal places.
#[must_use]
pub fn format_decimal(value: Decimal) -> String {
    format!("{value:.4}")
}

/// Format an optional ratio, `N/A` when undefined.
#[must_use]
pub fn format_ratio(value: Option<Decimal>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.2}"))
}
