//! Decimal constants for return and risk calculations.

use rust_decimal::Decimal;

pub const TWO: Decimal = Decimal::TWO;
pub const HUNDRED: Decimal = Decimal::ONE_HUNDRED;
pub const TRADING_DAYS: Decimal = Decimal::from_parts(252, 0, 0, false, 0);
pub const TRADING_DAYS_PER_YEAR: u64 = 252;
pub const TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 20); // 1e-20
