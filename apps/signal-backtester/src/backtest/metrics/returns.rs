//! Strategy returns, compounding and annualization.
//!
//! The strategy is long the asset on `+1` predictions and flat on `-1`
//! predictions. Every series below starts with a zero entry standing for the
//! moment before the first position is taken, so a span of `n` observations
//! yields `n + 1` values.

use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};

use super::constants::{TRADING_DAYS, TRADING_DAYS_PER_YEAR};
use super::math::{sample_std_dev, sqrt_decimal};
use crate::backtest::dataset::Direction;
use crate::error::{BacktestError, BacktestResult};

/// Profitability of one prediction sequence over an evaluation span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitabilityMetrics {
    /// Final compounded return.
    pub cumulative_return: Decimal,
    /// Compounded return scaled to a 252-day year.
    pub annualized_return: Decimal,
    /// Sample standard deviation of daily strategy returns, annualized.
    pub annualized_volatility: Decimal,
    /// Annualized return over annualized volatility. `None` when volatility is zero.
    pub sharpe_ratio: Option<Decimal>,
}

impl ProfitabilityMetrics {
    /// Compute all profitability metrics for `predictions` against `returns`.
    ///
    /// # Errors
    ///
    /// Returns `LengthMismatch` for unaligned inputs, `Range` for an empty
    /// span and `NumericOverflow` when compounding leaves the decimal range.
    pub fn compute(returns: &[Decimal], predictions: &[Direction]) -> BacktestResult<Self> {
        let curve = cumulative_returns(returns, predictions)?;
        let cumulative_return = curve.last().copied().unwrap_or(Decimal::ZERO);
        let annualized_return = annualized_return(cumulative_return, predictions.len())?;
        let annualized_volatility = annualized_volatility(returns, predictions)?;

        Ok(Self {
            cumulative_return,
            annualized_return,
            annualized_volatility,
            sharpe_ratio: sharpe_ratio(annualized_return, annualized_volatility)?,
        })
    }
}

fn check_aligned(returns: &[Decimal], predictions: &[Direction]) -> BacktestResult<()> {
    if returns.len() != predictions.len() {
        return Err(BacktestError::length_mismatch(
            "predictions",
            returns.len(),
            predictions.len(),
        ));
    }
    Ok(())
}

fn overflow(metric: &str) -> BacktestError {
    BacktestError::NumericOverflow {
        metric: metric.to_string(),
    }
}

/// Daily strategy returns: a leading zero, then `r` on `+1` steps and `0` on `-1` steps.
///
/// # Errors
///
/// Returns `LengthMismatch` when the inputs differ in length.
pub fn daily_returns(
    returns: &[Decimal],
    predictions: &[Direction],
) -> BacktestResult<Vec<Decimal>> {
    check_aligned(returns, predictions)?;

    let mut daily = Vec::with_capacity(returns.len() + 1);
    daily.push(Decimal::ZERO);
    daily.extend(returns.iter().zip(predictions).map(|(r, p)| {
        if p.is_up() {
            *r
        } else {
            Decimal::ZERO
        }
    }));
    Ok(daily)
}

/// Cumulative return series of the strategy, starting at zero.
///
/// The running wealth multiplies by `1 + r` on `+1` steps and is carried
/// unchanged on `-1` steps.
///
/// # Errors
///
/// Returns `LengthMismatch` for unaligned inputs and `NumericOverflow` when
/// the running product leaves the decimal range.
pub fn cumulative_returns(
    returns: &[Decimal],
    predictions: &[Direction],
) -> BacktestResult<Vec<Decimal>> {
    check_aligned(returns, predictions)?;

    let mut wealth = Decimal::ONE;
    let mut curve = Vec::with_capacity(returns.len() + 1);
    curve.push(Decimal::ZERO);
    for (r, p) in returns.iter().zip(predictions) {
        if p.is_up() {
            wealth = (Decimal::ONE + *r)
                .checked_mul(wealth)
                .ok_or_else(|| overflow("cumulative_return"))?;
        }
        curve.push(wealth - Decimal::ONE);
    }
    Ok(curve)
}

/// Annualize a final cumulative return earned over `observations` days.
///
/// `(1 + cumulative)^(252 / observations) - 1`. Exponents that are whole
/// numbers are evaluated exactly.
///
/// # Errors
///
/// Returns `Range` for zero observations or a cumulative return below -100%,
/// and `NumericOverflow` when the power is not representable.
pub fn annualized_return(cumulative: Decimal, observations: usize) -> BacktestResult<Decimal> {
    if observations == 0 {
        return Err(BacktestError::range(
            "annualized return needs at least one observation",
        ));
    }

    let base = Decimal::ONE + cumulative;
    if base.is_sign_negative() && !base.is_zero() {
        return Err(BacktestError::range(format!(
            "cumulative return {cumulative} is below -100%"
        )));
    }
    if base.is_zero() {
        return Ok(Decimal::NEGATIVE_ONE);
    }
    if base == Decimal::ONE {
        return Ok(Decimal::ZERO);
    }

    let n = observations as u64;
    let grown = if TRADING_DAYS_PER_YEAR % n == 0 {
        base.checked_powu(TRADING_DAYS_PER_YEAR / n)
    } else {
        base.checked_powd(TRADING_DAYS / Decimal::from(n))
    };

    grown
        .map(|g| g - Decimal::ONE)
        .ok_or_else(|| overflow("annualized_return"))
}

/// Annualized volatility: sample standard deviation of the daily returns times sqrt(252).
///
/// # Errors
///
/// Returns `LengthMismatch` for unaligned inputs and `Range` for an empty span.
pub fn annualized_volatility(
    returns: &[Decimal],
    predictions: &[Direction],
) -> BacktestResult<Decimal> {
    let daily = daily_returns(returns, predictions)?;
    let std = sample_std_dev(&daily)
        .ok_or_else(|| BacktestError::range("volatility needs at least one observation"))?;
    let factor = sqrt_decimal(TRADING_DAYS).ok_or_else(|| overflow("annualized_volatility"))?;

    std.checked_mul(factor)
        .ok_or_else(|| overflow("annualized_volatility"))
}

/// Sharpe ratio (zero risk-free rate). `None` when volatility is exactly zero.
///
/// # Errors
///
/// Returns `NumericOverflow` when the ratio leaves the decimal range.
pub fn sharpe_ratio(
    annualized_return: Decimal,
    annualized_volatility: Decimal,
) -> BacktestResult<Option<Decimal>> {
    if annualized_volatility.is_zero() {
        return Ok(None);
    }
    annualized_return
        .checked_div(annualized_volatility)
        .map(Some)
        .ok_or_else(|| overflow("sharpe_ratio"))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::backtest::dataset::Direction::{Down, Up};

    fn scenario() -> (Vec<Decimal>, Vec<Direction>) {
        (
            vec![
                dec!(0.01),
                dec!(-0.02),
                dec!(0.03),
                dec!(0),
                dec!(0.01),
                dec!(-0.01),
                dec!(0.02),
                dec!(0.01),
                dec!(-0.03),
                dec!(0.02),
            ],
            vec![Up, Up, Down, Up, Up, Down, Up, Up, Up, Down],
        )
    }

    #[test]
    fn test_daily_returns_scenario() {
        let (returns, predictions) = scenario();
        let daily = daily_returns(&returns, &predictions).unwrap();
        assert_eq!(
            daily,
            vec![
                dec!(0),
                dec!(0.01),
                dec!(-0.02),
                dec!(0),
                dec!(0),
                dec!(0.01),
                dec!(0),
                dec!(0.02),
                dec!(0.01),
                dec!(-0.03),
                dec!(0),
            ]
        );
    }

    #[test]
    fn test_cumulative_returns_scenario() {
        let (returns, predictions) = scenario();
        let curve = cumulative_returns(&returns, &predictions).unwrap();
        assert_eq!(
            curve,
            vec![
                dec!(0),
                dec!(0.01),
                dec!(-0.0102),
                dec!(-0.0102),
                dec!(-0.0102),
                dec!(-0.000302),
                dec!(-0.000302),
                dec!(0.01969196),
                dec!(0.0298888796),
                dec!(-0.001007786788),
                dec!(-0.001007786788),
            ]
        );
    }

    #[test]
    fn test_length_mismatch() {
        let result = daily_returns(&[dec!(0.01), dec!(0.02)], &[Up]);
        assert!(matches!(
            result,
            Err(BacktestError::LengthMismatch {
                expected: 2,
                got: 1,
                ..
            })
        ));
        assert!(cumulative_returns(&[dec!(0.01)], &[]).is_err());
        assert!(annualized_volatility(&[], &[Up]).is_err());
    }

    #[test]
    fn test_annualized_return_full_year_is_identity() {
        assert_eq!(annualized_return(dec!(0.1), 252).unwrap(), dec!(0.1));
    }

    #[test]
    fn test_annualized_return_half_year_squares() {
        assert_eq!(annualized_return(dec!(0.1), 126).unwrap(), dec!(0.21));
    }

    #[test]
    fn test_annualized_return_fractional_exponent() {
        // 500 days: (1.2)^(252/500) - 1 ~= 0.096245
        let value = annualized_return(dec!(0.2), 500).unwrap();
        assert!((value - dec!(0.096245)).abs() < dec!(0.0001));
    }

    #[test]
    fn test_annualized_return_zero_observations() {
        assert!(matches!(
            annualized_return(dec!(0.1), 0),
            Err(BacktestError::Range { .. })
        ));
    }

    #[test]
    fn test_annualized_return_total_loss() {
        assert_eq!(annualized_return(dec!(-1), 10).unwrap(), dec!(-1));
    }

    #[test]
    fn test_annualized_return_overflow() {
        assert!(matches!(
            annualized_return(dec!(1000000), 1),
            Err(BacktestError::NumericOverflow { .. })
        ));
    }

    #[test]
    fn test_volatility_matches_sample_std() {
        let returns = vec![dec!(0.01), dec!(-0.01), dec!(0.02)];
        let predictions = vec![Up, Up, Up];
        // daily = [0, 0.01, -0.01, 0.02], mean 0.005, var = 0.0005 / 3
        let expected_std = sqrt_decimal(dec!(0.0005) / dec!(3)).unwrap();
        let expected = expected_std * sqrt_decimal(dec!(252)).unwrap();
        let vol = annualized_volatility(&returns, &predictions).unwrap();
        assert!((vol - expected).abs() < dec!(0.000000001));
    }

    #[test]
    fn test_all_down_is_flat_with_undefined_sharpe() {
        let (returns, _) = scenario();
        let predictions = vec![Down; returns.len()];
        let metrics = ProfitabilityMetrics::compute(&returns, &predictions).unwrap();

        assert_eq!(metrics.cumulative_return, Decimal::ZERO);
        assert_eq!(metrics.annualized_return, Decimal::ZERO);
        assert_eq!(metrics.annualized_volatility, Decimal::ZERO);
        assert_eq!(metrics.sharpe_ratio, None);
    }

    #[test]
    fn test_sharpe_ratio() {
        assert_eq!(sharpe_ratio(dec!(0.2), dec!(0.1)).unwrap(), Some(dec!(2)));
        assert_eq!(sharpe_ratio(dec!(0.2), Decimal::ZERO).unwrap(), None);
    }

    #[test]
    fn test_sharpe_ratio_overflow_is_not_undefined() {
        let tiny = Decimal::new(1, 28);
        assert!(matches!(
            sharpe_ratio(Decimal::MAX, tiny),
            Err(BacktestError::NumericOverflow { .. })
        ));
    }

    fn arb_return() -> impl Strategy<Value = Decimal> {
        (-500i64..=500).prop_map(|bps| Decimal::new(bps, 4))
    }

    fn arb_direction() -> impl Strategy<Value = Direction> {
        prop_oneof![Just(Up), Just(Down)]
    }

    proptest! {
        #[test]
        fn prop_hold_step_leaves_wealth_unchanged(
            path in prop::collection::vec((arb_return(), arb_direction()), 1..40),
            inserted in arb_return(),
            at in any::<prop::sample::Index>(),
        ) {
            let (returns, predictions): (Vec<_>, Vec<_>) = path.into_iter().unzip();
            let base = cumulative_returns(&returns, &predictions).unwrap();

            let idx = at.index(returns.len() + 1);
            let mut returns_with = returns.clone();
            let mut predictions_with = predictions.clone();
            returns_with.insert(idx, inserted);
            predictions_with.insert(idx, Down);
            let extended = cumulative_returns(&returns_with, &predictions_with).unwrap();

            prop_assert_eq!(base.last(), extended.last());
        }

        #[test]
        fn prop_all_up_is_compounded_product(returns in prop::collection::vec(arb_return(), 1..40)) {
            let predictions = vec![Up; returns.len()];
            let curve = cumulative_returns(&returns, &predictions).unwrap();
            let product = returns.iter().fold(Decimal::ONE, |acc, r| (Decimal::ONE + *r) * acc);
            prop_assert_eq!(curve.last().copied(), Some(product - Decimal::ONE));
            prop_assert_eq!(curve.len(), returns.len() + 1);
        }

        #[test]
        fn prop_all_down_is_zero(returns in prop::collection::vec(arb_return(), 1..40)) {
            let predictions = vec![Down; returns.len()];
            let curve = cumulative_returns(&returns, &predictions).unwrap();
            prop_assert!(curve.iter().all(|c| c.is_zero()));
            prop_assert_eq!(annualized_volatility(&returns, &predictions).unwrap(), Decimal::ZERO);
        }
    }
}
