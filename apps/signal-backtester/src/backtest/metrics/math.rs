//! Statistical helpers on decimal series.

use rust_decimal::Decimal;

use super::constants::{TOLERANCE, TWO};

/// Arithmetic mean of a slice of decimals.
pub fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let sum: Decimal = values.iter().sum();
    Some(sum / Decimal::from(values.len() as u64))
}

/// Sample standard deviation (n - 1 denominator).
pub fn sample_std_dev(values: &[Decimal]) -> Option<Decimal> {
    if values.len() < 2 {
        return None;
    }

    let avg = mean(values)?;
    let variance_sum: Decimal = values.iter().map(|v| (*v - avg) * (*v - avg)).sum();
    let variance = variance_sum / Decimal::from((values.len() - 1) as u64);

    sqrt_decimal(variance)
}

/// Square root by Newton's method.
pub fn sqrt_decimal(value: Decimal) -> Option<Decimal> {
    if value < Decimal::ZERO {
        return None;
    }
    if value == Decimal::ZERO {
        return Some(Decimal::ZERO);
    }

    let mut guess = if value > Decimal::ONE {
        value / TWO
    } else {
        Decimal::ONE
    };

    for _ in 0..100 {
        let next = (guess + value / guess) / TWO;
        if (next - guess).abs() < TOLERANCE {
            return Some(next);
        }
        guess = next;
    }

    Some(guess)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_mean() {
        let values = vec![dec!(10), dec!(20), dec!(30), dec!(40)];
        assert_eq!(mean(&values), Some(dec!(25)));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_sample_std_dev() {
        let values = vec![dec!(2), dec!(4), dec!(4), dec!(4), dec!(5), dec!(5), dec!(7), dec!(9)];
        let Some(std) = sample_std_dev(&values) else {
            panic!("std should exist for eight values");
        };
        // sum of squares 32, n - 1 = 7
        let expected = dec!(2.1380899352993950);
        assert!((std - expected).abs() < dec!(0.0000000001));
    }

    #[test]
    fn test_std_dev_needs_two_values() {
        assert_eq!(sample_std_dev(&[dec!(1)]), None);
    }

    #[test]
    fn test_std_dev_of_constant_series_is_zero() {
        assert_eq!(sample_std_dev(&[dec!(0.5); 6]), Some(Decimal::ZERO));
    }

    #[test]
    fn test_sqrt() {
        let Some(sqrt4) = sqrt_decimal(dec!(4)) else {
            panic!("sqrt of 4 should succeed");
        };
        assert!((sqrt4 - dec!(2)).abs() < dec!(0.000000000001));

        let Some(small) = sqrt_decimal(dec!(0.0001)) else {
            panic!("sqrt of 0.0001 should succeed");
        };
        assert!((small - dec!(0.01)).abs() < dec!(0.000000000001));

        assert_eq!(sqrt_decimal(dec!(-1)), None);
    }
}
