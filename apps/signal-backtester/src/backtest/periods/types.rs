//! Core types for train/test period schedules.

use std::fmt;
use std::ops::Range;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::backtest::dataset::Dataset;
use crate::error::{BacktestError, BacktestResult};

/// Schedule mode for splitting a dataset into periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SplitMode {
    /// One period from the given train/test bounds.
    #[default]
    Single,
    /// Fixed-length training window slides forward by `window` rows.
    Rolling {
        /// Test window length in rows.
        window: usize,
    },
    /// Training start stays fixed, training window grows by `window` rows.
    Anchored {
        /// Test window length in rows.
        window: usize,
    },
}

impl fmt::Display for SplitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => write!(f, "single"),
            Self::Rolling { window } => write!(f, "rolling(window={window})"),
            Self::Anchored { window } => write!(f, "anchored(window={window})"),
        }
    }
}

/// Train/test bounds, by row position or by date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeSpec {
    /// Half-open row ranges.
    ByIndex {
        /// Training rows `[start, end)`.
        train: Range<usize>,
        /// Test rows `[start, end)`.
        test: Range<usize>,
    },
    /// Inclusive date bounds, resolved by exact lookup in the dataset index.
    ByDate {
        /// First and last training date.
        train: (NaiveDate, NaiveDate),
        /// First and last test date.
        test: (NaiveDate, NaiveDate),
    },
}

impl RangeSpec {
    /// Position bounds: train `[train_start, train_end)`, test `[train_end, test_end)`.
    #[must_use]
    pub const fn by_index(train_start: usize, train_end: usize, test_end: usize) -> Self {
        Self::ByIndex {
            train: train_start..train_end,
            test: train_end..test_end,
        }
    }

    /// Date bounds, all inclusive.
    #[must_use]
    pub const fn by_date(
        train_first: NaiveDate,
        train_last: NaiveDate,
        test_first: NaiveDate,
        test_last: NaiveDate,
    ) -> Self {
        Self::ByDate {
            train: (train_first, train_last),
            test: (test_first, test_last),
        }
    }

    /// Resolve to half-open row ranges `(train, test)`.
    ///
    /// A date bound `d` maps to `position(d)` as a start and `position(d) + 1`
    /// as an end.
    ///
    /// # Errors
    ///
    /// Returns `DateNotFound` when a date is absent from the index.
    pub fn resolve(&self, dataset: &Dataset) -> BacktestResult<(Range<usize>, Range<usize>)> {
        match self {
            Self::ByIndex { train, test } => Ok((train.clone(), test.clone())),
            Self::ByDate { train, test } => {
                let train_start = dataset.position_of(train.0)?;
                let train_end = dataset.position_of(train.1)? + 1;
                let test_start = dataset.position_of(test.0)?;
                let test_end = dataset.position_of(test.1)? + 1;
                Ok((train_start..train_end, test_start..test_end))
            }
        }
    }
}

/// One train/test window over row positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacktestPeriod {
    /// Training rows.
    pub train: Range<usize>,
    /// Test rows.
    pub test: Range<usize>,
}

impl BacktestPeriod {
    /// Create a new period, checking ordering but not dataset bounds.
    ///
    /// # Errors
    ///
    /// Returns `Range` when either range is empty or the training range
    /// reaches into the test range.
    pub fn new(train: Range<usize>, test: Range<usize>) -> BacktestResult<Self> {
        if train.is_empty() {
            return Err(BacktestError::range(format!(
                "train range [{}, {}) is empty",
                train.start, train.end
            )));
        }
        if test.is_empty() {
            return Err(BacktestError::range(format!(
                "test range [{}, {}) is empty",
                test.start, test.end
            )));
        }
        if train.end > test.start {
            return Err(BacktestError::range(format!(
                "train range [{}, {}) overlaps or follows test range [{}, {})",
                train.start, train.end, test.start, test.end
            )));
        }
        Ok(Self { train, test })
    }

    /// Number of training rows.
    #[must_use]
    pub fn train_len(&self) -> usize {
        self.train.len()
    }

    /// Number of test rows.
    #[must_use]
    pub fn test_len(&self) -> usize {
        self.test.len()
    }

    /// Check that both ranges lie inside `dataset`.
    ///
    /// # Errors
    ///
    /// Returns `Range` when a bound exceeds the dataset.
    pub fn check_bounds(&self, dataset: &Dataset) -> BacktestResult<()> {
        dataset.check_range(&self.train, "train")?;
        dataset.check_range(&self.test, "test")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_new_valid() {
        let period = BacktestPeriod::new(0..100, 100..150).unwrap();
        assert_eq!(period.train_len(), 100);
        assert_eq!(period.test_len(), 50);
    }

    #[test]
    fn test_period_rejects_overlap() {
        assert!(matches!(
            BacktestPeriod::new(0..101, 100..150),
            Err(BacktestError::Range { .. })
        ));
    }

    #[test]
    fn test_period_rejects_empty() {
        assert!(BacktestPeriod::new(10..10, 10..20).is_err());
        assert!(BacktestPeriod::new(0..10, 20..20).is_err());
    }

    #[test]
    fn test_period_allows_gap() {
        assert!(BacktestPeriod::new(0..10, 15..20).is_ok());
    }

    #[test]
    fn test_split_mode_serde() {
        let mode: SplitMode = serde_json::from_str(r#"{"mode":"rolling","window":50}"#).unwrap();
        assert_eq!(mode, SplitMode::Rolling { window: 50 });
        let single: SplitMode = serde_json::from_str(r#"{"mode":"single"}"#).unwrap();
        assert_eq!(single, SplitMode::Single);
    }

    #[test]
    fn test_split_mode_display() {
        assert_eq!(SplitMode::Single.to_string(), "single");
        assert_eq!(
            SplitMode::Anchored { window: 20 }.to_string(),
            "anchored(window=20)"
        );
    }

    #[test]
    fn test_by_index_builds_adjacent_ranges() {
        let spec = RangeSpec::by_index(0, 100, 250);
        assert_eq!(
            spec,
            RangeSpec::ByIndex {
                train: 0..100,
                test: 100..250
            }
        );
    }
}
