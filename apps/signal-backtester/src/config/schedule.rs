//! Period schedule configuration.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::backtest::{RangeSpec, SplitMode};

/// Train/test bounds as written in the config file, tagged by `by: index | date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by")]
pub enum ScheduleBounds {
    /// Row positions: train `[train_start, train_end)`, test `[train_end, test_end)`.
    #[serde(rename = "index")]
    ByIndex {
        /// First training row.
        train_start: usize,
        /// One past the last training row, first test row.
        train_end: usize,
        /// One past the last test row.
        test_end: usize,
    },
    /// Inclusive dates (`YYYY-MM-DD`) that must exist in the dataset.
    #[serde(rename = "date")]
    ByDate {
        /// First training date.
        train_first: NaiveDate,
        /// Last training date.
        train_last: NaiveDate,
        /// First test date.
        test_first: NaiveDate,
        /// Last test date.
        test_last: NaiveDate,
    },
}

impl Default for ScheduleBounds {
    fn default() -> Self {
        Self::ByIndex {
            train_start: 0,
            train_end: 500,
            test_end: 750,
        }
    }
}

/// Period schedule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Train/test bounds.
    #[serde(default)]
    pub bounds: ScheduleBounds,
    /// Split mode (`single`, `rolling` or `anchored` with a `window`).
    #[serde(default)]
    pub split: SplitMode,
}

impl ScheduleConfig {
    /// Bounds as a range specification.
    #[must_use]
    pub const fn range_spec(&self) -> RangeSpec {
        match self.bounds {
            ScheduleBounds::ByIndex {
                train_start,
                train_end,
                test_end,
            } => RangeSpec::by_index(train_start, train_end, test_end),
            ScheduleBounds::ByDate {
                train_first,
                train_last,
                test_first,
                test_last,
            } => RangeSpec::by_date(train_first, train_last, test_first, test_last),
        }
    }
}
