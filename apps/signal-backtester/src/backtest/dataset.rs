//! Time-ordered dataset of features, direction labels and realized returns.

use std::fmt;
use std::ops::Range;

use chrono::NaiveDate;
use ndarray::{Array2, ArrayView2, Axis, Slice};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{BacktestError, BacktestResult};

/// Predicted or realized direction of the next-period move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Direction {
    /// Price falls (-1). Strategy stays in cash.
    Down,
    /// Price rises (+1). Strategy holds the asset.
    Up,
}

impl Direction {
    /// Direction implied by the sign of a realized return. Zero counts as down.
    #[must_use]
    pub fn from_return(value: Decimal) -> Self {
        if value > Decimal::ZERO {
            Self::Up
        } else {
            Self::Down
        }
    }

    /// Whether this direction holds the asset.
    #[must_use]
    pub const fn is_up(self) -> bool {
        matches!(self, Self::Up)
    }

    /// Signed label value.
    #[must_use]
    pub const fn as_i8(self) -> i8 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

impl From<Direction> for i8 {
    fn from(direction: Direction) -> Self {
        direction.as_i8()
    }
}

impl TryFrom<i8> for Direction {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Up),
            -1 => Ok(Self::Down),
            other => Err(format!("invalid direction label {other}, expected +1 or -1")),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "+1"),
            Self::Down => write!(f, "-1"),
        }
    }
}

/// Immutable, validated backtest dataset.
///
/// Row `i` holds the features observed at `dates[i]`, the direction label of
/// the following move and the realized return earned by holding through it.
#[derive(Debug, Clone)]
pub struct Dataset {
    features: Array2<f64>,
    labels: Vec<Direction>,
    returns: Vec<Decimal>,
    dates: Vec<NaiveDate>,
}

impl Dataset {
    /// Create a new dataset.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDataset` if the dataset is empty, the columns differ
    /// in length or the dates are not strictly increasing.
    pub fn new(
        features: Array2<f64>,
        labels: Vec<Direction>,
        returns: Vec<Decimal>,
        dates: Vec<NaiveDate>,
    ) -> BacktestResult<Self> {
        let rows = dates.len();
        if rows == 0 {
            return Err(BacktestError::InvalidDataset("dataset has no rows".to_string()));
        }
        if features.nrows() != rows || labels.len() != rows || returns.len() != rows {
            return Err(BacktestError::InvalidDataset(format!(
                "column lengths differ: {} dates, {} feature rows, {} labels, {} returns",
                rows,
                features.nrows(),
                labels.len(),
                returns.len()
            )));
        }
        if let Some(pair) = dates.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(BacktestError::InvalidDataset(format!(
                "dates not strictly increasing at {} -> {}",
                pair[0], pair[1]
            )));
        }

        Ok(Self {
            features,
            labels,
            returns,
            dates,
        })
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Always false for a constructed dataset.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Number of feature columns.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// All feature rows.
    #[must_use]
    pub const fn features(&self) -> &Array2<f64> {
        &self.features
    }

    /// All direction labels.
    #[must_use]
    pub fn labels(&self) -> &[Direction] {
        &self.labels
    }

    /// All realized returns.
    #[must_use]
    pub fn returns(&self) -> &[Decimal] {
        &self.returns
    }

    /// Date index.
    #[must_use]
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Feature rows in `range`.
    #[must_use]
    pub fn feature_rows(&self, range: Range<usize>) -> ArrayView2<'_, f64> {
        self.features.slice_axis(Axis(0), Slice::from(range))
    }

    /// Labels in `range`.
    #[must_use]
    pub fn label_rows(&self, range: Range<usize>) -> &[Direction] {
        &self.labels[range]
    }

    /// Returns in `range`.
    #[must_use]
    pub fn return_rows(&self, range: Range<usize>) -> &[Decimal] {
        &self.returns[range]
    }

    /// Exact position of `date` in the index.
    ///
    /// # Errors
    ///
    /// Returns `DateNotFound` when the date is not in the index.
    pub fn position_of(&self, date: NaiveDate) -> BacktestResult<usize> {
        self.dates
            .binary_search(&date)
            .map_err(|_| BacktestError::DateNotFound {
                date: date.to_string(),
            })
    }

    /// Check that `range` is non-empty and inside the dataset.
    ///
    /// # Errors
    ///
    /// Returns `Range` when the bounds are empty or exceed the row count.
    pub fn check_range(&self, range: &Range<usize>, what: &str) -> BacktestResult<()> {
        if range.start >= range.end {
            return Err(BacktestError::range(format!(
                "{what} range [{}, {}) is empty",
                range.start, range.end
            )));
        }
        if range.end > self.len() {
            return Err(BacktestError::range(format!(
                "{what} range [{}, {}) exceeds dataset of {} rows",
                range.start,
                range.end,
                self.len()
            )));
        }
        Ok(())
    }
}
