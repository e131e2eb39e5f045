//! Per-column standardization fit on training rows only.

use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::error::{BacktestError, BacktestResult};

/// Column scale below which a feature is treated as constant.
const MIN_STD: f64 = 1e-12;

/// Standard scaler: `(x - mean) / std` with population std per column.
///
/// Constant columns are only centred.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    means: Array1<f64>,
    stds: Array1<f64>,
}

impl StandardScaler {
    /// Fit column statistics on `rows`.
    ///
    /// # Errors
    ///
    /// Returns `Range` when `rows` is empty.
    pub fn fit(rows: ArrayView2<'_, f64>) -> BacktestResult<Self> {
        let means = rows
            .mean_axis(Axis(0))
            .ok_or_else(|| BacktestError::range("cannot fit scaler on zero rows"))?;
        let stds = rows
            .std_axis(Axis(0), 0.0)
            .mapv(|std| if std > MIN_STD { std } else { 1.0 });

        Ok(Self { means, stds })
    }

    /// Apply the fitted statistics to `rows`.
    ///
    /// # Errors
    ///
    /// Returns `LengthMismatch` when the column count differs from the fit.
    pub fn transform(&self, rows: ArrayView2<'_, f64>) -> BacktestResult<Array2<f64>> {
        if rows.ncols() != self.means.len() {
            return Err(BacktestError::length_mismatch(
                "feature columns",
                self.means.len(),
                rows.ncols(),
            ));
        }
        Ok((&rows - &self.means) / &self.stds)
    }

    /// Column means seen during fit.
    #[must_use]
    pub const fn means(&self) -> &Array1<f64> {
        &self.means
    }
}
