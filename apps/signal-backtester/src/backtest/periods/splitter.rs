//! Period schedule generation.

use tracing::{debug, warn};

use super::types::{BacktestPeriod, RangeSpec, SplitMode};
use crate::backtest::dataset::Dataset;
use crate::error::{BacktestError, BacktestResult};

/// Splits a dataset into ordered train/test periods.
#[derive(Debug, Clone, Copy)]
pub struct PeriodSplitter<'a> {
    dataset: &'a Dataset,
}

impl<'a> PeriodSplitter<'a> {
    /// Create a new splitter over `dataset`.
    #[must_use]
    pub const fn new(dataset: &'a Dataset) -> Self {
        Self { dataset }
    }

    /// Generate the period schedule for `spec` under `mode`.
    ///
    /// Rolling and anchored schedules only use the test end bound; test
    /// windows start where the training window ends. Trailing rows that
    /// cannot fill a whole test window are dropped.
    ///
    /// # Errors
    ///
    /// Returns `Range`/`DateNotFound` for bad bounds, a zero window or a
    /// schedule that yields no period.
    pub fn split(&self, spec: &RangeSpec, mode: SplitMode) -> BacktestResult<Vec<BacktestPeriod>> {
        let (train, test) = spec.resolve(self.dataset)?;

        if train.is_empty() {
            return Err(BacktestError::range(format!(
                "train range [{}, {}) is empty",
                train.start, train.end
            )));
        }
        if test.end > self.dataset.len() {
            return Err(BacktestError::range(format!(
                "test end {} exceeds dataset of {} rows",
                test.end,
                self.dataset.len()
            )));
        }

        let periods = match mode {
            SplitMode::Single => vec![BacktestPeriod::new(train.clone(), test.clone())?],
            SplitMode::Rolling { window } => {
                check_window(window)?;
                let train_len = train.len();
                let mut periods = Vec::new();
                let mut i = train.start;
                while let Some(test_end) = i
                    .checked_add(train_len)
                    .and_then(|start| start.checked_add(window))
                    .filter(|end| *end <= test.end)
                {
                    let test_start = i + train_len;
                    periods.push(BacktestPeriod::new(i..test_start, test_start..test_end)?);
                    i += window;
                }
                periods
            }
            SplitMode::Anchored { window } => {
                check_window(window)?;
                let mut periods = Vec::new();
                let mut train_end = train.end;
                while let Some(test_end) = train_end
                    .checked_add(window)
                    .filter(|end| *end <= test.end)
                {
                    periods.push(BacktestPeriod::new(
                        train.start..train_end,
                        train_end..test_end,
                    )?);
                    train_end = test_end;
                }
                periods
            }
        };

        if periods.is_empty() {
            warn!(
                train_start = train.start,
                train_end = train.end,
                test_end = test.end,
                ?mode,
                "Schedule yields no complete test window"
            );
            return Err(BacktestError::range(format!(
                "no complete test window fits before row {}",
                test.end
            )));
        }

        for period in &periods {
            period.check_bounds(self.dataset)?;
        }

        let covered: usize = periods.iter().map(BacktestPeriod::test_len).sum();
        let dropped = test.end.saturating_sub(train.end).saturating_sub(covered);
        if dropped > 0 && !matches!(mode, SplitMode::Single) {
            debug!(dropped_rows = dropped, "Trailing partial test window dropped");
        }

        Ok(periods)
    }
}

fn check_window(window: usize) -> BacktestResult<()> {
    if window == 0 {
        return Err(BacktestError::range("test window length must be positive"));
    }
    Ok(())
}
