//! Train/test period schedules.
//!
//! Splits a time-ordered dataset into train/test windows:
//!
//! - **Single**: one window from explicit bounds
//! - **Rolling**: fixed-length training window that slides by the test length
//! - **Anchored**: expanding training window with a fixed start
//!
//! Test windows within one schedule are contiguous, non-overlapping and of
//! equal length. Every training window ends at or before its test window.

mod splitter;
mod types;

pub use splitter::PeriodSplitter;
pub use types::{BacktestPeriod, RangeSpec, SplitMode};
