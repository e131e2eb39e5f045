//! Progress tracking across backtest periods.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};

const BAR_WIDTH: u64 = 30;

/// Progress tracker shared by concurrent training jobs.
#[derive(Debug)]
pub struct ProgressTracker {
    total_jobs: u64,
    completed_jobs: AtomicU64,
    start_time: Instant,
}

impl ProgressTracker {
    /// Create a new progress tracker.
    #[must_use]
    pub fn new(total_jobs: u64) -> Self {
        Self {
            total_jobs,
            completed_jobs: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Mark a job as completed.
    pub fn job_completed(&self) {
        self.completed_jobs.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current progress.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn progress(&self) -> Progress {
        let completed = self.completed_jobs.load(Ordering::Relaxed);
        let elapsed = self.start_time.elapsed();

        let jobs_per_sec = if elapsed.as_secs_f64() > 0.0 {
            completed as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        let remaining = self.total_jobs.saturating_sub(completed);
        let eta_secs = if jobs_per_sec > 0.0 {
            (remaining as f64 / jobs_per_sec) as u64
        } else {
            0
        };

        Progress {
            total: self.total_jobs,
            completed,
            elapsed_secs: elapsed.as_secs(),
            eta_secs,
            jobs_per_sec,
        }
    }
}

/// Progress snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progress {
    /// Total number of jobs.
    pub total: u64,
    /// Completed jobs.
    pub completed: u64,
    /// Elapsed time in seconds.
    pub elapsed_secs: u64,
    /// Estimated time remaining in seconds.
    pub eta_secs: u64,
    /// Jobs processed per second.
    pub jobs_per_sec: f64,
}

impl Progress {
    /// Get completion percentage.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.completed as f64 / self.total as f64) * 100.0
        }
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filled = if self.total == 0 {
            BAR_WIDTH
        } else {
            (BAR_WIDTH * self.completed.min(self.total)) / self.total
        };
        let bar: String = (0..BAR_WIDTH)
            .map(|i| if i < filled { '#' } else { ' ' })
            .collect();
        write!(
            f,
            "[{bar}] {:.2}% ({}/{}) ETA {}s",
            self.percentage(),
            self.completed,
            self.total,
            self.eta_secs
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_tracker() {
        let tracker = ProgressTracker::new(10);

        tracker.job_completed();
        tracker.job_completed();
        tracker.job_completed();

        let progress = tracker.progress();
        assert_eq!(progress.total, 10);
        assert_eq!(progress.completed, 3);
        assert!((progress.percentage() - 30.0).abs() < 0.1);
    }

    #[test]
    fn test_progress_display() {
        let progress = Progress {
            total: 4,
            completed: 2,
            elapsed_secs: 1,
            eta_secs: 1,
            jobs_per_sec: 2.0,
        };
        let line = progress.to_string();
        assert!(line.starts_with(&format!("[{}{}]", "#".repeat(15), " ".repeat(15))));
        assert!(line.contains("50.00% (2/4) ETA 1s"));
    }

    #[test]
    fn test_empty_tracker_is_complete() {
        let progress = ProgressTracker::new(0).progress();
        assert_eq!(progress.completed, progress.total);
        assert!((progress.percentage() - 100.0).abs() < f64::EPSILON);
    }
}
