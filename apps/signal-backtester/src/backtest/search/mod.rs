//! Time-respecting hyperparameter search.
//!
//! Every candidate of a parameter grid is fit on the leading rows of a
//! training range and scored by accuracy on its trailing rows. Candidate
//! scoring is independent per candidate and runs on Rayon's work-stealing
//! pool once the candidate count reaches `min_parallel_candidates`; picking
//! the winner waits for all scores.
//!
//! # Thread Pool Configuration
//!
//! ```ignore
//! use rayon::ThreadPoolBuilder;
//!
//! ThreadPoolBuilder::new()
//!     .num_threads(4)
//!     .build_global()?;
//! ```

mod config;
mod executor;
mod progress;
mod result;

pub use config::SearchConfig;
pub use executor::{HoldoutFold, HoldoutSearch};
pub use progress::{Progress, ProgressTracker};
pub use result::{CandidateScore, SearchOutcome};
