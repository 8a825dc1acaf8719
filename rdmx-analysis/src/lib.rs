//! Offline aggregation of six-choice motion task sessions.

pub mod cli;
pub mod distribution;
mod error;
pub mod loader;
pub mod plot;
pub mod psychometric;
pub mod report;
pub mod rt;
pub mod stats;

pub use distribution::{ErrorDistribution, ScoredTrial, error_distribution, score_rows};
pub use error::AnalysisError;
pub use loader::{Dataset, LoadError, TrialRow, infer_choice_count, load_dataset};
pub use psychometric::{CHANCE_ACCURACY, CoherencePoint, filter_latency, psychometric_curve};
pub use rt::{RtDistribution, rt_distribution};
