pub mod config;
pub mod datafile;
pub mod schedule;
pub mod session;
pub use config::{ConfigError, TaskConfig};
pub use datafile::{DataFile, DataFileError};
pub use schedule::{Block, TrialPlan};
pub use session::{ActiveTrial, RunStatus, SessionEvent, TaskSession, TrialTimestamps};
