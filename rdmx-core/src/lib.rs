//! Core vocabulary of the six-choice random-dot-motion task: the target
//! layout, response scoring, circular error, trial records and the dot field.

pub mod classify;
pub mod dots;
pub mod layout;
pub mod metric;
pub mod phase;
pub mod record;
pub mod trial;

pub use classify::{Outcome, classify};
pub use dots::{Dot, DotField, DotFieldParams};
pub use layout::{ABORT_KEY, CONTINUE_KEY, Layout, LayoutError, Target};
pub use metric::{Angle, AngleError, CHANCE_NEIGHBOR_PROPORTION, ErrorCategory, delta};
pub use phase::{Phase, TaskPhase};
pub use record::TrialRecord;
pub use trial::{Feedback, RtBand, TrialState};
