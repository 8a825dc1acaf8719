use crate::metric::Angle;
use serde::{Deserialize, Serialize};

/// One row of the per-session data file.
///
/// Column names match the files produced by earlier versions of the task so
/// old and new sessions can be analysed together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    /// Seconds from stimulus onset to the first recognized key.
    #[serde(rename = "RT")]
    pub rt: f64,
    #[serde(rename = "Response")]
    pub response: String,
    #[serde(rename = "Correct")]
    pub correct: u8,
    #[serde(rename = "Coherence")]
    pub coherence: f64,
    #[serde(rename = "TargetAngle")]
    pub target_angle: Angle,
}

impl TrialRecord {
    pub fn is_correct(&self) -> bool {
        self.correct == 1
    }
}
