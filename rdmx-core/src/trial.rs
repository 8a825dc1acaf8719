use crate::metric::Angle;

/// Per-trial state machine.
///
/// `Fixation -> Stimulus -> Feedback -> Complete`. The stimulus phase also
/// holds the response window; it ends on the first recognized key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialState {
    Fixation,
    Stimulus,
    Feedback,
    Complete,
}

impl TrialState {
    pub fn accepts_response(&self) -> bool {
        matches!(self, TrialState::Stimulus)
    }

    pub fn shows_dots(&self) -> bool {
        matches!(self, TrialState::Stimulus | TrialState::Feedback)
    }
}

/// What the participant sees after answering.
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub target: Angle,
    pub chosen: Angle,
    pub correct: bool,
    /// Latency in seconds.
    pub rt: f64,
}

impl Feedback {
    pub fn rt_band(&self) -> RtBand {
        RtBand::from_seconds(self.rt)
    }
}

/// Speed class used to color the latency readout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtBand {
    /// under 0.5 s
    Fast,
    /// under 1.5 s
    Normal,
    Slow,
}

impl RtBand {
    pub fn from_seconds(rt: f64) -> Self {
        if rt < 0.5 {
            RtBand::Fast
        } else if rt < 1.5 {
            RtBand::Normal
        } else {
            RtBand::Slow
        }
    }
}
