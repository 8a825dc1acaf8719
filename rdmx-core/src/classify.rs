use crate::layout::Layout;
use crate::metric::{self, Angle, ErrorCategory};

/// Result of matching a response identifier against the instructed target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No target owns the identifier; correctness cannot be assigned.
    Unscored,
    Scored {
        target: Angle,
        chosen: Angle,
        correct: bool,
    },
}

impl Outcome {
    /// Index of the chosen target in the layout, if any.
    pub fn choice_index(&self) -> Option<usize> {
        match self {
            Outcome::Unscored => None,
            Outcome::Scored { chosen, .. } => Some(chosen.index()),
        }
    }

    pub fn is_scored(&self) -> bool {
        matches!(self, Outcome::Scored { .. })
    }

    pub fn is_correct(&self) -> bool {
        matches!(self, Outcome::Scored { correct: true, .. })
    }

    pub fn delta(&self) -> Option<i16> {
        match self {
            Outcome::Unscored => None,
            Outcome::Scored { target, chosen, .. } => Some(metric::delta(*target, *chosen)),
        }
    }

    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            Outcome::Unscored => None,
            Outcome::Scored { target, chosen, .. } => {
                Some(ErrorCategory::classify(*target, *chosen))
            }
        }
    }
}

/// Scores `identifier` against the instructed `target`.
pub fn classify(layout: &Layout, target: Angle, identifier: &str) -> Outcome {
    match layout.owner_of(identifier) {
        None => Outcome::Unscored,
        Some((_, owner)) => Outcome::Scored {
            target,
            chosen: owner.angle,
            correct: owner.angle == target,
        },
    }
}
