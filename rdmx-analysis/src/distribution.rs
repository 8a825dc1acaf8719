//! Spatial error distribution across all sessions.

use crate::loader::TrialRow;
use rdmx_core::{Angle, CHANCE_NEIGHBOR_PROPORTION, ErrorCategory, Layout, delta};
use std::collections::BTreeMap;

/// A scored trial: the response maps to a target and the target is one of
/// the six directions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredTrial {
    pub target: Angle,
    pub response: Angle,
    pub delta: i16,
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorDistribution {
    pub raw_trials: usize,
    pub scored_trials: usize,
    pub errors: usize,
    /// Error trials per category, indexed like `ErrorCategory::ALL`.
    pub error_counts: [usize; 4],
    /// Scored trials per delta (correct ones included), as plotted.
    pub delta_counts: BTreeMap<i16, usize>,
}

impl ErrorDistribution {
    pub fn error_rate(&self) -> f64 {
        self.errors as f64 / self.scored_trials as f64
    }

    pub fn count(&self, category: ErrorCategory) -> usize {
        ErrorCategory::ALL
            .iter()
            .position(|c| *c == category)
            .map_or(0, |i| self.error_counts[i])
    }

    /// Share of errors landing on a neighboring target.
    pub fn neighbor_share(&self) -> f64 {
        self.count(ErrorCategory::Neighbor) as f64 / self.errors as f64
    }

    pub fn chance_neighbor_share(&self) -> f64 {
        CHANCE_NEIGHBOR_PROPORTION
    }
}

/// Keeps the rows whose response and target can be placed on the circle.
pub fn score_rows(rows: &[TrialRow], layout: &Layout) -> Vec<ScoredTrial> {
    rows.iter()
        .filter_map(|row| {
            let (_, owner) = layout.owner_of(&row.response)?;
            let target = Angle::new(row.target_angle).ok()?;
            Some(ScoredTrial {
                target,
                response: owner.angle,
                delta: delta(target, owner.angle),
                correct: row.correct,
            })
        })
        .collect()
}

/// Tallies error trials by category. Error trials are the ones recorded as
/// incorrect in the data file.
///
/// Returns `None` when there is no error trial to analyze.
pub fn error_distribution(rows: &[TrialRow], layout: &Layout) -> Option<ErrorDistribution> {
    let scored = score_rows(rows, layout);

    let mut error_counts = [0usize; 4];
    let mut delta_counts = BTreeMap::new();
    let mut errors = 0usize;
    for trial in &scored {
        *delta_counts.entry(trial.delta).or_insert(0) += 1;
        if trial.correct {
            continue;
        }
        errors += 1;
        if let Some(category) = ErrorCategory::from_delta(trial.delta) {
            if let Some(i) = ErrorCategory::ALL.iter().position(|c| *c == category) {
                error_counts[i] += 1;
            }
        }
    }

    if errors == 0 {
        return None;
    }
    Some(ErrorDistribution {
        raw_trials: rows.len(),
        scored_trials: scored.len(),
        errors,
        error_counts,
        delta_counts,
    })
}
