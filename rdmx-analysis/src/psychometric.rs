//! Accuracy and latency as a function of motion coherence.

use crate::loader::TrialRow;
use crate::stats::{mean, sem};

/// Latencies outside this open interval are anticipations or lapses.
pub const RT_MIN: f64 = 0.1;
pub const RT_MAX: f64 = 5.0;

/// Task size the curves are computed for.
pub const CURVE_CHOICES: u32 = 6;
pub const CHANCE_ACCURACY: f64 = 1.0 / CURVE_CHOICES as f64;

pub fn within_latency_window(rt: f64) -> bool {
    rt > RT_MIN && rt < RT_MAX
}

pub fn filter_latency(rows: &[TrialRow]) -> Vec<&TrialRow> {
    rows.iter().filter(|r| within_latency_window(r.rt)).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoherencePoint {
    pub coherence: f64,
    pub trials: usize,
    pub accuracy: f64,
    pub accuracy_sem: Option<f64>,
    pub correct_trials: usize,
    /// Mean latency of correct trials.
    pub mean_rt: Option<f64>,
    pub rt_sem: Option<f64>,
}

/// Groups rows by coherence level, ascending.
fn by_coherence<'a>(rows: &[&'a TrialRow]) -> Vec<(f64, Vec<&'a TrialRow>)> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| a.coherence.total_cmp(&b.coherence));

    let mut groups: Vec<(f64, Vec<&TrialRow>)> = Vec::new();
    for row in sorted {
        match groups.last_mut() {
            Some((c, group)) if *c == row.coherence => group.push(row),
            _ => groups.push((row.coherence, vec![row])),
        }
    }
    groups
}

/// Psychometric (accuracy) and chronometric (correct-trial latency) points
/// for the six-choice trials among `rows`.
pub fn psychometric_curve(rows: &[&TrialRow]) -> Vec<CoherencePoint> {
    let six: Vec<&TrialRow> = rows
        .iter()
        .copied()
        .filter(|r| r.n_choice == CURVE_CHOICES)
        .collect();

    by_coherence(&six)
        .into_iter()
        .map(|(coherence, group)| {
            let hits: Vec<f64> = group
                .iter()
                .map(|r| if r.correct { 1.0 } else { 0.0 })
                .collect();
            let correct_rts: Vec<f64> = group.iter().filter(|r| r.correct).map(|r| r.rt).collect();
            CoherencePoint {
                coherence,
                trials: group.len(),
                accuracy: mean(&hits).unwrap_or(0.0),
                accuracy_sem: sem(&hits),
                correct_trials: correct_rts.len(),
                mean_rt: mean(&correct_rts),
                rt_sem: sem(&correct_rts),
            }
        })
        .collect()
}
