//! Latency distribution at the hardest coherence level.

use crate::loader::TrialRow;
use crate::psychometric::CURVE_CHOICES;
use crate::stats::{mean, median, skewness};
use tracing::info;

/// Below this many samples the lowest-coherence subset is too thin and
/// every six-choice trial is used instead.
pub const MIN_SAMPLES: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct RtDistribution {
    /// Lowest coherence level in the filtered data.
    pub coherence: f64,
    /// Set when the lowest-coherence subset was too small.
    pub pooled: bool,
    pub samples: Vec<f64>,
    pub mean: f64,
    pub median: f64,
    pub skewness: Option<f64>,
}

impl RtDistribution {
    pub fn n(&self) -> usize {
        self.samples.len()
    }
}

/// Picks the six-choice trials at the lowest coherence present in `rows`
/// and summarizes their latencies.
pub fn rt_distribution(rows: &[&TrialRow]) -> Option<RtDistribution> {
    let coherence = rows
        .iter()
        .map(|r| r.coherence)
        .min_by(f64::total_cmp)?;

    let six = rows.iter().filter(|r| r.n_choice == CURVE_CHOICES);
    let mut samples: Vec<f64> = six
        .clone()
        .filter(|r| r.coherence == coherence)
        .map(|r| r.rt)
        .collect();
    let mut pooled = false;
    if samples.len() < MIN_SAMPLES {
        info!(
            n = samples.len(),
            coherence, "too few lowest-coherence trials, pooling all six-choice trials"
        );
        samples = six.map(|r| r.rt).collect();
        pooled = true;
    }

    Some(RtDistribution {
        coherence,
        pooled,
        mean: mean(&samples)?,
        median: median(&samples)?,
        skewness: skewness(&samples),
        samples,
    })
}
