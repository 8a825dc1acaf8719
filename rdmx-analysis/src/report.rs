//! Plain-text summaries printed by the analysis tools.

use crate::distribution::ErrorDistribution;
use crate::loader::Dataset;
use crate::psychometric::{CHANCE_ACCURACY, CoherencePoint};
use crate::rt::RtDistribution;
use rdmx_core::ErrorCategory;
use std::fmt::Write;

pub const NO_FILES: &str = "No data files found, nothing to analyze.";
pub const NO_ERRORS: &str = "No error trials in the data, nothing to analyze.";

/// What to print when no file yielded any data.
pub fn empty_dataset_report(dataset: &Dataset) -> String {
    if dataset.skipped.is_empty() {
        return NO_FILES.to_string();
    }
    format!(
        "{}\nNo readable data files, nothing to analyze.",
        dataset_summary(dataset)
    )
}

pub fn dataset_summary(dataset: &Dataset) -> String {
    let mut out = format!(
        "Loaded {} trials from {} file(s)",
        dataset.len(),
        dataset.files.len()
    );
    if !dataset.skipped.is_empty() {
        let _ = write!(out, ", skipped {} unreadable file(s)", dataset.skipped.len());
    }
    if dataset.malformed_rows > 0 {
        let _ = write!(out, ", dropped {} malformed row(s)", dataset.malformed_rows);
    }
    out
}

pub fn error_report(dist: &ErrorDistribution) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Overview ===");
    let _ = writeln!(out, "Trials in files: {}", dist.raw_trials);
    let _ = writeln!(out, "Scored trials:   {}", dist.scored_trials);
    let _ = writeln!(
        out,
        "Error trials:    {} (error rate {:.1}%)",
        dist.errors,
        dist.error_rate() * 100.0
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "=== Spatial tuning ===");
    for category in ErrorCategory::ALL.into_iter().filter(|c| c.is_error()) {
        let _ = writeln!(out, "{:<24} {}", category.label(), dist.count(category));
    }
    let _ = write!(
        out,
        "Neighbor share of errors: {:.1}% (chance {:.0}%)",
        dist.neighbor_share() * 100.0,
        dist.chance_neighbor_share() * 100.0
    );
    out
}

pub fn psychometric_report(points: &[CoherencePoint]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>9} {:>7} {:>16} {:>18}",
        "coherence", "trials", "accuracy", "RT correct (s)"
    );
    for p in points {
        let acc = match p.accuracy_sem {
            Some(sem) => format!("{:.3} ± {:.3}", p.accuracy, sem),
            None => format!("{:.3}", p.accuracy),
        };
        let rt = match (p.mean_rt, p.rt_sem) {
            (Some(m), Some(s)) => format!("{m:.3} ± {s:.3}"),
            (Some(m), None) => format!("{m:.3}"),
            _ => "-".to_string(),
        };
        let _ = writeln!(out, "{:>9} {:>7} {:>16} {:>18}", p.coherence, p.trials, acc, rt);
    }
    let _ = write!(out, "Chance accuracy: {:.1}%", CHANCE_ACCURACY * 100.0);
    out
}

pub fn rt_report(dist: &RtDistribution) -> String {
    let mut out = String::new();
    if dist.pooled {
        let _ = writeln!(
            out,
            "Too few six-choice trials at coherence {}, using all six-choice trials.",
            dist.coherence
        );
    }
    let _ = write!(
        out,
        "RT distribution: n = {}, mean {:.2} s, median {:.2} s, skewness {}",
        dist.n(),
        dist.mean,
        dist.median,
        dist.skewness
            .map_or_else(|| "n/a".to_string(), |s| format!("{s:.2}"))
    );
    out
}
