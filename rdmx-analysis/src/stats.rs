//! Descriptive statistics over plain slices.

pub fn mean(xs: &[f64]) -> Option<f64> {
    if xs.is_empty() {
        None
    } else {
        Some(xs.iter().sum::<f64>() / xs.len() as f64)
    }
}

pub fn median(xs: &[f64]) -> Option<f64> {
    if xs.is_empty() {
        return None;
    }
    let mut sorted = xs.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    })
}

/// Sample standard deviation (n - 1 denominator).
pub fn std_dev(xs: &[f64]) -> Option<f64> {
    if xs.len() < 2 {
        return None;
    }
    let m = mean(xs)?;
    let ss: f64 = xs.iter().map(|x| (x - m).powi(2)).sum();
    Some((ss / (xs.len() - 1) as f64).sqrt())
}

/// Standard error of the mean.
pub fn sem(xs: &[f64]) -> Option<f64> {
    std_dev(xs).map(|s| s / (xs.len() as f64).sqrt())
}

/// Adjusted Fisher-Pearson skewness (G1). Zero for constant data, `None`
/// below three samples.
pub fn skewness(xs: &[f64]) -> Option<f64> {
    let n = xs.len();
    if n < 3 {
        return None;
    }
    let m = mean(xs)?;
    let nf = n as f64;
    let m2 = xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / nf;
    let m3 = xs.iter().map(|x| (x - m).powi(3)).sum::<f64>() / nf;
    if m2 <= f64::EPSILON * m.abs().max(1.0) {
        return Some(0.0);
    }
    let g1 = m3 / m2.powf(1.5);
    Some((nf * (nf - 1.0)).sqrt() / (nf - 2.0) * g1)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub edges: Vec<f64>,
    /// Probability density per bin; integrates to one over the edges.
    pub density: Vec<f64>,
}

/// Equal-width density histogram spanning the data range.
pub fn histogram(xs: &[f64], bins: usize) -> Option<Histogram> {
    if xs.is_empty() || bins == 0 {
        return None;
    }
    let lo = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if hi <= lo {
        hi = lo + 1e-3;
    }
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for &x in xs {
        let i = (((x - lo) / width) as usize).min(bins - 1);
        counts[i] += 1;
    }
    let total = xs.len() as f64;
    Some(Histogram {
        edges: (0..=bins).map(|i| lo + i as f64 * width).collect(),
        density: counts.iter().map(|&c| c as f64 / (total * width)).collect(),
    })
}

/// Gaussian kernel density estimate with Scott's bandwidth, evaluated at
/// `at`. `None` when the spread of `xs` is zero or undefined.
pub fn kde(xs: &[f64], at: &[f64]) -> Option<Vec<f64>> {
    let sd = std_dev(xs)?;
    if sd <= 0.0 {
        return None;
    }
    let n = xs.len() as f64;
    let bw = sd * n.powf(-0.2);
    let norm = 1.0 / (n * bw * (2.0 * std::f64::consts::PI).sqrt());
    Some(
        at.iter()
            .map(|&t| {
                norm * xs
                    .iter()
                    .map(|&x| (-0.5 * ((t - x) / bw).powi(2)).exp())
                    .sum::<f64>()
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const RTS: [f64; 8] = [0.4, 0.5, 0.55, 0.6, 0.7, 0.9, 1.4, 2.5];

    #[test]
    fn central_tendency() {
        assert_abs_diff_eq!(mean(&RTS).unwrap(), 0.94375, epsilon = 1e-12);
        assert_abs_diff_eq!(median(&RTS).unwrap(), 0.65, epsilon = 1e-12);
        assert_abs_diff_eq!(median(&[3.0, 1.0, 2.0]).unwrap(), 2.0);
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn spread() {
        assert_abs_diff_eq!(std_dev(&RTS).unwrap(), 0.7027687589608893, epsilon = 1e-12);
        assert_abs_diff_eq!(sem(&RTS).unwrap(), 0.24846627753364953, epsilon = 1e-12);
        assert_eq!(sem(&[1.0]), None);
    }

    #[test]
    fn skewness_matches_the_adjusted_estimator() {
        assert_abs_diff_eq!(skewness(&RTS).unwrap(), 1.920587403190041, epsilon = 1e-9);
        assert_eq!(skewness(&[1.0, 2.0]), None);
        assert_eq!(skewness(&[0.7, 0.7, 0.7]), Some(0.0));
    }

    #[test]
    fn histogram_density_integrates_to_one() {
        let h = histogram(&RTS, 30).unwrap();
        assert_eq!(h.edges.len(), 31);
        let width = h.edges[1] - h.edges[0];
        let area: f64 = h.density.iter().map(|d| d * width).sum();
        assert_abs_diff_eq!(area, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn kde_peaks_near_the_mass() {
        let at = [0.6, 2.9];
        let d = kde(&RTS, &at).unwrap();
        assert!(d[0] > d[1]);
        assert!(kde(&[1.0, 1.0], &at).is_none());
    }
}
