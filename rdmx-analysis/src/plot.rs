//! PNG figures for the aggregated reports.

use crate::distribution::ErrorDistribution;
use crate::error::AnalysisError;
use crate::psychometric::{CHANCE_ACCURACY, CoherencePoint};
use crate::rt::RtDistribution;
use crate::stats::{histogram, kde};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontStyle;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use rdmx_core::ErrorCategory;
use std::error::Error;
use std::f64::consts::PI;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

type PlotResult = Result<(), Box<dyn Error>>;

const FONT: &str = "sans-serif";
const HIST_BINS: usize = 30;
const KDE_POINTS: usize = 300;
const RT_AXIS_MAX: f64 = 3.0;
/// Angular width of a polar bar, in radians.
const BAR_WIDTH: f64 = 0.8;
/// Polar bars are scaled so the tallest one reaches this radius.
const POLAR_EXTENT: f64 = 1.35;

const NAVY: RGBColor = RGBColor(0, 0, 128);
const FIREBRICK: RGBColor = RGBColor(178, 34, 34);
const TEAL: RGBColor = RGBColor(0, 128, 128);
const CHANCE: RGBColor = RGBColor(128, 128, 128);
const MEAN_LINE: RGBColor = RGBColor(220, 0, 0);
const MEDIAN_LINE: RGBColor = RGBColor(255, 165, 0);

static FONT_READY: AtomicBool = AtomicBool::new(false);

/// Registers the font used for every later figure. Figures drawn without
/// one carry no captions, tick labels or legends.
pub fn use_font(bytes: Vec<u8>) -> Result<(), AnalysisError> {
    // plotters keeps registered fonts for the rest of the process
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    plotters::style::register_font(FONT, FontStyle::Normal, bytes)
        .map_err(|_| AnalysisError::PlotFont)?;
    FONT_READY.store(true, Ordering::Release);
    Ok(())
}

fn has_font() -> bool {
    FONT_READY.load(Ordering::Acquire)
}

pub fn category_color(category: ErrorCategory) -> RGBColor {
    match category {
        ErrorCategory::Correct => RGBColor(0x2e, 0xcc, 0x71),
        ErrorCategory::Neighbor => RGBColor(0xe7, 0x4c, 0x3c),
        ErrorCategory::Distal => RGBColor(0xf3, 0x9c, 0x12),
        ErrorCategory::Opposite => RGBColor(0x95, 0xa5, 0xa6),
    }
}

fn plot_error(path: &Path, e: Box<dyn Error>) -> AnalysisError {
    AnalysisError::Plot {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

/// Zero at the top, growing clockwise.
fn polar(theta: f64, rho: f64) -> (f64, f64) {
    (rho * theta.sin(), rho * theta.cos())
}

fn centered(size: i32) -> TextStyle<'static> {
    (FONT, size)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center))
}

/// Polar bar chart of response deltas.
pub fn plot_error_distribution(dist: &ErrorDistribution, out: &Path) -> Result<(), AnalysisError> {
    draw_error_distribution(dist, out).map_err(|e| plot_error(out, e))
}

fn draw_error_distribution(dist: &ErrorDistribution, out: &Path) -> PlotResult {
    let labels = has_font();
    let root = BitMapBackend::new(out, (900, 960)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(20);
    if labels {
        builder.caption(
            format!(
                "Aggregated Error Distribution (N={}) | Neighbor Error Ratio: {:.1}%",
                dist.scored_trials,
                dist.neighbor_share() * 100.0
            ),
            (FONT, 22),
        );
    }
    let span = POLAR_EXTENT + 0.3;
    let mut chart = builder.build_cartesian_2d(-span..span, -span..span)?;

    let max = dist.delta_counts.values().copied().max().unwrap_or(1).max(1) as f64;
    let grid = CHANCE.mix(0.3);

    for ring in 1..=4 {
        let rho = POLAR_EXTENT * ring as f64 / 4.0;
        let circle: Vec<(f64, f64)> = (0..=72)
            .map(|i| polar(i as f64 / 72.0 * 2.0 * PI, rho))
            .collect();
        chart.draw_series(std::iter::once(PathElement::new(circle, grid)))?;
    }
    let spokes: Vec<i32> = (-2..=3).map(|k| k * 60).collect();
    for &deg in &spokes {
        let end = polar(f64::from(deg).to_radians(), POLAR_EXTENT);
        chart.draw_series(std::iter::once(PathElement::new(vec![(0.0, 0.0), end], grid)))?;
    }

    for category in ErrorCategory::ALL {
        let wedges: Vec<Vec<(f64, f64)>> = dist
            .delta_counts
            .iter()
            .filter(|&(&delta, _)| ErrorCategory::from_delta(delta) == Some(category))
            .map(|(&delta, &count)| {
                let theta = f64::from(delta).to_radians();
                let rho = POLAR_EXTENT * count as f64 / max;
                std::iter::once((0.0, 0.0))
                    .chain((0..=16).map(|i| {
                        polar(theta - BAR_WIDTH / 2.0 + BAR_WIDTH * i as f64 / 16.0, rho)
                    }))
                    .collect()
            })
            .collect();
        if wedges.is_empty() {
            continue;
        }
        let color = category_color(category);
        chart
            .draw_series(
                wedges
                    .iter()
                    .map(|w| Polygon::new(w.clone(), color.mix(0.9).filled())),
            )?
            .label(category.label())
            .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 12, y + 6)], color.filled()));
        chart.draw_series(wedges.into_iter().map(|mut w| {
            w.push((0.0, 0.0));
            PathElement::new(w, BLACK.stroke_width(1))
        }))?;
    }

    if labels {
        chart.draw_series(spokes.iter().map(|&deg| {
            let at = polar(f64::from(deg).to_radians(), POLAR_EXTENT + 0.15);
            Text::new(format!("{deg}°"), at, centered(16))
        }))?;
        chart.draw_series((1..=4).map(|ring| {
            let rho = POLAR_EXTENT * ring as f64 / 4.0;
            let count = (max * ring as f64 / 4.0).round();
            Text::new(format!("{count}"), polar(PI / 12.0, rho), centered(12))
        }))?;
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

struct CurvePanel<'a> {
    title: &'a str,
    y_desc: &'a str,
    x: Range<f64>,
    y: Range<f64>,
    /// (coherence, value, sem)
    series: Vec<(f64, f64, Option<f64>)>,
    color: RGBColor,
    chance: Option<f64>,
}

/// Accuracy and correct-trial latency against coherence, side by side.
pub fn plot_psychometrics(points: &[CoherencePoint], out: &Path) -> Result<(), AnalysisError> {
    draw_psychometrics(points, out).map_err(|e| plot_error(out, e))
}

fn draw_psychometrics(points: &[CoherencePoint], out: &Path) -> PlotResult {
    let root = BitMapBackend::new(out, (1400, 620)).into_drawing_area();
    root.fill(&WHITE)?;
    if points.is_empty() {
        root.present()?;
        return Ok(());
    }

    let lo = points.first().map_or(0.0, |p| p.coherence);
    let hi = points.last().map_or(1.0, |p| p.coherence);
    let pad = ((hi - lo) * 0.1).max(0.01);
    let x = (lo - pad)..(hi + pad);

    let rt: Vec<(f64, f64, Option<f64>)> = points
        .iter()
        .filter_map(|p| p.mean_rt.map(|m| (p.coherence, m, p.rt_sem)))
        .collect();
    let rt_top = rt
        .iter()
        .map(|(_, m, s)| m + s.unwrap_or(0.0))
        .fold(0.0f64, f64::max);

    let panels = root.split_evenly((1, 2));
    draw_curve_panel(
        &panels[0],
        &CurvePanel {
            title: "Psychometric curve (accuracy)",
            y_desc: "Accuracy",
            x: x.clone(),
            y: 0.0..1.05,
            series: points
                .iter()
                .map(|p| (p.coherence, p.accuracy, p.accuracy_sem))
                .collect(),
            color: NAVY,
            chance: Some(CHANCE_ACCURACY),
        },
    )?;
    draw_curve_panel(
        &panels[1],
        &CurvePanel {
            title: "Chronometric curve (correct trials)",
            y_desc: "RT (s)",
            x,
            y: 0.0..(rt_top * 1.15).max(0.5),
            series: rt,
            color: FIREBRICK,
            chance: None,
        },
    )?;

    root.present()?;
    Ok(())
}

fn draw_curve_panel(area: &DrawingArea<BitMapBackend<'_>, Shift>, panel: &CurvePanel<'_>) -> PlotResult {
    let labels = has_font();
    let mut builder = ChartBuilder::on(area);
    builder
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60);
    if labels {
        builder.caption(panel.title, (FONT, 20));
    }
    let mut chart = builder.build_cartesian_2d(panel.x.clone(), panel.y.clone())?;
    if labels {
        chart
            .configure_mesh()
            .x_desc("Coherence")
            .y_desc(panel.y_desc)
            .draw()?;
    }

    if let Some(chance) = panel.chance {
        chart
            .draw_series(DashedLineSeries::new(
                vec![(panel.x.start, chance), (panel.x.end, chance)],
                8,
                6,
                CHANCE.stroke_width(2),
            ))?
            .label(format!("Chance ({:.1}%)", chance * 100.0))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], CHANCE.stroke_width(2)));
    }

    let color = panel.color;
    chart.draw_series(LineSeries::new(
        panel.series.iter().map(|&(x, y, _)| (x, y)),
        color.stroke_width(3),
    ))?;
    chart.draw_series(panel.series.iter().filter_map(|&(x, y, sem)| {
        sem.map(|e| ErrorBar::new_vertical(x, y - e, y, y + e, color.stroke_width(2), 12))
    }))?;
    chart.draw_series(
        panel
            .series
            .iter()
            .map(|&(x, y, _)| Circle::new((x, y), 6, color.filled())),
    )?;

    if labels && panel.chance.is_some() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }
    Ok(())
}

/// Density histogram of latencies with a kernel density overlay.
pub fn plot_rt_distribution(dist: &RtDistribution, out: &Path) -> Result<(), AnalysisError> {
    draw_rt_distribution(dist, out).map_err(|e| plot_error(out, e))
}

fn draw_rt_distribution(dist: &RtDistribution, out: &Path) -> PlotResult {
    let labels = has_font();
    let root = BitMapBackend::new(out, (1000, 620)).into_drawing_area();
    root.fill(&WHITE)?;
    let Some(hist) = histogram(&dist.samples, HIST_BINS) else {
        root.present()?;
        return Ok(());
    };

    let xs: Vec<f64> = (0..=KDE_POINTS)
        .map(|i| RT_AXIS_MAX * i as f64 / KDE_POINTS as f64)
        .collect();
    let density = kde(&dist.samples, &xs);
    let peak = hist
        .density
        .iter()
        .copied()
        .chain(density.iter().flatten().copied())
        .fold(0.0f64, f64::max);
    let y_max = (peak * 1.1).max(0.1);

    let mut builder = ChartBuilder::on(&root);
    builder
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60);
    if labels {
        let title = if dist.pooled {
            "RT distribution (N=6, all coherences)".to_string()
        } else {
            format!("RT distribution (N=6, coherence={})", dist.coherence)
        };
        builder.caption(title, (FONT, 22));
    }
    let mut chart = builder.build_cartesian_2d(0.0..RT_AXIS_MAX, 0.0..y_max)?;
    if labels {
        chart
            .configure_mesh()
            .x_desc("RT (s)")
            .y_desc("Density")
            .draw()?;
    }

    chart.draw_series(hist.density.iter().enumerate().filter_map(|(i, &d)| {
        let x0 = hist.edges[i].clamp(0.0, RT_AXIS_MAX);
        let x1 = hist.edges[i + 1].clamp(0.0, RT_AXIS_MAX);
        (x1 > x0).then(|| Rectangle::new([(x0, 0.0), (x1, d)], TEAL.mix(0.45).filled()))
    }))?;
    if let Some(density) = density {
        chart
            .draw_series(LineSeries::new(
                xs.iter().copied().zip(density),
                TEAL.stroke_width(3),
            ))?
            .label("KDE")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], TEAL.stroke_width(3)));
    }

    if dist.mean <= RT_AXIS_MAX {
        chart
            .draw_series(DashedLineSeries::new(
                vec![(dist.mean, 0.0), (dist.mean, y_max)],
                8,
                6,
                MEAN_LINE.stroke_width(2),
            ))?
            .label(format!("Mean: {:.2}s", dist.mean))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], MEAN_LINE.stroke_width(2)));
    }
    if dist.median <= RT_AXIS_MAX {
        chart
            .draw_series(LineSeries::new(
                vec![(dist.median, 0.0), (dist.median, y_max)],
                MEDIAN_LINE.stroke_width(2),
            ))?
            .label(format!("Median: {:.2}s", dist.median))
            .legend(|(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], MEDIAN_LINE.stroke_width(2))
            });
    }

    if labels {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }
    root.present()?;
    Ok(())
}

/// Creates `dir` and returns the path of `name` inside it.
pub fn plot_path(dir: &Path, name: &str) -> Result<PathBuf, AnalysisError> {
    std::fs::create_dir_all(dir).map_err(|source| AnalysisError::PlotDir {
        path: dir.to_path_buf(),
        source,
    })?;
    Ok(dir.join(name))
}
