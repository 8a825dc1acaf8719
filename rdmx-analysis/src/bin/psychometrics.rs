use anyhow::Result;
use clap::Parser;
use rdmx_analysis::cli::{AnalysisArgs, init_logging};
use rdmx_analysis::{filter_latency, load_dataset, plot, psychometric_curve, report, rt_distribution};
use rdmx_render::load_font_data;
use tracing::info;

/// Psychometric and chronometric curves plus the latency distribution.
#[derive(Debug, Parser)]
#[command(name = "rdmx-psychometrics", version, about)]
struct Cli {
    #[command(flatten)]
    args: AnalysisArgs,
}

fn main() -> Result<()> {
    let Cli { args } = Cli::parse();
    init_logging();

    let dataset = load_dataset(&args.data_dir)?;
    if dataset.is_empty() {
        println!("{}", report::empty_dataset_report(&dataset));
        return Ok(());
    }
    let rows = filter_latency(&dataset.rows);
    println!(
        "{} ({} within the latency window)",
        report::dataset_summary(&dataset),
        rows.len()
    );

    if !args.no_plot {
        if let Some(font) = load_font_data(args.font.as_deref())? {
            plot::use_font(font.bytes)?;
        }
    }

    let curve = psychometric_curve(&rows);
    if curve.is_empty() {
        println!("No six-choice trials to fit.");
    } else {
        println!("\n--- Psychometric and chronometric curves ---");
        println!("{}", report::psychometric_report(&curve));
        if !args.no_plot {
            let out = plot::plot_path(&args.plot_dir, "psychometrics.png")?;
            plot::plot_psychometrics(&curve, &out)?;
            info!(path = %out.display(), "figure written");
        }
    }

    if let Some(dist) = rt_distribution(&rows) {
        println!("\n--- Latency distribution ---");
        println!("{}", report::rt_report(&dist));
        if !args.no_plot {
            let out = plot::plot_path(&args.plot_dir, "rt_distribution.png")?;
            plot::plot_rt_distribution(&dist, &out)?;
            info!(path = %out.display(), "figure written");
        }
    }
    Ok(())
}
