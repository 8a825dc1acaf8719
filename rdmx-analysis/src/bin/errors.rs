use anyhow::Result;
use clap::Parser;
use rdmx_analysis::cli::{AnalysisArgs, init_logging};
use rdmx_analysis::{error_distribution, load_dataset, plot, report};
use rdmx_core::Layout;
use rdmx_render::load_font_data;
use tracing::info;

/// Aggregated spatial error distribution over all sessions.
#[derive(Debug, Parser)]
#[command(name = "rdmx-errors", version, about)]
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
    println!("{}", report::dataset_summary(&dataset));

    let layout = Layout::for_analysis()?;
    let Some(dist) = error_distribution(&dataset.rows, &layout) else {
        println!("{}", report::NO_ERRORS);
        return Ok(());
    };
    println!("\n{}", report::error_report(&dist));

    if !args.no_plot {
        if let Some(font) = load_font_data(args.font.as_deref())? {
            plot::use_font(font.bytes)?;
        }
        let out = plot::plot_path(&args.plot_dir, "error_distribution.png")?;
        plot::plot_error_distribution(&dist, &out)?;
        info!(path = %out.display(), "figure written");
    }
    Ok(())
}
