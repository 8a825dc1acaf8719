use clap::Args;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Flags shared by the analysis tools.
#[derive(Debug, Clone, Args)]
pub struct AnalysisArgs {
    /// Directory holding the session CSV files.
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Where PNG figures are written.
    #[arg(long, default_value = "plots")]
    pub plot_dir: PathBuf,

    /// Print the report without writing figures.
    #[arg(long)]
    pub no_plot: bool,

    /// Font used for figure text; system fonts are searched otherwise.
    #[arg(long)]
    pub font: Option<PathBuf>,
}

pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}
