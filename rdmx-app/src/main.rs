mod app;
mod keys;
mod prompt;

use app::App;

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rdmx_experiment::{DataFile, TaskConfig, TaskSession};
use rdmx_timing::HighPrecisionTimer;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Six-choice random-dot motion discrimination task.
#[derive(Debug, Parser)]
#[command(name = "rdmx", version, about)]
struct Args {
    /// Participant id; asked on the console when omitted.
    #[arg(short, long)]
    participant: Option<String>,

    /// JSON file overriding the default task settings.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory receiving the per-session CSV.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Seed for trial order and dot placement.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = match &args.config {
        Some(path) => TaskConfig::load(path)?,
        None => TaskConfig::default(),
    };
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    config.validate()?;

    let participant = match args.participant {
        Some(id) => id,
        None => {
            let stdin = std::io::stdin();
            match prompt::prompt_participant(&mut stdin.lock(), &mut std::io::stdout())? {
                Some(id) => id,
                None => {
                    info!("participant prompt cancelled, nothing recorded");
                    return Ok(());
                }
            }
        }
    };

    let data_file = DataFile::create(&config.data_dir, &participant, &config.experiment_name)?;
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let session = TaskSession::new(config, HighPrecisionTimer::new(), rng)
        .context("invalid response layout")?;

    info!(%participant, path = %data_file.path().display(), "session ready");
    App::new(session, data_file).run()
}
