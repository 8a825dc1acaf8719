use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("cannot create plot directory {path}: {source}")]
    PlotDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot draw plot {path}: {message}")]
    Plot { path: PathBuf, message: String },
    #[error("figure font could not be registered")]
    PlotFont,
}
