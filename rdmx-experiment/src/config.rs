use rdmx_core::DotFieldParams;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Everything that shapes a session. Defaults reproduce the standard
/// six-choice protocol; a JSON file only needs the fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    pub experiment_name: String,
    pub practice_trials: usize,
    pub main_repetitions: usize,
    pub coherence_levels: Vec<f64>,
    pub target_radius: f32,
    pub target_ring_radius: f32,
    pub dots: DotFieldParams,
    pub text_height: f32,
    pub fixation_ms: u64,
    pub feedback_frames: u32,
    pub debrief_ms: u64,
    pub window_size: (u32, u32),
    pub fullscreen: bool,
    pub data_dir: PathBuf,
    pub font_path: Option<PathBuf>,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            experiment_name: "6Choice_DDM".to_string(),
            practice_trials: 5,
            main_repetitions: 3,
            coherence_levels: vec![0.05, 0.1, 0.15],
            target_radius: 250.0,
            target_ring_radius: 35.0,
            dots: DotFieldParams::default(),
            text_height: 22.0,
            fixation_ms: 500,
            feedback_frames: 60,
            debrief_ms: 2000,
            window_size: (1200, 900),
            fullscreen: false,
            data_dir: PathBuf::from("data"),
            font_path: None,
        }
    }
}

impl TaskConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: TaskConfig =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.experiment_name.is_empty()
            || self.experiment_name.contains(['/', '\\'])
        {
            return invalid(format!(
                "experiment_name {:?} must be a plain file name component",
                self.experiment_name
            ));
        }
        if self.main_repetitions == 0 {
            return invalid("main_repetitions must be at least 1".into());
        }
        if self.coherence_levels.is_empty() {
            return invalid("coherence_levels is empty".into());
        }
        if let Some(c) = self
            .coherence_levels
            .iter()
            .find(|c| !(**c > 0.0 && **c <= 1.0))
        {
            return invalid(format!("coherence {c} is outside (0, 1]"));
        }
        if self.target_radius <= 0.0 || self.target_ring_radius <= 0.0 {
            return invalid("target radii must be positive".into());
        }
        if self.dots.n_dots == 0 || self.dots.field_size <= 0.0 || self.dots.lifetime == 0 {
            return invalid("dot field needs dots, a positive size and lifetime".into());
        }
        if self.window_size.0 == 0 || self.window_size.1 == 0 {
            return invalid("window_size must be non-zero".into());
        }
        Ok(())
    }

    /// Trials in the main block.
    pub fn main_trials(&self) -> usize {
        rdmx_core::metric::N_TARGETS * self.coherence_levels.len() * self.main_repetitions
    }
}
