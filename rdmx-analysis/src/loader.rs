//! Discovery and parsing of per-session data files.

use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Columns every session file must carry.
pub const REQUIRED_COLUMNS: [&str; 5] = ["RT", "Response", "Correct", "Coherence", "TargetAngle"];

/// Task variants recognized from the file name when `N_Choice` is absent.
pub const CHOICE_TAGS: [(&str, u32); 3] = [("6Choice", 6), ("4Choice", 4), ("2Choice", 2)];
pub const DEFAULT_CHOICE_COUNT: u32 = 6;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot list data directory {path}: {source}")]
    Dir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot read {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("{path} has no {column} column")]
    MissingColumn { path: PathBuf, column: &'static str },
}

/// One trial as read back from a data file.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialRow {
    pub rt: f64,
    pub response: String,
    pub correct: bool,
    pub coherence: f64,
    pub target_angle: i64,
    pub n_choice: u32,
}

#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "RT")]
    rt: f64,
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Correct")]
    correct: f64,
    #[serde(rename = "Coherence")]
    coherence: f64,
    #[serde(rename = "TargetAngle")]
    target_angle: f64,
    #[serde(rename = "N_Choice", default)]
    n_choice: Option<f64>,
}

impl RawRow {
    fn into_row(self, inferred_choices: u32) -> Option<TrialRow> {
        let correct = match self.correct {
            c if c == 0.0 => false,
            c if c == 1.0 => true,
            _ => return None,
        };
        if !self.rt.is_finite() || !self.coherence.is_finite() {
            return None;
        }
        let target_angle = integral(self.target_angle)?;
        let n_choice = match self.n_choice {
            Some(n) => u32::try_from(integral(n)?).ok()?,
            None => inferred_choices,
        };
        Some(TrialRow {
            rt: self.rt,
            response: self.response.trim().to_string(),
            correct,
            coherence: self.coherence,
            target_angle,
            n_choice,
        })
    }
}

fn integral(v: f64) -> Option<i64> {
    (v.is_finite() && v.fract() == 0.0).then_some(v as i64)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// All rows of every readable session file in a directory.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub rows: Vec<TrialRow>,
    pub files: Vec<PathBuf>,
    pub skipped: Vec<SkippedFile>,
    pub malformed_rows: usize,
}

impl Dataset {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Task size encoded in a session file name, e.g. `001_6Choice_DDM.csv`.
pub fn infer_choice_count(file_name: &str) -> u32 {
    CHOICE_TAGS
        .iter()
        .find(|(tag, _)| file_name.contains(tag))
        .map(|&(_, n)| n)
        .unwrap_or(DEFAULT_CHOICE_COUNT)
}

/// Parses one session file. Malformed rows are dropped and counted.
pub fn load_file(path: &Path) -> Result<(Vec<TrialRow>, usize), LoadError> {
    let csv_err = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    let headers = reader.headers().map_err(csv_err)?.clone();
    if let Some(column) = REQUIRED_COLUMNS
        .into_iter()
        .find(|c| !headers.iter().any(|h| h == *c))
    {
        return Err(LoadError::MissingColumn {
            path: path.to_path_buf(),
            column,
        });
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let inferred = infer_choice_count(&file_name);

    let mut rows = Vec::new();
    let mut malformed = 0usize;
    for (line, record) in reader.deserialize::<RawRow>().enumerate() {
        match record.map(|raw| raw.into_row(inferred)) {
            Ok(Some(row)) => rows.push(row),
            Ok(None) => malformed += 1,
            Err(e) => {
                debug!(file = %file_name, row = line + 1, "malformed row: {e}");
                malformed += 1;
            }
        }
    }
    Ok((rows, malformed))
}

/// Loads every `*.csv` in `dir`, in file-name order.
///
/// Unreadable files are logged and skipped. A missing directory yields an
/// empty dataset.
pub fn load_dataset(dir: &Path) -> Result<Dataset, LoadError> {
    let mut dataset = Dataset::default();
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(dir = %dir.display(), "data directory does not exist");
            return Ok(dataset);
        }
        Err(source) => {
            return Err(LoadError::Dir {
                path: dir.to_path_buf(),
                source,
            });
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "csv"))
        .collect();
    paths.sort();

    for path in paths {
        match load_file(&path) {
            Ok((rows, malformed)) => {
                if malformed > 0 {
                    warn!(file = %path.display(), malformed, "skipped malformed rows");
                }
                dataset.malformed_rows += malformed;
                dataset.rows.extend(rows);
                dataset.files.push(path);
            }
            Err(e) => {
                warn!("skipping file: {e}");
                dataset.skipped.push(SkippedFile {
                    path,
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        files = dataset.files.len(),
        skipped = dataset.skipped.len(),
        rows = dataset.rows.len(),
        "dataset loaded"
    );
    Ok(dataset)
}
