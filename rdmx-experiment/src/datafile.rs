use rdmx_core::TrialRecord;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Column order of the data file.
pub const HEADER: [&str; 5] = ["RT", "Response", "Correct", "Coherence", "TargetAngle"];

#[derive(Debug, Error)]
pub enum DataFileError {
    #[error("participant id {0:?} cannot be used in a file name")]
    InvalidParticipant(String),
    #[error("cannot create {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write trial to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Per-session CSV. Rows are flushed as they are appended, so whatever was
/// completed survives an abort.
pub struct DataFile {
    path: PathBuf,
    writer: csv::Writer<File>,
    rows: usize,
}

impl DataFile {
    /// Creates `<dir>/<participant>_<experiment>.csv`, adding `_1`, `_2`, ...
    /// instead of overwriting an earlier session.
    pub fn create(dir: &Path, participant: &str, experiment: &str) -> Result<Self, DataFileError> {
        validate_participant(participant)?;
        fs::create_dir_all(dir).map_err(|source| DataFileError::Create {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = free_path(dir, &session_stem(participant, experiment));
        let file = File::create(&path).map_err(|source| DataFileError::Create {
            path: path.clone(),
            source,
        })?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        let write_err = |source| DataFileError::Write {
            path: path.clone(),
            source,
        };
        writer.write_record(HEADER).map_err(write_err)?;
        writer
            .flush()
            .map_err(|e| write_err(csv::Error::from(e)))?;

        info!(path = %path.display(), "data file created");
        Ok(Self {
            path,
            writer,
            rows: 0,
        })
    }

    pub fn append(&mut self, record: &TrialRecord) -> Result<(), DataFileError> {
        let path = &self.path;
        let write_err = |source| DataFileError::Write {
            path: path.clone(),
            source,
        };
        self.writer.serialize(record).map_err(write_err)?;
        self.writer
            .flush()
            .map_err(|e| write_err(csv::Error::from(e)))?;
        self.rows += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows(&self) -> usize {
        self.rows
    }
}

pub fn session_stem(participant: &str, experiment: &str) -> String {
    format!("{participant}_{experiment}")
}

fn validate_participant(participant: &str) -> Result<(), DataFileError> {
    let bad = participant.is_empty()
        || participant.trim() != participant
        || participant
            .chars()
            .any(|c| matches!(c, '/' | '\\' | ':' | '\0') || c.is_control())
        || participant == "."
        || participant == "..";
    if bad {
        Err(DataFileError::InvalidParticipant(participant.to_string()))
    } else {
        Ok(())
    }
}

fn free_path(dir: &Path, stem: &str) -> PathBuf {
    let first = dir.join(format!("{stem}.csv"));
    if !first.exists() {
        return first;
    }
    (1..)
        .map(|n| dir.join(format!("{stem}_{n}.csv")))
        .find(|p| !p.exists())
        .unwrap_or(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdmx_core::Angle;

    fn record(rt: f64, response: &str, correct: u8) -> TrialRecord {
        TrialRecord {
            rt,
            response: response.to_string(),
            correct,
            coherence: 0.1,
            target_angle: Angle::new(60).unwrap(),
        }
    }

    #[test]
    fn header_is_written_on_creation() {
        let dir = tempfile::tempdir().unwrap();
        let file = DataFile::create(dir.path(), "001", "6Choice_DDM").unwrap();
        assert_eq!(file.path(), dir.path().join("001_6Choice_DDM.csv"));
        let text = fs::read_to_string(file.path()).unwrap();
        assert_eq!(text, "RT,Response,Correct,Coherence,TargetAngle\n");
    }

    #[test]
    fn rows_are_flushed_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = DataFile::create(dir.path(), "p7", "6Choice_DDM").unwrap();
        file.append(&record(0.5, "e", 1)).unwrap();
        file.append(&record(1.25, "num_6", 0)).unwrap();
        assert_eq!(file.rows(), 2);

        let text = fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "0.5,e,1,0.1,60");
        assert_eq!(lines[2], "1.25,num_6,0,0.1,60");
    }

    #[test]
    fn existing_session_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let a = DataFile::create(dir.path(), "001", "x").unwrap();
        let b = DataFile::create(dir.path(), "001", "x").unwrap();
        assert_ne!(a.path(), b.path());
        assert_eq!(b.path(), dir.path().join("001_x_1.csv"));
    }

    #[test]
    fn path_like_participant_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        for bad in ["", "../up", "a/b", " 001", ".."] {
            assert!(matches!(
                DataFile::create(dir.path(), bad, "x"),
                Err(DataFileError::InvalidParticipant(_))
            ));
        }
    }

    #[test]
    fn missing_directory_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("data").join("sessions");
        let file = DataFile::create(&nested, "001", "x").unwrap();
        assert!(file.path().starts_with(&nested));
    }
}
