// Write-only sink for user feedback on analyses.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::FeedbackError;

/// Which analysis the user picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackChoice {
    /// Index into the ranked analyses of the result.
    Candidate(usize),
    NoneCorrect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub form: String,
    pub choice: FeedbackChoice,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub note: String,
}

pub trait FeedbackSink: Send + Sync {
    fn record(&self, feedback: &Feedback) -> Result<(), FeedbackError>;
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl FeedbackSink for NullSink {
    fn record(&self, _feedback: &Feedback) -> Result<(), FeedbackError> {
        Ok(())
    }
}

/// Appends one JSON object per line to a file.
#[derive(Debug)]
pub struct JsonLinesSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonLinesSink {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FeedbackError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FeedbackSink for JsonLinesSink {
    fn record(&self, feedback: &Feedback) -> Result<(), FeedbackError> {
        let mut line = serde_json::to_string(feedback)?;
        line.push('\n');
        let mut file = self.file.lock().map_err(|_| FeedbackError::Poisoned)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}
