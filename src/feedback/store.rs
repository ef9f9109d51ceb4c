//! Feedback store
//!
//! A single JSON document holding every entry. Each append rewrites the
//! whole file through a sibling temp file and a rename.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::validate::Submission;
use super::FeedbackError;

/// Store path used when none is configured
pub const DEFAULT_STORE_FILE: &str = "feedback.json";

/// One stored submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    /// Submission time in Unix milliseconds
    pub id: i64,
    pub name: String,
    pub email: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// On-disk document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackFile {
    #[serde(default)]
    pub feedback: Vec<FeedbackEntry>,
    #[serde(default = "first_id")]
    pub next_id: u64,
}

fn first_id() -> u64 {
    1
}

impl Default for FeedbackFile {
    fn default() -> Self {
        Self {
            feedback: Vec::new(),
            next_id: first_id(),
        }
    }
}

/// Summary figures for the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackStats {
    pub total: usize,
    pub this_month: usize,
    /// Mean message length in characters, rounded
    pub average_length: usize,
}

impl FeedbackStats {
    pub fn compute(entries: &[FeedbackEntry], now: DateTime<Utc>) -> Self {
        let this_month = entries
            .iter()
            .filter(|e| e.timestamp.year() == now.year() && e.timestamp.month() == now.month())
            .count();
        let average_length = match entries.len() {
            0 => 0,
            n => {
                let chars: usize = entries.iter().map(|e| e.message.chars().count()).sum();
                (chars as f64 / n as f64).round() as usize
            }
        };
        Self {
            total: entries.len(),
            this_month,
            average_length,
        }
    }
}

/// JSON-file feedback store
#[derive(Debug, Clone)]
pub struct FeedbackStore {
    path: PathBuf,
}

impl FeedbackStore {
    /// Open the store at `path`, creating an empty one if missing
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, FeedbackError> {
        let store = Self { path: path.into() };
        if !store.path.exists() {
            debug!(path = %store.path.display(), "creating feedback store");
            store.write(&FeedbackFile::default())?;
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole document
    pub fn load(&self) -> Result<FeedbackFile, FeedbackError> {
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Validate and append a submission stamped with the current time
    pub fn append(&self, submission: &Submission) -> Result<FeedbackEntry, FeedbackError> {
        self.append_at(submission, Utc::now())
    }

    /// Validate and append a submission stamped with `now`.
    ///
    /// Ids are the submission time in milliseconds, bumped past the last
    /// stored id when two submissions share a millisecond.
    pub fn append_at(&self, submission: &Submission, now: DateTime<Utc>) -> Result<FeedbackEntry, FeedbackError> {
        let submission = submission.validated()?;
        let mut file = self.load()?;

        let last = file.feedback.last().map_or(i64::MIN, |e| e.id);
        let entry = FeedbackEntry {
            id: now.timestamp_millis().max(last.saturating_add(1)),
            name: submission.name,
            email: submission.email,
            message: submission.message,
            timestamp: now,
        };
        file.feedback.push(entry.clone());
        file.next_id += 1;
        self.write(&file)?;
        Ok(entry)
    }

    pub fn count(&self) -> Result<usize, FeedbackError> {
        Ok(self.load()?.feedback.len())
    }

    pub fn stats(&self, now: DateTime<Utc>) -> Result<FeedbackStats, FeedbackError> {
        Ok(FeedbackStats::compute(&self.load()?.feedback, now))
    }

    fn write(&self, file: &FeedbackFile) -> Result<(), FeedbackError> {
        let content = serde_json::to_string_pretty(file)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
