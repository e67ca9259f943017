use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::Utc;
use parking_lot::Mutex;
use thiserror::Error;

use super::record::FeedbackRecord;

const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10 MB

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("feedback persistence failed: {0}")]
    Persistence(#[from] io::Error),
}

/// Append-only JSONL log with size-based rotation.
///
/// The mutex gives a total order of appends per file. No fsync per
/// record; losing the tail on a crash is acceptable for feedback.
pub struct FeedbackLog {
    file: Mutex<Option<File>>,
    base_dir: PathBuf,
    max_bytes: u64,
}

impl FeedbackLog {
    pub fn new(base_dir: impl Into<PathBuf>) -> io::Result<Self> {
        Self::with_limit(base_dir, MAX_FILE_SIZE)
    }

    pub fn with_limit(base_dir: impl Into<PathBuf>, max_bytes: u64) -> io::Result<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)?;

        Ok(Self {
            file: Mutex::new(None),
            base_dir,
            max_bytes,
        })
    }

    /// Append one record, rotating to a new timestamped file when the
    /// current one is full.
    pub fn append(&self, record: &FeedbackRecord) -> Result<(), FeedbackError> {
        let mut file_guard = self.file.lock();

        // First append after startup: continue the latest log file if it
        // still has room, otherwise start a new one.
        if file_guard.is_none() {
            let file = match self.find_latest_log_file()? {
                Some(path) => {
                    let f = OpenOptions::new().create(true).append(true).open(&path)?;
                    if f.metadata()?.len() < self.max_bytes {
                        f
                    } else {
                        self.create_new_file()?
                    }
                }
                None => self.create_new_file()?,
            };
            *file_guard = Some(file);
        }

        let should_rotate = match file_guard.as_ref() {
            Some(f) => f.metadata()?.len() >= self.max_bytes,
            None => false,
        };
        if should_rotate {
            *file_guard = Some(self.create_new_file()?);
        }

        if let Some(file) = file_guard.as_mut() {
            let json = serde_json::to_string(record).map_err(io::Error::from)?;
            writeln!(file, "{}", json)?;
        }

        Ok(())
    }

    fn create_new_file(&self) -> io::Result<File> {
        let now = Utc::now();
        let filename = format!("feedback-{}.jsonl", now.format("%Y-%m-%d-%H%M%S%3f"));
        let path = self.base_dir.join(filename);

        OpenOptions::new().create(true).append(true).open(path)
    }

    fn find_latest_log_file(&self) -> io::Result<Option<PathBuf>> {
        let mut entries = fs::read_dir(&self.base_dir)?
            .filter_map(|res| res.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().map_or(false, |ext| ext == "jsonl"))
            .collect::<Vec<_>>();

        if entries.is_empty() {
            return Ok(None);
        }

        // Timestamped filenames sort chronologically.
        entries.sort();
        Ok(entries.last().cloned())
    }
}
