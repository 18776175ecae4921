use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;

use super::record::PredictionRecord;
use crate::constants::DEFAULT_MAX_LOG_FILE_SIZE;

/// Prefix of every file the log creates
const LOG_FILE_PREFIX: &str = "predictions-";

/// Current state of the log directory
#[derive(Debug, Clone, Serialize)]
pub struct LogStats {
    pub total_files: usize,
    pub total_size_mb: f64,
    pub current_file: Option<String>,
}

/// Append-only JSONL prediction log with size-based rotation
pub struct PredictionLog {
    file: Mutex<Option<File>>,
    base_dir: PathBuf,
    max_file_size: u64,
}

impl PredictionLog {
    pub fn open(base_dir: impl Into<PathBuf>) -> io::Result<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)?;
        log::info!("Prediction log at {}", base_dir.display());

        Ok(Self {
            file: Mutex::new(None),
            base_dir,
            max_file_size: DEFAULT_MAX_LOG_FILE_SIZE,
        })
    }

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Append record to the log
    /// Handles file rotation automatically
    pub fn append(&self, record: &PredictionRecord) -> io::Result<()> {
        let mut file_guard = self.file.lock();

        // If file not open, continue the latest one or create new
        if file_guard.is_none() {
            let file = match self.find_latest_log_file()? {
                Some(path) => OpenOptions::new().create(true).append(true).open(&path)?,
                None => self.create_new_file()?,
            };
            *file_guard = Some(file);
        }

        let should_rotate = match file_guard.as_ref() {
            Some(f) => f.metadata()?.len() >= self.max_file_size,
            None => false,
        };

        if should_rotate {
            *file_guard = Some(self.create_new_file()?);
        }

        if let Some(file) = file_guard.as_mut() {
            let json = serde_json::to_string(record)?;
            writeln!(file, "{}", json)?;
        }

        Ok(())
    }

    pub fn get_stats(&self) -> io::Result<LogStats> {
        let paths = self.log_files()?;
        let mut size = 0u64;
        for path in &paths {
            size += fs::metadata(path)?.len();
        }

        Ok(LogStats {
            total_files: paths.len(),
            total_size_mb: size as f64 / 1024.0 / 1024.0,
            current_file: paths
                .last()
                .and_then(|p| p.file_name())
                .and_then(|n| n.to_str())
                .map(str::to_string),
        })
    }

    fn create_new_file(&self) -> io::Result<File> {
        // timestamp format: YYYY-MM-DD-HHMMSS, then a sequence number so
        // rotations within the same second still sort in order
        let stamp = Utc::now().format("%Y-%m-%d-%H%M%S");
        let mut seq = 0u32;
        let path = loop {
            let candidate = self.base_dir.join(format!("{}{}-{:04}.jsonl", LOG_FILE_PREFIX, stamp, seq));
            if !candidate.exists() {
                break candidate;
            }
            seq += 1;
        };

        log::debug!("Opening new prediction log file {}", path.display());
        OpenOptions::new().create(true).append(true).open(path)
    }

    /// Log files owned by this log, sorted by name (timestamp order)
    fn log_files(&self) -> io::Result<Vec<PathBuf>> {
        let mut entries = fs::read_dir(&self.base_dir)?
            .filter_map(|res| res.ok())
            .map(|e| e.path())
            .filter(|p| is_log_file(p))
            .collect::<Vec<_>>();
        entries.sort();
        Ok(entries)
    }

    fn find_latest_log_file(&self) -> io::Result<Option<PathBuf>> {
        Ok(self.log_files()?.pop())
    }
}

fn is_log_file(path: &Path) -> bool {
    let owned_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map_or(false, |n| n.starts_with(LOG_FILE_PREFIX));
    owned_name && path.extension().map_or(false, |ext| ext == "jsonl")
}
