//! JSONL dataset reader
//!
//! Bad lines are skipped and reported with their line number; only I/O
//! failures abort the load.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use super::record::HistoricalRecord;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to open dataset {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read dataset: {0}")]
    Read(#[from] io::Error),
}

/// A line that could not be turned into a record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedLine {
    /// 1-based
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct LoadedDataset {
    pub records: Vec<HistoricalRecord>,
    pub rejected: Vec<RejectedLine>,
}

/// Read records from any line source
pub fn read_jsonl<R: BufRead>(reader: R) -> Result<LoadedDataset, DatasetError> {
    let mut dataset = LoadedDataset::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match HistoricalRecord::from_json_line(&line) {
            Ok(record) => dataset.records.push(record),
            Err(e) => {
                log::warn!("Skipping dataset line {}: {}", index + 1, e);
                dataset.rejected.push(RejectedLine {
                    line: index + 1,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(dataset)
}

/// Read records from a JSONL file
pub fn load_jsonl(path: impl AsRef<Path>) -> Result<LoadedDataset, DatasetError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| DatasetError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let dataset = read_jsonl(BufReader::new(file))?;
    log::info!(
        "Loaded {} records from {} ({} rejected)",
        dataset.records.len(),
        path.display(),
        dataset.rejected.len()
    );
    Ok(dataset)
}
