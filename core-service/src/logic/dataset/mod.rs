//! Dataset Module - Records on disk
//!
//! Reads the labeled historical dataset used by analytics, and records
//! scored predictions in JSONL format with automatic rotation.

pub mod reader;
pub mod record;
pub mod writer;

#[cfg(test)]
mod tests;

pub use reader::{load_jsonl, read_jsonl, DatasetError, LoadedDataset, RejectedLine};
pub use record::{HistoricalRecord, PredictionRecord, RecordError};
pub use writer::{LogStats, PredictionLog};
