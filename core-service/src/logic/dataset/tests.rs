use std::fs;
use std::io::Cursor;

use tempfile::tempdir;

use super::reader::{load_jsonl, read_jsonl, DatasetError};
use super::record::{HistoricalRecord, PredictionRecord, RecordError};
use super::writer::PredictionLog;
use crate::logic::features::{sample_input, FeatureVector, FEATURE_COUNT};
use crate::logic::risk::{RiskScore, RiskTier};

fn sample_record(tier: RiskTier) -> HistoricalRecord {
    HistoricalRecord::new(FeatureVector::construct(&sample_input()).unwrap(), tier)
}

fn sample_prediction() -> PredictionRecord {
    let vector = FeatureVector::construct(&sample_input()).unwrap();
    let score = RiskScore::new(vec![0.9, 0.1]).unwrap();
    PredictionRecord::new("test-model", &vector, &score, RiskTier::Low)
}

#[test]
fn test_record_line_round_trip() {
    let record = sample_record(RiskTier::Moderate);
    let line = record.to_json_line().unwrap();
    assert_eq!(HistoricalRecord::from_json_line(&line).unwrap(), record);
}

#[test]
fn test_stressed_flag_labels() {
    let features = serde_json::to_string(&sample_input()).unwrap();

    for (flag, tier) in [("true", RiskTier::High), ("1", RiskTier::High), ("false", RiskTier::Low), ("0", RiskTier::Low)] {
        let line = format!(r#"{{"features": {}, "stressed": {}}}"#, features, flag);
        assert_eq!(HistoricalRecord::from_json_line(&line).unwrap().tier, tier);
    }

    let line = format!(r#"{{"features": {}, "stressed": 2}}"#, features);
    assert!(matches!(
        HistoricalRecord::from_json_line(&line),
        Err(RecordError::InvalidStressedFlag(2))
    ));

    let line = format!(r#"{{"features": {}}}"#, features);
    assert!(matches!(HistoricalRecord::from_json_line(&line), Err(RecordError::MissingLabel)));
}

#[test]
fn test_reader_reports_bad_lines() {
    let good = sample_record(RiskTier::High).to_json_line().unwrap();
    let mut missing_age = sample_input();
    missing_age.remove("age");
    let invalid = format!(
        r#"{{"features": {}, "tier": "high"}}"#,
        serde_json::to_string(&missing_age).unwrap()
    );
    let content = format!("{}\n\nnot json\n{}\n{}\n", good, invalid, good.replace("\"high\"", "\"severe\""));

    let dataset = read_jsonl(Cursor::new(content)).unwrap();
    assert_eq!(dataset.records.len(), 1);
    let lines: Vec<usize> = dataset.rejected.iter().map(|r| r.line).collect();
    assert_eq!(lines, vec![3, 4, 5]);
    assert!(dataset.rejected[1].reason.contains("age"));
}

#[test]
fn test_load_jsonl_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("survey.jsonl");
    let lines: Vec<String> = [RiskTier::Low, RiskTier::High]
        .into_iter()
        .map(|t| sample_record(t).to_json_line().unwrap())
        .collect();
    fs::write(&path, lines.join("\n")).unwrap();

    let dataset = load_jsonl(&path).unwrap();
    assert_eq!(dataset.records.len(), 2);
    assert!(dataset.rejected.is_empty());

    assert!(matches!(
        load_jsonl(dir.path().join("missing.jsonl")),
        Err(DatasetError::Open { .. })
    ));
}

#[test]
fn test_prediction_log_append_and_read() {
    let dir = tempdir().unwrap();
    let log = PredictionLog::open(dir.path()).unwrap();

    let record = sample_prediction();
    log.append(&record).unwrap();

    // Should be 1 file ending in jsonl
    let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().map(|e| e.unwrap()).collect();
    assert_eq!(entries.len(), 1);
    let path = entries[0].path();
    assert!(path.extension().unwrap() == "jsonl");

    let content = fs::read_to_string(&path).unwrap();
    let deserialized: PredictionRecord = serde_json::from_str(content.trim()).unwrap();
    assert_eq!(deserialized, record);
    assert_eq!(deserialized.features.len(), FEATURE_COUNT);
}

#[test]
fn test_small_records_share_one_file() {
    let dir = tempdir().unwrap();
    let log = PredictionLog::open(dir.path()).unwrap();

    log.append(&sample_prediction()).unwrap();
    log.append(&sample_prediction()).unwrap();

    let stats = log.get_stats().unwrap();
    assert_eq!(stats.total_files, 1);
    assert!(stats.current_file.is_some());
}

#[test]
fn test_rotation_creates_new_file() {
    let dir = tempdir().unwrap();
    let log = PredictionLog::open(dir.path()).unwrap().with_max_file_size(1);

    // Every append after the first finds the current file full
    for _ in 0..3 {
        log.append(&sample_prediction()).unwrap();
    }

    let stats = log.get_stats().unwrap();
    assert_eq!(stats.total_files, 3);
}

#[test]
fn test_reopen_continues_latest_file() {
    let dir = tempdir().unwrap();
    PredictionLog::open(dir.path()).unwrap().append(&sample_prediction()).unwrap();
    PredictionLog::open(dir.path()).unwrap().append(&sample_prediction()).unwrap();

    let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
    let content = fs::read_to_string(entries[0].as_ref().unwrap().path()).unwrap();
    assert_eq!(content.lines().count(), 2);
}

#[test]
fn test_log_leaves_other_jsonl_files_alone() {
    let dir = tempdir().unwrap();
    let survey = dir.path().join("survey.jsonl");
    let line = sample_record(RiskTier::Moderate).to_json_line().unwrap();
    fs::write(&survey, format!("{}\n", line)).unwrap();

    let log = PredictionLog::open(dir.path()).unwrap();
    log.append(&sample_prediction()).unwrap();

    let dataset = load_jsonl(&survey).unwrap();
    assert_eq!(dataset.records.len(), 1);
    assert!(dataset.rejected.is_empty());

    let stats = log.get_stats().unwrap();
    assert_eq!(stats.total_files, 1);
    assert!(stats.current_file.unwrap().starts_with("predictions-"));

    // A fresh log does not adopt the foreign file either
    PredictionLog::open(dir.path()).unwrap().append(&sample_prediction()).unwrap();
    assert_eq!(fs::read_to_string(&survey).unwrap().lines().count(), 1);
}
