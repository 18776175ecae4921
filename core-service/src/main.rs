//! Occupational Stress Risk - Command line entry point

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value as JsonValue};

use stress_risk_core::constants::{get_prediction_log_dir, APP_VERSION, DEFAULT_HISTOGRAM_BINS};
use stress_risk_core::logic::analytics::{AnalyticsAggregator, EmptyPolicy, GroupSummary};
use stress_risk_core::logic::dataset::load_jsonl;
use stress_risk_core::logic::features::{LayoutInfo, RawInput, SCHEMA};
use stress_risk_core::logic::model::ScoringModel;
use stress_risk_core::{AssessError, EngineConfig, StressAssessor};

#[derive(Debug, Parser)]
#[command(
    name = "stress-risk",
    version,
    about = "Occupational stress risk prediction and dataset analytics",
    long_about = "stress-risk scores 14 work and lifestyle answers with a frozen model,\n\
        maps the score to a Low / Moderate / High tier and prints guidance.\n\n\
        EXAMPLES:\n\
        \n  stress-risk predict -i answers.json          Assess one person\n\
        \n  cat batch.json | stress-risk predict         Assess a JSON array of answers\n\
        \n  stress-risk analyze -d survey.jsonl -g income_level\n\
        \n  stress-risk schema                           Show the expected fields"
)]
struct Cli {
    /// Engine configuration file (JSON)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity level (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Assess one input object or an array of them
    Predict(PredictArgs),

    /// Summarize a labeled historical dataset
    Analyze(AnalyzeArgs),

    /// Print the expected input fields and their domains
    Schema,

    /// Load the model and print its metadata
    ModelInfo,
}

#[derive(Debug, Args)]
struct PredictArgs {
    /// JSON input file (reads from stdin if not provided)
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Record scored requests (default data directory unless configured)
    #[arg(long)]
    log_predictions: bool,
}

#[derive(Debug, Args)]
struct AnalyzeArgs {
    /// Dataset JSONL file (overrides configuration)
    #[arg(short, long, value_name = "FILE")]
    dataset: Option<PathBuf>,

    /// Feature name or 'risk_tier'
    #[arg(short, long, value_name = "FIELD")]
    group_by: Option<String>,

    /// Also print a histogram of this feature
    #[arg(long, value_name = "FIELD")]
    histogram: Option<String>,

    #[arg(long, default_value_t = DEFAULT_HISTOGRAM_BINS)]
    bins: usize,

    /// Fail when the dataset has no valid records
    #[arg(long)]
    require_records: bool,
}

/// Per-item batch output
#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum BatchItem {
    Ok(stress_risk_core::Assessment),
    Error(JsonValue),
}

fn main() -> ExitCode {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    log::debug!("stress-risk v{}", APP_VERSION);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = EngineConfig::load(cli.config.as_deref()).context("invalid configuration")?;

    match cli.command {
        Command::Predict(args) => predict(&config, args),
        Command::Analyze(args) => analyze(&config, args),
        Command::Schema => {
            print_json(&json!({ "layout": LayoutInfo::current(), "fields": SCHEMA }))?;
            Ok(ExitCode::SUCCESS)
        }
        Command::ModelInfo => {
            let model = ScoringModel::load(&config.model_path).context("model unavailable")?;
            print_json(&json!({
                "status": model.status(),
                "feature_importance": model.feature_importance(),
            }))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn predict(config: &EngineConfig, args: PredictArgs) -> Result<ExitCode> {
    let mut config = config.clone();
    if args.log_predictions && config.prediction_log_dir.is_none() {
        config.prediction_log_dir = Some(get_prediction_log_dir());
    }

    // Model problems are fatal before any input is read
    let assessor = StressAssessor::from_config(&config).context("failed to start the assessor")?;

    let content = match &args.input {
        Some(path) => fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("failed to read stdin")?;
            buf
        }
    };
    let input: JsonValue = serde_json::from_str(&content).context("input is not valid JSON")?;

    match input {
        JsonValue::Array(items) => {
            print_json(&batch_report(&assessor, items))?;
            Ok(ExitCode::SUCCESS)
        }
        JsonValue::Object(_) => {
            let raw: RawInput = serde_json::from_value(input).context("input must map field names to values")?;
            match assessor.assess(&raw) {
                Ok(assessment) => {
                    print_json(&assessment)?;
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    print_json(&json!({ "error": error_json(&e) }))?;
                    Ok(ExitCode::from(2))
                }
            }
        }
        _ => bail!("input must be a JSON object or an array of objects"),
    }
}

/// One output entry per input item, failures included
fn batch_report(assessor: &StressAssessor, items: Vec<JsonValue>) -> Vec<BatchItem> {
    assessor
        .assess_json_batch(items)
        .into_iter()
        .map(|r| match r {
            Ok(assessment) => BatchItem::Ok(assessment),
            Err(e) => BatchItem::Error(error_json(&e)),
        })
        .collect()
}

fn analyze(config: &EngineConfig, args: AnalyzeArgs) -> Result<ExitCode> {
    let Some(path) = args.dataset.as_ref().or(config.dataset_path.as_ref()) else {
        bail!("no dataset given (use --dataset or STRESS_DATASET_PATH)");
    };

    let dataset = load_jsonl(path)?;
    let analytics = AnalyticsAggregator::new(&dataset.records);
    let policy = if args.require_records {
        EmptyPolicy::RequireNonEmpty
    } else {
        EmptyPolicy::AllowEmpty
    };

    let groups: Vec<GroupSummary> = analytics.aggregate(args.group_by.as_deref(), policy)?.iter().collect();

    let mut report = json!({
        "records": dataset.records.len(),
        "rejected": dataset.rejected,
        "groups": groups,
    });

    if !analytics.is_empty() {
        report["overview"] = serde_json::to_value(analytics.overview()?)?;
        report["correlation"] = serde_json::to_value(analytics.correlation_matrix()?)?;
        report["insights"] = serde_json::to_value(analytics.insights()?)?;
    }

    if let Some(field) = &args.histogram {
        report["histogram"] = serde_json::to_value(analytics.histogram(field, args.bins)?)?;
    }

    print_json(&report)?;
    Ok(ExitCode::SUCCESS)
}

fn error_json(error: &AssessError) -> JsonValue {
    match error {
        AssessError::Validation(v) => json!({
            "kind": v.kind(),
            "fields": v.fields(),
            "message": v.to_string(),
        }),
        AssessError::InvalidScore(s) => json!({
            "kind": "invalid_score",
            "message": s.to_string(),
        }),
        AssessError::MalformedInput { .. } => json!({
            "kind": "malformed_input",
            "message": error.to_string(),
        }),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assessor() -> StressAssessor {
        let config = EngineConfig {
            model_path: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/models/reference_model.json")),
            ..Default::default()
        };
        StressAssessor::from_config(&config).unwrap()
    }

    fn valid_item() -> JsonValue {
        json!({
            "age": 30, "work_years": 5, "position_years": 2, "income_level": "medium",
            "weekly_work_hours": 40, "alcohol_units": 0, "moderate_exercise_hours": 3,
            "education_level": "bachelor", "shift_work": "no", "night_shift": "no",
            "sleep_disorder": "no", "vigorous_exercise_hours": 2, "life_satisfaction": 8,
            "fatigue_level": "none"
        })
    }

    #[test]
    fn test_batch_report_keeps_valid_items() {
        let mut null_age = valid_item();
        null_age["age"] = JsonValue::Null;
        let items = vec![valid_item(), json!({"age": null}), json!(42), null_age];

        let report = serde_json::to_value(batch_report(&assessor(), items)).unwrap();
        let entries = report.as_array().unwrap();
        assert_eq!(entries.len(), 4);

        assert_eq!(entries[0]["ok"]["tier"], "low");
        assert_eq!(entries[1]["error"]["kind"], "missing_field");
        assert_eq!(entries[2]["error"]["kind"], "malformed_input");
        assert_eq!(entries[3]["error"]["kind"], "invalid_category");
        assert_eq!(entries[3]["error"]["fields"], json!(["age"]));
    }

    #[test]
    fn test_reference_model_loads() {
        let model = ScoringModel::load(concat!(env!("CARGO_MANIFEST_DIR"), "/models/reference_model.json"));
        assert!(model.is_ok());
    }
}
