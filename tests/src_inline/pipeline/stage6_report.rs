
use super::*;
use crate::input::UploadLimits;
use crate::input::table::{load_table, parse_table};
use crate::model::scaler::StandardScaler;
use crate::model::state::ScorerState;
use crate::model::thresholds::DecisionThreshold;
use crate::model::xgboost::BoostedForest;
use crate::pipeline::score_table;
use crate::pipeline::stage4_aggregate::run_stage4;
use crate::pipeline::stage5_evaluate::run_stage5;
use std::sync::atomic::{AtomicUsize, Ordering};

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("burnout_report_test_{}_{}", std::process::id(), id));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn state() -> ScorerState {
    ScorerState::new(
        BoostedForest::load(&fixture("burnout_model.json")).unwrap(),
        StandardScaler::load(&fixture("scaler.json")).unwrap(),
        DecisionThreshold::default(),
    )
    .unwrap()
}

fn write(table: &RawTable, out_dir: &Path) -> ReportPaths {
    let batch = score_table(&state(), table).unwrap();
    let aggregate = run_stage4(&batch.features, &batch.predictions);
    let evaluation = batch
        .ground_truth
        .as_deref()
        .map(|truth| run_stage5(truth, &batch.predictions));
    write_reports(
        &Stage6Input {
            table,
            batch: &batch,
            aggregate: &aggregate,
            evaluation: evaluation.as_ref(),
            threshold_source: "default".to_string(),
            tool_name: "burnout-scorer".to_string(),
            tool_version: "0.1.0".to_string(),
        },
        out_dir,
    )
    .unwrap()
}

#[test]
fn test_writes_all_outputs() {
    let dir = make_temp_dir();
    let table = load_table(&fixture("employees.csv"), b',', &UploadLimits::default()).unwrap();
    let paths = write(&table, &dir.join("out"));
    assert!(paths.predictions.ends_with(PREDICTIONS_FILE));
    assert!(paths.predictions.exists());
    assert!(paths.summary.exists());
    assert!(paths.report.exists());
}

#[test]
fn test_predictions_echo_original_columns() {
    let dir = make_temp_dir();
    let table = load_table(&fixture("employees.csv"), b',', &UploadLimits::default()).unwrap();
    let paths = write(&table, &dir);

    let mut reader = csv::Reader::from_path(&paths.predictions).unwrap();
    let headers = reader.headers().unwrap().clone();
    let mut expected = table.columns.clone();
    expected.push(PROBABILITY_COLUMN.to_string());
    expected.push(PREDICTION_COLUMN.to_string());
    assert_eq!(headers.iter().collect::<Vec<_>>(), expected);

    let records = reader.records().map(|r| r.unwrap()).collect::<Vec<_>>();
    assert_eq!(records.len(), 10);
    assert_eq!(&records[0][0], "E001");
    assert_eq!(&records[0][1], "Engineering");
    assert_eq!(&records[0][8], "0.182829");
    assert_eq!(&records[0][9], "0");
    assert_eq!(&records[1][9], "1");
    for record in &records {
        let p: f32 = record[8].parse().unwrap();
        assert!((0.0..=1.0).contains(&p));
    }
}

#[test]
fn test_existing_output_columns_are_replaced() {
    let dir = make_temp_dir();
    let text = "burnout_prediction,work_hours_per_week,after_hours_emails,negative_sentiment_score,meeting_count,task_completion_rate\nstale,45,10,0.3,10,0.8\n";
    let table = parse_table(text.as_bytes(), b',', &UploadLimits::default(), "inline").unwrap();
    let paths = write(&table, &dir);

    let mut reader = csv::Reader::from_path(&paths.predictions).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.len(), 7);
    assert_eq!(&headers[0], PREDICTION_COLUMN);
    assert_eq!(&headers[6], PROBABILITY_COLUMN);
    let record = reader.records().next().unwrap().unwrap();
    assert_eq!(&record[0], "0");
}

#[test]
fn test_summary_json_content() {
    let dir = make_temp_dir();
    let table = load_table(&fixture("employees.csv"), b',', &UploadLimits::default()).unwrap();
    let paths = write(&table, &dir);

    let text = std::fs::read_to_string(&paths.summary).unwrap();
    let v: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(v["tool"]["name"], "burnout-scorer");
    assert_eq!(v["input"]["n_rows"], 10);
    assert_eq!(v["input"]["has_ground_truth"], true);
    assert_eq!(
        v["input"]["extra_columns"],
        serde_json::json!(["employee_id", "department"])
    );
    assert_eq!(v["threshold"]["value"], 0.5);
    assert_eq!(v["distribution"][0]["label"], "no_burnout");
    assert_eq!(v["distribution"][0]["count"], 6);
    assert_eq!(v["distribution"][0]["percent"], 60.0);
    assert_eq!(v["distribution"][1]["count"], 4);
    assert_eq!(v["distribution"][1]["percent"], 40.0);
    assert_eq!(v["feature_means"].as_array().unwrap().len(), 2);
    assert_eq!(v["evaluation"]["accuracy"], 1.0);
    assert_eq!(
        v["evaluation"]["confusion_matrix"],
        serde_json::json!([[6, 0], [0, 4]])
    );
    assert_eq!(v["evaluation"]["classes"][1]["name"], "1");
    assert_eq!(v["evaluation"]["macro_avg"]["name"], "macro avg");
}

#[test]
fn test_summary_without_ground_truth() {
    let dir = make_temp_dir();
    let text = "work_hours_per_week,after_hours_emails,negative_sentiment_score,meeting_count,task_completion_rate\n45,10,0.3,10,0.8\n95,10,0.3,10,0.8\n";
    let table = parse_table(text.as_bytes(), b',', &UploadLimits::default(), "inline").unwrap();
    let paths = write(&table, &dir);

    let v: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&paths.summary).unwrap()).unwrap();
    assert!(v.get("evaluation").is_none());
    let means = v["feature_means"].as_array().unwrap();
    assert_eq!(means.len(), 2);
    assert_eq!(means[1]["label"], "burnout");
    assert_eq!(means[1]["rows"], 0);
    assert!(means[1]["means"].as_array().unwrap().iter().all(|m| m["mean"].is_null()));
    assert_eq!(means[0]["rows"], 2);
    assert_eq!(v["out_of_range"][0]["feature"], "work_hours_per_week");
    assert_eq!(v["out_of_range"][0]["count"], 1);

    let report = std::fs::read_to_string(&paths.report).unwrap();
    assert!(!report.contains("Model evaluation"));
    assert!(report.contains("not a medical diagnosis"));
}

#[test]
fn test_unwritable_output_is_report_error() {
    let dir = make_temp_dir();
    let blocker = dir.join("file");
    std::fs::write(&blocker, "x").unwrap();
    let table = load_table(&fixture("employees.csv"), b',', &UploadLimits::default()).unwrap();
    let batch = score_table(&state(), &table).unwrap();
    let aggregate = run_stage4(&batch.features, &batch.predictions);
    let err = write_reports(
        &Stage6Input {
            table: &table,
            batch: &batch,
            aggregate: &aggregate,
            evaluation: None,
            threshold_source: "default".to_string(),
            tool_name: "burnout-scorer".to_string(),
            tool_version: "0.1.0".to_string(),
        },
        &blocker.join("out"),
    )
    .unwrap_err();
    assert!(matches!(err, PipelineError::Report { .. }));
}
