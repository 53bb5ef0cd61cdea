
use super::*;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("burnout_state_test_{}_{}", std::process::id(), id));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn paths(threshold_file: PathBuf, threshold_override: Option<f32>) -> ArtifactPaths {
    ArtifactPaths {
        model: fixtures().join("burnout_model.json"),
        scaler: fixtures().join("scaler.json"),
        threshold_file,
        threshold_override,
    }
}

#[test]
fn test_load_with_default_threshold() {
    let dir = make_temp_dir();
    let state = ScorerState::load(&paths(dir.join("burnout_threshold.txt"), None)).unwrap();
    assert_eq!(state.threshold().value(), 0.5);
    assert_eq!(state.threshold_source(), &ThresholdSource::Default);
    assert_eq!(state.classifier().n_trees(), 3);
}

#[test]
fn test_override_wins_over_file() {
    let dir = make_temp_dir();
    let file = dir.join("burnout_threshold.txt");
    std::fs::write(&file, "0.3").unwrap();

    let state = ScorerState::load(&paths(file.clone(), None)).unwrap();
    assert!((state.threshold().value() - 0.3).abs() < 1e-7);
    assert_eq!(state.threshold_source(), &ThresholdSource::File(file.clone()));

    let state = ScorerState::load(&paths(file, Some(0.7))).unwrap();
    assert!((state.threshold().value() - 0.7).abs() < 1e-7);
    assert_eq!(state.threshold_source(), &ThresholdSource::CommandLine);
}

#[test]
fn test_invalid_override_is_config_error() {
    let dir = make_temp_dir();
    let err = ScorerState::load(&paths(dir.join("t.txt"), Some(1.5))).unwrap_err();
    assert!(matches!(err, ConfigError::Threshold { .. }));
}

#[test]
fn test_missing_model_is_io_error() {
    let dir = make_temp_dir();
    let mut p = paths(dir.join("t.txt"), None);
    p.model = dir.join("nope.json");
    let err = ScorerState::load(&p).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn test_classifier_dimension_checked() {
    let dir = make_temp_dir();
    let text = std::fs::read_to_string(fixtures().join("burnout_model.json")).unwrap();
    let mut model: serde_json::Value = serde_json::from_str(&text).unwrap();
    model["learner"]["learner_model_param"]["num_feature"] = serde_json::json!("6");
    model["learner"]["feature_names"] = serde_json::json!([]);
    let path = dir.join("six.json");
    std::fs::write(&path, model.to_string()).unwrap();

    let mut p = paths(dir.join("t.txt"), None);
    p.model = path;
    let err = ScorerState::load(&p).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Dimension {
            artifact: "classifier",
            expected: 5,
            found: 6
        }
    ));
}

#[test]
fn test_classifier_feature_names_checked() {
    let dir = make_temp_dir();
    let text = std::fs::read_to_string(fixtures().join("burnout_model.json")).unwrap();
    let mut model: serde_json::Value = serde_json::from_str(&text).unwrap();
    model["learner"]["feature_names"] =
        serde_json::json!(["a", "b", "c", "d", "e"]);
    let path = dir.join("renamed.json");
    std::fs::write(&path, model.to_string()).unwrap();

    let mut p = paths(dir.join("t.txt"), None);
    p.model = path;
    let err = ScorerState::load(&p).unwrap_err();
    assert!(matches!(err, ConfigError::FeatureNames { .. }));
}
