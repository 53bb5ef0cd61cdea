use std::path::PathBuf;

pub mod features;
pub mod labels;
pub mod scaler;
pub mod state;
pub mod thresholds;
pub mod xgboost;

/// A fitted binary classifier over scaled feature vectors.
pub trait Classifier {
    fn n_features(&self) -> usize;
    /// Probability of the positive (burnout) class, in [0, 1].
    fn predict_proba(&self, x: &[f32]) -> f32;
}

/// Problems with the artifacts loaded at startup. Any of these stops the process
/// before a single request is served.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse {origin}: {source}")]
    Json {
        origin: String,
        source: serde_json::Error,
    },
    #[error("invalid decision threshold {value:?} from {origin}: expected a number in [0, 1]")]
    Threshold { origin: String, value: String },
    #[error("{artifact} expects {found} features, the scorer uses {expected}")]
    Dimension {
        artifact: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("{artifact} was fitted on features {found:?}, expected {expected:?}")]
    FeatureNames {
        artifact: &'static str,
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("invalid scaler: {0}")]
    InvalidScaler(String),
    #[error("unsupported model: {0}")]
    UnsupportedModel(String),
    #[error("tree {tree} is invalid: {reason}")]
    InvalidTree { tree: usize, reason: String },
}

/// Checks fitted feature names against the canonical order. An empty list means the
/// artifact was fitted without names and only its dimension can be checked.
pub fn check_feature_names(artifact: &'static str, found: &[String]) -> Result<(), ConfigError> {
    if found.is_empty() {
        return Ok(());
    }
    let expected = features::feature_columns();
    if found.len() != expected.len() || found.iter().zip(expected).any(|(a, b)| a != b) {
        return Err(ConfigError::FeatureNames {
            artifact,
            expected: expected.iter().map(|s| s.to_string()).collect(),
            found: found.to_vec(),
        });
    }
    Ok(())
}
