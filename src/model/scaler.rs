use std::path::Path;

use serde::Deserialize;

use crate::model::features::{FeatureRow, N_FEATURES};
use crate::model::{ConfigError, check_feature_names};

/// On-disk form of a fitted standard scaler. Accepts the attribute names scikit-learn
/// uses (`mean_`, `scale_`, `feature_names_in_`) so an export can be a plain dump of them.
#[derive(Debug, Clone, Deserialize)]
struct ScalerFile {
    #[serde(alias = "mean_")]
    mean: Vec<f64>,
    #[serde(alias = "scale_")]
    scale: Vec<f64>,
    #[serde(default, alias = "feature_names_in_")]
    feature_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: [f64; N_FEATURES],
    scale: [f64; N_FEATURES],
}

impl StandardScaler {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text, &path.display().to_string())
    }

    pub fn from_json_str(text: &str, origin: &str) -> Result<Self, ConfigError> {
        let file: ScalerFile = serde_json::from_str(text).map_err(|source| ConfigError::Json {
            origin: origin.to_string(),
            source,
        })?;
        check_feature_names("scaler", &file.feature_names)?;
        Self::from_parts(&file.mean, &file.scale)
    }

    pub fn from_parts(mean: &[f64], scale: &[f64]) -> Result<Self, ConfigError> {
        for values in [mean, scale] {
            if values.len() != N_FEATURES {
                return Err(ConfigError::Dimension {
                    artifact: "scaler",
                    expected: N_FEATURES,
                    found: values.len(),
                });
            }
        }
        if mean.iter().chain(scale).any(|v| !v.is_finite()) {
            return Err(ConfigError::InvalidScaler(
                "mean and scale must be finite".to_string(),
            ));
        }
        if scale.iter().any(|&s| s < 0.0) {
            return Err(ConfigError::InvalidScaler(
                "scale must be non-negative".to_string(),
            ));
        }

        let mut out = Self {
            mean: [0.0; N_FEATURES],
            scale: [1.0; N_FEATURES],
        };
        for i in 0..N_FEATURES {
            out.mean[i] = mean[i];
            // constant features were fitted with zero variance; leave them unscaled
            out.scale[i] = if scale[i] == 0.0 { 1.0 } else { scale[i] };
        }
        Ok(out)
    }

    pub fn mean(&self) -> &[f64; N_FEATURES] {
        &self.mean
    }

    pub fn scale(&self) -> &[f64; N_FEATURES] {
        &self.scale
    }

    /// Z-score transform. Missing values (NaN) pass through unchanged.
    pub fn transform(&self, row: &FeatureRow) -> [f64; N_FEATURES] {
        let mut out = [0.0; N_FEATURES];
        for (i, v) in row.values().iter().enumerate() {
            out[i] = (v - self.mean[i]) / self.scale[i];
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/scaler.rs"]
mod tests;
