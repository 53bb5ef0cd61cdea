use std::path::PathBuf;

use tracing::{debug, info};

use crate::model::features::N_FEATURES;
use crate::model::scaler::StandardScaler;
use crate::model::thresholds::{DecisionThreshold, ThresholdSource, load_threshold};
use crate::model::xgboost::BoostedForest;
use crate::model::{Classifier, ConfigError, check_feature_names};

#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub scaler: PathBuf,
    pub threshold_file: PathBuf,
    pub threshold_override: Option<f32>,
}

/// Classifier, scaler and cutoff, loaded once before any request is served and only
/// ever borrowed afterwards.
#[derive(Debug, Clone)]
pub struct ScorerState {
    classifier: BoostedForest,
    scaler: StandardScaler,
    threshold: DecisionThreshold,
    threshold_source: ThresholdSource,
}

impl ScorerState {
    pub fn new(
        classifier: BoostedForest,
        scaler: StandardScaler,
        threshold: DecisionThreshold,
    ) -> Result<Self, ConfigError> {
        if classifier.n_features() != N_FEATURES {
            return Err(ConfigError::Dimension {
                artifact: "classifier",
                expected: N_FEATURES,
                found: classifier.n_features(),
            });
        }
        check_feature_names("classifier", classifier.feature_names())?;
        Ok(Self {
            classifier,
            scaler,
            threshold,
            threshold_source: ThresholdSource::Default,
        })
    }

    pub fn load(paths: &ArtifactPaths) -> Result<Self, ConfigError> {
        let classifier = BoostedForest::load(&paths.model)?;
        info!(
            "loaded classifier {} ({} trees, {} features, objective {}, xgboost {})",
            paths.model.display(),
            classifier.n_trees(),
            classifier.n_features(),
            classifier.objective(),
            classifier.version().as_deref().unwrap_or("unknown")
        );
        debug!("base margin {:.6}", classifier.base_margin());

        let scaler = StandardScaler::load(&paths.scaler)?;
        info!("loaded scaler {}", paths.scaler.display());
        debug!("scaler mean {:?} scale {:?}", scaler.mean(), scaler.scale());

        let (threshold, source) = match paths.threshold_override {
            Some(value) => {
                let threshold =
                    DecisionThreshold::new(value).ok_or_else(|| ConfigError::Threshold {
                        origin: ThresholdSource::CommandLine.to_string(),
                        value: value.to_string(),
                    })?;
                (threshold, ThresholdSource::CommandLine)
            }
            None => load_threshold(&paths.threshold_file)?,
        };

        let mut state = Self::new(classifier, scaler, threshold)?;
        state.threshold_source = source;
        info!(
            "decision threshold {} ({})",
            state.threshold.value(),
            state.threshold_source
        );
        Ok(state)
    }

    pub fn classifier(&self) -> &BoostedForest {
        &self.classifier
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn threshold(&self) -> DecisionThreshold {
        self.threshold
    }

    pub fn threshold_source(&self) -> &ThresholdSource {
        &self.threshold_source
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/state.rs"]
mod tests;
