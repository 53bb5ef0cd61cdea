use crate::model::Classifier;
use crate::model::features::{FeatureRow, N_FEATURES};
use crate::model::labels::BurnoutLabel;
use crate::model::thresholds::DecisionThreshold;
use crate::pipeline::stage2_normalize::Stage2Output;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredRow {
    pub features: FeatureRow,
    pub probability: f32,
    pub prediction: BurnoutLabel,
}

/// Column-wise scoring result for one table. Probabilities are computed once; labels
/// are derived from them and the threshold the batch was last labelled with.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredBatch {
    pub features: Vec<FeatureRow>,
    pub probabilities: Vec<f32>,
    pub predictions: Vec<BurnoutLabel>,
    pub ground_truth: Option<Vec<BurnoutLabel>>,
    pub threshold: DecisionThreshold,
    /// Per feature, how many values fell outside the expected range.
    pub out_of_range: [usize; N_FEATURES],
}

impl ScoredBatch {
    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    /// Same probabilities, new labels. The classifier is not consulted.
    pub fn relabelled(&self, threshold: DecisionThreshold) -> ScoredBatch {
        ScoredBatch {
            features: self.features.clone(),
            probabilities: self.probabilities.clone(),
            predictions: relabel(&self.probabilities, threshold),
            ground_truth: self.ground_truth.clone(),
            threshold,
            out_of_range: self.out_of_range,
        }
    }
}

pub fn run_stage3(
    stage2: Stage2Output,
    classifier: &dyn Classifier,
    threshold: DecisionThreshold,
) -> ScoredBatch {
    let probabilities = predict_probabilities(&stage2.scaled, classifier);
    let predictions = relabel(&probabilities, threshold);
    ScoredBatch {
        features: stage2.rows,
        probabilities,
        predictions,
        ground_truth: stage2.ground_truth,
        threshold,
        out_of_range: stage2.out_of_range,
    }
}

pub fn predict_probabilities(
    scaled: &[[f32; N_FEATURES]],
    classifier: &dyn Classifier,
) -> Vec<f32> {
    scaled.iter().map(|x| classifier.predict_proba(x)).collect()
}

pub fn relabel(probabilities: &[f32], threshold: DecisionThreshold) -> Vec<BurnoutLabel> {
    probabilities.iter().map(|&p| threshold.label(p)).collect()
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_score.rs"]
mod tests;
