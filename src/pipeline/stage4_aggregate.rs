use std::collections::BTreeMap;

use crate::model::features::{Feature, FeatureRow, N_FEATURES};
use crate::model::labels::BurnoutLabel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Distribution {
    pub total: usize,
    /// Indexed by `BurnoutLabel::index()`.
    pub counts: [usize; 2],
}

impl Distribution {
    pub fn count(&self, label: BurnoutLabel) -> usize {
        self.counts[label.index()]
    }

    /// Share of rows with `label`, `None` for an empty batch.
    pub fn fraction(&self, label: BurnoutLabel) -> Option<f64> {
        (self.total > 0).then(|| self.count(label) as f64 / self.total as f64)
    }

    pub fn percent(&self, label: BurnoutLabel) -> Option<f64> {
        (self.total > 0).then(|| self.count(label) as f64 * 100.0 / self.total as f64)
    }
}

/// Per-feature means over the rows predicted as one label. A feature whose values are
/// all missing in the partition has no mean.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelMeans {
    pub rows: usize,
    pub means: [Option<f64>; N_FEATURES],
}

impl LabelMeans {
    pub fn mean(&self, feature: Feature) -> Option<f64> {
        self.means[feature.index()]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stage4Output {
    pub distribution: Distribution,
    /// Only labels with at least one row have an entry.
    pub feature_means: BTreeMap<BurnoutLabel, LabelMeans>,
}

pub fn run_stage4(features: &[FeatureRow], predictions: &[BurnoutLabel]) -> Stage4Output {
    Stage4Output {
        distribution: distribution(predictions),
        feature_means: feature_means_by_label(features, predictions),
    }
}

pub fn distribution(predictions: &[BurnoutLabel]) -> Distribution {
    let mut out = Distribution {
        total: predictions.len(),
        counts: [0; 2],
    };
    for label in predictions {
        out.counts[label.index()] += 1;
    }
    out
}

pub fn feature_means_by_label(
    features: &[FeatureRow],
    predictions: &[BurnoutLabel],
) -> BTreeMap<BurnoutLabel, LabelMeans> {
    let mut sums: BTreeMap<BurnoutLabel, (usize, [f64; N_FEATURES], [usize; N_FEATURES])> =
        BTreeMap::new();

    for (row, label) in features.iter().zip(predictions) {
        let entry = sums
            .entry(*label)
            .or_insert((0, [0.0; N_FEATURES], [0; N_FEATURES]));
        entry.0 += 1;
        for feature in Feature::ALL.into_iter().filter(|&f| !row.is_missing(f)) {
            entry.1[feature.index()] += row.get(feature);
            entry.2[feature.index()] += 1;
        }
    }

    sums.into_iter()
        .map(|(label, (rows, sum, present))| {
            let mut means = [None; N_FEATURES];
            for i in 0..N_FEATURES {
                if present[i] > 0 {
                    means[i] = Some(sum[i] / present[i] as f64);
                }
            }
            (label, LabelMeans { rows, means })
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_aggregate.rs"]
mod tests;
