use tracing::warn;

use crate::model::labels::BurnoutLabel;

/// 2x2 counts, `cells[actual][predicted]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfusionMatrix {
    pub cells: [[usize; 2]; 2],
}

impl ConfusionMatrix {
    pub fn from_labels(actual: &[BurnoutLabel], predicted: &[BurnoutLabel]) -> Self {
        debug_assert_eq!(actual.len(), predicted.len());
        let mut cells = [[0usize; 2]; 2];
        for (a, p) in actual.iter().zip(predicted) {
            cells[a.index()][p.index()] += 1;
        }
        Self { cells }
    }

    pub fn get(&self, actual: BurnoutLabel, predicted: BurnoutLabel) -> usize {
        self.cells[actual.index()][predicted.index()]
    }

    pub fn total(&self) -> usize {
        self.cells.iter().flatten().sum()
    }

    pub fn support(&self, label: BurnoutLabel) -> usize {
        self.cells[label.index()].iter().sum()
    }

    pub fn predicted(&self, label: BurnoutLabel) -> usize {
        self.cells.iter().map(|row| row[label.index()]).sum()
    }

    pub fn correct(&self) -> usize {
        BurnoutLabel::ALL.iter().map(|&l| self.get(l, l)).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassMetrics {
    pub label: BurnoutLabel,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub classes: [ClassMetrics; 2],
    pub accuracy: f64,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stage5Output {
    pub matrix: ConfusionMatrix,
    pub report: ClassificationReport,
}

pub fn run_stage5(actual: &[BurnoutLabel], predicted: &[BurnoutLabel]) -> Stage5Output {
    let matrix = ConfusionMatrix::from_labels(actual, predicted);
    let report = classification_report(&matrix);
    Stage5Output { matrix, report }
}

pub fn classification_report(matrix: &ConfusionMatrix) -> ClassificationReport {
    let classes = BurnoutLabel::ALL.map(|label| class_metrics(matrix, label));
    let total = matrix.total();

    let macro_avg = AverageMetrics {
        precision: classes.iter().map(|c| c.precision).sum::<f64>() / classes.len() as f64,
        recall: classes.iter().map(|c| c.recall).sum::<f64>() / classes.len() as f64,
        f1: classes.iter().map(|c| c.f1).sum::<f64>() / classes.len() as f64,
        support: total,
    };

    let weighted = |metric: fn(&ClassMetrics) -> f64| {
        ratio(
            classes
                .iter()
                .map(|c| metric(c) * c.support as f64)
                .sum::<f64>(),
            total as f64,
        )
    };
    let weighted_avg = AverageMetrics {
        precision: weighted(|c| c.precision),
        recall: weighted(|c| c.recall),
        f1: weighted(|c| c.f1),
        support: total,
    };

    ClassificationReport {
        classes,
        accuracy: ratio(matrix.correct() as f64, total as f64),
        macro_avg,
        weighted_avg,
    }
}

fn class_metrics(matrix: &ConfusionMatrix, label: BurnoutLabel) -> ClassMetrics {
    let tp = matrix.get(label, label) as f64;
    let predicted = matrix.predicted(label);
    let support = matrix.support(label);

    if predicted == 0 {
        warn!(
            "precision for class {} is undefined (no predicted samples); reported as 0",
            label.as_u8()
        );
    }
    if support == 0 {
        warn!(
            "recall for class {} is undefined (no true samples); reported as 0",
            label.as_u8()
        );
    }

    let precision = ratio(tp, predicted as f64);
    let recall = ratio(tp, support as f64);
    ClassMetrics {
        label,
        precision,
        recall,
        f1: ratio(2.0 * precision * recall, precision + recall),
        support,
    }
}

fn ratio(num: f64, denom: f64) -> f64 {
    if denom > 0.0 { num / denom } else { 0.0 }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage5_evaluate.rs"]
mod tests;
