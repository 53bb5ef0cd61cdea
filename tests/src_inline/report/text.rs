
use super::*;
use crate::model::features::FeatureRow;
use crate::report::{
    EvaluationSummary, FeatureMean, InputMeta, LabelFeatureMeans, LabelShare, OutOfRange,
    ProbabilityStats, ThresholdMeta, ToolMeta,
};

fn metrics(name: &str, support: usize) -> MetricsRow {
    MetricsRow {
        name: name.to_string(),
        precision: 1.0,
        recall: 1.0,
        f1: 1.0,
        support,
    }
}

fn summary(evaluation: Option<EvaluationSummary>) -> SummaryData {
    SummaryData {
        tool: ToolMeta {
            name: "burnout-scorer".to_string(),
            version: "0.1.0".to_string(),
        },
        input: InputMeta {
            source: "team.csv".to_string(),
            n_rows: 10,
            n_columns: 7,
            extra_columns: vec!["employee_id".to_string()],
            has_ground_truth: evaluation.is_some(),
        },
        threshold: ThresholdMeta {
            value: 0.5,
            source: "default".to_string(),
        },
        distribution: vec![
            LabelShare {
                label: "no_burnout",
                value: 0,
                count: 6,
                fraction: Some(0.6),
                percent: Some(60.0),
            },
            LabelShare {
                label: "burnout",
                value: 1,
                count: 4,
                fraction: Some(0.4),
                percent: Some(40.0),
            },
        ],
        probability: ProbabilityStats {
            min: 0.1,
            median: 0.2,
            p90: 0.6,
            max: 0.7,
        },
        feature_means: vec![LabelFeatureMeans {
            label: "no_burnout",
            rows: 6,
            means: Feature::ALL
                .into_iter()
                .map(|f| FeatureMean {
                    feature: f.column(),
                    mean: (f != Feature::MeetingCount).then_some(1.5),
                })
                .collect(),
        }],
        out_of_range: vec![OutOfRange {
            feature: "work_hours_per_week",
            count: 2,
        }],
        evaluation,
    }
}

#[test]
fn test_bar() {
    assert_eq!(bar(0.5, 10), "#####.....");
    assert_eq!(bar(0.0, 4), "....");
    assert_eq!(bar(1.0, 4), "####");
    assert_eq!(bar(1.7, 4), "####");
}

#[test]
fn test_report_sections() {
    let text = render_report_text(&summary(None));
    assert!(text.contains("Input: team.csv"));
    assert!(text.contains("Passed-through columns: employee_id"));
    assert!(text.contains(&format!("[{}]", bar(0.6, 40))));
    assert!(text.contains(" 60.0% (6)"));
    assert!(text.contains(" 40.0% (4)"));
    assert!(text.contains("No rows predicted as Burnout."));
    assert!(text.contains("n/a"));
    assert!(text.contains("1.5000"));
    assert!(text.contains("work_hours_per_week: 2 value(s) outside the expected range"));
    assert!(text.contains("4. Quality and caveats"));
    assert!(!text.contains("Model evaluation"));
    assert!(text.trim_end().ends_with("not a medical diagnosis."));
}

#[test]
fn test_report_with_evaluation() {
    let eval = EvaluationSummary {
        confusion_matrix: [[6, 0], [0, 4]],
        classes: vec![metrics("0", 6), metrics("1", 4)],
        accuracy: 1.0,
        macro_avg: metrics("macro avg", 10),
        weighted_avg: metrics("weighted avg", 10),
    };
    let text = render_report_text(&summary(Some(eval)));
    assert!(text.contains("4. Model evaluation"));
    assert!(text.contains("5. Quality and caveats"));
    assert!(text.contains("weighted avg"));
    assert!(text.contains("actual 1"));
}

#[test]
fn test_prediction_text() {
    let row = ScoredRow {
        features: FeatureRow([45.0, 10.0, 0.3, 10.0, 0.8]),
        probability: 0.1828,
        prediction: BurnoutLabel::NoBurnout,
    };
    let text = render_prediction_text(&row, DecisionThreshold::default());
    assert!(text.starts_with("No Burnout Risk Detected"));
    assert!(text.contains("Probability: 0.18 (threshold 0.50)"));

    let row = ScoredRow {
        probability: 0.91,
        prediction: BurnoutLabel::Burnout,
        ..row
    };
    let text = render_prediction_text(&row, DecisionThreshold::default());
    assert!(text.starts_with("High Burnout Risk Detected"));
    assert!(text.contains("not a medical diagnosis"));
}
