use std::fmt::Write;

use crate::model::features::Feature;
use crate::model::labels::BurnoutLabel;
use crate::model::thresholds::DecisionThreshold;
use crate::pipeline::stage3_score::ScoredRow;
use crate::report::{MetricsRow, SummaryData, format_f32_6, format_f64_4};

const BAR_WIDTH: usize = 40;

const DISCLAIMER: &str = "Note: this result comes from a machine learning model trained on synthetic data and is not a medical diagnosis.";

pub fn render_report_text(data: &SummaryData) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Burnout Risk Report");
    let _ = writeln!(out, "===================");
    let _ = writeln!(out);
    let _ = writeln!(out, "Input: {}", data.input.source);
    let _ = writeln!(out, "Rows scored: {}", data.input.n_rows);
    let _ = writeln!(
        out,
        "Decision threshold: {} ({})",
        format_f32_6(data.threshold.value),
        data.threshold.source
    );
    if !data.input.extra_columns.is_empty() {
        let _ = writeln!(
            out,
            "Passed-through columns: {}",
            data.input.extra_columns.join(", ")
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "1. Burnout distribution");
    let name_width = data
        .distribution
        .iter()
        .map(|s| display_name(s.label).len())
        .max()
        .unwrap_or(0);
    for share in &data.distribution {
        let fraction = share.fraction.unwrap_or(0.0);
        let _ = writeln!(
            out,
            "{:<width$}  [{}]  {:>5.1}% ({})",
            display_name(share.label),
            bar(fraction, BAR_WIDTH),
            share.percent.unwrap_or(0.0),
            share.count,
            width = name_width
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "2. Probability profile");
    let _ = writeln!(
        out,
        "min {}  median {}  p90 {}  max {}",
        format_f32_6(data.probability.min),
        format_f32_6(data.probability.median),
        format_f32_6(data.probability.p90),
        format_f32_6(data.probability.max)
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "3. Feature comparison (mean per predicted label)");
    out.push_str(&feature_table(data));
    let _ = writeln!(out);

    let mut section = 4;
    if let Some(eval) = &data.evaluation {
        let _ = writeln!(out, "{section}. Model evaluation");
        let _ = writeln!(out, "Confusion matrix (rows = actual, columns = predicted)");
        let _ = writeln!(out, "{:<10}{:>10}{:>10}", "", "pred 0", "pred 1");
        for (actual, row) in eval.confusion_matrix.iter().enumerate() {
            let _ = writeln!(
                out,
                "{:<10}{:>10}{:>10}",
                format!("actual {actual}"),
                row[0],
                row[1]
            );
        }
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{:<14}{:>10}{:>10}{:>10}{:>10}",
            "", "precision", "recall", "f1-score", "support"
        );
        for class in &eval.classes {
            out.push_str(&metrics_line(class));
        }
        let _ = writeln!(
            out,
            "{:<14}{:>10}{:>10}{:>10}{:>10}",
            "accuracy",
            "",
            "",
            format_f64_4(eval.accuracy),
            eval.macro_avg.support
        );
        out.push_str(&metrics_line(&eval.macro_avg));
        out.push_str(&metrics_line(&eval.weighted_avg));
        let _ = writeln!(out);
        section += 1;
    }

    let _ = writeln!(out, "{section}. Quality and caveats");
    if data.out_of_range.is_empty() {
        let _ = writeln!(out, "All feature values within expected ranges.");
    } else {
        for entry in &data.out_of_range {
            let _ = writeln!(
                out,
                "{}: {} value(s) outside the expected range",
                entry.feature, entry.count
            );
        }
    }
    let _ = writeln!(out, "{DISCLAIMER}");

    out
}

/// Verdict for a single, manually entered row.
pub fn render_prediction_text(row: &ScoredRow, threshold: DecisionThreshold) -> String {
    let mut out = String::new();
    match row.prediction {
        BurnoutLabel::Burnout => {
            let _ = writeln!(out, "High Burnout Risk Detected");
        }
        BurnoutLabel::NoBurnout => {
            let _ = writeln!(out, "No Burnout Risk Detected");
        }
    }
    let _ = writeln!(
        out,
        "Probability: {:.2} (threshold {:.2})",
        row.probability,
        threshold.value()
    );
    for feature in Feature::ALL {
        let _ = writeln!(
            out,
            "  {:<22} {}",
            feature.display_name(),
            row.features.get(feature)
        );
    }
    let _ = writeln!(out, "{DISCLAIMER}");
    out
}

pub fn bar(fraction: f64, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    let mut s = "#".repeat(filled);
    s.push_str(&".".repeat(width - filled));
    s
}

fn display_name(key: &str) -> &'static str {
    BurnoutLabel::ALL
        .into_iter()
        .find(|l| l.key() == key)
        .map(BurnoutLabel::display_name)
        .unwrap_or("Unknown")
}

fn feature_table(data: &SummaryData) -> String {
    let mut out = String::new();
    let _ = write!(out, "{:<24}", "Feature");
    for label in BurnoutLabel::ALL {
        let _ = write!(out, "{:>14}", label.display_name());
    }
    let _ = writeln!(out);

    for feature in Feature::ALL {
        let _ = write!(out, "{:<24}", feature.display_name());
        for label in BurnoutLabel::ALL {
            let mean = data
                .feature_means
                .iter()
                .find(|m| m.label == label.key())
                .and_then(|m| m.means.iter().find(|fm| fm.feature == feature.column()))
                .and_then(|fm| fm.mean);
            let cell = mean.map(format_f64_4).unwrap_or_else(|| "n/a".to_string());
            let _ = write!(out, "{:>14}", cell);
        }
        let _ = writeln!(out);
    }
    for label in BurnoutLabel::ALL {
        if !data
            .feature_means
            .iter()
            .any(|m| m.label == label.key() && m.rows > 0)
        {
            let _ = writeln!(out, "No rows predicted as {}.", label.display_name());
        }
    }
    out
}

fn metrics_line(row: &MetricsRow) -> String {
    format!(
        "{:<14}{:>10}{:>10}{:>10}{:>10}\n",
        row.name,
        format_f64_4(row.precision),
        format_f64_4(row.recall),
        format_f64_4(row.f1),
        row.support
    )
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/text.rs"]
mod tests;
