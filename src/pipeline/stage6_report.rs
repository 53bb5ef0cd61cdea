use std::fs;
use std::path::{Path, PathBuf};

use crate::input::table::RawTable;
use crate::model::features::{Feature, LABEL_COLUMN, PREDICTION_COLUMN, PROBABILITY_COLUMN};
use crate::model::labels::BurnoutLabel;
use crate::pipeline::PipelineError;
use crate::pipeline::stage3_score::ScoredBatch;
use crate::pipeline::stage4_aggregate::Stage4Output;
use crate::pipeline::stage5_evaluate::{AverageMetrics, Stage5Output};
use crate::report::json::render_summary_json;
use crate::report::text::render_report_text;
use crate::report::{
    EvaluationSummary, FeatureMean, InputMeta, LabelFeatureMeans, LabelShare, MetricsRow,
    OutOfRange, SummaryData, ThresholdMeta, ToolMeta, format_f32_6, probability_stats,
};

pub const PREDICTIONS_FILE: &str = "burnout_predictions.csv";
pub const SUMMARY_FILE: &str = "summary.json";
pub const REPORT_FILE: &str = "report.txt";

#[derive(Debug, Clone)]
pub struct Stage6Input<'a> {
    pub table: &'a RawTable,
    pub batch: &'a ScoredBatch,
    pub aggregate: &'a Stage4Output,
    pub evaluation: Option<&'a Stage5Output>,
    pub threshold_source: String,
    pub tool_name: String,
    pub tool_version: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub predictions: PathBuf,
    pub summary: PathBuf,
    pub report: PathBuf,
}

pub fn write_reports(input: &Stage6Input<'_>, out_dir: &Path) -> Result<ReportPaths, PipelineError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source: std::io::Error| PipelineError::Report { path, source }
    };

    fs::create_dir_all(out_dir).map_err(io_err(out_dir))?;

    let predictions = out_dir.join(PREDICTIONS_FILE);
    write_predictions_csv(input.table, input.batch, &predictions)?;

    let summary_data = build_summary(input);

    let summary = out_dir.join(SUMMARY_FILE);
    let json = render_summary_json(&summary_data)
        .map_err(std::io::Error::other)
        .map_err(io_err(&summary))?;
    fs::write(&summary, json).map_err(io_err(&summary))?;

    let report = out_dir.join(REPORT_FILE);
    fs::write(&report, render_report_text(&summary_data)).map_err(io_err(&report))?;

    Ok(ReportPaths {
        predictions,
        summary,
        report,
    })
}

/// Echoes every uploaded column, then appends (or overwrites) the two derived ones.
pub fn write_predictions_csv(
    table: &RawTable,
    batch: &ScoredBatch,
    path: &Path,
) -> Result<(), PipelineError> {
    let to_err = |e: csv::Error| PipelineError::Report {
        path: path.to_path_buf(),
        source: e.into(),
    };

    let mut header = table.columns.clone();
    let prob_col = output_column(&mut header, PROBABILITY_COLUMN);
    let pred_col = output_column(&mut header, PREDICTION_COLUMN);

    let mut w = csv::Writer::from_path(path).map_err(to_err)?;
    w.write_record(&header).map_err(to_err)?;
    for (i, record) in table.rows.iter().enumerate() {
        let mut out = record.clone();
        out.resize(header.len(), String::new());
        out[prob_col] = format_f32_6(batch.probabilities[i]);
        out[pred_col] = batch.predictions[i].as_u8().to_string();
        w.write_record(&out).map_err(to_err)?;
    }
    w.flush().map_err(|source| PipelineError::Report {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn output_column(header: &mut Vec<String>, name: &str) -> usize {
    match header.iter().position(|c| c == name) {
        Some(idx) => idx,
        None => {
            header.push(name.to_string());
            header.len() - 1
        }
    }
}

pub fn build_summary(input: &Stage6Input<'_>) -> SummaryData {
    let batch = input.batch;
    let dist = &input.aggregate.distribution;

    let extra_columns = input
        .table
        .columns
        .iter()
        .filter(|c| Feature::from_column(c).is_none() && c.as_str() != LABEL_COLUMN)
        .cloned()
        .collect();

    let distribution = BurnoutLabel::ALL
        .into_iter()
        .map(|label| LabelShare {
            label: label.key(),
            value: label.as_u8(),
            count: dist.count(label),
            fraction: dist.fraction(label),
            percent: dist.percent(label),
        })
        .collect();

    let feature_means = BurnoutLabel::ALL
        .into_iter()
        .map(|label| {
            let means = input.aggregate.feature_means.get(&label);
            LabelFeatureMeans {
                label: label.key(),
                rows: means.map_or(0, |m| m.rows),
                means: Feature::ALL
                    .into_iter()
                    .map(|f| FeatureMean {
                        feature: f.column(),
                        mean: means.and_then(|m| m.mean(f)),
                    })
                    .collect(),
            }
        })
        .collect();

    let out_of_range = Feature::ALL
        .into_iter()
        .filter(|f| batch.out_of_range[f.index()] > 0)
        .map(|f| OutOfRange {
            feature: f.column(),
            count: batch.out_of_range[f.index()],
        })
        .collect();

    SummaryData {
        tool: ToolMeta {
            name: input.tool_name.clone(),
            version: input.tool_version.clone(),
        },
        input: InputMeta {
            source: input.table.source.clone(),
            n_rows: batch.len(),
            n_columns: input.table.columns.len(),
            extra_columns,
            has_ground_truth: batch.ground_truth.is_some(),
        },
        threshold: ThresholdMeta {
            value: batch.threshold.value(),
            source: input.threshold_source.clone(),
        },
        distribution,
        probability: probability_stats(&batch.probabilities),
        feature_means,
        out_of_range,
        evaluation: input.evaluation.map(evaluation_summary),
    }
}

fn evaluation_summary(eval: &Stage5Output) -> EvaluationSummary {
    let avg = |name: &str, m: &AverageMetrics| MetricsRow {
        name: name.to_string(),
        precision: m.precision,
        recall: m.recall,
        f1: m.f1,
        support: m.support,
    };
    EvaluationSummary {
        confusion_matrix: eval.matrix.cells,
        classes: eval
            .report
            .classes
            .iter()
            .map(|c| MetricsRow {
                name: c.label.as_u8().to_string(),
                precision: c.precision,
                recall: c.recall,
                f1: c.f1,
                support: c.support,
            })
            .collect(),
        accuracy: eval.report.accuracy,
        macro_avg: avg("macro avg", &eval.report.macro_avg),
        weighted_avg: avg("weighted avg", &eval.report.weighted_avg),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage6_report.rs"]
mod tests;
