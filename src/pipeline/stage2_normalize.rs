use tracing::warn;

use crate::input::table::RawTable;
use crate::model::features::{Feature, FeatureRow, LABEL_COLUMN, N_FEATURES};
use crate::model::labels::{BurnoutLabel, parse_ground_truth};
use crate::model::scaler::StandardScaler;
use crate::pipeline::PipelineError;
use crate::pipeline::stage1_schema::ValidatedSchema;

/// Cell spellings read as a missing value.
const MISSING_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "None", "#N/A",
];

#[derive(Debug, Clone)]
pub struct Stage2Output {
    pub rows: Vec<FeatureRow>,
    /// Scaled rows in canonical order, as the classifier consumes them.
    pub scaled: Vec<[f32; N_FEATURES]>,
    pub ground_truth: Option<Vec<BurnoutLabel>>,
    pub out_of_range: [usize; N_FEATURES],
}

pub fn run_stage2(
    table: &RawTable,
    schema: &ValidatedSchema,
    scaler: &StandardScaler,
) -> Result<Stage2Output, PipelineError> {
    let n_rows = table.n_rows();
    let mut rows = Vec::with_capacity(n_rows);
    let mut scaled = Vec::with_capacity(n_rows);
    let mut ground_truth = schema.label_column.map(|_| Vec::with_capacity(n_rows));
    let mut out_of_range = [0usize; N_FEATURES];

    for (i, record) in table.rows.iter().enumerate() {
        let row_no = i + 1;
        let mut values = [0.0f64; N_FEATURES];
        for feature in Feature::ALL {
            let raw = cell(record, schema.feature_columns[feature.index()]);
            values[feature.index()] =
                parse_feature_cell(raw).ok_or_else(|| PipelineError::Parse {
                    row: row_no,
                    column: feature.column().to_string(),
                    value: raw.to_string(),
                    expected: "a number",
                })?;
        }
        let row = FeatureRow(values);
        for feature in row.out_of_range() {
            out_of_range[feature.index()] += 1;
        }

        if let (Some(labels), Some(col)) = (ground_truth.as_mut(), schema.label_column) {
            let raw = cell(record, col);
            let label = parse_ground_truth(raw).ok_or_else(|| PipelineError::Parse {
                row: row_no,
                column: LABEL_COLUMN.to_string(),
                value: raw.to_string(),
                expected: "a 0/1 label",
            })?;
            labels.push(label);
        }

        scaled.push(normalize_row(&row, scaler));
        rows.push(row);
    }

    for feature in Feature::ALL {
        let count = out_of_range[feature.index()];
        if count > 0 {
            let (lo, hi) = feature.expected_range();
            warn!(
                "{}: {} of {} values in {} fall outside [{}, {}]",
                table.source,
                count,
                n_rows,
                feature.column(),
                lo,
                hi
            );
        }
    }

    Ok(Stage2Output {
        rows,
        scaled,
        ground_truth,
        out_of_range,
    })
}

/// Scales one row and narrows it to the f32 the trees were trained on.
pub fn normalize_row(row: &FeatureRow, scaler: &StandardScaler) -> [f32; N_FEATURES] {
    scaler.transform(row).map(|v| v as f32)
}

/// `Some(NaN)` for a missing marker, `None` for text that is not a finite number.
pub fn parse_feature_cell(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if MISSING_MARKERS.contains(&raw) {
        return Some(f64::NAN);
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn cell(record: &[String], idx: usize) -> &str {
    record.get(idx).map(String::as_str).unwrap_or("")
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_normalize.rs"]
mod tests;
