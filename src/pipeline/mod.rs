use std::path::PathBuf;

use crate::input::InputError;
use crate::input::table::RawTable;
use crate::model::Classifier;
use crate::model::features::FeatureRow;
use crate::model::state::ScorerState;

pub mod stage1_schema;
pub mod stage2_normalize;
pub mod stage3_score;
pub mod stage4_aggregate;
pub mod stage5_evaluate;
pub mod stage6_report;

use stage1_schema::validate_schema;
use stage2_normalize::{normalize_row, run_stage2};
use stage3_score::{ScoredBatch, ScoredRow, run_stage3};

/// Failures that end one request. The process keeps serving after any of these.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("missing required columns: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },
    #[error("row {row}, column {column:?}: cannot read {value:?} as {expected}")]
    Parse {
        row: usize,
        column: String,
        value: String,
        expected: &'static str,
    },
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("cannot write {}: {}", .path.display(), .source)]
    Report {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Stages 1-3 over an uploaded table: nothing is scored unless the whole table
/// validates and parses.
pub fn score_table(state: &ScorerState, table: &RawTable) -> Result<ScoredBatch, PipelineError> {
    let schema = validate_schema(&table.columns)?;
    let stage2 = run_stage2(table, &schema, state.scaler())?;
    Ok(run_stage3(stage2, state.classifier(), state.threshold()))
}

pub fn score_row(state: &ScorerState, row: FeatureRow) -> ScoredRow {
    let scaled = normalize_row(&row, state.scaler());
    let probability = state.classifier().predict_proba(&scaled);
    ScoredRow {
        features: row,
        probability,
        prediction: state.threshold().label(probability),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/mod.rs"]
mod tests;
