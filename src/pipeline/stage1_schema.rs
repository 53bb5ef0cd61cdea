use crate::model::features::{Feature, LABEL_COLUMN, N_FEATURES};
use crate::pipeline::PipelineError;

/// Column positions of a table that carries every required feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedSchema {
    /// Indexed by `Feature::index()`.
    pub feature_columns: [usize; N_FEATURES],
    pub label_column: Option<usize>,
}

pub fn validate_schema(columns: &[String]) -> Result<ValidatedSchema, PipelineError> {
    let position = |name: &str| columns.iter().position(|c| c == name);

    let missing = missing_columns(columns);
    if !missing.is_empty() {
        return Err(PipelineError::Schema {
            missing: missing.into_iter().map(str::to_string).collect(),
        });
    }

    let mut feature_columns = [0usize; N_FEATURES];
    for feature in Feature::ALL {
        if let Some(idx) = position(feature.column()) {
            feature_columns[feature.index()] = idx;
        }
    }

    Ok(ValidatedSchema {
        feature_columns,
        label_column: position(LABEL_COLUMN),
    })
}

/// Required columns absent from `columns`, in canonical feature order.
pub fn missing_columns(columns: &[String]) -> Vec<&'static str> {
    Feature::ALL
        .into_iter()
        .map(Feature::column)
        .filter(|name| !columns.iter().any(|c| c == *name))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_schema.rs"]
mod tests;
