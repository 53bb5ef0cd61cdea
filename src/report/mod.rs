use serde::Serialize;

pub mod json;
pub mod text;

#[derive(Debug, Clone, Serialize)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputMeta {
    pub source: String,
    pub n_rows: usize,
    pub n_columns: usize,
    pub extra_columns: Vec<String>,
    pub has_ground_truth: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThresholdMeta {
    pub value: f32,
    pub source: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LabelShare {
    pub label: &'static str,
    pub value: u8,
    pub count: usize,
    pub fraction: Option<f64>,
    pub percent: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProbabilityStats {
    pub min: f32,
    pub median: f32,
    pub p90: f32,
    pub max: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureMean {
    pub feature: &'static str,
    pub mean: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LabelFeatureMeans {
    pub label: &'static str,
    pub rows: usize,
    pub means: Vec<FeatureMean>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutOfRange {
    pub feature: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsRow {
    pub name: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationSummary {
    /// `[actual][predicted]`, labels 0 then 1.
    pub confusion_matrix: [[usize; 2]; 2],
    pub classes: Vec<MetricsRow>,
    pub accuracy: f64,
    pub macro_avg: MetricsRow,
    pub weighted_avg: MetricsRow,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryData {
    pub tool: ToolMeta,
    pub input: InputMeta,
    pub threshold: ThresholdMeta,
    pub distribution: Vec<LabelShare>,
    pub probability: ProbabilityStats,
    pub feature_means: Vec<LabelFeatureMeans>,
    pub out_of_range: Vec<OutOfRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<EvaluationSummary>,
}

pub fn format_f32_6(v: f32) -> String {
    format!("{:.6}", v)
}

pub fn format_f64_4(v: f64) -> String {
    format!("{:.4}", v)
}

pub fn quantile_indexed(values: &[f32], p: f32) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    let idx = (((n - 1) as f64 * p as f64).ceil() as usize).min(n - 1);
    sorted[idx]
}

pub fn median(values: &[f32]) -> f32 {
    quantile_indexed(values, 0.5)
}

pub fn p90(values: &[f32]) -> f32 {
    quantile_indexed(values, 0.90)
}

pub fn probability_stats(values: &[f32]) -> ProbabilityStats {
    ProbabilityStats {
        min: quantile_indexed(values, 0.0),
        median: median(values),
        p90: p90(values),
        max: quantile_indexed(values, 1.0),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
