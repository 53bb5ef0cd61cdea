use serde::Serialize;

use crate::model::features::Feature;
use crate::model::thresholds::DecisionThreshold;
use crate::pipeline::stage3_score::ScoredRow;
use crate::report::SummaryData;

#[derive(Debug, Serialize)]
struct FeaturesJson {
    work_hours_per_week: f64,
    after_hours_emails: f64,
    negative_sentiment_score: f64,
    meeting_count: f64,
    task_completion_rate: f64,
}

#[derive(Debug, Serialize)]
struct PredictionJson<'a> {
    features: FeaturesJson,
    burnout_probability: f32,
    burnout_prediction: u8,
    label: &'a str,
    threshold: f32,
}

pub fn render_summary_json(data: &SummaryData) -> serde_json::Result<String> {
    let mut out = serde_json::to_string_pretty(data)?;
    out.push('\n');
    Ok(out)
}

pub fn render_prediction_json(
    row: &ScoredRow,
    threshold: DecisionThreshold,
) -> serde_json::Result<String> {
    let payload = PredictionJson {
        features: FeaturesJson {
            work_hours_per_week: row.features.get(Feature::WorkHoursPerWeek),
            after_hours_emails: row.features.get(Feature::AfterHoursEmails),
            negative_sentiment_score: row.features.get(Feature::NegativeSentimentScore),
            meeting_count: row.features.get(Feature::MeetingCount),
            task_completion_rate: row.features.get(Feature::TaskCompletionRate),
        },
        burnout_probability: row.probability,
        burnout_prediction: row.prediction.as_u8(),
        label: row.prediction.key(),
        threshold: threshold.value(),
    };
    serde_json::to_string_pretty(&payload)
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/json.rs"]
mod tests;
