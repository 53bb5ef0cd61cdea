pub const N_FEATURES: usize = 5;

/// Ground-truth column consumed by the evaluator, never by the classifier.
pub const LABEL_COLUMN: &str = "burnout";

pub const PROBABILITY_COLUMN: &str = "burnout_probability";
pub const PREDICTION_COLUMN: &str = "burnout_prediction";

/// The five workplace metrics, in the order the scaler and classifier were fitted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    WorkHoursPerWeek,
    AfterHoursEmails,
    NegativeSentimentScore,
    MeetingCount,
    TaskCompletionRate,
}

impl Feature {
    pub const ALL: [Feature; N_FEATURES] = [
        Feature::WorkHoursPerWeek,
        Feature::AfterHoursEmails,
        Feature::NegativeSentimentScore,
        Feature::MeetingCount,
        Feature::TaskCompletionRate,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn column(self) -> &'static str {
        match self {
            Feature::WorkHoursPerWeek => "work_hours_per_week",
            Feature::AfterHoursEmails => "after_hours_emails",
            Feature::NegativeSentimentScore => "negative_sentiment_score",
            Feature::MeetingCount => "meeting_count",
            Feature::TaskCompletionRate => "task_completion_rate",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Feature::WorkHoursPerWeek => "Work hours per week",
            Feature::AfterHoursEmails => "After-hours emails",
            Feature::NegativeSentimentScore => "Negative sentiment",
            Feature::MeetingCount => "Weekly meetings",
            Feature::TaskCompletionRate => "Task completion rate",
        }
    }

    /// Plausible range for uploaded data. Values outside are scored but logged.
    pub fn expected_range(self) -> (f64, f64) {
        match self {
            Feature::WorkHoursPerWeek => (30.0, 80.0),
            Feature::AfterHoursEmails | Feature::MeetingCount => (0.0, f64::INFINITY),
            Feature::NegativeSentimentScore | Feature::TaskCompletionRate => (0.0, 1.0),
        }
    }

    /// Range accepted for a manually entered row.
    pub fn form_range(self) -> (f64, f64) {
        match self {
            Feature::WorkHoursPerWeek => (30.0, 80.0),
            Feature::AfterHoursEmails => (0.0, 50.0),
            Feature::MeetingCount => (0.0, 40.0),
            Feature::NegativeSentimentScore | Feature::TaskCompletionRate => (0.0, 1.0),
        }
    }

    pub fn from_column(name: &str) -> Option<Feature> {
        Feature::ALL.into_iter().find(|f| f.column() == name)
    }
}

pub fn feature_columns() -> [&'static str; N_FEATURES] {
    Feature::ALL.map(Feature::column)
}

/// One employee's metrics in canonical order. NaN marks a missing cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureRow(pub [f64; N_FEATURES]);

impl FeatureRow {
    pub fn get(&self, feature: Feature) -> f64 {
        self.0[feature.index()]
    }

    pub fn values(&self) -> &[f64; N_FEATURES] {
        &self.0
    }

    pub fn is_missing(&self, feature: Feature) -> bool {
        self.get(feature).is_nan()
    }

    pub fn out_of_range(&self) -> impl Iterator<Item = Feature> + '_ {
        Feature::ALL.into_iter().filter(|&f| {
            let v = self.get(f);
            let (lo, hi) = f.expected_range();
            !v.is_nan() && (v < lo || v > hi)
        })
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/features.rs"]
mod tests;
