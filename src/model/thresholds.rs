use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::model::ConfigError;
use crate::model::labels::BurnoutLabel;

pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// Probability cutoff in [0, 1]. A row is positive when `p >= threshold`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct DecisionThreshold(f32);

impl DecisionThreshold {
    pub fn new(value: f32) -> Option<Self> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn value(self) -> f32 {
        self.0
    }

    pub fn label(self, probability: f32) -> BurnoutLabel {
        if probability >= self.0 {
            BurnoutLabel::Burnout
        } else {
            BurnoutLabel::NoBurnout
        }
    }
}

impl Default for DecisionThreshold {
    fn default() -> Self {
        Self(DEFAULT_THRESHOLD)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ThresholdSource {
    Default,
    File(PathBuf),
    CommandLine,
}

impl std::fmt::Display for ThresholdSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThresholdSource::Default => write!(f, "default"),
            ThresholdSource::File(path) => write!(f, "{}", path.display()),
            ThresholdSource::CommandLine => write!(f, "--threshold"),
        }
    }
}

/// Reads the threshold file; an absent file means the default cutoff.
pub fn load_threshold(path: &Path) -> Result<(DecisionThreshold, ThresholdSource), ConfigError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(
                "threshold file {} not found, using {}",
                path.display(),
                DEFAULT_THRESHOLD
            );
            return Ok((DecisionThreshold::default(), ThresholdSource::Default));
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let threshold = parse_threshold(text.trim(), &path.display().to_string())?;
    info!(
        "decision threshold {} loaded from {}",
        threshold.value(),
        path.display()
    );
    Ok((threshold, ThresholdSource::File(path.to_path_buf())))
}

pub fn parse_threshold(raw: &str, origin: &str) -> Result<DecisionThreshold, ConfigError> {
    raw.parse::<f32>()
        .ok()
        .and_then(DecisionThreshold::new)
        .ok_or_else(|| ConfigError::Threshold {
            origin: origin.to_string(),
            value: raw.to_string(),
        })
}

/// Largest sweep accepted; every point relabels the whole batch.
pub const MAX_GRID_POINTS: usize = 10_001;

/// Inclusive grid `start, start + step, ..., stop` for threshold sweeps.
pub fn threshold_grid(start: f32, stop: f32, step: f32) -> Option<Vec<DecisionThreshold>> {
    DecisionThreshold::new(start)?;
    DecisionThreshold::new(stop)?;
    if !(step.is_finite() && step > 0.0) || start > stop {
        return None;
    }
    let span = ((stop - start) as f64 / step as f64 + 1e-4).floor();
    if span >= MAX_GRID_POINTS as f64 {
        return None;
    }
    let n = span as usize + 1;
    let grid = (0..n)
        .filter_map(|i| {
            let t = (start + i as f32 * step).min(stop);
            DecisionThreshold::new(t)
        })
        .collect();
    Some(grid)
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/thresholds.rs"]
mod tests;
