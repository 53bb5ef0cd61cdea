use crate::input::InputError;
use crate::model::features::{Feature, FeatureRow, N_FEATURES};

/// Defaults of the individual prediction form.
pub const FORM_DEFAULTS: [f64; N_FEATURES] = [45.0, 10.0, 0.3, 10.0, 0.8];

/// Builds a row from individually entered values, rejecting anything the form would not
/// have allowed.
pub fn manual_row(values: [f64; N_FEATURES]) -> Result<FeatureRow, InputError> {
    for feature in Feature::ALL {
        let v = values[feature.index()];
        let (lo, hi) = feature.form_range();
        if !v.is_finite() || v < lo || v > hi {
            return Err(InputError::InvalidInput(format!(
                "{} must be between {} and {}, got {}",
                feature.column(),
                lo,
                hi,
                v
            )));
        }
    }
    Ok(FeatureRow(values))
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/manual.rs"]
mod tests;
