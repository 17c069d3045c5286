//! Body-fat estimation (U.S. Navy circumference method, male variant).

use crate::{Error, Result};

/// Centimetre to inch factor used by the formula
pub const CM_TO_INCHES: f64 = 0.3937;

/// Estimate body-fat percentage from height, neck and waist in centimetres.
///
/// Returns a value rounded to 2 decimal places (half away from zero).
/// Fails with [`Error::InvalidMeasurement`] unless `waist_cm > neck_cm`.
pub fn body_fat_percentage(height_cm: f64, neck_cm: f64, waist_cm: f64) -> Result<f64> {
    if waist_cm <= neck_cm {
        return Err(Error::InvalidMeasurement(
            "Waist must be larger than neck for valid calculation.".into(),
        ));
    }

    let height_in = height_cm * CM_TO_INCHES;
    let neck_in = neck_cm * CM_TO_INCHES;
    let waist_in = waist_cm * CM_TO_INCHES;

    let fat_pct =
        86.010 * (waist_in - neck_in).log10() - 70.041 * height_in.log10() + 36.76;

    Ok(round2(fat_pct))
}

/// Round to 2 decimal places, halves away from zero
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
