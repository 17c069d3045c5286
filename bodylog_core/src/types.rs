//! Core domain types for bodylog.
//!
//! This module defines:
//! - The persisted measurement record
//! - Raw (not yet resolved) user input for a new entry
//! - Chartable metrics
//! - The duplicate-date policy

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Records
// ============================================================================

/// One day's measurements. The date is the record key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub date: NaiveDate,
    pub weight_kg: f64,
    pub waist_cm: f64,
    pub neck_cm: f64,
    /// Derived from neck, waist and height at write time, 2 decimals
    pub fat_pct: f64,
}

impl MeasurementRecord {
    /// Value of the given metric for this record
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Weight => self.weight_kg,
            Metric::Waist => self.waist_cm,
            Metric::BodyFat => self.fat_pct,
        }
    }
}

// ============================================================================
// Input
// ============================================================================

/// Candidate values for a new entry.
///
/// `None` means "carry forward the previous value". A literal zero is
/// indistinguishable from no input and is normalised to `None`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeasurementInput {
    pub weight_kg: Option<f64>,
    pub waist_cm: Option<f64>,
    pub neck_cm: Option<f64>,
}

impl MeasurementInput {
    /// Build input from plain numbers, treating `0` as "reuse previous"
    pub fn from_values(weight_kg: f64, waist_cm: f64, neck_cm: f64) -> Self {
        Self {
            weight_kg: non_zero(weight_kg),
            waist_cm: non_zero(waist_cm),
            neck_cm: non_zero(neck_cm),
        }
    }

    /// Build input from optional numbers, treating `Some(0)` as `None`
    pub fn from_options(
        weight_kg: Option<f64>,
        waist_cm: Option<f64>,
        neck_cm: Option<f64>,
    ) -> Self {
        Self {
            weight_kg: weight_kg.and_then(non_zero),
            waist_cm: waist_cm.and_then(non_zero),
            neck_cm: neck_cm.and_then(non_zero),
        }
    }
}

fn non_zero(value: f64) -> Option<f64> {
    if value == 0.0 {
        None
    } else {
        Some(value)
    }
}

/// Parse one typed-in field.
///
/// Empty text and `0` both mean "carry forward". Anything else must be a
/// finite number; negative numbers are passed through and rejected later
/// by validation.
pub fn parse_field(label: &str, text: &str) -> Result<Option<f64>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    let value: f64 = text.parse().map_err(|_| {
        Error::InvalidMeasurement(format!("{} must be a number, got '{}'", label, text))
    })?;

    if !value.is_finite() {
        return Err(Error::InvalidMeasurement(format!(
            "{} must be a finite number, got '{}'",
            label, text
        )));
    }

    Ok(non_zero(value))
}

// ============================================================================
// Metrics
// ============================================================================

/// A plottable series of the log
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Weight,
    Waist,
    BodyFat,
}

impl Metric {
    /// Axis label including the unit
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Weight => "Weight (kg)",
            Metric::Waist => "Waist (cm)",
            Metric::BodyFat => "Body Fat (%)",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::Weight => "weight",
            Metric::Waist => "waist",
            Metric::BodyFat => "fat",
        };
        f.write_str(name)
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "weight" | "w" => Ok(Metric::Weight),
            "waist" | "a" => Ok(Metric::Waist),
            "fat" | "f" | "bodyfat" | "body_fat" | "fat_pct" => Ok(Metric::BodyFat),
            _ => Err(Error::UnknownMetric(s.trim().to_string())),
        }
    }
}

// ============================================================================
// Policies
// ============================================================================

/// What to do when a new entry's date is already present in the log
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Refuse the append, leaving the log untouched
    #[default]
    Reject,
    /// Replace the existing row(s) for that date with the new entry
    Overwrite,
}

/// Parse a `YYYY-MM-DD` date as typed by the user
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, crate::DATE_FORMAT)
        .map_err(|e| Error::InvalidDate(format!("'{}' is not YYYY-MM-DD ({})", text, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_means_carry_forward() {
        let input = MeasurementInput::from_values(0.0, 85.0, 0.0);
        assert_eq!(input.weight_kg, None);
        assert_eq!(input.waist_cm, Some(85.0));
        assert_eq!(input.neck_cm, None);
    }

    #[test]
    fn test_parse_field() {
        assert_eq!(parse_field("Weight", "").unwrap(), None);
        assert_eq!(parse_field("Weight", "   ").unwrap(), None);
        assert_eq!(parse_field("Weight", "0").unwrap(), None);
        assert_eq!(parse_field("Weight", "0.0").unwrap(), None);
        assert_eq!(parse_field("Weight", " 71.5 ").unwrap(), Some(71.5));
        assert_eq!(parse_field("Weight", "-3").unwrap(), Some(-3.0));
    }

    #[test]
    fn test_parse_field_rejects_garbage() {
        let err = parse_field("Weight", "abc").unwrap_err();
        assert!(matches!(err, Error::InvalidMeasurement(_)));
        assert!(err.to_string().contains("Weight must be a number"));

        assert!(parse_field("Neck", "inf").is_err());
        assert!(parse_field("Neck", "NaN").is_err());
    }

    #[test]
    fn test_metric_parsing_and_labels() {
        assert_eq!("weight".parse::<Metric>().unwrap(), Metric::Weight);
        assert_eq!("Waist".parse::<Metric>().unwrap(), Metric::Waist);
        assert_eq!("body_fat".parse::<Metric>().unwrap(), Metric::BodyFat);
        assert_eq!("f".parse::<Metric>().unwrap(), Metric::BodyFat);
        assert!("hips".parse::<Metric>().is_err());
        assert_eq!(Metric::BodyFat.label(), "Body Fat (%)");
    }

    #[test]
    fn test_parse_date() {
        let date = parse_date("2024-02-29").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert!(matches!(parse_date("2023-02-29"), Err(Error::InvalidDate(_))));
        assert!(parse_date("yesterday").is_err());
    }
}
