//! Registration of a new day's measurement.
//!
//! One registration:
//! 1. Reads the log: the last appended record seeds the defaults, the
//!    latest date decides the next one
//! 2. Asks a [`MeasurementSource`] for candidate values
//! 3. Resolves carry-forward and validates
//! 4. Computes body fat and appends the record
//!
//! Value resolution is a pure function so it can be tested without a
//! terminal; the source is the only part that talks to the user.

use crate::{
    body_fat_percentage, Config, DuplicatePolicy, Error, MeasurementInput, MeasurementLog,
    MeasurementRecord, Result,
};
use chrono::NaiveDate;

/// Supplies candidate values for a new entry
pub trait MeasurementSource {
    /// `previous` is the last recorded entry, shown to the user as defaults
    fn provide(&mut self, previous: Option<&MeasurementRecord>) -> Result<MeasurementInput>;
}

/// Fixed, programmatic input
impl MeasurementSource for MeasurementInput {
    fn provide(&mut self, _previous: Option<&MeasurementRecord>) -> Result<MeasurementInput> {
        Ok(self.clone())
    }
}

/// Measurements after carry-forward, all validated positive
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedMeasurement {
    pub weight_kg: f64,
    pub waist_cm: f64,
    pub neck_cm: f64,
}

/// Outcome of a successful registration
#[derive(Clone, Debug, PartialEq)]
pub struct RegisteredEntry {
    pub record: MeasurementRecord,
    /// True if an existing entry for the same date was overwritten
    pub replaced: bool,
}

/// Apply carry-forward and validate each field.
///
/// A missing field takes the previous record's value. Every field must end
/// up positive and the waist must exceed the neck.
pub fn resolve(
    input: &MeasurementInput,
    previous: Option<&MeasurementRecord>,
) -> Result<ResolvedMeasurement> {
    let weight_kg = resolve_field("weight", input.weight_kg, previous.map(|p| p.weight_kg))?;
    let waist_cm = resolve_field("waist", input.waist_cm, previous.map(|p| p.waist_cm))?;
    let neck_cm = resolve_field("neck", input.neck_cm, previous.map(|p| p.neck_cm))?;

    if waist_cm <= neck_cm {
        return Err(Error::InvalidMeasurement(format!(
            "waist ({}) must be larger than neck ({})",
            waist_cm, neck_cm
        )));
    }

    Ok(ResolvedMeasurement {
        weight_kg,
        waist_cm,
        neck_cm,
    })
}

fn resolve_field(name: &str, given: Option<f64>, previous: Option<f64>) -> Result<f64> {
    let value = given.or(previous).ok_or_else(|| {
        Error::InvalidMeasurement(format!(
            "no {} given and no previous entry to reuse",
            name
        ))
    })?;

    if !value.is_finite() || value <= 0.0 {
        return Err(Error::InvalidMeasurement(format!(
            "{} must be positive, got {}",
            name, value
        )));
    }
    Ok(value)
}

/// The day after `latest`, or `today` when there is no history.
///
/// `latest` is the entry with the greatest date, which is not always the
/// last one appended once earlier days have been backfilled.
pub fn next_entry_date(
    latest: Option<&MeasurementRecord>,
    today: NaiveDate,
) -> Result<NaiveDate> {
    match latest {
        Some(last) => last
            .date
            .succ_opt()
            .ok_or_else(|| Error::InvalidDate(format!("no day after {}", last.date))),
        None => Ok(today),
    }
}

/// Orchestrates one "register a measurement" transaction
#[derive(Clone, Debug)]
pub struct EntryRegistrar {
    log: MeasurementLog,
    height_cm: f64,
    policy: DuplicatePolicy,
}

impl EntryRegistrar {
    pub fn new(log: MeasurementLog, height_cm: f64) -> Self {
        Self {
            log,
            height_cm,
            policy: DuplicatePolicy::default(),
        }
    }

    /// Registrar using the configured log path, height and duplicate policy
    pub fn from_config(config: &Config) -> Self {
        Self::new(MeasurementLog::new(config.log_path()), config.body.height_cm)
            .with_policy(config.registration.on_duplicate_date)
    }

    pub fn with_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn log(&self) -> &MeasurementLog {
        &self.log
    }

    /// Register the day after the latest entry (or today's, on an empty log)
    pub fn register<S>(&self, source: &mut S, today: NaiveDate) -> Result<RegisteredEntry>
    where
        S: MeasurementSource + ?Sized,
    {
        let records = self.log.read_all()?;
        let previous = records.last();
        let latest = records.iter().max_by_key(|record| record.date);
        let date = next_entry_date(latest, today)?;
        let input = source.provide(previous)?;
        self.commit(date, &input, previous)
    }

    /// Register an entry for an explicit date, still carrying forward from
    /// the last recorded entry
    pub fn register_on<S>(&self, source: &mut S, date: NaiveDate) -> Result<RegisteredEntry>
    where
        S: MeasurementSource + ?Sized,
    {
        let previous = self.log.read_last()?;
        let input = source.provide(previous.as_ref())?;
        self.commit(date, &input, previous.as_ref())
    }

    fn commit(
        &self,
        date: NaiveDate,
        input: &MeasurementInput,
        previous: Option<&MeasurementRecord>,
    ) -> Result<RegisteredEntry> {
        let resolved = resolve(input, previous)?;
        let fat_pct = body_fat_percentage(self.height_cm, resolved.neck_cm, resolved.waist_cm)?;

        let record = MeasurementRecord {
            date,
            weight_kg: resolved.weight_kg,
            waist_cm: resolved.waist_cm,
            neck_cm: resolved.neck_cm,
            fat_pct,
        };

        let replaced = match self.policy {
            DuplicatePolicy::Reject => {
                self.log.append(&record)?;
                false
            }
            DuplicatePolicy::Overwrite => self.log.replace(&record)? > 0,
        };

        tracing::info!(
            "Registered entry for {} (fat {:.2}%{})",
            record.date,
            record.fat_pct,
            if replaced { ", replaced existing" } else { "" }
        );

        Ok(RegisteredEntry { record, replaced })
    }
}
