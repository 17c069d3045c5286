//! Measurement log persistence.
//!
//! All records live in one CSV file with the header
//! `date,weight,waist,neck,fat_pct`. Rows are appended in registration
//! order; deletions rewrite the file through a temp file and an atomic
//! rename so a failed write never leaves a truncated log behind.
//!
//! A missing file, an empty file and a file holding only whitespace are all
//! the same thing: an empty log.

use crate::{Error, MeasurementRecord, Result, DATE_FORMAT};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Column names, in file order
pub const HEADER: [&str; 5] = ["date", "weight", "waist", "neck", "fat_pct"];

/// A row as written to disk
#[derive(Debug, Serialize)]
struct WriteRow {
    date: String,
    weight: f64,
    waist: f64,
    neck: f64,
    fat_pct: String,
}

impl From<&MeasurementRecord> for WriteRow {
    fn from(record: &MeasurementRecord) -> Self {
        WriteRow {
            date: record.date.format(DATE_FORMAT).to_string(),
            weight: record.weight_kg,
            waist: record.waist_cm,
            neck: record.neck_cm,
            fat_pct: format!("{:.2}", record.fat_pct),
        }
    }
}

/// A row as read back from disk
#[derive(Debug, Deserialize)]
struct ReadRow {
    date: String,
    weight: f64,
    waist: f64,
    neck: f64,
    fat_pct: f64,
}

impl TryFrom<ReadRow> for MeasurementRecord {
    type Error = Error;

    fn try_from(row: ReadRow) -> Result<Self> {
        let date = NaiveDate::parse_from_str(&row.date, DATE_FORMAT)
            .map_err(|e| Error::InvalidDate(format!("'{}': {}", row.date, e)))?;

        Ok(MeasurementRecord {
            date,
            weight_kg: row.weight,
            waist_cm: row.waist,
            neck_cm: row.neck,
            fat_pct: row.fat_pct,
        })
    }
}

/// CSV-backed store of measurement records
#[derive(Clone, Debug)]
pub struct MeasurementLog {
    path: PathBuf,
}

impl MeasurementLog {
    /// Create a log handle for the given path. Nothing is touched on disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Most recently appended record, or `None` for an empty log
    pub fn read_last(&self) -> Result<Option<MeasurementRecord>> {
        Ok(self.read_all()?.pop())
    }

    /// All records in physical (insertion) order
    pub fn read_all(&self) -> Result<Vec<MeasurementRecord>> {
        let content = match self.read_content()? {
            Some(content) => content,
            None => return Ok(Vec::new()),
        };

        let records = parse_records(&content, &self.path)?;
        tracing::debug!("Read {} records from {:?}", records.len(), self.path);
        Ok(records)
    }

    /// All records ordered by a caller-supplied key (stable for equal keys)
    pub fn read_all_sorted_by<K, F>(&self, key: F) -> Result<Vec<MeasurementRecord>>
    where
        K: Ord,
        F: FnMut(&MeasurementRecord) -> K,
    {
        let mut records = self.read_all()?;
        records.sort_by_key(key);
        Ok(records)
    }

    /// All records, oldest date first
    pub fn read_chronological(&self) -> Result<Vec<MeasurementRecord>> {
        self.read_all_sorted_by(|record| record.date)
    }

    /// Whether any row carries the given date
    pub fn contains_date(&self, date: NaiveDate) -> Result<bool> {
        Ok(self.read_all()?.iter().any(|record| record.date == date))
    }

    /// Append one record, writing the header first if the log is empty.
    ///
    /// Fails with [`Error::DuplicateDate`] if the date is already present
    /// and with [`Error::InvalidMeasurement`] if the record breaks the
    /// record invariants. In both cases the file is left untouched.
    pub fn append(&self, record: &MeasurementRecord) -> Result<()> {
        check_record(record)?;
        self.ensure_parent_dir()?;

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)?;

        // Acquire exclusive lock
        file.lock_exclusive()?;
        let result = append_locked(&mut file, record, &self.path);
        let unlocked = file.unlock();
        result?;
        unlocked?;

        tracing::debug!("Appended entry for {} to {:?}", record.date, self.path);
        Ok(())
    }

    /// Remove every row dated `date`, keeping the header and the order of
    /// all other rows. Returns the number of rows removed; a date that is
    /// not present is a no-op.
    pub fn delete_by_date(&self, date: NaiveDate) -> Result<usize> {
        let removed = self.rewrite_without(date, None)?;
        if removed > 0 {
            tracing::info!("Deleted {} row(s) dated {} from {:?}", removed, date, self.path);
        } else {
            tracing::debug!("No row dated {} in {:?}", date, self.path);
        }
        Ok(removed)
    }

    /// Replace any rows carrying the record's date with the record itself,
    /// in a single atomic rewrite. The record takes the position of the
    /// first matching row, or goes last if none matched. Returns the number
    /// of rows replaced.
    pub fn replace(&self, record: &MeasurementRecord) -> Result<usize> {
        check_record(record)?;
        let replaced = self.rewrite_without(record.date, Some(record))?;
        tracing::debug!(
            "Replaced {} row(s) dated {} in {:?}",
            replaced,
            record.date,
            self.path
        );
        Ok(replaced)
    }

    /// Read the whole file under a shared lock.
    ///
    /// Returns `None` when the file is missing or holds only whitespace.
    fn read_content(&self) -> Result<Option<String>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No log file at {:?}, treating as empty", self.path);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        // Acquire shared lock for reading
        file.lock_shared()?;
        let mut content = String::new();
        let read = (&file).read_to_string(&mut content);
        file.unlock()?;
        read?;

        if content.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(content))
        }
    }

    /// Rewrite the log without rows dated `date`, optionally putting
    /// `replacement` in place of the first of them.
    fn rewrite_without(
        &self,
        date: NaiveDate,
        replacement: Option<&MeasurementRecord>,
    ) -> Result<usize> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return match replacement {
                    Some(record) => self.append(record).map(|_| 0),
                    None => Ok(0),
                };
            }
            Err(e) => return Err(e.into()),
        };

        file.lock_exclusive()?;
        let result = self.rewrite_locked(&file, date, replacement);
        let unlocked = file.unlock();
        let removed = result?;
        unlocked?;
        Ok(removed)
    }

    fn rewrite_locked(
        &self,
        file: &File,
        date: NaiveDate,
        replacement: Option<&MeasurementRecord>,
    ) -> Result<usize> {
        let mut content = String::new();
        let mut reader = file;
        reader.read_to_string(&mut content)?;

        let mut rows = if content.trim().is_empty() {
            Vec::new()
        } else {
            check_header(&content)?;
            raw_rows(&content)?
        };

        let header = if rows.is_empty() {
            None
        } else {
            Some(rows.remove(0))
        };
        let removed = rows.iter().filter(|row| row_has_date(row, date)).count();

        if removed == 0 && replacement.is_none() {
            return Ok(0);
        }

        // Create unique temp file in the same directory for atomic rename
        let temp = NamedTempFile::new_in(self.parent_dir())?;
        {
            let mut writer = WriterBuilder::new()
                .has_headers(false)
                .flexible(true)
                .from_writer(temp.as_file());

            match &header {
                Some(header) => writer.write_record(header)?,
                None => writer.write_record(HEADER)?,
            }
            let mut pending = replacement;
            for row in &rows {
                if !row_has_date(row, date) {
                    writer.write_record(row)?;
                } else if let Some(record) = pending.take() {
                    writer.serialize(WriteRow::from(record))?;
                }
            }
            if let Some(record) = pending {
                writer.serialize(WriteRow::from(record))?;
            }
            writer.flush()?;
        }
        temp.as_file().sync_all()?;

        // Atomically replace the old log
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;
        Ok(removed)
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        std::fs::create_dir_all(self.parent_dir())?;
        Ok(())
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

fn append_locked(file: &mut File, record: &MeasurementRecord, path: &Path) -> Result<()> {
    let mut content = String::new();
    file.read_to_string(&mut content)?;

    let needs_header = content.trim().is_empty();
    if needs_header {
        // Whitespace left behind by an interrupted write
        if !content.is_empty() {
            file.set_len(0)?;
        }
    } else {
        let existing = parse_records(&content, path)?;
        if existing.iter().any(|r| r.date == record.date) {
            return Err(Error::DuplicateDate(record.date));
        }
        // A crash mid-row leaves no trailing newline
        if !content.ends_with('\n') {
            file.write_all(b"\n")?;
        }
    }

    let mut writer = WriterBuilder::new()
        .has_headers(needs_header)
        .from_writer(&*file);
    writer.serialize(WriteRow::from(record))?;
    writer.flush()?;
    drop(writer);

    file.sync_all()?;
    Ok(())
}

fn check_record(record: &MeasurementRecord) -> Result<()> {
    let fields = [
        ("weight", record.weight_kg),
        ("waist", record.waist_cm),
        ("neck", record.neck_cm),
        ("fat_pct", record.fat_pct),
    ];
    for (name, value) in fields {
        if !value.is_finite() {
            return Err(Error::InvalidMeasurement(format!(
                "{} must be a finite number",
                name
            )));
        }
    }
    for (name, value) in &fields[..3] {
        if *value <= 0.0 {
            return Err(Error::InvalidMeasurement(format!(
                "{} must be positive",
                name
            )));
        }
    }
    if record.waist_cm <= record.neck_cm {
        return Err(Error::InvalidMeasurement(
            "Waist must be larger than neck for valid calculation.".into(),
        ));
    }
    Ok(())
}

fn check_header(content: &str) -> Result<()> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());
    let headers = reader.headers()?;

    if headers.iter().ne(HEADER.iter().copied()) {
        return Err(Error::CorruptLog(format!(
            "unexpected header '{}', expected '{}'",
            headers.iter().collect::<Vec<_>>().join(","),
            HEADER.join(",")
        )));
    }
    Ok(())
}

fn parse_records(content: &str, path: &Path) -> Result<Vec<MeasurementRecord>> {
    check_header(content)?;

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let mut records = Vec::new();
    for (index, result) in reader.deserialize::<ReadRow>().enumerate() {
        // Data rows start on line 2
        let line = index + 2;
        match result {
            Ok(row) => match MeasurementRecord::try_from(row) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("Skipping row {} of {:?}: {}", line, path, e);
                }
            },
            Err(e) => {
                tracing::warn!("Skipping malformed row {} of {:?}: {}", line, path, e);
            }
        }
    }

    Ok(records)
}

/// Whether a raw row's date column names `date`.
///
/// Parsed the same way as [`parse_records`], so hand-edited dates such as
/// `2024-3-1` match the entry they read back as.
fn row_has_date(row: &StringRecord, date: NaiveDate) -> bool {
    row.get(0)
        .map(str::trim)
        .and_then(|field| NaiveDate::parse_from_str(field, DATE_FORMAT).ok())
        == Some(date)
}

/// Every record in the file, header included, without interpretation
fn raw_rows(content: &str) -> Result<Vec<StringRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for row in reader.records() {
        rows.push(row?);
    }
    Ok(rows)
}
