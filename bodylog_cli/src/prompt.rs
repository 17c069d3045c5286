//! Line-based prompting over any reader/writer pair.

use bodylog_core::{parse_field, MeasurementInput, MeasurementRecord, MeasurementSource, Result};
use std::io::{self, BufRead, Write};

/// Print `prompt` and read one line.
///
/// Returns `None` at end of input.
pub fn ask<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> io::Result<Option<String>> {
    write!(output, "{}", prompt)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Asks for weight, waist and neck, showing the last values as defaults
pub struct TerminalSource<'a, R, W> {
    input: &'a mut R,
    output: &'a mut W,
}

impl<'a, R: BufRead, W: Write> TerminalSource<'a, R, W> {
    pub fn new(input: &'a mut R, output: &'a mut W) -> Self {
        Self { input, output }
    }

    fn field(&mut self, label: &str, unit: &str, default: Option<f64>) -> Result<Option<f64>> {
        let shown = default.map(|v| format!("{:?}", v)).unwrap_or_default();
        let prompt = format!("{} ({}) [{}]: ", label, unit, shown);
        // End of input counts as "no value", i.e. carry forward
        let text = ask(&mut *self.input, &mut *self.output, &prompt)?.unwrap_or_default();
        parse_field(label, &text)
    }
}

impl<R: BufRead, W: Write> MeasurementSource for TerminalSource<'_, R, W> {
    fn provide(&mut self, previous: Option<&MeasurementRecord>) -> Result<MeasurementInput> {
        writeln!(
            self.output,
            "Enter your daily measurements. Enter 0 to reuse the last recorded value (if available)."
        )?;

        let weight_kg = self.field("Weight", "kg", previous.map(|p| p.weight_kg))?;
        let waist_cm = self.field("Waist", "cm", previous.map(|p| p.waist_cm))?;
        let neck_cm = self.field("Neck", "cm", previous.map(|p| p.neck_cm))?;

        Ok(MeasurementInput {
            weight_kg,
            waist_cm,
            neck_cm,
        })
    }
}
