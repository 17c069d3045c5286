//! Interactive menu loop.
//!
//! Recoverable errors (bad input, storage failures) are reported and the
//! loop continues; only a failure to write to the terminal ends it.

use crate::prompt::{ask, TerminalSource};
use bodylog_core::chart::{self, ChartOptions};
use bodylog_core::{parse_date, EntryRegistrar, Metric, Result};
use chrono::NaiveDate;
use std::io::{BufRead, Write};

/// Run the menu until the user exits or input ends
pub fn run<R: BufRead, W: Write>(
    registrar: &EntryRegistrar,
    input: &mut R,
    output: &mut W,
    today: NaiveDate,
    chart_options: ChartOptions,
) -> Result<()> {
    loop {
        writeln!(output, "\n=== Weight Tracker ===")?;
        writeln!(output, "1. Register a new entry")?;
        writeln!(output, "2. View progress graph")?;
        writeln!(output, "3. Delete entry by date")?;
        writeln!(output, "4. Exit")?;

        let choice = match ask(input, output, "Choose an option: ")? {
            Some(choice) => choice,
            None => {
                writeln!(output, "\nGoodbye!")?;
                return Ok(());
            }
        };

        match choice.trim() {
            "1" => register_entry(registrar, input, output, today)?,
            "2" => show_progress(registrar, input, output, chart_options)?,
            "3" => delete_entry(registrar, input, output)?,
            "4" => {
                writeln!(output, "Goodbye!")?;
                return Ok(());
            }
            _ => writeln!(output, "Invalid option. Try again.")?,
        }
    }
}

fn register_entry<R: BufRead, W: Write>(
    registrar: &EntryRegistrar,
    input: &mut R,
    output: &mut W,
    today: NaiveDate,
) -> Result<()> {
    let result = {
        let mut source = TerminalSource::new(input, output);
        registrar.register(&mut source, today)
    };

    match result {
        Ok(entry) => {
            if entry.replaced {
                writeln!(output, "Replaced the existing entry for {}.", entry.record.date)?;
            }
            writeln!(
                output,
                "Entry saved for {}. Body fat: {:.2}%",
                entry.record.date, entry.record.fat_pct
            )?;
        }
        Err(e) if e.is_storage_failure() => {
            tracing::warn!("Registration failed: {:?}", e);
            writeln!(output, "Error saving entry: {}", e)?;
        }
        Err(e) => writeln!(output, "Error: {}", e)?,
    }
    Ok(())
}

fn show_progress<R: BufRead, W: Write>(
    registrar: &EntryRegistrar,
    input: &mut R,
    output: &mut W,
    options: ChartOptions,
) -> Result<()> {
    let records = match registrar.log().read_chronological() {
        Ok(records) => records,
        Err(e) => {
            writeln!(output, "Error reading log: {}", e)?;
            return Ok(());
        }
    };

    let mut metric = Metric::Weight;
    loop {
        match chart::render(&records, metric, &options) {
            Some(rendered) => write!(output, "\n{}", rendered)?,
            None => {
                writeln!(output, "No data to display.")?;
                return Ok(());
            }
        }

        let answer = ask(
            input,
            output,
            "Switch metric: [w]eight, w[a]ist, [f]at (Enter to return): ",
        )?;
        let answer = match answer {
            Some(answer) if !answer.trim().is_empty() => answer,
            _ => return Ok(()),
        };

        match answer.parse::<Metric>() {
            Ok(selected) => metric = selected,
            Err(e) => writeln!(output, "{}", e)?,
        }
    }
}

fn delete_entry<R: BufRead, W: Write>(
    registrar: &EntryRegistrar,
    input: &mut R,
    output: &mut W,
) -> Result<()> {
    let text = match ask(input, output, "Enter the date to delete (YYYY-MM-DD): ")? {
        Some(text) => text,
        None => return Ok(()),
    };

    let date = match parse_date(&text) {
        Ok(date) => date,
        Err(e) => {
            writeln!(output, "Error: {}", e)?;
            return Ok(());
        }
    };

    match registrar.log().delete_by_date(date) {
        Ok(0) => writeln!(output, "No entry found for {}.", date)?,
        Ok(_) => writeln!(output, "Entry with date {} has been deleted.", date)?,
        Err(e) => writeln!(output, "Error deleting entry: {}", e)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bodylog_core::MeasurementLog;
    use std::io::Cursor;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 10).unwrap()
    }

    fn run_with(registrar: &EntryRegistrar, script: &str) -> String {
        let mut input = Cursor::new(script.to_string());
        let mut output = Vec::new();
        run(
            registrar,
            &mut input,
            &mut output,
            today(),
            ChartOptions::new(20, 5),
        )
        .unwrap();
        String::from_utf8(output).unwrap()
    }

    fn setup() -> (tempfile::TempDir, EntryRegistrar) {
        let temp_dir = tempfile::tempdir().unwrap();
        let log = MeasurementLog::new(temp_dir.path().join("weight_log.csv"));
        (temp_dir, EntryRegistrar::new(log, 178.0))
    }

    #[test]
    fn test_exit_and_eof() {
        let (_dir, registrar) = setup();
        assert!(run_with(&registrar, "4\n").ends_with("Goodbye!\n"));
        assert!(run_with(&registrar, "").ends_with("Goodbye!\n"));
    }

    #[test]
    fn test_invalid_option() {
        let (_dir, registrar) = setup();
        let out = run_with(&registrar, "9\n4\n");
        assert!(out.contains("Invalid option. Try again."));
    }

    #[test]
    fn test_register_then_carry_forward() {
        let (_dir, registrar) = setup();
        let out = run_with(&registrar, "1\n70\n85\n35\n1\n0\n\n\n4\n");

        assert!(out.contains("Entry saved for 2024-04-10. Body fat: 18.80%"));
        assert!(out.contains("Weight (kg) [70.0]: "));
        assert!(out.contains("Entry saved for 2024-04-11. Body fat: 18.80%"));

        let all = registrar.log().read_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].weight_kg, 70.0);
    }

    #[test]
    fn test_invalid_registration_returns_to_menu() {
        let (_dir, registrar) = setup();
        let out = run_with(&registrar, "1\n70\n30\n35\n4\n");

        assert!(out.contains("Error: Invalid measurement"));
        assert!(out.ends_with("Goodbye!\n"));
        assert!(!registrar.log().path().exists());
    }

    #[test]
    fn test_delete_by_date() {
        let (_dir, registrar) = setup();
        let out = run_with(&registrar, "1\n70\n85\n35\n3\n2024-04-10\n3\n2024-04-10\n3\nnot-a-date\n4\n");

        assert!(out.contains("Entry with date 2024-04-10 has been deleted."));
        assert!(out.contains("No entry found for 2024-04-10."));
        assert!(out.contains("Error: Invalid date"));
        assert!(registrar.log().read_all().unwrap().is_empty());
    }

    #[test]
    fn test_progress_graph_switches_metric() {
        let (_dir, registrar) = setup();
        let out = run_with(&registrar, "2\n1\n70\n85\n35\n1\n72\n88\n0\n2\nf\nhips\n\n4\n");

        assert!(out.contains("No data to display."));
        assert!(out.contains("Progress of Weight (kg)"));
        assert!(out.contains("Progress of Body Fat (%)"));
        assert!(out.contains("Unknown metric 'hips'"));
    }
}
