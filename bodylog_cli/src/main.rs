mod menu;
mod prompt;

use bodylog_core::chart::{self, ChartOptions};
use bodylog_core::*;
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bodylog")]
#[command(about = "Body-composition tracker: weight, waist, neck and estimated body fat", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the height (cm) used for body-fat estimation
    #[arg(long, global = true)]
    height_cm: Option<f64>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive menu (default)
    Menu,

    /// Register the next entry without prompting
    Add {
        /// Weight in kg (omit or 0 to reuse the last value)
        #[arg(long)]
        weight: Option<f64>,

        /// Waist in cm (omit or 0 to reuse the last value)
        #[arg(long)]
        waist: Option<f64>,

        /// Neck in cm (omit or 0 to reuse the last value)
        #[arg(long)]
        neck: Option<f64>,

        /// Record for this date (YYYY-MM-DD) instead of the day after the last entry
        #[arg(long)]
        date: Option<String>,
    },

    /// Delete the entry for a date (YYYY-MM-DD)
    Delete { date: String },

    /// List all entries by date
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Plot one metric over time
    Chart {
        /// weight, waist or fat
        #[arg(long, default_value = "weight")]
        metric: Metric,

        /// Plot width in columns
        #[arg(long, default_value_t = 60)]
        width: usize,

        /// Plot height in rows
        #[arg(long, default_value_t = 15)]
        height: usize,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        bodylog_core::logging::init_with_level("debug");
    } else {
        bodylog_core::logging::init();
    }

    if let Err(e) = run(cli) {
        tracing::debug!("Command failed: {:?}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(data_dir) = cli.data_dir {
        config.data.data_dir = data_dir;
    }
    if let Some(height_cm) = cli.height_cm {
        config.body.height_cm = height_cm;
    }
    config.validate()?;

    let registrar = EntryRegistrar::from_config(&config);
    tracing::debug!("Using log at {:?}", registrar.log().path());

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => cmd_menu(&registrar),
        Commands::Add {
            weight,
            waist,
            neck,
            date,
        } => cmd_add(&registrar, weight, waist, neck, date),
        Commands::Delete { date } => cmd_delete(&registrar, &date),
        Commands::List { json } => cmd_list(&registrar, json),
        Commands::Chart {
            metric,
            width,
            height,
        } => cmd_chart(&registrar, metric, ChartOptions::new(width, height)),
    }
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

fn cmd_menu(registrar: &EntryRegistrar) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut input = stdin.lock();
    let mut output = stdout.lock();
    menu::run(
        registrar,
        &mut input,
        &mut output,
        today(),
        ChartOptions::default(),
    )
}

fn cmd_add(
    registrar: &EntryRegistrar,
    weight: Option<f64>,
    waist: Option<f64>,
    neck: Option<f64>,
    date: Option<String>,
) -> Result<()> {
    let mut input = MeasurementInput::from_options(weight, waist, neck);

    let entry = match date {
        Some(date) => registrar.register_on(&mut input, parse_date(&date)?)?,
        None => registrar.register(&mut input, today())?,
    };

    if entry.replaced {
        println!("Replaced the existing entry for {}.", entry.record.date);
    }
    println!(
        "Entry saved for {}. Body fat: {:.2}%",
        entry.record.date, entry.record.fat_pct
    );
    Ok(())
}

fn cmd_delete(registrar: &EntryRegistrar, date: &str) -> Result<()> {
    let date = parse_date(date)?;
    match registrar.log().delete_by_date(date)? {
        0 => println!("No entry found for {}.", date),
        _ => println!("Entry with date {} has been deleted.", date),
    }
    Ok(())
}

fn cmd_list(registrar: &EntryRegistrar, json: bool) -> Result<()> {
    let records = registrar.log().read_chronological()?;

    if json {
        let out = serde_json::to_string_pretty(&records).map_err(io::Error::from)?;
        println!("{}", out);
        return Ok(());
    }

    if records.is_empty() {
        println!("No entries yet.");
        return Ok(());
    }

    println!(
        "{:<10}  {:>8}  {:>8}  {:>8}  {:>7}",
        "date", "weight", "waist", "neck", "fat_pct"
    );
    for record in &records {
        println!(
            "{:<10}  {:>8.1}  {:>8.1}  {:>8.1}  {:>7.2}",
            record.date.format(DATE_FORMAT).to_string(),
            record.weight_kg,
            record.waist_cm,
            record.neck_cm,
            record.fat_pct
        );
    }
    Ok(())
}

fn cmd_chart(registrar: &EntryRegistrar, metric: Metric, options: ChartOptions) -> Result<()> {
    let records = registrar.log().read_chronological()?;
    tracing::debug!("Rendering {} chart from {} records", metric, records.len());

    match chart::render(&records, metric, &options) {
        Some(rendered) => print!("{}", rendered),
        None => println!("No data to display."),
    }
    Ok(())
}
