#![forbid(unsafe_code)]

//! Core domain model and business logic for bodylog.
//!
//! This crate provides:
//! - Domain types (measurement records, input, metrics)
//! - Body-fat estimation
//! - The CSV-backed measurement log
//! - Entry registration with carry-forward defaults
//! - Text charts of a metric over time

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod formula;
pub mod log_store;
pub mod registrar;
pub mod chart;

/// Date format used in the log file and on the command line
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use formula::body_fat_percentage;
pub use log_store::MeasurementLog;
pub use registrar::{EntryRegistrar, MeasurementSource, RegisteredEntry};
pub use chart::ChartOptions;
