//! Configuration file support for bodylog.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/bodylog/config.toml`.

use crate::{DuplicatePolicy, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub body: BodyConfig,

    #[serde(default)]
    pub registration: RegistrationConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_file")]
    pub log_file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_file: default_log_file(),
        }
    }
}

/// Body constants used by the body-fat formula
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BodyConfig {
    #[serde(default = "default_height_cm")]
    pub height_cm: f64,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            height_cm: default_height_cm(),
        }
    }
}

/// Entry registration behaviour
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct RegistrationConfig {
    #[serde(default)]
    pub on_duplicate_date: DuplicatePolicy,
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("bodylog")
}

fn default_log_file() -> String {
    "weight_log.csv".into()
}

fn default_height_cm() -> f64 {
    178.0
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("bodylog").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Reject values the formula or the store cannot work with
    pub fn validate(&self) -> Result<()> {
        let height = self.body.height_cm;
        if !height.is_finite() || height <= 0.0 {
            return Err(Error::Config(format!(
                "body.height_cm must be a positive number, got {}",
                height
            )));
        }
        if self.data.log_file.trim().is_empty() {
            return Err(Error::Config("data.log_file must not be empty".into()));
        }
        Ok(())
    }

    /// Full path of the measurement log
    pub fn log_path(&self) -> PathBuf {
        self.data.data_dir.join(&self.data.log_file)
    }
}
