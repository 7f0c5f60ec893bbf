//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tabsweep_janitor::JanitorConfig;

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Timestamp store; a `.json` extension selects the JSON file backend,
    /// anything else SQLite
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// JSON array of the live tabs
    #[serde(default = "default_tabs_file")]
    pub tabs_file: PathBuf,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// Sweep schedule and badge
    #[serde(default)]
    pub janitor: JanitorConfig,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
}

impl Config {
    /// Directory holding the default config, database and tabs file.
    pub fn home() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".tabsweep"))
    }

    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        Ok(Self::home()?.join("config.toml"))
    }

    /// Load from `path`, or from the default location when `None`.
    ///
    /// A missing default file yields the defaults; a missing explicit file
    /// is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load_from(path)?,
            None => {
                let path = Self::path()?;
                if path.exists() {
                    Self::load_from(&path)?
                } else {
                    tracing::debug!("No config at {}, using defaults", path.display());
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Check the janitor table.
    pub fn validate(&self) -> Result<()> {
        self.janitor
            .validate()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            tabs_file: default_tabs_file(),
            settings: Settings::default(),
            janitor: JanitorConfig::default(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_dir() -> PathBuf {
    Config::home().unwrap_or_else(|_| PathBuf::from("."))
}

fn default_database() -> PathBuf {
    default_dir().join("tabsweep.db")
}

fn default_tabs_file() -> PathBuf {
    default_dir().join("tabs.json")
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}
