//! Configuration management for camctl
//!
//! Loads and saves the logging and probing options from a TOML file.

use crate::errors::{ControlError, ControlResult};
use crate::logging::{self, LogLevel, LoggingSession};
use crate::types::PropertyAddress;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CamCtlConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub probing: ProbingConfig,
}

/// Log sink configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum level delivered to the callback
    pub min_level: LogLevel,
    /// Install the built-in stdout/stderr sink
    pub stderr_sink: bool,
}

/// Capability probing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbingConfig {
    /// Also probe relative (motion) camera controls
    pub include_relative_controls: bool,
    /// Extra vendor addresses to probe, as `{GUID}#id`
    #[serde(default)]
    pub vendor_properties: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::DEFAULT,
            stderr_sink: true,
        }
    }
}

impl Default for ProbingConfig {
    fn default() -> Self {
        Self {
            include_relative_controls: true,
            vendor_properties: Vec::new(),
        }
    }
}

impl ProbingConfig {
    /// Parsed `vendor_properties`.
    pub fn vendor_addresses(&self) -> ControlResult<Vec<PropertyAddress>> {
        self.vendor_properties.iter().map(|s| s.parse()).collect()
    }
}

impl LoggingConfig {
    /// Apply to the process-wide log facility. Without the built-in sink only
    /// the level is set and no callback is installed.
    pub fn apply(&self) -> LoggingSession {
        let session = logging::init(logging::stderr_sink(), self.min_level);
        if !self.stderr_sink {
            logging::clear_log_callback();
        }
        session
    }
}

impl CamCtlConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> ControlResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            ControlError::invalid_argument(format!("Failed to read config file: {}", e))
        })?;

        let config: CamCtlConfig = toml::from_str(&contents).map_err(|e| {
            ControlError::invalid_argument(format!("Failed to parse config file: {}", e))
        })?;

        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> ControlResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ControlError::platform(format!("Failed to create config directory: {}", e))
            })?;
        }

        let toml_string = toml::to_string_pretty(self).map_err(|e| {
            ControlError::invalid_argument(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, toml_string)
            .map_err(|e| ControlError::platform(format!("Failed to write config file: {}", e)))?;

        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    pub fn default_path() -> PathBuf {
        PathBuf::from("camctl.toml")
    }

    /// Load from default location or fall back to defaults
    pub fn load_or_default() -> Self {
        Self::load_from_file(Self::default_path()).unwrap_or_else(|e| {
            log::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if let Err(e) = self.probing.vendor_addresses() {
            return Err(format!("Invalid vendor property address: {}", e.message()));
        }
        Ok(())
    }
}
