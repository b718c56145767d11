//! Configuration loader/writer plus strongly typed settings structures.
//!
//! Settings live in `~/.rig-panel/<profile>/config.toml`. The file is created
//! from the embedded default on first run and never overwritten afterwards.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::data::WidgetId;

pub mod panel_validator;

use panel_validator::ValidationResult;

// Embed default configuration at compile time
const DEFAULT_CONFIG: &str = include_str!("../defaults/config.toml");

/// Environment variable that overrides the base directory
pub const DIR_ENV_VAR: &str = "RIG_PANEL_DIR";

/// Top-level configuration object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub panel: PanelConfig,
    #[serde(skip)] // Set at runtime
    pub profile: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default = "default_port_name")]
    pub port_name: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    #[serde(default = "default_break_ms")]
    pub break_ms: u64, // Break (reset pulse) length
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize, // Console scrollback lines
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64, // Event poll timeout; bounds how long serial draining can wait
    #[serde(default)]
    pub show_timestamps: bool,
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    #[serde(default = "default_min_command_length")]
    pub min_command_length: usize, // Shorter text submissions are not saved to history
}

/// Declared widgets. Values at runtime live in `WidgetStore`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub reset_enable_default: bool,
    #[serde(default)]
    pub buttons: Vec<ButtonDef>,
    #[serde(default)]
    pub toggles: Vec<ToggleDef>,
    #[serde(default)]
    pub sliders: Vec<SliderDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonDef {
    pub id: WidgetId,
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToggleDef {
    pub id: WidgetId,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub default: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliderDef {
    pub id: WidgetId,
    #[serde(default)]
    pub label: String,
    pub min: i32,
    pub max: i32,
    pub default: i32,
    #[serde(default = "default_step")]
    pub step: i32,
}

fn default_port_name() -> String {
    if cfg!(windows) {
        "COM3".to_string()
    } else {
        "/dev/ttyUSB0".to_string()
    }
}

fn default_baud_rate() -> u32 {
    38400
}

fn default_break_ms() -> u64 {
    100
}

fn default_read_timeout_ms() -> u64 {
    2
}

fn default_buffer_size() -> usize {
    1000
}

fn default_poll_timeout_ms() -> u64 {
    2
}

fn default_max_history() -> usize {
    100
}

fn default_min_command_length() -> usize {
    1
}

fn default_title() -> String {
    "Motor Controls".to_string()
}

fn default_step() -> i32 {
    1
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            port_name: default_port_name(),
            baud_rate: default_baud_rate(),
            break_ms: default_break_ms(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

impl ConnectionConfig {
    pub fn break_duration(&self) -> Duration {
        Duration::from_millis(self.break_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            buffer_size: default_buffer_size(),
            poll_timeout_ms: default_poll_timeout_ms(),
            show_timestamps: false,
            max_history: default_max_history(),
            min_command_length: default_min_command_length(),
        }
    }
}

impl UiConfig {
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }
}

/// The reference rig: one momentary button, one mode switch, pan and tilt.
impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            reset_enable_default: false,
            buttons: vec![ButtonDef {
                id: 1,
                label: "Return to position".to_string(),
            }],
            toggles: vec![ToggleDef {
                id: 1,
                label: "Program position".to_string(),
                default: true,
            }],
            sliders: vec![
                SliderDef {
                    id: 1,
                    label: "Pan".to_string(),
                    min: 30000,
                    max: 90000,
                    default: 60000,
                    step: 500,
                },
                SliderDef {
                    id: 2,
                    label: "Tilt".to_string(),
                    min: 60000,
                    max: 90000,
                    default: 60000,
                    step: 500,
                },
            ],
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::default(),
            ui: UiConfig::default(),
            panel: PanelConfig::default(),
            profile: None,
        }
    }
}

impl Config {
    /// Parse a config from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse config")
    }

    /// Load config for a profile, extracting defaults on first run
    pub fn load_with_options(profile: Option<&str>) -> Result<Self> {
        Self::extract_defaults(profile)?;

        let config_path = Self::config_path(profile)?;
        let mut config = Self::load_file(&config_path)?;
        config.profile = profile.map(|s| s.to_string());
        Ok(config)
    }

    /// Load config from an explicit file
    pub fn load_from_path(path: &Path, profile: Option<&str>) -> Result<Self> {
        let mut config = Self::load_file(path)?;
        config.profile = profile.map(|s| s.to_string());
        Ok(config)
    }

    fn load_file(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).context(format!("Failed to read config file: {:?}", path))?;
        Self::from_toml(&contents).context(format!("Failed to parse config file: {:?}", path))
    }

    /// Apply command line overrides
    pub fn apply_overrides(&mut self, port_name: Option<&str>, baud_rate: Option<u32>) {
        if let Some(port_name) = port_name {
            self.connection.port_name = port_name.to_string();
        }
        if let Some(baud_rate) = baud_rate {
            self.connection.baud_rate = baud_rate;
        }
    }

    /// Validate the panel, auto-fix what can be fixed and log the rest.
    pub fn validate_and_fix(&mut self) -> ValidationResult {
        let validation = panel_validator::validate_panel(&self.panel);
        if validation.has_errors() {
            tracing::warn!("Panel validation found {} errors", validation.errors().len());
            for error in validation.errors() {
                tracing::warn!("  {}", error.message());
            }
        }
        if validation.has_warnings() {
            for warning in validation.warnings() {
                tracing::warn!("Panel warning: {}", warning.message());
            }
            let fixed = panel_validator::auto_fix_panel(&mut self.panel, &validation.issues);
            if fixed > 0 {
                tracing::info!("Auto-fixed {} panel issues", fixed);
            }
        }
        validation
    }

    /// Write the embedded default config if the profile has none yet
    fn extract_defaults(profile: Option<&str>) -> Result<()> {
        let config_path = Self::config_path(profile)?;
        if config_path.exists() {
            return Ok(());
        }

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .context(format!("Failed to create profile directory: {:?}", parent))?;
        }
        fs::write(&config_path, DEFAULT_CONFIG)
            .context(format!("Failed to write default config: {:?}", config_path))?;
        tracing::info!("Wrote default config to {:?}", config_path);
        Ok(())
    }

    /// Get the profile directory (or "default" if none)
    fn profile_dir(profile: Option<&str>) -> Result<PathBuf> {
        let profile_name = profile.unwrap_or("default");
        Ok(Self::config_dir()?.join(profile_name))
    }

    /// Can be overridden with the RIG_PANEL_DIR environment variable
    fn config_dir() -> Result<PathBuf> {
        if let Ok(custom_dir) = std::env::var(DIR_ENV_VAR) {
            return Ok(PathBuf::from(custom_dir));
        }

        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".rig-panel"))
    }

    /// Returns: ~/.rig-panel/{profile}/config.toml
    pub fn config_path(profile: Option<&str>) -> Result<PathBuf> {
        Ok(Self::profile_dir(profile)?.join("config.toml"))
    }

    /// Returns: ~/.rig-panel/{profile}/history.txt
    pub fn history_path(profile: Option<&str>) -> Result<PathBuf> {
        Ok(Self::profile_dir(profile)?.join("history.txt"))
    }
}
