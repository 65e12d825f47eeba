//! Configuration for the dashboard

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Which CPU counter the CPU monitor samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CpuSourceKind {
    /// sysinfo's rate-computed global usage
    Counter,
    /// Delta of raw busy time from /proc/stat (Linux only)
    ProcStat,
}

/// Errors raised while loading or saving the config file
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Config I/O error: {}", e),
            ConfigError::Parse(e) => write!(f, "Config parse error: {}", e),
            ConfigError::Serialize(e) => write!(f, "Config serialize error: {}", e),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(e: toml::ser::Error) -> Self {
        ConfigError::Serialize(e)
    }
}

/// Main dashboard configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Interval between two samples of a live monitor (milliseconds)
    pub tick_interval_ms: u64,

    /// How often the cancel key is polled inside one tick (milliseconds)
    pub cancel_poll_ms: u64,

    /// Number of cells in a usage bar
    pub bar_width: usize,

    /// Character for the used part of a bar
    pub filled_char: char,

    /// Character for the free part of a bar
    pub empty_char: char,

    /// Key that stops a live monitor (Esc and Ctrl+C always work)
    pub cancel_key: char,

    /// Warn when a disk has less free space than this (percent)
    pub disk_warning_percent: f64,

    /// CPU counter used by the CPU monitor
    pub cpu_source: CpuSourceKind,

    /// Measurement window for per-process CPU usage (milliseconds)
    pub process_window_ms: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            cancel_poll_ms: 100,
            bar_width: 50,
            filled_char: '█',
            empty_char: '░',
            cancel_key: 'q',
            disk_warning_percent: 10.0,
            cpu_source: CpuSourceKind::Counter,
            process_window_ms: 1000,
        }
    }
}

impl DashboardConfig {
    /// Default config file location: `<config dir>/sysdash/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sysdash").join("config.toml"))
    }

    /// Load config from TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) if path.exists() => {
                debug!("Loading config from {}", path.display());
                Self::load(path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Save config to TOML file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid("tick_interval_ms must be > 0".into()));
        }
        if self.cancel_poll_ms == 0 || self.cancel_poll_ms > self.tick_interval_ms {
            return Err(ConfigError::Invalid(
                "cancel_poll_ms must be between 1 and tick_interval_ms".into(),
            ));
        }
        if self.bar_width == 0 {
            return Err(ConfigError::Invalid("bar_width must be > 0".into()));
        }
        if !(0.0..=100.0).contains(&self.disk_warning_percent) {
            return Err(ConfigError::Invalid(
                "disk_warning_percent must be within 0-100".into(),
            ));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn cancel_poll(&self) -> Duration {
        Duration::from_millis(self.cancel_poll_ms)
    }

    pub fn process_window(&self) -> Duration {
        Duration::from_millis(self.process_window_ms)
    }
}
