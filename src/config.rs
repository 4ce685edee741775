//! Application configuration, stored as TOML
//!
//! Looked up at `$DISCMENU_CONFIG`, falling back to
//! `<config dir>/discmenu/config.toml`. A default file is written on first start.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn, Level};

use crate::controller::{TranslatorSettings, DEFAULT_DEADZONE};
use crate::gpu::{BinSize, HeadlessSettings, PvrParams};
use crate::startup::HostSettings;
use crate::storage::{DiscType, PollPolicy};

const CONFIG_ENV: &str = "DISCMENU_CONFIG";
const CONFIG_DIR: &str = "discmenu";
const CONFIG_FILE: &str = "config.toml";

// Config errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to write config {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub input: InputConfig,
    pub gpu: GpuConfig,
    pub drive: DriveConfig,
    pub data: DataConfig,
    pub log: LogConfig,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    pub deadzone: u8,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            deadzone: DEFAULT_DEADZONE,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct GpuConfig {
    pub frame_interval_ms: u64,
    pub vertex_buffer_kb: usize,
    pub autosort: bool,
    pub translucent_bin: u8,
}

impl Default for GpuConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16,
            vertex_buffer_kb: 256,
            autosort: true,
            translucent_bin: 32,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DriveConfig {
    /// Polls per phase before giving up; unset spins forever
    pub max_polls: Option<u64>,
    pub settle_after_polls: u64,
    pub disc: DiscType,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            max_polls: None,
            settle_after_polls: 3,
            disc: DiscType::Gdrom,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DataConfig {
    pub data_dir: PathBuf,
    pub dat_files: Vec<String>,
    pub list_file: String,
    pub small_pool_kb: usize,
    pub large_pool_kb: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            dat_files: vec!["BOX.DAT".to_string(), "ICON.DAT".to_string()],
            list_file: "games.toml".to_string(),
            small_pool_kb: 512,
            large_pool_kb: 2048,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub stats_interval_secs: u64,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            stats_interval_secs: 10,
        }
    }
}

impl AppConfig {
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::parse(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.display().to_string(),
                source,
            })?;
        }
        fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.display().to_string(),
            source,
        })
    }

    /// Loads `path`, writing the defaults there first if it does not exist
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("Creating default configuration at {}", path.display());
            let config = AppConfig::default();
            config.save(path)?;
            return Ok(config);
        }
        Self::load(path)
    }

    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            debug!("Using config path from {}", CONFIG_ENV);
            return PathBuf::from(path);
        }
        let mut path = dirs::config_dir().unwrap_or_else(|| {
            warn!("Could not determine config directory, using current directory");
            PathBuf::from(".")
        });
        path.push(CONFIG_DIR);
        path.push(CONFIG_FILE);
        path
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if BinSize::from_entries(self.gpu.translucent_bin).is_none() {
            return Err(ConfigError::Invalid(format!(
                "gpu.translucent_bin must be 0, 8, 16 or 32, got {}",
                self.gpu.translucent_bin
            )));
        }
        if self.drive.max_polls == Some(0) {
            return Err(ConfigError::Invalid("drive.max_polls must be at least 1".into()));
        }
        for (key, kb) in [
            ("gpu.vertex_buffer_kb", self.gpu.vertex_buffer_kb),
            ("data.small_pool_kb", self.data.small_pool_kb),
            ("data.large_pool_kb", self.data.large_pool_kb),
        ] {
            if kb.checked_mul(1024).is_none() {
                return Err(ConfigError::Invalid(format!("{} is too large, got {}", key, kb)));
            }
        }
        if stats_window(self.log.stats_interval_secs).is_none() {
            return Err(ConfigError::Invalid(format!(
                "log.stats_interval_secs is too large, got {}",
                self.log.stats_interval_secs
            )));
        }
        Ok(())
    }

    pub fn log_level(&self) -> Level {
        match self.log.level.parse::<Level>() {
            Ok(level) => level,
            Err(_) => {
                warn!("Unknown log level '{}', using INFO", self.log.level);
                Level::INFO
            }
        }
    }

    pub fn translator_settings(&self) -> TranslatorSettings {
        TranslatorSettings {
            deadzone: self.input.deadzone,
        }
    }

    pub fn pvr_params(&self) -> PvrParams {
        let bin = BinSize::from_entries(self.gpu.translucent_bin).unwrap_or(BinSize::Size32);
        let vertex_buffer = self.gpu.vertex_buffer_kb.saturating_mul(1024);
        PvrParams::translucent_only(bin, vertex_buffer, self.gpu.autosort)
    }

    pub fn headless_settings(&self) -> HeadlessSettings {
        HeadlessSettings {
            frame_interval: Duration::from_millis(self.gpu.frame_interval_ms),
        }
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::from_max_polls(self.drive.max_polls)
    }

    pub fn host_settings(&self) -> HostSettings {
        HostSettings {
            data_dir: self.data.data_dir.clone(),
            dat_files: self.data.dat_files.clone(),
            list_file: self.data.list_file.clone(),
            small_pool_bytes: self.data.small_pool_kb.saturating_mul(1024),
            large_pool_bytes: self.data.large_pool_kb.saturating_mul(1024),
        }
    }

    pub fn stats_interval(&self) -> chrono::Duration {
        stats_window(self.log.stats_interval_secs).unwrap_or(chrono::Duration::MAX)
    }
}

// None when the interval does not fit a chrono duration
fn stats_window(secs: u64) -> Option<chrono::Duration> {
    i64::try_from(secs).ok().and_then(chrono::Duration::try_seconds)
}
