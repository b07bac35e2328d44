//! ParkAlloc configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ParkError, Result};

/// Environment variable that points at an alternate config file.
pub const CONFIG_ENV: &str = "PARKALLOC_CONFIG";

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParkConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub capacity: CapacityConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

impl ParkConfig {
    /// `explicit` if given, else `$PARKALLOC_CONFIG`, else the default path.
    pub fn resolve_path(explicit: Option<&str>) -> PathBuf {
        let expand = |p: &str| PathBuf::from(shellexpand::tilde(p).to_string());
        match explicit {
            Some(p) => expand(p),
            None => std::env::var(CONFIG_ENV)
                .map(|p| expand(&p))
                .unwrap_or_else(|_| Self::default_path()),
        }
    }

    /// Load `path`, or defaults when it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ParkError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| ParkError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| ParkError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings the allocator and calendar cannot work with.
    pub fn validate(&self) -> Result<()> {
        crate::calendar::OperatingCalendar::from_config(&self.schedule)?;
        match self.storage.backend.as_str() {
            "json" | "sqlite" => {}
            other => {
                return Err(ParkError::Config(format!(
                    "unknown storage backend '{other}' (expected json or sqlite)"
                )));
            }
        }
        match self.notify.target.as_str() {
            "slack" | "discord" | "webhook" => {}
            other => {
                return Err(ParkError::Config(format!(
                    "unknown notify target '{other}' (expected slack, discord or webhook)"
                )));
            }
        }
        if self.notify.timeout_secs == 0 {
            return Err(ParkError::Config("notify.timeout_secs must be > 0".into()));
        }
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the ParkAlloc home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".parkalloc")
    }

    /// Data directory with `~` expanded.
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.storage.data_dir).to_string())
    }
}

/// Where documents live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// `json` (one file per document) or `sqlite`.
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_backend() -> String { "json".into() }
fn default_data_dir() -> String { "~/.parkalloc/data".into() }

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            data_dir: default_data_dir(),
        }
    }
}

/// Calendar and daily run schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Local time of day after which requests target the next day.
    #[serde(default = "default_cutoff")]
    pub cutoff: String,
    /// Local offset from UTC in minutes (540 = UTC+09:00).
    #[serde(default = "default_utc_offset")]
    pub utc_offset_minutes: i32,
    #[serde(default = "default_non_operating_days")]
    pub non_operating_days: Vec<String>,
    /// 5-field cron expression, evaluated in local time.
    #[serde(default = "default_cron")]
    pub cron: String,
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,
}

fn default_cutoff() -> String { "08:00".into() }
fn default_utc_offset() -> i32 { 9 * 60 }
fn default_non_operating_days() -> Vec<String> {
    vec!["Sat", "Sun"].into_iter().map(String::from).collect()
}
fn default_cron() -> String { "30 7 * * *".into() }
fn default_check_interval() -> u64 { 60 }

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            cutoff: default_cutoff(),
            utc_offset_minutes: default_utc_offset(),
            non_operating_days: default_non_operating_days(),
            cron: default_cron(),
            check_interval_secs: default_check_interval(),
        }
    }
}

/// Slot counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityConfig {
    #[serde(default = "default_pool_a")]
    pub pool_a: usize,
    #[serde(default = "default_pool_b")]
    pub pool_b: usize,
    /// Extra pool B slots on days with `pool_b_reduced` set.
    #[serde(default = "default_pool_b_bonus")]
    pub pool_b_bonus: usize,
}

fn default_pool_a() -> usize { 1 }
fn default_pool_b() -> usize { 2 }
fn default_pool_b_bonus() -> usize { 1 }

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            pool_a: default_pool_a(),
            pool_b: default_pool_b(),
            pool_b_bonus: default_pool_b_bonus(),
        }
    }
}

/// Outbound notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default = "bool_true")]
    pub enabled: bool,
    /// `slack`, `discord` or `webhook`.
    #[serde(default = "default_target")]
    pub target: String,
    /// Name of the env var holding the (secret) endpoint URL.
    #[serde(default = "default_webhook_env")]
    pub webhook_env: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_pool_a_name")]
    pub pool_a_name: String,
    #[serde(default = "default_pool_b_name")]
    pub pool_b_name: String,
}

fn bool_true() -> bool { true }
fn default_target() -> String { "slack".into() }
fn default_webhook_env() -> String { "SLACK_WEBHOOK_URL".into() }
fn default_timeout() -> u64 { 10 }
fn default_pool_a_name() -> String { "Admin office".into() }
fn default_pool_b_name() -> String { "Tower".into() }

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            target: default_target(),
            webhook_env: default_webhook_env(),
            timeout_secs: default_timeout(),
            pool_a_name: default_pool_a_name(),
            pool_b_name: default_pool_b_name(),
        }
    }
}
