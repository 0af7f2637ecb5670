// File: ./src/config.rs
// Handles configuration loading, saving, and defaults.
use crate::context::AppContext;
use crate::model::DEFAULT_HORIZON_YEARS;
use crate::planner::WeekStart;
use crate::storage::JsonFileStore;
use anyhow::{Error, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;

fn default_horizon_years() -> u32 {
    DEFAULT_HORIZON_YEARS
}
fn default_future_log_months() -> u32 {
    12
}

fn default_link_prefix() -> String {
    "#date=".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Config {
    /// How far ahead `(REPEAT: ...)` links look for the next date.
    #[serde(default = "default_horizon_years")]
    pub horizon_years: u32,
    /// Months shown by the future log, counted from today.
    #[serde(default = "default_future_log_months")]
    pub future_log_months: u32,
    #[serde(default)]
    pub planner_week_start: WeekStart,
    #[serde(default = "default_link_prefix")]
    pub link_prefix: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // Match the serde defaults
            horizon_years: DEFAULT_HORIZON_YEARS,
            future_log_months: 12,
            planner_week_start: WeekStart::default(),
            link_prefix: default_link_prefix(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load the configuration from disk using an explicit context.
    /// Returns a contextualized error if reading or parsing fails.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_config_file_path()?;

        // Explicitly detect missing file so callers can fall back to defaults.
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found"));
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;

        Ok(config)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(ctx: &dyn AppContext) -> Result<Self> {
        match Self::load(ctx) {
            Ok(config) => Ok(config),
            Err(e) if Self::is_missing_config_error(&e) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Detects whether an error means the config file was missing, either via
    /// our explicit message or an underlying IO NotFound anywhere in the chain.
    pub fn is_missing_config_error(err: &Error) -> bool {
        if err.to_string().contains("Config file not found") {
            return true;
        }

        for cause in err.chain() {
            if let Some(io_err) = cause.downcast_ref::<std::io::Error>()
                && io_err.kind() == std::io::ErrorKind::NotFound
            {
                return true;
            }
        }

        false
    }

    /// Save configuration using an explicit context.
    pub fn save(&self, ctx: &dyn AppContext) -> Result<()> {
        let path = ctx.get_config_file_path()?;
        JsonFileStore::with_lock(&path, || {
            let toml_str = toml::to_string_pretty(self)?;
            JsonFileStore::atomic_write(&path, toml_str)?;
            Ok(())
        })?;
        Ok(())
    }

    /// Unknown level names fall back to `Warn`.
    pub fn log_level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Warn)
    }
}
