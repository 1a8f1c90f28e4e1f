// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Configuration management for the running log dashboard

pub mod columns;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

use crate::constants::{defaults, env_config};

pub use columns::ColumnConfig;

/// How "the current week" and "the current month" are located
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorMode {
    /// Periods contain the evaluation day; stale logs show near-zero totals
    #[default]
    EvaluationInstant,
    /// Periods contain the most recent valid run in the log
    LatestRecord,
}

impl FromStr for AnchorMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "evaluation_instant" | "now" | "today" => Ok(Self::EvaluationInstant),
            "latest_record" | "latest" => Ok(Self::LatestRecord),
            other => bail!("Unknown anchor mode: {other}. Expected evaluation_instant or latest_record"),
        }
    }
}

impl fmt::Display for AnchorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EvaluationInstant => write!(f, "evaluation_instant"),
            Self::LatestRecord => write!(f, "latest_record"),
        }
    }
}

/// What to aggregate when the run log cannot be fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackMode {
    /// Aggregate nothing; every total is zero
    #[default]
    Empty,
    /// Aggregate the bundled sample log
    Sample,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Local path or http(s) URL of the run log CSV
    pub source: String,
    pub weekly_goal_km: f64,
    pub rolling_weeks: u32,
    pub recent_runs_limit: usize,
    pub fetch_timeout_secs: u64,
    pub anchor: AnchorMode,
    pub fallback: FallbackMode,
    pub columns: ColumnConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source: defaults::SOURCE.to_string(),
            weekly_goal_km: defaults::WEEKLY_GOAL_KM,
            rolling_weeks: defaults::ROLLING_WEEKS,
            recent_runs_limit: defaults::RECENT_RUNS_LIMIT,
            fetch_timeout_secs: defaults::FETCH_TIMEOUT_SECS,
            anchor: AnchorMode::default(),
            fallback: FallbackMode::default(),
            columns: ColumnConfig::default(),
        }
    }
}

/// Overrides read from `RUNLOG_*` environment variables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvOverrides {
    pub source: Option<String>,
    pub weekly_goal_km: Option<f64>,
    pub rolling_weeks: Option<u32>,
    pub anchor: Option<String>,
    pub fetch_timeout_secs: Option<u64>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        Self {
            source: env_config::source(),
            weekly_goal_km: env_config::weekly_goal_km(),
            rolling_weeks: env_config::rolling_weeks(),
            anchor: env_config::anchor(),
            fetch_timeout_secs: env_config::fetch_timeout_secs(),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from file or defaults, then apply environment overrides
    ///
    /// Lookup order: explicit path, `runlog.toml` in the working directory,
    /// `runlog/config.toml` under the user config directory, built-in defaults.
    pub fn load(path: Option<String>) -> Result<Self> {
        let config = match Self::locate(path) {
            Some(config_path) => Self::load_from_file(&config_path)?,
            None => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };

        let config = config.with_overrides(EnvOverrides::from_env())?;
        config.validate()?;
        Ok(config)
    }

    fn locate(path: Option<String>) -> Option<PathBuf> {
        if let Some(explicit) = path {
            return Some(PathBuf::from(explicit));
        }

        let local = PathBuf::from(defaults::CONFIG_FILE);
        if local.exists() {
            return Some(local);
        }

        dirs::config_dir()
            .map(|dir| dir.join(defaults::USER_CONFIG_FILE))
            .filter(|candidate| candidate.exists())
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: DashboardConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    pub fn with_overrides(mut self, overrides: EnvOverrides) -> Result<Self> {
        if let Some(source) = overrides.source {
            self.source = source;
        }
        if let Some(goal) = overrides.weekly_goal_km {
            self.weekly_goal_km = goal;
        }
        if let Some(weeks) = overrides.rolling_weeks {
            self.rolling_weeks = weeks;
        }
        if let Some(anchor) = overrides.anchor {
            self.anchor = anchor.parse().context("Invalid RUNLOG_ANCHOR")?;
        }
        if let Some(timeout) = overrides.fetch_timeout_secs {
            self.fetch_timeout_secs = timeout;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.source.trim().is_empty() {
            bail!("source must name a file or URL");
        }
        if !self.weekly_goal_km.is_finite() || self.weekly_goal_km <= 0.0 {
            bail!("weekly_goal_km must be a positive number, got {}", self.weekly_goal_km);
        }
        if self.rolling_weeks == 0 || self.rolling_weeks > defaults::MAX_ROLLING_WEEKS {
            bail!(
                "rolling_weeks must be between 1 and {}, got {}",
                defaults::MAX_ROLLING_WEEKS,
                self.rolling_weeks
            );
        }
        if self.columns.date.is_empty() || self.columns.distance.is_empty() {
            bail!("columns.date and columns.distance need at least one alias each");
        }
        Ok(())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }
}
