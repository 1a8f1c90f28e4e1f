// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Constants Module
//!
//! Application constants and environment-based configuration values.
//! This module provides both hardcoded defaults and environment variable lookups.

/// Dashboard defaults used when no configuration overrides them
pub mod defaults {
    /// Location of the run log when nothing else is configured
    pub const SOURCE: &str = "running-data.csv";

    /// Weekly distance goal in kilometers
    pub const WEEKLY_GOAL_KM: f64 = 30.0;

    /// Number of ISO weeks in the rolling weekly series
    pub const ROLLING_WEEKS: u32 = 4;

    /// Longest rolling window accepted, ten years of weeks
    pub const MAX_ROLLING_WEEKS: u32 = 520;

    /// Number of entries in the recent runs listing
    pub const RECENT_RUNS_LIMIT: usize = 10;

    /// Timeout for remote fetches
    pub const FETCH_TIMEOUT_SECS: u64 = 10;

    /// Config file looked up in the working directory
    pub const CONFIG_FILE: &str = "runlog.toml";

    /// Config file below the platform config directory
    pub const USER_CONFIG_FILE: &str = "runlog/config.toml";
}

/// Display markers and labels
pub mod display {
    /// Marker for values that cannot be derived or were not recorded
    pub const NOT_AVAILABLE: &str = "-";

    /// Day labels of an ISO week, Monday first
    pub const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

    /// Unit suffix appended to pace strings
    pub const PACE_SUFFIX: &str = "/km";
}

/// Environment-based configuration
pub mod env_config {
    use std::env;

    /// Run log location from environment
    pub fn source() -> Option<String> {
        env::var("RUNLOG_SOURCE").ok()
    }

    /// Weekly goal override from environment
    pub fn weekly_goal_km() -> Option<f64> {
        env::var("RUNLOG_WEEKLY_GOAL_KM").ok()?.parse().ok()
    }

    /// Rolling window length override from environment
    pub fn rolling_weeks() -> Option<u32> {
        env::var("RUNLOG_ROLLING_WEEKS").ok()?.parse().ok()
    }

    /// Anchor mode override from environment
    pub fn anchor() -> Option<String> {
        env::var("RUNLOG_ANCHOR").ok()
    }

    /// Fetch timeout override from environment
    pub fn fetch_timeout_secs() -> Option<u64> {
        env::var("RUNLOG_FETCH_TIMEOUT_SECS").ok()?.parse().ok()
    }

    /// Get log level from environment or default
    pub fn log_level() -> String {
        env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string())
    }
}
