// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Runlog
//!
//! Turns a running log kept as CSV into weekly and monthly training
//! statistics: distance and time this week, distance this month, a rolling
//! series of recent weeks, a per-day breakdown and progress toward a weekly
//! distance goal.
//!
//! ## Features
//!
//! - **Lenient input**: quoted fields, missing cells, unknown columns and
//!   unreadable values never abort a load
//! - **ISO calendar**: weeks start on Monday and belong to their ISO year
//! - **Local or remote logs**: read from a path or fetched over HTTP(S)
//! - **Render-ready output**: rounded series, pace strings and date labels
//!
//! ## Architecture
//!
//! - **Parser**: CSV text into header-keyed rows
//! - **Normalize**: rows into typed run records with per-field status
//! - **Calendar**: ISO week and month buckets
//! - **Metrics**: totals, series, pace and goal progress
//! - **Dashboard**: the full pipeline behind a fetchable source
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use runlog::config::DashboardConfig;
//! use runlog::dashboard::build_dashboard;
//! use runlog::source::LoadStatus;
//!
//! let csv = "Date,Distance,Minutes,Seconds\n2024-05-06,5.0,30,0\n2024-05-08,10.0,50,0\n";
//! let today = NaiveDate::from_ymd_opt(2024, 5, 9).unwrap();
//! let status = LoadStatus::Loaded { source: "inline".into(), bytes: csv.len() };
//!
//! let dashboard = build_dashboard(csv, &DashboardConfig::default(), today, status);
//! assert_eq!(dashboard.current_week.total_distance_km, 15.0);
//! assert_eq!(dashboard.goal.percent, 50.0);
//! ```

/// ISO week and calendar month bucketing
pub mod calendar;

/// Configuration management and persistence
pub mod config;

/// Application constants and configuration values
pub mod constants;

/// End-to-end pipeline and dashboard service
pub mod dashboard;

/// Date and duration labels
pub mod format;

/// Structured logging
pub mod logging;

/// Totals, series, pace and goal progress
pub mod metrics;

/// Run log data models
pub mod models;

/// Record normalization
pub mod normalize;

/// CSV parsing
pub mod parser;

/// Run log sources
pub mod source;
