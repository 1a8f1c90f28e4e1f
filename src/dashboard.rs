// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Dashboard
//!
//! The full pipeline from raw CSV text to render-ready aggregates:
//! parse, normalize, bucket, compute metrics. [`build_dashboard`] is a pure
//! function of its inputs; [`DashboardService`] adds the fetch in front.
//!
//! ```rust,no_run
//! use runlog::config::DashboardConfig;
//! use runlog::dashboard::DashboardService;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = DashboardConfig::load(None)?;
//!     let service = DashboardService::new(config)?;
//!     let dashboard = service.load(chrono::Local::now().date_naive()).await;
//!     println!("{:.2} km this week", dashboard.current_week.total_distance_km);
//!     Ok(())
//! }
//! ```

use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::calendar::{bucket_by_month, bucket_by_week, MonthBucket, WeekBucket};
use crate::config::{AnchorMode, ColumnConfig, DashboardConfig};
use crate::format::{duration_label, format_minutes, long_date, or_not_available, run_date_label, short_date};
use crate::logging::AppLogger;
use crate::metrics::{record_pace, round2, DailyPoint, GoalProgress, MetricsEngine, PeriodTotals, WeeklyPoint};
use crate::models::{FieldStatus, RunRecord};
use crate::normalize::{normalize_rows, NormalizationSummary, NormalizedLog};
use crate::parser::parse_csv;
use crate::source::{create_source, load_log_text, LoadStatus, RunLogSource};

/// Everything derived from one pass over the raw text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    pub headers: Vec<String>,
    pub log: NormalizedLog,
    pub weeks: Vec<WeekBucket>,
    pub months: Vec<MonthBucket>,
}

impl Aggregation {
    pub fn metrics(&self) -> MetricsEngine<'_> {
        MetricsEngine::from_log(&self.log)
    }
}

/// Parse, normalize and bucket raw CSV text
pub fn aggregate(text: &str, columns: &ColumnConfig) -> Aggregation {
    let parsed = parse_csv(text);

    let unknown: Vec<&str> = parsed
        .headers
        .iter()
        .map(String::as_str)
        .filter(|header| !columns.is_recognized(header))
        .collect();
    if !unknown.is_empty() {
        debug!(columns = ?unknown, "Ignoring unrecognized columns");
    }

    let log = normalize_rows(&parsed.rows, columns);
    let weeks = bucket_by_week(log.dated());
    let months = bucket_by_month(log.dated());

    Aggregation {
        headers: parsed.headers,
        log,
        weeks,
        months,
    }
}

/// One entry of the weekly history chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    /// Week start as `Jan 2`
    pub label: String,
    /// ISO week as `2023-W01`
    pub period: String,
    pub start: NaiveDate,
    pub distance_km: f64,
    pub total_minutes: f64,
    pub run_count: usize,
}

impl HistoryPoint {
    fn from_week(bucket: &WeekBucket) -> Self {
        Self {
            label: short_date(bucket.start),
            period: bucket.key.to_string(),
            start: bucket.start,
            distance_km: round2(bucket.total_distance_km),
            total_minutes: bucket.total_minutes,
            run_count: bucket.run_count(),
        }
    }

    fn from_month(bucket: &MonthBucket) -> Self {
        Self {
            label: bucket.start.format("%b %Y").to_string(),
            period: bucket.key.to_string(),
            start: bucket.start,
            distance_km: round2(bucket.total_distance_km),
            total_minutes: bucket.total_minutes,
            run_count: bucket.run_count(),
        }
    }
}

/// One row of the recent runs table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub date: String,
    pub distance_km: f64,
    pub distance_status: FieldStatus,
    pub duration: String,
    /// Derived from distance and duration
    pub pace: String,
    /// As recorded in the log
    pub avg_pace: String,
    pub avg_heart_rate: String,
    pub rpe: String,
    pub notes: String,
}

impl RunSummary {
    fn from_record(record: &RunRecord) -> Self {
        Self {
            date: run_date_label(&record.date),
            distance_km: record.distance(),
            distance_status: record.distance_km.status,
            duration: duration_label(&record.duration),
            pace: record_pace(record).to_string(),
            avg_pace: or_not_available(record.avg_pace.as_deref()),
            avg_heart_rate: or_not_available(record.avg_heart_rate.as_deref()),
            rpe: or_not_available(record.rpe.as_deref()),
            notes: or_not_available(record.notes.as_deref()),
        }
    }
}

/// Render-ready snapshot handed to a presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub today: NaiveDate,
    pub anchor: AnchorMode,
    /// Day the current week and month are measured up to
    pub reference_date: NaiveDate,
    pub load_status: LoadStatus,
    pub current_week: PeriodTotals,
    /// Current week time as `Xh Ym`
    pub current_week_time: String,
    pub current_month: PeriodTotals,
    pub goal: GoalProgress,
    pub rolling_weeks: Vec<WeeklyPoint>,
    pub daily: Vec<DailyPoint>,
    pub weekly_history: Vec<HistoryPoint>,
    pub monthly_history: Vec<HistoryPoint>,
    pub recent_runs: Vec<RunSummary>,
    /// Long date of the most recent run
    pub last_updated: Option<String>,
    pub summary: NormalizationSummary,
}

/// Valid records, newest first; records with unreadable dates go last
pub fn recent_runs(log: &NormalizedLog, limit: usize) -> Vec<&RunRecord> {
    let mut runs: Vec<&RunRecord> = log.valid().collect();
    runs.sort_by_key(|record| Reverse(record.date.parsed));
    runs.truncate(limit);
    runs
}

/// Build the dashboard from raw text
///
/// Pure and total: the same text, config and day always give the same
/// dashboard, and empty or malformed text gives zeroed aggregates.
pub fn build_dashboard(
    text: &str,
    config: &DashboardConfig,
    today: NaiveDate,
    load_status: LoadStatus,
) -> Dashboard {
    let aggregation = aggregate(text, &config.columns);
    let summary = aggregation.log.summary();
    AppLogger::log_pipeline_summary(&summary, aggregation.weeks.len(), aggregation.months.len());

    let engine = aggregation.metrics().with_weekly_goal(config.weekly_goal_km);
    let reference_date = engine.reference_date(config.anchor, today);
    let current_week = engine.current_week(reference_date);

    Dashboard {
        today,
        anchor: config.anchor,
        reference_date,
        load_status,
        current_week_time: format_minutes(current_week.total_minutes),
        current_week,
        current_month: engine.current_month(reference_date),
        goal: engine.goal_progress(reference_date),
        rolling_weeks: engine.rolling_weeks(reference_date, config.rolling_weeks),
        daily: engine.daily_distances(reference_date),
        weekly_history: aggregation.weeks.iter().map(HistoryPoint::from_week).collect(),
        monthly_history: aggregation.months.iter().map(HistoryPoint::from_month).collect(),
        recent_runs: recent_runs(&aggregation.log, config.recent_runs_limit)
            .into_iter()
            .map(RunSummary::from_record)
            .collect(),
        last_updated: engine.latest_run_date().map(long_date),
        summary,
    }
}

/// Fetches the configured run log and builds dashboards from it
pub struct DashboardService {
    config: DashboardConfig,
    source: Box<dyn RunLogSource>,
}

impl DashboardService {
    pub fn new(config: DashboardConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.fetch_timeout_secs);
        let source = create_source(&config.source, timeout)?;
        Ok(Self { config, source })
    }

    pub fn with_source(config: DashboardConfig, source: Box<dyn RunLogSource>) -> Self {
        Self { config, source }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Fetch the raw text and aggregate it without computing a dashboard
    pub async fn aggregate(&self) -> (Aggregation, LoadStatus) {
        let loaded = load_log_text(self.source.as_ref(), self.config.fallback).await;
        (aggregate(&loaded.text, &self.config.columns), loaded.status)
    }

    /// Fetch the log and build the dashboard for `today`
    #[instrument(skip(self), fields(source = %self.source.describe()))]
    pub async fn load(&self, today: NaiveDate) -> Dashboard {
        let loaded = load_log_text(self.source.as_ref(), self.config.fallback).await;
        build_dashboard(&loaded.text, &self.config, today, loaded.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticSource;

    const LOG: &str = "Date,Distance,Minutes,Seconds,Avg Pace,Avg HR,RPE,Notes
2024-05-06,5.0,30,0,6:00,140,5,Easy
2024-05-08,10.0,50,0,5:00,150,7,Tempo
2024-05-09,,20,0,,,,Forgot the watch
someday,3.0,18,0,,,,
2024-04-30,6.0,33,0,,,,
";

    fn loaded() -> LoadStatus {
        LoadStatus::Loaded {
            source: "test".to_string(),
            bytes: LOG.len(),
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_dashboard_for_current_week() {
        let config = DashboardConfig::default();
        let dashboard = build_dashboard(LOG, &config, ymd(2024, 5, 9), loaded());

        assert_eq!(dashboard.reference_date, ymd(2024, 5, 9));
        assert_eq!(dashboard.current_week.total_distance_km, 15.0);
        assert_eq!(dashboard.current_week.total_minutes, 80.0);
        assert_eq!(dashboard.current_week_time, "1h 20m");
        assert_eq!(dashboard.current_month.total_distance_km, 15.0);
        assert_eq!(dashboard.goal.percent, 50.0);
        assert_eq!(dashboard.daily[2].distance_km, 10.0);
        assert_eq!(dashboard.rolling_weeks.len(), 4);
        assert_eq!(dashboard.rolling_weeks[2].distance_km, 6.0);
        assert_eq!(dashboard.last_updated.as_deref(), Some("Wednesday, May 8, 2024"));
    }

    #[test]
    fn test_recent_runs_sorted_newest_first_with_unparsed_dates_last() {
        let dashboard = build_dashboard(LOG, &DashboardConfig::default(), ymd(2024, 5, 9), loaded());
        let dates: Vec<&str> = dashboard.recent_runs.iter().map(|r| r.date.as_str()).collect();

        assert_eq!(dates, vec!["08 May 2024", "06 May 2024", "30 Apr 2024", "someday"]);
        assert_eq!(dashboard.recent_runs[0].pace, "5:00/km");
        assert_eq!(dashboard.recent_runs[0].avg_heart_rate, "150");
        assert_eq!(dashboard.recent_runs[3].avg_heart_rate, "-");
    }

    #[test]
    fn test_recent_runs_limit() {
        let config = DashboardConfig {
            recent_runs_limit: 2,
            ..DashboardConfig::default()
        };
        let dashboard = build_dashboard(LOG, &config, ymd(2024, 5, 9), loaded());
        assert_eq!(dashboard.recent_runs.len(), 2);
    }

    #[test]
    fn test_summary_and_histories() {
        let dashboard = build_dashboard(LOG, &DashboardConfig::default(), ymd(2024, 5, 9), loaded());

        assert_eq!(dashboard.summary.rows, 5);
        assert_eq!(dashboard.summary.valid, 4);
        assert_eq!(dashboard.summary.unparseable_dates, 1);

        let weeks: Vec<&str> = dashboard.weekly_history.iter().map(|w| w.label.as_str()).collect();
        assert_eq!(weeks, vec!["Apr 29", "May 6"]);
        assert_eq!(dashboard.weekly_history[1].period, "2024-W19");

        let months: Vec<&str> = dashboard.monthly_history.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(months, vec!["Apr 2024", "May 2024"]);
    }

    #[test]
    fn test_empty_text_gives_zeroed_dashboard() {
        let status = LoadStatus::Failed {
            reason: "unreachable".to_string(),
        };
        let dashboard = build_dashboard("", &DashboardConfig::default(), ymd(2024, 5, 9), status.clone());

        assert_eq!(dashboard.load_status, status);
        assert_eq!(dashboard.current_week.total_distance_km, 0.0);
        assert_eq!(dashboard.goal.percent, 0.0);
        assert_eq!(dashboard.daily.len(), 7);
        assert!(dashboard.weekly_history.is_empty());
        assert!(dashboard.recent_runs.is_empty());
        assert_eq!(dashboard.last_updated, None);
    }

    #[test]
    fn test_oversized_rolling_window_stays_bounded() {
        let config = DashboardConfig {
            rolling_weeks: 200_000_000,
            ..DashboardConfig::default()
        };
        let dashboard = build_dashboard(LOG, &config, ymd(2024, 5, 9), loaded());

        assert_eq!(dashboard.rolling_weeks.len(), 520);
        assert_eq!(dashboard.rolling_weeks.last().map(|w| w.distance_km), Some(15.0));
    }

    #[tokio::test]
    async fn test_service_with_static_source() {
        let service = DashboardService::with_source(
            DashboardConfig::default(),
            Box::new(StaticSource::new("inline", LOG)),
        );

        assert_eq!(service.config().weekly_goal_km, 30.0);

        let dashboard = service.load(ymd(2024, 5, 9)).await;
        assert!(dashboard.load_status.is_loaded());
        assert_eq!(dashboard.current_week.run_count, 2);

        let (aggregation, _) = service.aggregate().await;
        assert_eq!(aggregation.weeks.len(), 2);
        assert_eq!(aggregation.headers.len(), 8);
    }
}
