// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Period totals, chart series, pace and goal progress

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::calendar::{month_start, week_start};
use crate::config::AnchorMode;
use crate::constants::{defaults, display};
use crate::models::{RunDuration, RunRecord};
use crate::normalize::{parse_clock_minutes, NormalizedLog};

/// Distance and time summed over a date range
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodTotals {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub total_distance_km: f64,
    pub total_minutes: f64,
    pub run_count: usize,
}

/// One bar of the rolling weekly chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyPoint {
    pub label: String,
    pub week_start: NaiveDate,
    pub distance_km: f64,
}

/// One day of the current-week chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub day: String,
    pub date: NaiveDate,
    pub distance_km: f64,
}

/// Weekly distance against the configured goal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub distance_km: f64,
    pub goal_km: f64,
    /// Not clamped; exceeding the goal yields more than 100
    pub percent: f64,
}

/// Time per kilometer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Pace {
    PerKm { minutes: u32, seconds: u32 },
    NotAvailable,
}

impl Pace {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::PerKm { .. })
    }
}

impl fmt::Display for Pace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PerKm { minutes, seconds } => {
                write!(f, "{}:{:02}{}", minutes, seconds, display::PACE_SUFFIX)
            }
            Self::NotAvailable => f.write_str(display::NOT_AVAILABLE),
        }
    }
}

/// Pace from a distance and an elapsed time in minutes
///
/// Floored to whole seconds per kilometer. Zero, negative or non-finite
/// inputs give
/// [`Pace::NotAvailable`].
pub fn derive_pace(distance_km: f64, total_minutes: f64) -> Pace {
    if !(distance_km.is_finite() && distance_km > 0.0) {
        return Pace::NotAvailable;
    }
    if !(total_minutes.is_finite() && total_minutes > 0.0) {
        return Pace::NotAvailable;
    }

    // Epsilon keeps exact paces like 41:30 over 7.5 km at 5:32
    let seconds_per_km = (total_minutes * 60.0 / distance_km + 1e-9).floor();
    if !(seconds_per_km.is_finite() && seconds_per_km < f64::from(u32::MAX)) {
        return Pace::NotAvailable;
    }
    let seconds_per_km = seconds_per_km as u32;

    Pace::PerKm {
        minutes: seconds_per_km / 60,
        seconds: seconds_per_km % 60,
    }
}

/// Pace from a distance and a clock string such as `50:00` or `1:02:30`
pub fn pace_from_clock(distance_km: f64, time: &str) -> Pace {
    let minutes = parse_clock_minutes(time);
    if minutes.is_defaulted() {
        return Pace::NotAvailable;
    }
    derive_pace(distance_km, minutes.value)
}

/// Pace of a single run; unavailable when no duration was recorded
pub fn record_pace(record: &RunRecord) -> Pace {
    match &record.duration {
        duration if !duration.is_present() => Pace::NotAvailable,
        RunDuration::Clock { total_minutes, .. } if total_minutes.is_defaulted() => {
            Pace::NotAvailable
        }
        duration => derive_pace(record.distance(), duration.total_minutes()),
    }
}

/// Weekly distance as a percentage of the goal
pub fn goal_progress_percent(distance_km: f64, goal_km: f64) -> f64 {
    if goal_km > 0.0 {
        distance_km / goal_km * 100.0
    } else {
        0.0
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Metrics over the dated, valid records of one log
pub struct MetricsEngine<'a> {
    runs: Vec<(NaiveDate, &'a RunRecord)>,
    weekly_goal_km: f64,
}

impl<'a> MetricsEngine<'a> {
    pub fn new<I>(runs: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, &'a RunRecord)>,
    {
        Self {
            runs: runs.into_iter().collect(),
            weekly_goal_km: defaults::WEEKLY_GOAL_KM,
        }
    }

    pub fn from_log(log: &'a NormalizedLog) -> Self {
        Self::new(log.dated())
    }

    pub fn with_weekly_goal(mut self, goal_km: f64) -> Self {
        self.weekly_goal_km = goal_km;
        self
    }

    /// Date of the most recent run, if any run is dated
    pub fn latest_run_date(&self) -> Option<NaiveDate> {
        self.runs.iter().map(|(date, _)| *date).max()
    }

    /// The day current periods are measured up to
    pub fn reference_date(&self, anchor: AnchorMode, today: NaiveDate) -> NaiveDate {
        match anchor {
            AnchorMode::EvaluationInstant => today,
            AnchorMode::LatestRecord => self.latest_run_date().unwrap_or(today),
        }
    }

    /// Totals over `start..=end`
    pub fn totals_between(&self, start: NaiveDate, end: NaiveDate) -> PeriodTotals {
        self.runs
            .iter()
            .filter(|(date, _)| (start..=end).contains(date))
            .fold(
                PeriodTotals {
                    start: Some(start),
                    end: Some(end),
                    ..PeriodTotals::default()
                },
                |mut totals, (_, run)| {
                    totals.total_distance_km += run.distance();
                    totals.total_minutes += run.total_minutes();
                    totals.run_count += 1;
                    totals
                },
            )
    }

    /// Monday of the reference week through the reference day
    pub fn current_week(&self, reference: NaiveDate) -> PeriodTotals {
        self.totals_between(week_start(reference), reference)
    }

    /// First of the reference month through the reference day
    pub fn current_month(&self, reference: NaiveDate) -> PeriodTotals {
        self.totals_between(month_start(reference), reference)
    }

    /// Distance per full ISO week for the `weeks` weeks ending with the reference week
    ///
    /// Oldest first, labelled `Week 1` through `Week N`.
    pub fn rolling_weeks(&self, reference: NaiveDate, weeks: u32) -> Vec<WeeklyPoint> {
        let current = week_start(reference);

        // Newest first, stopping where the calendar runs out
        let mut starts: Vec<NaiveDate> = (0..weeks.min(defaults::MAX_ROLLING_WEEKS))
            .map_while(|back| current.checked_sub_signed(Duration::weeks(i64::from(back))))
            .collect();
        starts.reverse();

        starts
            .into_iter()
            .enumerate()
            .map(|(position, start)| {
                let end = start
                    .checked_add_signed(Duration::days(6))
                    .unwrap_or(NaiveDate::MAX);
                WeeklyPoint {
                    label: format!("Week {}", position + 1),
                    week_start: start,
                    distance_km: round2(self.totals_between(start, end).total_distance_km),
                }
            })
            .collect()
    }

    /// Distance for each day, Monday to Sunday, of the reference week
    pub fn daily_distances(&self, reference: NaiveDate) -> Vec<DailyPoint> {
        let monday = week_start(reference);

        display::WEEKDAY_LABELS
            .iter()
            .zip(0i64..)
            .map(|(day, offset)| {
                let date = monday + Duration::days(offset);
                DailyPoint {
                    day: day.to_string(),
                    date,
                    distance_km: round2(self.totals_between(date, date).total_distance_km),
                }
            })
            .collect()
    }

    pub fn goal_progress(&self, reference: NaiveDate) -> GoalProgress {
        let distance_km = self.current_week(reference).total_distance_km;
        GoalProgress {
            distance_km,
            goal_km: self.weekly_goal_km,
            percent: goal_progress_percent(distance_km, self.weekly_goal_km),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Measured, RunDate};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn run(date: NaiveDate, km: f64, minutes: u32) -> RunRecord {
        RunRecord {
            index: 0,
            date: RunDate {
                raw: date.to_string(),
                parsed: Some(date),
            },
            distance_km: Measured::parsed(km),
            duration: RunDuration::Split {
                minutes: Measured::parsed(minutes),
                seconds: Measured::missing(),
            },
            avg_pace: None,
            avg_heart_rate: None,
            rpe: None,
            notes: None,
        }
    }

    fn engine(records: &[RunRecord]) -> MetricsEngine<'_> {
        MetricsEngine::new(records.iter().map(|r| (r.date.parsed.unwrap(), r)))
    }

    #[test]
    fn test_pace_from_clock() {
        assert_eq!(pace_from_clock(10.0, "50:00").to_string(), "5:00/km");
        assert_eq!(pace_from_clock(10.0, "0:50:00").to_string(), "5:00/km");
        assert_eq!(pace_from_clock(0.0, "50:00"), Pace::NotAvailable);
        assert_eq!(pace_from_clock(0.0, "50:00").to_string(), "-");
        assert_eq!(pace_from_clock(5.0, "soon"), Pace::NotAvailable);
    }

    #[test]
    fn test_pace_floors_minutes_and_seconds() {
        // 30m15s over 5.2 km is 5.817.. min/km
        assert_eq!(derive_pace(5.2, 30.25), Pace::PerKm { minutes: 5, seconds: 49 });
        assert_eq!(derive_pace(21.1, 132.75).to_string(), "6:17/km");
        assert_eq!(derive_pace(5.0, 0.0), Pace::NotAvailable);
        assert_eq!(derive_pace(f64::NAN, 30.0), Pace::NotAvailable);
    }

    #[test]
    fn test_pace_keeps_exact_seconds() {
        // 41:30 over 7.5 km is exactly 5:32 per km
        assert_eq!(derive_pace(7.5, 41.5).to_string(), "5:32/km");
        assert_eq!(derive_pace(3.0, 16.5).to_string(), "5:30/km");
        assert_eq!(pace_from_clock(7.5, "0:41:30").to_string(), "5:32/km");
    }

    #[test]
    fn test_record_pace_needs_a_duration() {
        let mut record = run(ymd(2023, 1, 2), 10.0, 50);
        assert_eq!(record_pace(&record).to_string(), "5:00/km");

        record.duration = RunDuration::Missing;
        assert!(!record_pace(&record).is_available());

        record.duration = RunDuration::Split {
            minutes: Measured::missing(),
            seconds: Measured::missing(),
        };
        assert!(!record_pace(&record).is_available());
    }

    #[test]
    fn test_goal_progress_is_not_clamped() {
        assert_eq!(goal_progress_percent(15.0, 30.0), 50.0);
        assert_eq!(goal_progress_percent(45.0, 30.0), 150.0);
        assert_eq!(goal_progress_percent(10.0, 0.0), 0.0);
    }

    #[test]
    fn test_current_week_is_anchored_to_reference_day() {
        let records = [
            run(ymd(2024, 5, 6), 5.0, 30),  // Monday
            run(ymd(2024, 5, 8), 10.0, 55), // Wednesday
            run(ymd(2024, 5, 10), 7.0, 40), // Friday, after the reference day
            run(ymd(2024, 5, 5), 20.0, 120), // previous Sunday
        ];
        let engine = engine(&records);

        let week = engine.current_week(ymd(2024, 5, 9));
        assert_eq!(week.start, Some(ymd(2024, 5, 6)));
        assert_eq!(week.total_distance_km, 15.0);
        assert_eq!(week.total_minutes, 85.0);
        assert_eq!(week.run_count, 2);
    }

    #[test]
    fn test_stale_log_shows_zero_for_current_week() {
        let records = [run(ymd(2023, 4, 23), 5.29, 30)];
        let engine = engine(&records);
        let today = ymd(2026, 10, 17);

        assert_eq!(engine.current_week(today).total_distance_km, 0.0);
        assert_eq!(engine.current_month(today).run_count, 0);

        let reference = engine.reference_date(AnchorMode::LatestRecord, today);
        assert_eq!(reference, ymd(2023, 4, 23));
        assert_eq!(engine.current_week(reference).total_distance_km, 5.29);
    }

    #[test]
    fn test_current_month() {
        let records = [
            run(ymd(2023, 3, 30), 7.2, 41),
            run(ymd(2023, 4, 2), 20.65, 126),
            run(ymd(2023, 4, 4), 8.0, 44),
        ];
        let month = engine(&records).current_month(ymd(2023, 4, 10));

        assert_eq!(month.start, Some(ymd(2023, 4, 1)));
        assert!((month.total_distance_km - 28.65).abs() < 1e-9);
    }

    #[test]
    fn test_rolling_weeks_is_bounded() {
        let records = [run(ymd(2024, 5, 7), 8.0, 45)];
        let engine = engine(&records);

        let series = engine.rolling_weeks(ymd(2024, 5, 8), 200_000_000);
        assert_eq!(series.len(), defaults::MAX_ROLLING_WEEKS as usize);
        assert_eq!(series.last().map(|p| p.distance_km), Some(8.0));

        // Near the start of the calendar the window is cut short
        let reference = NaiveDate::MIN + Duration::days(10);
        let early = engine.rolling_weeks(reference, 4);
        assert!(!early.is_empty() && early.len() < 4);
        assert_eq!(early[0].label, "Week 1");
        assert_eq!(early.last().map(|p| p.week_start), Some(week_start(reference)));
    }

    #[test]
    fn test_rolling_weeks_oldest_first() {
        let records = [
            run(ymd(2024, 4, 16), 4.0, 20), // three weeks back
            run(ymd(2024, 4, 29), 6.0, 30), // one week back
            run(ymd(2024, 5, 5), 1.5, 9),   // Sunday of the same week
            run(ymd(2024, 5, 7), 8.0, 45),  // current week
        ];
        let series = engine(&records).rolling_weeks(ymd(2024, 5, 8), 4);

        let labels: Vec<&str> = series.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Week 1", "Week 2", "Week 3", "Week 4"]);

        let distances: Vec<f64> = series.iter().map(|p| p.distance_km).collect();
        assert_eq!(distances, vec![4.0, 0.0, 7.5, 8.0]);
        assert_eq!(series[0].week_start, ymd(2024, 4, 15));
        assert_eq!(series[3].week_start, ymd(2024, 5, 6));
    }

    #[test]
    fn test_daily_distances_sum_same_day_runs() {
        let records = [
            run(ymd(2024, 5, 6), 5.0, 30),
            run(ymd(2024, 5, 6), 3.333, 20),
            run(ymd(2024, 5, 12), 12.0, 70),
        ];
        let days = engine(&records).daily_distances(ymd(2024, 5, 9));

        assert_eq!(days.len(), 7);
        assert_eq!(days[0].day, "Mon");
        assert_eq!(days[0].distance_km, 8.33);
        assert_eq!(days[6].day, "Sun");
        assert_eq!(days[6].date, ymd(2024, 5, 12));
        assert_eq!(days[6].distance_km, 12.0);
        assert!(days[1..6].iter().all(|d| d.distance_km == 0.0));
    }

    #[test]
    fn test_goal_progress_uses_configured_goal() {
        let records = [run(ymd(2024, 5, 6), 15.0, 80)];
        let progress = engine(&records)
            .with_weekly_goal(30.0)
            .goal_progress(ymd(2024, 5, 7));

        assert_eq!(progress.distance_km, 15.0);
        assert_eq!(progress.percent, 50.0);
    }

    #[test]
    fn test_empty_engine_is_all_zero() {
        let engine = MetricsEngine::new(std::iter::empty::<(NaiveDate, &RunRecord)>());
        let today = ymd(2024, 1, 1);

        assert_eq!(engine.latest_run_date(), None);
        assert_eq!(engine.reference_date(AnchorMode::LatestRecord, today), today);
        assert_eq!(engine.current_week(today).total_distance_km, 0.0);
        assert!(engine.rolling_weeks(today, 4).iter().all(|p| p.distance_km == 0.0));
        assert_eq!(engine.goal_progress(today).percent, 0.0);
    }
}
