// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Calendar bucketing of run records into ISO weeks and calendar months
//!
//! Weeks are keyed by (ISO week-year, ISO week number), never by calendar
//! year, so the days of a week that straddles New Year land in one bucket.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::models::RunRecord;

/// A calendar period records can be grouped by
pub trait CalendarPeriod: Copy + Ord + fmt::Display {
    /// The period containing `date`
    fn containing(date: NaiveDate) -> Self;

    /// First day of the period
    fn start(&self) -> NaiveDate;
}

/// ISO-8601 week identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IsoWeekKey {
    pub iso_year: i32,
    pub week: u32,
}

impl CalendarPeriod for IsoWeekKey {
    fn containing(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        Self {
            iso_year: iso.year(),
            week: iso.week(),
        }
    }

    fn start(&self) -> NaiveDate {
        // Week 1 always contains January 4th
        let jan4 = NaiveDate::from_ymd_opt(self.iso_year, 1, 4).unwrap_or_default();
        week_start(jan4) + Duration::weeks(i64::from(self.week) - 1)
    }
}

impl fmt::Display for IsoWeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.iso_year, self.week)
    }
}

/// Calendar month identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl CalendarPeriod for MonthKey {
    fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    fn start(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Monday of the ISO week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// First day of the month containing `date`
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Aggregation cell for one calendar period
///
/// Totals accumulate in source order as records are absorbed; members keep
/// that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket<K> {
    pub key: K,
    pub start: NaiveDate,
    pub total_distance_km: f64,
    pub total_minutes: f64,
    pub members: Vec<RunRecord>,
}

pub type WeekBucket = Bucket<IsoWeekKey>;
pub type MonthBucket = Bucket<MonthKey>;

impl<K: CalendarPeriod> Bucket<K> {
    fn open(key: K) -> Self {
        Self {
            key,
            start: key.start(),
            total_distance_km: 0.0,
            total_minutes: 0.0,
            members: Vec::new(),
        }
    }

    fn absorb(&mut self, record: &RunRecord) {
        self.total_distance_km += record.distance();
        self.total_minutes += record.total_minutes();
        self.members.push(record.clone());
    }

    pub fn run_count(&self) -> usize {
        self.members.len()
    }
}

/// Group dated records by period, sorted by period start ascending
pub fn bucket_by<'a, K, I>(records: I) -> Vec<Bucket<K>>
where
    K: CalendarPeriod,
    I: IntoIterator<Item = (NaiveDate, &'a RunRecord)>,
{
    let mut buckets: BTreeMap<K, Bucket<K>> = BTreeMap::new();

    for (date, record) in records {
        let key = K::containing(date);
        buckets
            .entry(key)
            .or_insert_with(|| Bucket::open(key))
            .absorb(record);
    }

    let mut ordered: Vec<Bucket<K>> = buckets.into_values().collect();
    ordered.sort_by_key(|bucket| bucket.start);
    ordered
}

pub fn bucket_by_week<'a, I>(records: I) -> Vec<WeekBucket>
where
    I: IntoIterator<Item = (NaiveDate, &'a RunRecord)>,
{
    bucket_by(records)
}

pub fn bucket_by_month<'a, I>(records: I) -> Vec<MonthBucket>
where
    I: IntoIterator<Item = (NaiveDate, &'a RunRecord)>,
{
    bucket_by(records)
}
