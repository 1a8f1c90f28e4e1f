// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Record normalization: raw CSV rows to typed run records
//!
//! Numeric fields use parse-or-zero semantics. A cell that cannot be read
//! contributes zero to totals but is flagged [`FieldStatus::Unparseable`],
//! never an error. Rows without a date or without any distance value stay
//! in the log but are not valid for aggregation.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::config::ColumnConfig;
use crate::models::{FieldStatus, Measured, RawRow, RunDate, RunDuration, RunRecord};

/// Date-only formats tried after ISO-8601, most specific first
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%A, %b %d, %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Every row of a log, normalized, in source order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedLog {
    pub records: Vec<RunRecord>,
}

/// Counts describing how rows fared during normalization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationSummary {
    pub rows: usize,
    pub valid: usize,
    /// Valid records whose date parsed and can be bucketed
    pub dated: usize,
    pub excluded: usize,
    pub unparseable_dates: usize,
    pub defaulted_distances: usize,
}

impl NormalizedLog {
    /// Records with both a date and a distance value
    pub fn valid(&self) -> impl Iterator<Item = &RunRecord> {
        self.records.iter().filter(|record| record.is_valid())
    }

    /// Valid records paired with their calendar date
    pub fn dated(&self) -> impl Iterator<Item = (NaiveDate, &RunRecord)> {
        self.records
            .iter()
            .filter_map(|record| record.aggregation_date().map(|date| (date, record)))
    }

    pub fn summary(&self) -> NormalizationSummary {
        let valid: Vec<&RunRecord> = self.valid().collect();
        let dated = valid.iter().filter(|r| r.date.parsed.is_some()).count();

        NormalizationSummary {
            rows: self.records.len(),
            valid: valid.len(),
            dated,
            excluded: self.records.len() - valid.len(),
            unparseable_dates: valid.len() - dated,
            defaulted_distances: valid
                .iter()
                .filter(|r| r.distance_km.status == FieldStatus::Unparseable)
                .count(),
        }
    }
}

/// Normalize every row of a parsed table
pub fn normalize_rows(rows: &[RawRow], columns: &ColumnConfig) -> NormalizedLog {
    NormalizedLog {
        records: rows
            .iter()
            .enumerate()
            .map(|(index, row)| normalize_row(row, index, columns))
            .collect(),
    }
}

/// Normalize a single row
pub fn normalize_row(row: &RawRow, index: usize, columns: &ColumnConfig) -> RunRecord {
    let raw_date = row.first_present(&columns.date).unwrap_or_default();

    RunRecord {
        index,
        date: RunDate {
            raw: raw_date.to_string(),
            parsed: parse_run_date(raw_date),
        },
        distance_km: parse_distance(row.first_present(&columns.distance)),
        duration: read_duration(row, columns),
        avg_pace: text_field(row, &columns.avg_pace),
        avg_heart_rate: text_field(row, &columns.avg_hr),
        rpe: text_field(row, &columns.rpe),
        notes: text_field(row, &columns.notes),
    }
}

fn text_field(row: &RawRow, aliases: &[String]) -> Option<String> {
    row.first_present(aliases).map(str::to_string)
}

fn read_duration(row: &RawRow, columns: &ColumnConfig) -> RunDuration {
    let minutes = row.first_present(&columns.minutes);
    let seconds = row.first_present(&columns.seconds);

    if minutes.is_some() || seconds.is_some() {
        return RunDuration::Split {
            minutes: parse_whole(minutes),
            seconds: parse_whole(seconds),
        };
    }

    match row.first_present(&columns.time) {
        Some(raw) => RunDuration::Clock {
            raw: raw.to_string(),
            total_minutes: parse_clock_minutes(raw),
        },
        None => RunDuration::Missing,
    }
}

/// Parse a date cell
///
/// ISO-8601 dates and date-times come first, then common locale renderings
/// such as `01/05/2023` (month first) or `Jan 5, 2023`. Date-times keep the
/// calendar date they were written with.
pub fn parse_run_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.date_naive());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|datetime| datetime.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        })
}

/// Parse a distance in kilometers; a trailing `km` unit is accepted
pub fn parse_distance(raw: Option<&str>) -> Measured<f64> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Measured::missing();
    };

    let number = raw
        .strip_suffix("km")
        .or_else(|| raw.strip_suffix("KM"))
        .unwrap_or(raw)
        .trim();

    match number.parse::<f64>() {
        Ok(km) if km.is_finite() && km >= 0.0 => Measured::parsed(km),
        _ => Measured::unparseable(),
    }
}

/// Parse a whole number of minutes or seconds; fractions are truncated
pub fn parse_whole(raw: Option<&str>) -> Measured<u32> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Measured::missing();
    };

    if let Ok(whole) = raw.parse::<u32>() {
        return Measured::parsed(whole);
    }

    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 && value < f64::from(u32::MAX) => {
            Measured::parsed(value.trunc() as u32)
        }
        _ => Measured::unparseable(),
    }
}

/// Convert a clock string to minutes
///
/// `H:MM:SS` is hours, minutes, seconds; `M:SS` is minutes and seconds; a
/// bare number is minutes.
pub fn parse_clock_minutes(raw: &str) -> Measured<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Measured::missing();
    }

    let parts: Option<Vec<f64>> = raw
        .split(':')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite() && *value >= 0.0)
        })
        .collect();

    match parts.as_deref() {
        Some([minutes]) => Measured::parsed(*minutes),
        Some([minutes, seconds]) => Measured::parsed(minutes + seconds / 60.0),
        Some([hours, minutes, seconds]) => Measured::parsed(hours * 60.0 + minutes + seconds / 60.0),
        _ => Measured::unparseable(),
    }
}
