// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Data Models
//!
//! Core data structures shared by the aggregation pipeline.
//!
//! ## Design Principles
//!
//! - **Header driven**: [`RawRow`] keeps whatever columns the CSV header declares
//! - **Explicit schema**: [`RunRecord`] has a fixed set of recognized fields
//! - **Observable coercion**: every numeric field carries a [`FieldStatus`] so
//!   "genuinely zero" and "unparseable, treated as zero" stay distinguishable
//!
//! ## Core Models
//!
//! - [`RawRow`]: One CSV data line keyed by header name
//! - [`RunRecord`]: A normalized run
//! - [`Measured`]: A numeric value plus how it was obtained
//! - [`RunDate`]: Raw date text plus its parsed calendar date
//! - [`RunDuration`]: Elapsed time from `Minutes`/`Seconds` or a clock string

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One CSV data line, keyed positionally by the header line
///
/// Cells keep the header order. Lookup is exact first and then
/// case-insensitive, so `avg hr` still finds an `Avg HR` column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    cells: Vec<(String, String)>,
}

impl RawRow {
    /// Build a row from header/value pairs
    pub fn new(cells: Vec<(String, String)>) -> Self {
        Self { cells }
    }

    /// Value of the named column, if the header declared it
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(header, _)| header == column)
            .or_else(|| {
                self.cells
                    .iter()
                    .find(|(header, _)| header.eq_ignore_ascii_case(column))
            })
            .map(|(_, value)| value.as_str())
    }

    /// First non-empty value among several column aliases
    pub fn first_present<S: AsRef<str>>(&self, aliases: &[S]) -> Option<&str> {
        aliases
            .iter()
            .filter_map(|alias| self.get(alias.as_ref()))
            .find(|value| !value.is_empty())
    }

    /// Column headers in declaration order
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(header, _)| header.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// How a field value was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    /// The cell held a valid value
    Parsed,
    /// The cell was absent or empty
    Missing,
    /// The cell held text that could not be read; the value defaulted to zero
    Unparseable,
}

/// A numeric field together with its [`FieldStatus`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measured<T> {
    pub value: T,
    pub status: FieldStatus,
}

impl<T: Default> Measured<T> {
    pub fn parsed(value: T) -> Self {
        Self {
            value,
            status: FieldStatus::Parsed,
        }
    }

    pub fn missing() -> Self {
        Self {
            value: T::default(),
            status: FieldStatus::Missing,
        }
    }

    pub fn unparseable() -> Self {
        Self {
            value: T::default(),
            status: FieldStatus::Unparseable,
        }
    }

    /// Whether the source cell had any content at all
    pub fn is_present(&self) -> bool {
        self.status != FieldStatus::Missing
    }

    /// Whether the value is a zero default rather than a reading
    pub fn is_defaulted(&self) -> bool {
        self.status != FieldStatus::Parsed
    }
}

/// Date of a run: the raw cell text plus the parsed calendar date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunDate {
    pub raw: String,
    pub parsed: Option<NaiveDate>,
}

impl RunDate {
    pub fn is_present(&self) -> bool {
        !self.raw.is_empty()
    }
}

/// Elapsed time of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunDuration {
    /// Separate `Minutes` and `Seconds` columns
    Split {
        minutes: Measured<u32>,
        seconds: Measured<u32>,
    },
    /// A single clock string such as `1:02:30` or `50:00`
    Clock {
        raw: String,
        total_minutes: Measured<f64>,
    },
    /// No duration recorded
    Missing,
}

impl RunDuration {
    /// Combined duration in minutes (`minutes + seconds / 60`)
    pub fn total_minutes(&self) -> f64 {
        match self {
            Self::Split { minutes, seconds } => {
                f64::from(minutes.value) + f64::from(seconds.value) / 60.0
            }
            Self::Clock { total_minutes, .. } => total_minutes.value,
            Self::Missing => 0.0,
        }
    }

    /// Whether any duration value was recorded
    pub fn is_present(&self) -> bool {
        match self {
            Self::Split { minutes, seconds } => minutes.is_present() || seconds.is_present(),
            Self::Clock { .. } => true,
            Self::Missing => false,
        }
    }
}

/// A normalized run record
///
/// Opaque display fields (`avg_pace`, `avg_heart_rate`, `rpe`, `notes`) are
/// carried through untouched; `None` means the cell was empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Zero-based position among the data rows
    pub index: usize,
    pub date: RunDate,
    pub distance_km: Measured<f64>,
    pub duration: RunDuration,
    pub avg_pace: Option<String>,
    pub avg_heart_rate: Option<String>,
    pub rpe: Option<String>,
    pub notes: Option<String>,
}

impl RunRecord {
    /// A record is valid when it has both a date and some distance value
    pub fn is_valid(&self) -> bool {
        self.date.is_present() && self.distance_km.is_present()
    }

    /// The date used for calendar aggregation
    ///
    /// `None` for invalid records and for dates that failed to parse.
    pub fn aggregation_date(&self) -> Option<NaiveDate> {
        if self.is_valid() {
            self.date.parsed
        } else {
            None
        }
    }

    pub fn distance(&self) -> f64 {
        self.distance_km.value
    }

    pub fn total_minutes(&self) -> f64 {
        self.duration.total_minutes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        RawRow::new(
            pairs
                .iter()
                .map(|(h, v)| (h.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_raw_row_lookup_falls_back_to_case_insensitive() {
        let row = row(&[("Date", "2023-01-01"), ("Avg HR", "145")]);

        assert_eq!(row.get("Date"), Some("2023-01-01"));
        assert_eq!(row.get("avg hr"), Some("145"));
        assert_eq!(row.get("Notes"), None);
        assert_eq!(row.headers().collect::<Vec<_>>(), vec!["Date", "Avg HR"]);
    }

    #[test]
    fn test_first_present_skips_empty_aliases() {
        let row = row(&[("Distance", ""), ("Run", "5.5")]);

        assert_eq!(row.first_present(&["Distance", "Run"]), Some("5.5"));
        assert_eq!(row.first_present(&["Missing"]), None);
    }

    #[test]
    fn test_split_duration_combines_minutes_and_seconds() {
        let duration = RunDuration::Split {
            minutes: Measured::parsed(30),
            seconds: Measured::parsed(15),
        };

        assert_eq!(duration.total_minutes(), 30.25);
        assert!(duration.is_present());
        assert_eq!(RunDuration::Missing.total_minutes(), 0.0);
    }

    #[test]
    fn test_measured_status_flags() {
        let zero = Measured::parsed(0.0_f64);
        let bad = Measured::<f64>::unparseable();
        let empty = Measured::<f64>::missing();

        assert!(zero.is_present() && !zero.is_defaulted());
        assert!(bad.is_present() && bad.is_defaulted());
        assert!(!empty.is_present() && empty.is_defaulted());
        assert_eq!(bad.value, zero.value);
    }

    #[test]
    fn test_invalid_record_has_no_aggregation_date() {
        let record = RunRecord {
            index: 0,
            date: RunDate {
                raw: "2023-01-01".to_string(),
                parsed: NaiveDate::from_ymd_opt(2023, 1, 1),
            },
            distance_km: Measured::missing(),
            duration: RunDuration::Missing,
            avg_pace: None,
            avg_heart_rate: None,
            rpe: None,
            notes: None,
        };

        assert!(!record.is_valid());
        assert_eq!(record.aggregation_date(), None);
    }
}
