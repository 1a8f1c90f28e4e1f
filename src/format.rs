// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Render-ready labels for dates and durations

use chrono::NaiveDate;

use crate::constants::display;
use crate::models::{RunDate, RunDuration};

/// `Xh Ym`, rounded to the nearest minute
pub fn format_minutes(minutes: f64) -> String {
    let total = if minutes.is_finite() && minutes > 0.0 {
        minutes.round() as u64
    } else {
        0
    };
    format!("{}h {}m", total / 60, total % 60)
}

/// `Sunday, Jan 1, 2023`
pub fn long_date(date: NaiveDate) -> String {
    date.format("%A, %b %-d, %Y").to_string()
}

/// `01 Jan 2023`
pub fn table_date(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string()
}

/// `Jan 2`, used for week-start chart labels
pub fn short_date(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// Table date when the date parsed, otherwise the raw cell text
pub fn run_date_label(date: &RunDate) -> String {
    match date.parsed {
        Some(parsed) => table_date(parsed),
        None if date.raw.is_empty() => display::NOT_AVAILABLE.to_string(),
        None => date.raw.clone(),
    }
}

/// `30m 15s` for split columns, the clock text as written, or `-`
pub fn duration_label(duration: &RunDuration) -> String {
    match duration {
        RunDuration::Split { minutes, seconds } => format!("{}m {}s", minutes.value, seconds.value),
        RunDuration::Clock { raw, .. } => raw.clone(),
        RunDuration::Missing => display::NOT_AVAILABLE.to_string(),
    }
}

/// The text itself, or `-` when absent
pub fn or_not_available(value: Option<&str>) -> String {
    value.unwrap_or(display::NOT_AVAILABLE).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Measured;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(78.75), "1h 19m");
        assert_eq!(format_minutes(45.2), "0h 45m");
        assert_eq!(format_minutes(119.6), "2h 0m");
        assert_eq!(format_minutes(0.0), "0h 0m");
        assert_eq!(format_minutes(f64::NAN), "0h 0m");
    }

    #[test]
    fn test_date_labels() {
        assert_eq!(long_date(ymd(2023, 1, 1)), "Sunday, Jan 1, 2023");
        assert_eq!(table_date(ymd(2023, 1, 5)), "05 Jan 2023");
        assert_eq!(short_date(ymd(2023, 1, 2)), "Jan 2");
    }

    #[test]
    fn test_run_date_label_keeps_unparsed_text() {
        let unparsed = RunDate {
            raw: "sometime in May".to_string(),
            parsed: None,
        };
        let empty = RunDate {
            raw: String::new(),
            parsed: None,
        };

        assert_eq!(run_date_label(&unparsed), "sometime in May");
        assert_eq!(run_date_label(&empty), "-");
    }

    #[test]
    fn test_duration_label() {
        let split = RunDuration::Split {
            minutes: Measured::parsed(30),
            seconds: Measured::parsed(15),
        };
        let clock = RunDuration::Clock {
            raw: "1:02:30".to_string(),
            total_minutes: Measured::parsed(62.5),
        };

        assert_eq!(duration_label(&split), "30m 15s");
        assert_eq!(duration_label(&clock), "1:02:30");
        assert_eq!(duration_label(&RunDuration::Missing), "-");
        assert_eq!(or_not_available(None), "-");
    }
}
