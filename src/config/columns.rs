// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Column name aliases for the recognized run log fields
//!
//! Different exports of the same log name their columns differently
//! (`Distance` vs `Run`, `Minutes`/`Seconds` vs `Time`). Each recognized
//! field lists the header names it may appear under, in priority order.

use serde::{Deserialize, Serialize};

/// Header aliases per recognized field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub date: Vec<String>,
    pub distance: Vec<String>,
    pub minutes: Vec<String>,
    pub seconds: Vec<String>,
    pub time: Vec<String>,
    pub avg_pace: Vec<String>,
    pub avg_hr: Vec<String>,
    pub rpe: Vec<String>,
    pub notes: Vec<String>,
}

impl ColumnConfig {
    /// Every alias that maps to a recognized field
    pub fn recognized(&self) -> impl Iterator<Item = &str> {
        [
            &self.date,
            &self.distance,
            &self.minutes,
            &self.seconds,
            &self.time,
            &self.avg_pace,
            &self.avg_hr,
            &self.rpe,
            &self.notes,
        ]
        .into_iter()
        .flatten()
        .map(String::as_str)
    }

    /// Whether a header names one of the recognized fields
    pub fn is_recognized(&self, header: &str) -> bool {
        self.recognized()
            .any(|alias| alias.eq_ignore_ascii_case(header.trim()))
    }
}

fn aliases(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            date: aliases(&["Date"]),
            distance: aliases(&["Distance", "Run"]),
            minutes: aliases(&["Minutes"]),
            seconds: aliases(&["Seconds"]),
            time: aliases(&["Time"]),
            avg_pace: aliases(&["Avg Pace"]),
            avg_hr: aliases(&["Avg HR"]),
            rpe: aliases(&["RPE"]),
            notes: aliases(&["Notes"]),
        }
    }
}
