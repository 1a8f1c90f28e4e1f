// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! CSV parsing into header-keyed rows
//!
//! Parsing is total: any text yields a (possibly empty) table. Quoted fields
//! may contain commas and newlines. Rows shorter than the header are padded
//! with empty cells and cells beyond the header are dropped.

use crate::models::RawRow;
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

/// Result of parsing a CSV document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCsv {
    /// Trimmed header names from the first line
    pub headers: Vec<String>,
    /// Data rows in source order
    pub rows: Vec<RawRow>,
}

impl ParsedCsv {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Parse CSV text whose first line is the header
pub fn parse_csv(text: &str) -> ParsedCsv {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut records = reader
        .records()
        .enumerate()
        .filter_map(|(position, result)| match result {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(record = position, error = %e, "Skipping unreadable CSV record");
                None
            }
        })
        .filter(|record| !is_blank(record));

    let headers: Vec<String> = match records.next() {
        Some(header) => header.iter().map(str::to_string).collect(),
        None => return ParsedCsv::default(),
    };

    let rows = records
        .map(|record| {
            let cells = headers
                .iter()
                .enumerate()
                .map(|(i, header)| (header.clone(), record.get(i).unwrap_or("").to_string()))
                .collect();
            RawRow::new(cells)
        })
        .collect();

    ParsedCsv { headers, rows }
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(str::is_empty) && record.len() <= 1
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Date,Distance,Minutes,Seconds,Avg Pace,Avg HR,RPE,Notes";

    #[test]
    fn test_rows_follow_source_order() {
        let text = format!(
            "{HEADER}\n2023-01-01,5.2,30,15,5:49,145,6,Easy\n2023-01-03,8.4,48,30,5:46,152,7,Hills\n"
        );
        let parsed = parse_csv(&text);

        assert_eq!(parsed.headers.len(), 8);
        assert_eq!(parsed.row_count(), 2);
        assert_eq!(parsed.rows[0].get("Date"), Some("2023-01-01"));
        assert_eq!(parsed.rows[1].get("Notes"), Some("Hills"));
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let text = format!("{HEADER}\n\n2023-01-01,5.2,30,15,,,,\n   \n\r\n2023-01-03,8.4,48,30,,,,\n");
        let parsed = parse_csv(&text);

        assert_eq!(parsed.row_count(), 2);
    }

    #[test]
    fn test_short_rows_are_padded_and_long_rows_truncated() {
        let text = "Date,Distance,Notes\n2023-01-01\n2023-01-02,4.0,Easy run, no pains\n";
        let parsed = parse_csv(text);

        assert_eq!(parsed.rows[0].get("Distance"), Some(""));
        assert_eq!(parsed.rows[0].get("Notes"), Some(""));
        assert_eq!(parsed.rows[1].get("Notes"), Some("Easy run"));
        assert_eq!(parsed.rows[1].len(), 3);
    }

    #[test]
    fn test_quoted_fields_keep_embedded_commas_and_newlines() {
        let text = "Date,Distance,Notes\n2023-01-01,5.0,\"Easy, then\nstrides\"\n";
        let parsed = parse_csv(text);

        assert_eq!(parsed.row_count(), 1);
        assert_eq!(parsed.rows[0].get("Notes"), Some("Easy, then\nstrides"));
    }

    #[test]
    fn test_cells_and_headers_are_trimmed() {
        let text = " Date , Distance \r\n 2023-01-01 , 5.0 \r\n";
        let parsed = parse_csv(text);

        assert_eq!(parsed.headers, vec!["Date", "Distance"]);
        assert_eq!(parsed.rows[0].get("Distance"), Some("5.0"));
    }

    #[test]
    fn test_empty_and_header_only_inputs_have_no_rows() {
        assert_eq!(parse_csv(""), ParsedCsv::default());
        assert_eq!(parse_csv("\n\n").row_count(), 0);

        let header_only = parse_csv(HEADER);
        assert_eq!(header_only.row_count(), 0);
        assert_eq!(header_only.headers.len(), 8);
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let parsed = parse_csv("\u{feff}Date,Distance\n2023-01-01,3.0\n");
        assert_eq!(parsed.rows[0].get("Date"), Some("2023-01-01"));
    }
}
