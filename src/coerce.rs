//! Cell coercion
//!
//! Bad numeric or date cells never fail a load: numerics fall back to `0.0`
//! and dates to `None`. Every non-blank cell that had to be defaulted is
//! recorded as a [`CoercionWarning`] so the load can report it.
//!
//! Slash dates are read month-first. A slash date that is not a valid
//! month-first date (`15/01/2024`) is read day-first.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%b-%Y",
    "%B %d, %Y",
];

/// A single cell that could not be parsed and was defaulted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoercionWarning {
    pub source_name: String,
    pub field: &'static str,
    /// 1-based line in the source, header included.
    pub line: u64,
    pub raw: String,
}

/// Per-field count of coercion warnings for one load.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoercionReport {
    pub counts: BTreeMap<String, usize>,
}

impl CoercionReport {
    pub fn record(&mut self, warning: CoercionWarning) {
        debug!(
            source = %warning.source_name,
            field = warning.field,
            line = warning.line,
            raw = %warning.raw,
            "coerced unparsable cell to default"
        );
        *self
            .counts
            .entry(format!("{}.{}", warning.source_name, warning.field))
            .or_insert(0) += 1;
    }

    pub fn merge(&mut self, other: CoercionReport) {
        for (key, count) in other.counts {
            *self.counts.entry(key).or_insert(0) += count;
        }
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Emit one summary line if anything was coerced.
    pub fn log_summary(&self) {
        if !self.is_empty() {
            warn!(total = self.total(), fields = ?self.counts, "cells coerced to defaults during load");
        }
    }
}

/// Parse a numeric cell. Blank, unparsable and non-finite input all yield
/// `None`. Callers substitute `0.0`.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a date or timestamp cell in any of the accepted layouts.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_local());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Turns raw cells into typed values for one source, recording warnings.
pub struct Coercer<'a> {
    source_name: &'a str,
    report: CoercionReport,
}

impl<'a> Coercer<'a> {
    pub fn new(source_name: &'a str) -> Self {
        Self {
            source_name,
            report: CoercionReport::default(),
        }
    }

    pub fn numeric(&mut self, field: &'static str, line: u64, raw: &str) -> f64 {
        match parse_numeric(raw) {
            Some(value) => value,
            None => {
                self.note_if_present(field, line, raw);
                0.0
            }
        }
    }

    pub fn datetime(&mut self, field: &'static str, line: u64, raw: &str) -> Option<NaiveDateTime> {
        let parsed = parse_datetime(raw);
        if parsed.is_none() {
            self.note_if_present(field, line, raw);
        }
        parsed
    }

    fn note_if_present(&mut self, field: &'static str, line: u64, raw: &str) {
        if raw.trim().is_empty() {
            return;
        }
        self.report.record(CoercionWarning {
            source_name: self.source_name.to_string(),
            field,
            line,
            raw: raw.to_string(),
        });
    }

    pub fn finish(self) -> CoercionReport {
        self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_numeric() {
        assert_eq!(parse_numeric("12.5"), Some(12.5));
        assert_eq!(parse_numeric(" 3 "), Some(3.0));
        assert_eq!(parse_numeric("-4"), Some(-4.0));
        assert_eq!(parse_numeric(""), None);
        assert_eq!(parse_numeric("$10"), None);
        assert_eq!(parse_numeric("NaN"), None);
        assert_eq!(parse_numeric("inf"), None);
    }

    #[test]
    fn test_parse_datetime_layouts() {
        let iso = parse_datetime("2024-01-15").unwrap();
        assert_eq!((iso.year(), iso.month(), iso.day()), (2024, 1, 15));

        let with_time = parse_datetime("2024-03-02 14:30:00").unwrap();
        assert_eq!(with_time.hour(), 14);

        let us = parse_datetime("02/03/2024").unwrap();
        assert_eq!((us.month(), us.day()), (2, 3));

        let day_first = parse_datetime("15/01/2024").unwrap();
        assert_eq!((day_first.year(), day_first.month(), day_first.day()), (2024, 1, 15));
        let day_first_time = parse_datetime("31/12/2023 18:45").unwrap();
        assert_eq!((day_first_time.month(), day_first_time.day(), day_first_time.hour()), (12, 31, 18));
        assert!(parse_datetime("31/31/2024").is_none());

        let rfc = parse_datetime("2024-06-01T08:00:00+02:00").unwrap();
        assert_eq!(rfc.hour(), 8);

        assert!(parse_datetime("15-Jan-2024").is_some());
        assert!(parse_datetime("not a date").is_none());
        assert!(parse_datetime("2024-13-45").is_none());
        assert!(parse_datetime("").is_none());
    }

    #[test]
    fn test_coercer_counts_only_non_blank_failures() {
        let mut coercer = Coercer::new("orders");
        assert_eq!(coercer.numeric("quantity", 2, "abc"), 0.0);
        assert_eq!(coercer.numeric("quantity", 3, ""), 0.0);
        assert_eq!(coercer.numeric("quantity", 4, "7"), 7.0);
        assert!(coercer.datetime("order_date", 5, "yesterday").is_none());

        let report = coercer.finish();
        assert_eq!(report.total(), 2);
        assert_eq!(report.counts.get("orders.quantity"), Some(&1));
        assert_eq!(report.counts.get("orders.order_date"), Some(&1));
    }
}
