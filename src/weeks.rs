// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Week Windows & Date Normalization
//!
//! Report weeks run Saturday through Friday. All window math takes an
//! explicit reference date so historical weeks can be reprocessed
//! without any process-wide "now" override.
//!
//! Date parsing tolerates the ledger's legacy spreadsheet formats:
//! ISO strings with trailing time parts, leading apostrophes from
//! text-formatted cells, and serial day counts since 1899-12-30.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// Inclusive Saturday-to-Friday week window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekWindow {
    /// The window containing `reference`, snapped back to Saturday.
    pub fn containing(reference: NaiveDate) -> Self {
        let offset = (reference.weekday().num_days_from_sunday() + 1) % 7;
        let start = reference - Duration::days(i64::from(offset));
        Self {
            start,
            end: start + Duration::days(6),
        }
    }

    /// The window `n` weeks before this one.
    pub fn weeks_back(&self, n: u32) -> Self {
        let start = self.start - Duration::days(7 * i64::from(n));
        Self {
            start,
            end: start + Duration::days(6),
        }
    }

    /// The trailing baseline span: the 4 weeks ending the day before
    /// this window starts.
    pub fn trend_window(&self) -> Self {
        Self {
            start: self.start - Duration::days(28),
            end: self.start - Duration::days(1),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Report header label, e.g. "WEEK OF 2025-06-14".
    pub fn label(&self) -> String {
        format!("WEEK OF {}", self.start.format("%Y-%m-%d"))
    }

    /// ISO week label, e.g. "Week 24".
    pub fn iso_label(&self) -> String {
        format!("Week {}", self.start.iso_week().week())
    }
}

impl fmt::Display for WeekWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

/// Strip the apostrophe spreadsheet cells prepend to force text storage.
pub fn strip_leading_apostrophe(value: &str) -> &str {
    value.strip_prefix('\'').unwrap_or(value)
}

/// Serial day count since 1899-12-30 (the spreadsheet epoch, shifted
/// for the 1900 leap-year bug) to a calendar date.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

/// Parse a date token in any of the tolerated ledger formats.
pub fn parse_date_token(raw: &str) -> Option<NaiveDate> {
    let token = strip_leading_apostrophe(raw.trim());
    if token.is_empty() {
        return None;
    }
    if token.len() >= 10 {
        if let Ok(date) = NaiveDate::parse_from_str(&token[..10], "%Y-%m-%d") {
            return Some(date);
        }
    }
    token.parse::<f64>().ok().and_then(serial_to_date)
}

/// Parse "HH:MM" or "HH:MM:SS" into minutes since midnight.
pub fn parse_time_to_minutes(raw: &str) -> Option<f64> {
    let mut parts = raw.trim().split(':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = match parts.next() {
        Some(s) => s.parse().ok()?,
        None => 0.0,
    };
    Some(hours * 60.0 + minutes + seconds / 60.0)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDate {
    Text(String),
    Serial(f64),
}

impl RawDate {
    fn resolve(&self) -> Option<NaiveDate> {
        match self {
            Self::Text(s) => parse_date_token(s),
            Self::Serial(n) => serial_to_date(*n),
        }
    }
}

/// Serde helper for required ledger date fields.
pub fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = RawDate::deserialize(deserializer)?;
    raw.resolve()
        .ok_or_else(|| serde::de::Error::custom("unparseable date value"))
}

/// Serde helper for optional ledger date fields.
pub fn deserialize_opt_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawDate>::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(value) => value
            .resolve()
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom("unparseable date value")),
    }
}

/// Default reporting reference: one week before `today`, so the most
/// recently finished week is scored rather than the in-progress one.
pub fn default_reference(today: NaiveDate) -> NaiveDate {
    today - Duration::days(7)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_snaps_back_to_saturday() {
        // 2025-06-18 is a Wednesday
        let window = WeekWindow::containing(date(2025, 6, 18));
        assert_eq!(window.start, date(2025, 6, 14));
        assert_eq!(window.end, date(2025, 6, 20));
        assert_eq!(window.start.weekday(), Weekday::Sat);
    }

    #[test]
    fn test_window_on_saturday_starts_same_day() {
        let window = WeekWindow::containing(date(2025, 6, 14));
        assert_eq!(window.start, date(2025, 6, 14));
    }

    #[test]
    fn test_window_on_friday_reaches_back_six_days() {
        let window = WeekWindow::containing(date(2025, 6, 13));
        assert_eq!(window.start, date(2025, 6, 7));
        assert_eq!(window.end, date(2025, 6, 13));
    }

    #[test]
    fn test_weeks_back_and_trend_window() {
        let window = WeekWindow::containing(date(2025, 6, 14));
        let prior = window.weeks_back(1);
        assert_eq!(prior.start, date(2025, 6, 7));
        assert_eq!(prior.end, date(2025, 6, 13));

        let trend = window.trend_window();
        assert_eq!(trend.start, date(2025, 5, 17));
        assert_eq!(trend.end, date(2025, 6, 13));
    }

    #[test]
    fn test_parse_date_token_iso_with_time_suffix() {
        assert_eq!(
            parse_date_token("2025-06-14T00:00:00"),
            Some(date(2025, 6, 14))
        );
    }

    #[test]
    fn test_parse_date_token_leading_apostrophe() {
        assert_eq!(parse_date_token("'2025-06-14"), Some(date(2025, 6, 14)));
    }

    #[test]
    fn test_parse_date_token_serial() {
        // 2025-06-14 is 45822 days after 1899-12-30
        assert_eq!(parse_date_token("45822"), Some(date(2025, 6, 14)));
        assert_eq!(serial_to_date(45822.0), Some(date(2025, 6, 14)));
    }

    #[test]
    fn test_parse_date_token_rejects_garbage() {
        assert_eq!(parse_date_token(""), None);
        assert_eq!(parse_date_token("not-a-date"), None);
    }

    #[test]
    fn test_parse_time_to_minutes() {
        assert_eq!(parse_time_to_minutes("23:30"), Some(1410.0));
        assert_eq!(parse_time_to_minutes("07:15:30"), Some(435.5));
        assert_eq!(parse_time_to_minutes("bad"), None);
    }

    #[test]
    fn test_default_reference_is_previous_week() {
        let reference = default_reference(date(2025, 6, 18));
        assert_eq!(reference, date(2025, 6, 11));
        let window = WeekWindow::containing(reference);
        assert_eq!(window.start, date(2025, 6, 7));
    }

    #[test]
    fn test_labels() {
        let window = WeekWindow::containing(date(2025, 6, 14));
        assert_eq!(window.label(), "WEEK OF 2025-06-14");
        assert!(window.iso_label().starts_with("Week "));
    }
}
