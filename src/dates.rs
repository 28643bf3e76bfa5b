//! Conversion between the timestamps a news site prints and absolute instants.
//!
//! Search result pages mix relative stamps ("5 minutes ago", "2 hours ago")
//! with calendar dates ("Jan. 5, 2024", "01/05/2024"). [`DateNormalizer`]
//! resolves all of them to a [`Timestamp`] in the local timezone, and builds
//! the [`DateWindow`] a scrape is bounded by.
//!
//! Grammars are tried in a fixed order and the first match wins:
//!
//! | # | Shape | Result |
//! |---|-------|--------|
//! | 1 | `<N> minute(s) ago` | now minus N minutes |
//! | 2 | `<N> hour(s) ago` | now minus N hours |
//! | 3 | `<Mon>[letters][.] <day>, <yyyy>` | that day, 00:00 |
//! | 4 | `MM/DD/YYYY` | that day, 00:00 |
//! | 5 | empty | depends on [`EmptyDatePolicy`] |

use chrono::{DateTime, Datelike, Local, Months, NaiveDate, NaiveTime, TimeDelta};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{debug, warn};

use crate::config::EmptyDatePolicy;
use crate::error::DateFormatError;

/// An absolute, timezone-resolved point in time.
pub type Timestamp = DateTime<Local>;

static MINUTES_AGO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d+) minutes? ago\b").unwrap());
static HOURS_AGO: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(\d+) hours? ago\b").unwrap());
static MONTH_DAY_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Za-z]{3})[A-Za-z]*\.? (0?[1-9]|[12][0-9]|3[01]), ([0-9]{4})\b").unwrap()
});
static SLASH_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(0?[1-9]|1[0-2])/(0?[1-9]|[12][0-9]|3[01])/([0-9]{4})$").unwrap()
});

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Separator placed between month, day and year by [`display_string`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateSeparator {
    #[default]
    Slash,
    Dash,
}

/// Format a timestamp as `MM/DD/YYYY` or `MM-DD-YYYY`, optionally followed by
/// `_HH-MM-SS`.
pub fn display_string(timestamp: &Timestamp, separator: DateSeparator, include_time: bool) -> String {
    let format = match (separator, include_time) {
        (DateSeparator::Slash, false) => "%m/%d/%Y",
        (DateSeparator::Dash, false) => "%m-%d-%Y",
        (DateSeparator::Slash, true) => "%m/%d/%Y_%H-%M-%S",
        (DateSeparator::Dash, true) => "%m-%d-%Y_%H-%M-%S",
    };
    timestamp.format(format).to_string()
}

/// The inclusive range of publication instants a scrape keeps.
///
/// `start` is the older bound. `end` is the more recent bound, pushed to the
/// last representable instant of its calendar day so that a window naming a
/// single day covers all of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    start: Timestamp,
    end: Timestamp,
}

impl DateWindow {
    /// Build a window from two bounds given in either order.
    pub fn new(first: Timestamp, second: Timestamp) -> Self {
        let (start, end) = if second < first {
            (second, first)
        } else {
            (first, second)
        };
        Self {
            start,
            end: end_of_day(end),
        }
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn end(&self) -> Timestamp {
        self.end
    }

    pub fn contains(&self, instant: &Timestamp) -> bool {
        self.start <= *instant && *instant <= self.end
    }
}

fn end_of_day(timestamp: Timestamp) -> Timestamp {
    timestamp
        .date_naive()
        .and_hms_nano_opt(23, 59, 59, 999_999_999)
        .and_then(|naive| naive.and_local_timezone(Local).latest())
        .unwrap_or(timestamp)
}

fn start_of_day(date: NaiveDate, original: &str) -> Result<Timestamp, DateFormatError> {
    date.and_time(NaiveTime::MIN)
        .and_local_timezone(Local)
        .earliest()
        .ok_or_else(|| DateFormatError::InvalidDate(original.to_string()))
}

/// Parses site timestamps according to the grammar table in the module docs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateNormalizer {
    empty_policy: EmptyDatePolicy,
}

impl DateNormalizer {
    pub fn new(empty_policy: EmptyDatePolicy) -> Self {
        Self { empty_policy }
    }

    pub fn empty_policy(&self) -> EmptyDatePolicy {
        self.empty_policy
    }

    /// Parse `text` relative to the current wall-clock time.
    pub fn parse(&self, text: &str) -> Result<Timestamp, DateFormatError> {
        self.parse_at(text, Local::now())
    }

    /// Parse `text`, resolving relative stamps against `now`.
    pub fn parse_at(&self, text: &str, now: Timestamp) -> Result<Timestamp, DateFormatError> {
        let trimmed = text.trim();

        if let Some(caps) = MINUTES_AGO.captures(trimmed) {
            let minutes = amount(&caps, text)?;
            return TimeDelta::try_minutes(minutes)
                .and_then(|delta| now.checked_sub_signed(delta))
                .ok_or_else(|| DateFormatError::InvalidDate(text.to_string()));
        }

        if let Some(caps) = HOURS_AGO.captures(trimmed) {
            let hours = amount(&caps, text)?;
            return TimeDelta::try_hours(hours)
                .and_then(|delta| now.checked_sub_signed(delta))
                .ok_or_else(|| DateFormatError::InvalidDate(text.to_string()));
        }

        if let Some(caps) = MONTH_DAY_YEAR.captures(trimmed) {
            let month = month_number(&caps[1])
                .ok_or_else(|| DateFormatError::Unrecognized(text.to_string()))?;
            let date = calendar_date(&caps[3], month, &caps[2], text)?;
            return start_of_day(date, text);
        }

        if let Some(caps) = SLASH_DATE.captures(trimmed) {
            let month: u32 = caps[1]
                .parse()
                .map_err(|_| DateFormatError::Unrecognized(text.to_string()))?;
            let date = calendar_date(&caps[3], month, &caps[2], text)?;
            return start_of_day(date, text);
        }

        if trimmed.is_empty() {
            return match self.empty_policy {
                EmptyDatePolicy::Reject => Err(DateFormatError::Empty),
                EmptyDatePolicy::Now => {
                    warn!("empty date string; substituting the current time");
                    Ok(now)
                }
            };
        }

        debug!(text, "no date grammar matched");
        Err(DateFormatError::Unrecognized(text.to_string()))
    }

    /// Parse two bound strings into a window, regardless of their order.
    pub fn normalize_window(&self, first: &str, second: &str) -> Result<DateWindow, DateFormatError> {
        self.normalize_window_at(first, second, Local::now())
    }

    pub fn normalize_window_at(
        &self,
        first: &str,
        second: &str,
        now: Timestamp,
    ) -> Result<DateWindow, DateFormatError> {
        let first = self.parse_at(first, now)?;
        let second = self.parse_at(second, now)?;
        Ok(DateWindow::new(first, second))
    }
}

fn amount(caps: &Captures<'_>, original: &str) -> Result<i64, DateFormatError> {
    caps[1]
        .parse()
        .map_err(|_| DateFormatError::InvalidDate(original.to_string()))
}

fn month_number(name: &str) -> Option<u32> {
    let name = name.to_ascii_lowercase();
    MONTH_ABBREVIATIONS
        .iter()
        .position(|abbr| *abbr == name)
        .map(|idx| idx as u32 + 1)
}

fn calendar_date(year: &str, month: u32, day: &str, original: &str) -> Result<NaiveDate, DateFormatError> {
    let invalid = || DateFormatError::InvalidDate(original.to_string());
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let day: u32 = day.parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// First and last day of a span of `months` calendar months ending with the
/// month containing `today`. `0` and `1` both mean the current month only.
pub fn month_window(months: u32, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let first_of_month = today.with_day(1)?;
    let start = first_of_month.checked_sub_months(Months::new(months.saturating_sub(1)))?;
    let end = first_of_month.checked_add_months(Months::new(1))?.pred_opt()?;
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn noon(year: i32, month: u32, day: u32) -> Timestamp {
        Local.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    fn normalizer() -> DateNormalizer {
        DateNormalizer::default()
    }

    #[test]
    fn test_minutes_ago() {
        let now = noon(2024, 3, 10);
        assert_eq!(
            normalizer().parse_at("5 minutes ago", now).unwrap(),
            now - TimeDelta::minutes(5)
        );
        assert_eq!(
            normalizer().parse_at("1 minute ago", now).unwrap(),
            now - TimeDelta::minutes(1)
        );
    }

    #[test]
    fn test_hours_ago() {
        let now = noon(2024, 3, 10);
        assert_eq!(
            normalizer().parse_at("2 hours ago", now).unwrap(),
            now - TimeDelta::hours(2)
        );
        assert_eq!(
            normalizer().parse_at("1 hour ago", now).unwrap(),
            now - TimeDelta::hours(1)
        );
    }

    #[test]
    fn test_relative_parse_uses_wall_clock() {
        let before = Local::now();
        let parsed = normalizer().parse("3 minutes ago").unwrap();
        let after = Local::now();
        assert!(parsed >= before - TimeDelta::minutes(3));
        assert!(parsed <= after - TimeDelta::minutes(3));
    }

    #[test]
    fn test_month_day_year_variants_agree() {
        let now = noon(2024, 3, 10);
        let expected = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        for text in ["Jan 5, 2024", "Jan. 5, 2024", "January 5, 2024", "jan 05, 2024"] {
            let parsed = normalizer().parse_at(text, now).unwrap();
            assert_eq!(parsed.date_naive(), expected, "{text}");
            assert_eq!(parsed.time(), NaiveTime::MIN, "{text}");
        }
    }

    #[test]
    fn test_september_long_abbreviation() {
        let parsed = normalizer().parse_at("Sept. 30, 2023", noon(2024, 1, 1)).unwrap();
        assert_eq!(parsed.date_naive(), NaiveDate::from_ymd_opt(2023, 9, 30).unwrap());
    }

    #[test]
    fn test_slash_dates() {
        let now = noon(2024, 3, 10);
        let expected = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(normalizer().parse_at("1/5/2024", now).unwrap().date_naive(), expected);
        assert_eq!(normalizer().parse_at("01/05/2024", now).unwrap().date_naive(), expected);
    }

    #[test]
    fn test_slash_date_rejects_bad_shapes() {
        let now = noon(2024, 3, 10);
        assert_eq!(
            normalizer().parse_at("13/01/2024", now),
            Err(DateFormatError::Unrecognized("13/01/2024".to_string()))
        );
        assert_eq!(
            normalizer().parse_at("1/5/24", now),
            Err(DateFormatError::Unrecognized("1/5/24".to_string()))
        );
        assert_eq!(
            normalizer().parse_at("02/30/2024", now),
            Err(DateFormatError::InvalidDate("02/30/2024".to_string()))
        );
    }

    #[test]
    fn test_unknown_month_is_unrecognized() {
        assert_eq!(
            normalizer().parse_at("Foo 5, 2024", noon(2024, 1, 1)),
            Err(DateFormatError::Unrecognized("Foo 5, 2024".to_string()))
        );
    }

    #[test]
    fn test_garbage_is_unrecognized() {
        assert_eq!(
            normalizer().parse_at("yesterday", noon(2024, 1, 1)),
            Err(DateFormatError::Unrecognized("yesterday".to_string()))
        );
    }

    #[test]
    fn test_minutes_take_priority() {
        let now = noon(2024, 3, 10);
        let parsed = normalizer().parse_at("3 minutes ago", now).unwrap();
        assert_eq!(parsed, now - TimeDelta::minutes(3));
    }

    #[test]
    fn test_empty_rejected_by_default() {
        let now = noon(2024, 3, 10);
        assert_eq!(normalizer().parse_at("", now), Err(DateFormatError::Empty));
        assert_eq!(normalizer().parse_at("   ", now), Err(DateFormatError::Empty));
    }

    #[test]
    fn test_empty_as_now_policy() {
        let now = noon(2024, 3, 10);
        let lenient = DateNormalizer::new(EmptyDatePolicy::Now);
        assert_eq!(lenient.parse_at("", now), Ok(now));
    }

    #[test]
    fn test_display_strings() {
        let ts = Local.with_ymd_and_hms(2024, 1, 5, 8, 9, 10).unwrap();
        assert_eq!(display_string(&ts, DateSeparator::Slash, false), "01/05/2024");
        assert_eq!(display_string(&ts, DateSeparator::Dash, false), "01-05-2024");
        assert_eq!(display_string(&ts, DateSeparator::Slash, true), "01/05/2024_08-09-10");
        assert_eq!(display_string(&ts, DateSeparator::Dash, true), "01-05-2024_08-09-10");
    }

    #[test]
    fn test_normalize_window_is_commutative() {
        let now = noon(2024, 3, 10);
        let a = normalizer().normalize_window_at("01/05/2024", "Feb 1, 2024", now).unwrap();
        let b = normalizer().normalize_window_at("Feb 1, 2024", "01/05/2024", now).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.start().date_naive(), NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(a.end().date_naive(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }

    #[test]
    fn test_window_end_is_last_instant_of_day() {
        let now = noon(2024, 3, 10);
        let window = normalizer().normalize_window_at("2 hours ago", "01/05/2024", now).unwrap();
        let end = window.end();
        assert_eq!((end.hour(), end.minute(), end.second()), (23, 59, 59));
        assert_eq!(end.nanosecond(), 999_999_999);
        assert_eq!(end.date_naive(), now.date_naive());
    }

    #[test]
    fn test_same_day_window_covers_whole_day() {
        let now = noon(2024, 3, 10);
        let window = normalizer().normalize_window_at("01/05/2024", "01/05/2024", now).unwrap();
        assert!(window.contains(&Local.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap()));
        assert!(window.contains(&Local.with_ymd_and_hms(2024, 1, 5, 23, 59, 59).unwrap()));
        assert!(!window.contains(&Local.with_ymd_and_hms(2024, 1, 6, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_window_rejects_bad_bound() {
        let err = normalizer()
            .normalize_window_at("01/05/2024", "soon", noon(2024, 3, 10))
            .unwrap_err();
        assert_eq!(err, DateFormatError::Unrecognized("soon".to_string()));
    }

    #[test]
    fn test_month_window_current_month() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let expected = (
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        );
        assert_eq!(month_window(1, today), Some(expected));
        assert_eq!(month_window(0, today), Some(expected));
    }

    #[test]
    fn test_month_window_spans_back() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let (start, end) = month_window(3, today).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
    }

    #[test]
    fn test_month_window_leap_february_and_year_wrap() {
        let (_, end) = month_window(1, NaiveDate::from_ymd_opt(2024, 2, 10).unwrap()).unwrap();
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let (start, _) = month_window(2, NaiveDate::from_ymd_opt(2024, 1, 20).unwrap()).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2023, 12, 1).unwrap());
    }
}
