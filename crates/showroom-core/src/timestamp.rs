//! # Timestamps
//!
//! Lenient parsing of the backend's timestamp strings and the month
//! windows used by dashboard trends.
//!
//! The backend mixes RFC 3339 strings (`2024-03-05T10:00:00+05:30`) with
//! naive ones (`2024-03-05T10:00:00.123456`). Naive strings are read as the
//! caller's wall-clock time, which is how a browser reads them. Anything that
//! does not parse is `None`, never a panic.

use chrono::{DateTime, Datelike, FixedOffset, Months, NaiveDate, NaiveDateTime, NaiveTime};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses a server timestamp into wall-clock time at `offset`.
pub fn parse_local(raw: &str, offset: FixedOffset) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&offset).naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&offset).naive_local());
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::default()))
}

// =============================================================================
// Month Windows
// =============================================================================

/// Which reporting bucket a timestamp falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthBucket {
    /// `[month_start, now)`
    Current,
    /// `[previous_month_start, month_start)`
    Previous,
}

/// Month-to-date and previous-month boundaries for a given `now`.
///
/// ```text
///   previous_start          current_start            now
///        │◄──── Previous ────►│◄──── Current ────────►│
///   ─────┼────────────────────┼───────────────────────┼──────► time
///     Feb 1 00:00          Mar 1 00:00          Mar 17 14:05
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub previous_start: NaiveDateTime,
    pub current_start: NaiveDateTime,
    pub now: NaiveDateTime,
}

impl MonthWindow {
    /// Builds the window around `now` in the caller's own offset.
    pub fn containing(now: DateTime<FixedOffset>) -> Self {
        let local_now = now.naive_local();
        let today = local_now.date();
        let first_of_month = today.with_day(1).unwrap_or(today);
        let first_of_previous = first_of_month
            .checked_sub_months(Months::new(1))
            .unwrap_or(first_of_month);

        MonthWindow {
            previous_start: first_of_previous.and_time(NaiveTime::default()),
            current_start: first_of_month.and_time(NaiveTime::default()),
            now: local_now,
        }
    }

    /// `(year, month)` the window reports on.
    pub fn reporting_month(&self) -> (i32, u32) {
        (self.current_start.year(), self.current_start.month())
    }

    /// Classifies a wall-clock timestamp.
    pub fn bucket(&self, at: NaiveDateTime) -> Option<MonthBucket> {
        if at >= self.current_start && at < self.now {
            Some(MonthBucket::Current)
        } else if at >= self.previous_start && at < self.current_start {
            Some(MonthBucket::Previous)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(5 * 3600 + 1800).unwrap()
    }

    fn at(raw: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_parse_naive_and_fractional() {
        assert_eq!(parse_local("2024-03-05T10:00:00", ist()), Some(at("2024-03-05 10:00:00")));
        assert_eq!(
            parse_local("2024-03-05T10:00:00.123456", ist()).map(|d| d.date()),
            Some(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
        );
        assert_eq!(parse_local("2024-03-05", ist()), Some(at("2024-03-05 00:00:00")));
    }

    #[test]
    fn test_parse_offset_converts_to_wall_clock() {
        // 20:00 UTC is 01:30 the next day in IST.
        assert_eq!(parse_local("2024-02-29T20:00:00Z", ist()), Some(at("2024-03-01 01:30:00")));
        assert_eq!(parse_local("2024-02-29T20:00:00+0000", ist()), Some(at("2024-03-01 01:30:00")));
    }

    #[test]
    fn test_parse_garbage_is_none() {
        assert_eq!(parse_local("", ist()), None);
        assert_eq!(parse_local("yesterday", ist()), None);
        assert_eq!(parse_local("2024-13-40", ist()), None);
    }

    #[test]
    fn test_month_window_january_rolls_back_a_year() {
        let now = DateTime::parse_from_rfc3339("2024-01-17T09:00:00+05:30").unwrap();
        let window = MonthWindow::containing(now);
        assert_eq!(window.current_start, at("2024-01-01 00:00:00"));
        assert_eq!(window.previous_start, at("2023-12-01 00:00:00"));
        assert_eq!(window.reporting_month(), (2024, 1));
    }

    #[test]
    fn test_bucket_boundaries() {
        let now = DateTime::parse_from_rfc3339("2024-03-17T14:05:00+05:30").unwrap();
        let window = MonthWindow::containing(now);

        assert_eq!(window.bucket(at("2024-03-01 00:00:00")), Some(MonthBucket::Current));
        assert_eq!(window.bucket(at("2024-02-29 23:59:59")), Some(MonthBucket::Previous));
        assert_eq!(window.bucket(at("2024-02-01 00:00:00")), Some(MonthBucket::Previous));
        assert_eq!(window.bucket(at("2024-01-31 23:59:59")), None);
        assert_eq!(window.bucket(at("2024-03-17 14:05:00")), None);
    }
}
