//! # Tide Time Parsing
//!
//! The `time` field of a tide event comes in two forms:
//!
//! - **Absolute**: an ISO-8601 timestamp (`"2024-06-16T14:05:00+02:00"`). Any
//!   string containing `T` or `-` is treated this way.
//! - **Bare**: a clock reading with no date, written the French way with a
//!   literal `h` between hours and minutes (`"0h29"`, `"14h05"`). The reading
//!   may be embedded in longer text; the first match wins.
//!
//! Both parsers return `Option`: a string that cannot be understood yields
//! `None` and the caller drops the event.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// How an event's `time` string is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeForm {
    /// ISO-8601 timestamp carrying its own date
    Absolute,
    /// `Hh MM` clock reading with no date
    Bare,
}

impl TimeForm {
    /// Classify a raw `time` string.
    pub fn classify(time: &str) -> Self {
        if time.contains('T') || time.contains('-') {
            TimeForm::Absolute
        } else {
            TimeForm::Bare
        }
    }
}

/// A time of day read from a bare clock string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockReading {
    pub hour: u32,
    pub minute: u32,
}

impl ClockReading {
    /// Minutes since midnight.
    pub fn minute_of_day(self) -> u32 {
        self.hour * 60 + self.minute
    }

    fn naive_time(self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0)
    }
}

/// Find the first `H[H]hMM` reading in `time`.
///
/// Hours take one or two digits, minutes exactly two. Readings outside
/// `0h00..=23h59` are rejected.
///
/// # Example
/// ```
/// use surf_tides::clock::{parse_bare_clock, ClockReading};
///
/// assert_eq!(parse_bare_clock("0h29"), Some(ClockReading { hour: 0, minute: 29 }));
/// assert_eq!(parse_bare_clock("PM 14h05"), Some(ClockReading { hour: 14, minute: 5 }));
/// assert_eq!(parse_bare_clock("garbage"), None);
/// ```
pub fn parse_bare_clock(time: &str) -> Option<ClockReading> {
    static BARE_CLOCK: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"([0-9]{1,2})h([0-9]{2})").expect("valid regex"));

    let caps = BARE_CLOCK.captures(time)?;
    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;

    (hour < 24 && minute < 60).then_some(ClockReading { hour, minute })
}

/// Parse an absolute timestamp into the viewer's time zone.
///
/// Accepted, in order:
/// 1. RFC 3339 with an offset or `Z` (`2024-06-16T14:05:00+02:00`)
/// 2. A naive date-time, interpreted in `tz` (`2024-06-16T14:05`, seconds and
///    fractions optional, `T` or space separator)
/// 3. A bare date, taken as UTC midnight (`2024-06-16`)
pub fn parse_absolute<Tz: TimeZone>(time: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    let time = time.trim();

    if let Ok(instant) = DateTime::parse_from_rfc3339(time) {
        return Some(instant.with_timezone(tz));
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(time, fmt).ok())
    {
        return resolve_local(tz, naive);
    }

    NaiveDate::parse_from_str(time, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| Utc.from_utc_datetime(&midnight).with_timezone(tz))
}

/// Map a wall-clock date-time onto `tz`.
///
/// Ambiguous readings (clocks going back) take the earlier instant. Readings
/// inside a gap (clocks going forward) are pushed one hour later.
pub fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
}

/// Local midnight starting the calendar day of `now`.
pub fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let midnight = now.date_naive().and_hms_opt(0, 0, 0)?;
    resolve_local(&now.timezone(), midnight)
}

/// Wall-clock instant `days` after `anchor`'s date at the given reading.
pub fn at_reading<Tz: TimeZone>(
    anchor: &DateTime<Tz>,
    days: i64,
    reading: ClockReading,
) -> Option<DateTime<Tz>> {
    let date = anchor.date_naive().checked_add_signed(Duration::days(days))?;
    resolve_local(&anchor.timezone(), date.and_time(reading.naive_time()?))
}

/// Whole calendar days from `anchor`'s date to `instant`'s local date.
pub fn day_offset<Tz: TimeZone>(anchor: &DateTime<Tz>, instant: &DateTime<Tz>) -> i64 {
    (instant.date_naive() - anchor.date_naive()).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, FixedOffset, Timelike};
    use chrono_tz::Europe::Paris;

    fn paris() -> FixedOffset {
        FixedOffset::east_opt(2 * 3600).unwrap()
    }

    #[test]
    fn test_classify() {
        assert_eq!(TimeForm::classify("2024-06-16T14:05:00Z"), TimeForm::Absolute);
        assert_eq!(TimeForm::classify("2024-06-16"), TimeForm::Absolute);
        assert_eq!(TimeForm::classify("14h05"), TimeForm::Bare);
        assert_eq!(TimeForm::classify("garbage"), TimeForm::Bare);
    }

    #[test]
    fn test_parse_bare_clock_variants() {
        assert_eq!(parse_bare_clock("9h07"), Some(ClockReading { hour: 9, minute: 7 }));
        assert_eq!(parse_bare_clock("09h07"), Some(ClockReading { hour: 9, minute: 7 }));
        assert_eq!(parse_bare_clock("23h50"), Some(ClockReading { hour: 23, minute: 50 }));
        // Leftmost match inside a longer digit run
        assert_eq!(parse_bare_clock("123h45"), Some(ClockReading { hour: 23, minute: 45 }));
        // Extra minute digits are ignored
        assert_eq!(parse_bare_clock("7h305"), Some(ClockReading { hour: 7, minute: 30 }));
    }

    #[test]
    fn test_parse_bare_clock_rejects() {
        assert_eq!(parse_bare_clock("garbage"), None);
        assert_eq!(parse_bare_clock("14:05"), None);
        assert_eq!(parse_bare_clock("14h5"), None);
        assert_eq!(parse_bare_clock("h05"), None);
        assert_eq!(parse_bare_clock("25h00"), None);
        assert_eq!(parse_bare_clock("12h75"), None);
        assert_eq!(parse_bare_clock(""), None);
    }

    #[test]
    fn test_minute_of_day() {
        assert_eq!(ClockReading { hour: 23, minute: 50 }.minute_of_day(), 1430);
        assert_eq!(ClockReading { hour: 0, minute: 10 }.minute_of_day(), 10);
    }

    #[test]
    fn test_parse_absolute_with_offset() {
        let instant = parse_absolute("2024-06-16T12:05:00Z", &paris()).unwrap();
        assert_eq!(instant.hour(), 14);
        assert_eq!(instant.minute(), 5);
        assert_eq!(instant.day(), 16);
    }

    #[test]
    fn test_parse_absolute_naive_is_local() {
        let instant = parse_absolute("2024-06-16T14:05", &paris()).unwrap();
        assert_eq!(instant.hour(), 14);
        assert_eq!(instant.to_rfc3339(), "2024-06-16T14:05:00+02:00");

        let spaced = parse_absolute("2024-06-16 14:05:30", &paris()).unwrap();
        assert_eq!(spaced.minute(), 5);
    }

    #[test]
    fn test_parse_absolute_date_only_is_utc_midnight() {
        let instant = parse_absolute("2024-06-16", &paris()).unwrap();
        assert_eq!(instant.to_rfc3339(), "2024-06-16T02:00:00+02:00");
    }

    #[test]
    fn test_parse_absolute_garbage() {
        assert!(parse_absolute("2024-13-45T99:00", &paris()).is_none());
        assert!(parse_absolute("not-a-date", &paris()).is_none());
    }

    #[test]
    fn test_day_arithmetic() {
        let now = paris().with_ymd_and_hms(2024, 6, 16, 23, 0, 0).unwrap();
        let midnight = start_of_day(&now).unwrap();
        assert_eq!(midnight.to_rfc3339(), "2024-06-16T00:00:00+02:00");

        let next = at_reading(&midnight, 1, ClockReading { hour: 0, minute: 10 }).unwrap();
        assert_eq!(next.to_rfc3339(), "2024-06-17T00:10:00+02:00");
        assert_eq!(day_offset(&midnight, &next), 1);
    }

    #[test]
    fn test_leftmost_reading_wins_even_if_out_of_range() {
        assert_eq!(parse_bare_clock("99h99 / 14h05"), None);
        assert_eq!(
            parse_bare_clock("BM 6h12 PM 18h40"),
            Some(ClockReading { hour: 6, minute: 12 })
        );
    }

    #[test]
    fn test_spring_forward_gap_moves_one_hour_later() {
        // 2024-03-31: Paris clocks jump from 02:00 to 03:00
        let anchor = Paris.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap();
        let reading = parse_bare_clock("2h30").unwrap();

        let instant = at_reading(&anchor, 0, reading).unwrap();
        assert_eq!(instant.to_rfc3339(), "2024-03-31T03:30:00+02:00");
    }

    #[test]
    fn test_fall_back_overlap_takes_earlier_instant() {
        // 2024-10-27: Paris clocks go back from 03:00 to 02:00
        let naive = NaiveDate::from_ymd_opt(2024, 10, 27)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();

        let instant = resolve_local(&Paris, naive).unwrap();
        assert_eq!(instant.to_rfc3339(), "2024-10-27T02:30:00+02:00");
    }

    #[test]
    fn test_day_offset_across_dst_change() {
        let anchor = Paris.with_ymd_and_hms(2024, 3, 30, 0, 0, 0).unwrap();
        let next = at_reading(&anchor, 1, ClockReading { hour: 12, minute: 0 }).unwrap();

        assert_eq!(next.to_rfc3339(), "2024-03-31T12:00:00+02:00");
        assert_eq!(day_offset(&anchor, &next), 1);
    }
}
