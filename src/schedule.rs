//! # Tide Event Scheduling
//!
//! Resolves a raw, mixed-format list of tide events into absolute instants and
//! selects the ones still ahead.
//!
//! ## Day Resolution
//!
//! Bare readings such as `"0h10"` never say which day they belong to. The feed
//! is assumed to list events in chronological order, so the list is walked
//! once while tracking a running day offset from the anchor day (local midnight
//! of `now`):
//!
//! - A reading more than [`ROLLOVER_THRESHOLD_MINUTES`] earlier than the one
//!   before it means the list crossed midnight: the offset advances by one day.
//! - A reading at most that much earlier is upstream jitter and stays on the
//!   same day.
//! - An absolute timestamp resets the offset to its own calendar day, so bare
//!   readings following it continue from that day.
//! - A resolved instant still more than 24 hours behind `now` is moved one day
//!   forward. This catches a first reading that is yesterday's leftover.
//!
//! Shuffling the input breaks this: day assignment depends on the order the
//! feed delivers events in.
//!
//! ## Determinism
//!
//! `now` is an argument. Nothing here reads the system clock, so the same
//! events and the same `now` always produce the same output.

use chrono::{DateTime, Duration, TimeZone};

use crate::clock::{self, ClockReading, TimeForm};
use crate::height::parse_height;
use crate::{TideEvent, TideKind};

/// Number of upcoming events shown by default.
pub const DEFAULT_UPCOMING_LIMIT: usize = 4;

/// A backwards jump larger than this between consecutive bare readings is a
/// midnight crossing.
pub const ROLLOVER_THRESHOLD_MINUTES: u32 = 60;

/// A tide event pinned to an absolute instant.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedTideEvent<Tz: TimeZone> {
    pub kind: TideKind,
    /// Metres, `None` when the feed value could not be read
    pub height: Option<f64>,
    pub instant: DateTime<Tz>,
    pub original_time: String,
    pub form: TimeForm,
}

/// Running state of the day-offset walk.
#[derive(Debug, Default)]
struct DayTracker {
    offset: i64,
    previous_minutes: Option<u32>,
}

impl DayTracker {
    /// Record a bare reading and return the day offset it belongs to.
    fn observe(&mut self, reading: ClockReading) -> i64 {
        let minutes = reading.minute_of_day();
        if let Some(previous) = self.previous_minutes {
            if minutes + ROLLOVER_THRESHOLD_MINUTES < previous {
                self.offset += 1;
            }
        }
        self.previous_minutes = Some(minutes);
        self.offset
    }
}

/// Resolves events one by one against a fixed `now`.
struct Resolver<Tz: TimeZone> {
    now: DateTime<Tz>,
    anchor: DateTime<Tz>,
    days: DayTracker,
}

impl<Tz: TimeZone> Resolver<Tz> {
    fn new(now: DateTime<Tz>) -> Option<Self> {
        let anchor = clock::start_of_day(&now)?;
        Some(Self {
            now,
            anchor,
            days: DayTracker::default(),
        })
    }

    fn resolve(&mut self, event: &TideEvent) -> Option<NormalizedTideEvent<Tz>> {
        let form = TimeForm::classify(&event.time);
        let instant = match form {
            TimeForm::Absolute => self.resolve_absolute(&event.time),
            TimeForm::Bare => self.resolve_bare(&event.time),
        }?;

        Some(NormalizedTideEvent {
            kind: event.kind,
            height: parse_height(&event.height),
            instant,
            original_time: event.time.clone(),
            form,
        })
    }

    fn resolve_absolute(&mut self, time: &str) -> Option<DateTime<Tz>> {
        let instant = clock::parse_absolute(time, &self.now.timezone())?;
        self.days.offset = clock::day_offset(&self.anchor, &instant);
        Some(instant)
    }

    fn resolve_bare(&mut self, time: &str) -> Option<DateTime<Tz>> {
        let reading = clock::parse_bare_clock(time)?;
        let offset = self.days.observe(reading);

        let instant = clock::at_reading(&self.anchor, offset, reading)?;
        if instant < self.now.clone() - Duration::days(1) {
            return clock::at_reading(&self.anchor, offset + 1, reading);
        }
        Some(instant)
    }
}

/// Resolve every event against `now` and sort ascending by instant.
///
/// Events whose time cannot be parsed are dropped. Past events are kept; see
/// [`upcoming`] for the display selection. Ties keep their input order.
///
/// # Example
/// ```
/// use chrono::{FixedOffset, TimeZone};
/// use surf_tides::{normalize, RawHeight, TideEvent, TideKind};
///
/// let tz = FixedOffset::east_opt(3600).unwrap();
/// let now = tz.with_ymd_and_hms(2024, 6, 16, 23, 0, 0).unwrap();
/// let events = vec![
///     TideEvent::new("23h50", TideKind::High, RawHeight::Number(4.2)),
///     TideEvent::new("0h10", TideKind::Low, RawHeight::Number(0.5)),
/// ];
///
/// let resolved = normalize(&events, &now);
/// assert_eq!(resolved[1].instant.to_rfc3339(), "2024-06-17T00:10:00+01:00");
/// ```
pub fn normalize<Tz: TimeZone>(
    events: &[TideEvent],
    now: &DateTime<Tz>,
) -> Vec<NormalizedTideEvent<Tz>> {
    let Some(mut resolver) = Resolver::new(now.clone()) else {
        return Vec::new();
    };

    let mut resolved: Vec<_> = events
        .iter()
        .filter_map(|event| resolver.resolve(event))
        .collect();
    resolved.sort_by(|a, b| a.instant.cmp(&b.instant));
    resolved
}

/// The next `limit` events at or after `now`, ascending.
///
/// Never fails: empty or entirely malformed input gives an empty list.
pub fn upcoming<Tz: TimeZone>(
    events: &[TideEvent],
    now: &DateTime<Tz>,
    limit: usize,
) -> Vec<NormalizedTideEvent<Tz>> {
    normalize(events, now)
        .into_iter()
        .filter(|event| event.instant >= *now)
        .take(limit)
        .collect()
}
