//! # Surf Tides Core Library
//!
//! This library turns the tide events published for a surf spot into a short,
//! chronologically ordered list of the next high and low tides.
//!
//! ## The Problem
//!
//! Upstream feeds are inconsistent. A single payload can mix:
//! - **Bare clock readings** such as `"0h29"` or `"14h05"`, with no date at all
//! - **Absolute timestamps** such as `"2024-06-16T14:05:00+02:00"`
//! - **Heights** given as numbers, as noisy strings (`"1,50 m"`), or as `"N/A"`
//!
//! Bare readings only make sense relative to their neighbours: a list that goes
//! `23h50`, `0h10` has crossed midnight, and the second event belongs to the next
//! calendar day.
//!
//! ## Data Flow
//! 1. **Fetch**: `tide_data` downloads (or loads cached) raw [`TideEvent`]s
//! 2. **Normalize**: `schedule` resolves every event to an absolute instant
//!    against one captured "now"
//! 3. **Select**: keep future events, ascending, capped at
//!    [`schedule::DEFAULT_UPCOMING_LIMIT`]
//! 4. **Render**: `renderer` formats rows for the terminal
//!
//! ## Core Types
//! - [`TideEvent`]: one raw record as delivered by the API
//! - [`RawHeight`]: the height union, resolved at the deserialization boundary
//! - [`TidePayload`]: either response shape of the tides endpoint
//! - [`TideReport`]: what the CLI renders, with an offline indicator

use serde::{Deserialize, Serialize};

// Module declarations
pub mod clock;
pub mod config;
pub mod fallback;
pub mod height;
pub mod renderer;
pub mod schedule;
pub mod tide_data;

pub use schedule::{normalize, upcoming, NormalizedTideEvent, DEFAULT_UPCOMING_LIMIT};

/// High or low water.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TideKind {
    High,
    Low,
}

/// Height of a tide event exactly as the feed encoded it.
///
/// JSON numbers become [`RawHeight::Number`], strings (including the `"N/A"`
/// sentinel) become [`RawHeight::Text`], and `null` or an absent field become
/// [`RawHeight::Missing`]. Turning this into a number is the job of
/// [`height::parse_height`].
///
/// # Example
/// ```
/// use surf_tides::RawHeight;
///
/// let h: RawHeight = serde_json::from_str("\"1,50 m\"").unwrap();
/// assert_eq!(h, RawHeight::Text("1,50 m".to_string()));
///
/// let h: RawHeight = serde_json::from_str("4.2").unwrap();
/// assert_eq!(h, RawHeight::Number(4.2));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawHeight {
    Number(f64),
    Text(String),
    #[default]
    Missing,
}

/// One tide event as delivered by the API.
///
/// `time` is either a bare clock reading (`"14h05"`) or an ISO-8601 timestamp.
///
/// # Example
/// ```
/// use surf_tides::{RawHeight, TideEvent, TideKind};
///
/// let event: TideEvent =
///     serde_json::from_str(r#"{"time":"23h50","height":4.2,"type":"high"}"#).unwrap();
///
/// assert_eq!(event.kind, TideKind::High);
/// assert_eq!(event.height, RawHeight::Number(4.2));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TideEvent {
    pub time: String,
    #[serde(default)]
    pub height: RawHeight,
    #[serde(rename = "type")]
    pub kind: TideKind,
}

impl TideEvent {
    /// Convenience constructor, mostly for tests and fixtures.
    pub fn new(time: impl Into<String>, kind: TideKind, height: RawHeight) -> Self {
        Self {
            time: time.into(),
            height,
            kind,
        }
    }
}

/// A water height sample from the hourly curve some payloads carry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HourlyTide {
    pub time: String,
    pub height: f64,
}

/// Body of `GET /api/spots/{id}/tides`.
///
/// Older deployments answer with a bare array of events; newer ones wrap the
/// events together with the hourly curve. Records are kept as raw JSON values
/// here so a single malformed one cannot fail the whole payload; see
/// [`TidePayload::events`] and [`TidePayload::hourly`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TidePayload {
    Events(Vec<serde_json::Value>),
    Data {
        #[serde(default)]
        events: Option<Vec<serde_json::Value>>,
        #[serde(default)]
        hourly: Option<Vec<serde_json::Value>>,
    },
}

impl TidePayload {
    /// Decode every well-formed event, dropping the rest.
    pub fn events(&self) -> Vec<TideEvent> {
        let raw = match self {
            TidePayload::Events(events) => events.as_slice(),
            TidePayload::Data { events, .. } => events.as_deref().unwrap_or_default(),
        };
        decode_each(raw, "tide event")
    }

    /// Hourly height curve, empty when the payload has none. Malformed
    /// samples are dropped.
    pub fn hourly(&self) -> Vec<HourlyTide> {
        match self {
            TidePayload::Events(_) => Vec::new(),
            TidePayload::Data { hourly, .. } => {
                decode_each(hourly.as_deref().unwrap_or_default(), "hourly tide")
            }
        }
    }
}

fn decode_each<T>(raw: &[serde_json::Value], what: &str) -> Vec<T>
where
    T: serde::de::DeserializeOwned,
{
    raw.iter()
        .filter_map(|value| match T::deserialize(value) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!(%err, record = %value, "skipping malformed {}", what);
                None
            }
        })
        .collect()
}

/// Decoded tide data ready for display.
///
/// When `offline = true` the events come from a stale cache (or nothing at
/// all) because the API could not be reached. The terminal output shows
/// "⚠ OFFLINE" so the user knows the list may be out of date.
///
/// # Example
/// ```
/// use surf_tides::{RawHeight, TideEvent, TideKind, TideReport};
///
/// let report = TideReport {
///     events: vec![TideEvent::new("6h12", TideKind::Low, RawHeight::Number(0.8))],
///     hourly: vec![],
///     offline: false,
/// };
///
/// assert_eq!(report.events.len(), 1);
/// assert!(!report.offline);
/// ```
#[derive(Clone, Debug, Default)]
pub struct TideReport {
    pub events: Vec<TideEvent>,
    pub hourly: Vec<HourlyTide>,
    /// True if served from the fallback instead of a live fetch
    pub offline: bool,
}

impl TideReport {
    /// Build a report from a decoded payload.
    pub fn from_payload(payload: &TidePayload, offline: bool) -> Self {
        Self {
            events: payload.events(),
            hourly: payload.hourly(),
            offline,
        }
    }
}
