//! # Tide Event Rendering
//!
//! Turns normalized events into display rows and prints them to the terminal,
//! either as a short table or as JSON. When the payload carries an hourly
//! height curve it can also be plotted as an ASCII chart.

use crate::clock;
use crate::height::format_height;
use crate::schedule::NormalizedTideEvent;
use crate::{HourlyTide, TideKind};
use chrono::{DateTime, Datelike, TimeZone, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Language and clock conventions for display strings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayLocale {
    /// `14:05`, `sam. 18`, "Marée haute"
    #[default]
    Fr,
    /// `2:05 PM`, `Sat 18`, "High tide"
    En,
}

impl DisplayLocale {
    fn kind_label(self, kind: TideKind) -> &'static str {
        match (self, kind) {
            (DisplayLocale::Fr, TideKind::High) => "Marée haute",
            (DisplayLocale::Fr, TideKind::Low) => "Marée basse",
            (DisplayLocale::En, TideKind::High) => "High tide",
            (DisplayLocale::En, TideKind::Low) => "Low tide",
        }
    }

    fn clock<Tz: TimeZone>(self, instant: &DateTime<Tz>) -> String
    where
        Tz::Offset: Display,
    {
        match self {
            DisplayLocale::Fr => instant.format("%H:%M").to_string(),
            DisplayLocale::En => instant.format("%-I:%M %p").to_string(),
        }
    }

    fn short_date<Tz: TimeZone>(self, instant: &DateTime<Tz>) -> String
    where
        Tz::Offset: Display,
    {
        match self {
            DisplayLocale::Fr => format!("{} {}", french_weekday(instant.weekday()), instant.day()),
            DisplayLocale::En => instant.format("%a %-d").to_string(),
        }
    }

    fn empty_message(self) -> &'static str {
        match self {
            DisplayLocale::Fr => "Aucune marée à venir",
            DisplayLocale::En => "No upcoming tides",
        }
    }
}

fn french_weekday(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "lun.",
        Weekday::Tue => "mar.",
        Weekday::Wed => "mer.",
        Weekday::Thu => "jeu.",
        Weekday::Fri => "ven.",
        Weekday::Sat => "sam.",
        Weekday::Sun => "dim.",
    }
}

/// One line of the upcoming-tides display.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TideRow {
    pub kind: TideKind,
    pub label: &'static str,
    pub time: String,
    pub date: String,
    pub height: String,
}

impl TideRow {
    /// Format one normalized event.
    ///
    /// The instant is already in the viewer's zone, so absolute timestamps
    /// show their stated time converted to local clock time.
    pub fn from_event<Tz: TimeZone>(
        event: &NormalizedTideEvent<Tz>,
        locale: DisplayLocale,
    ) -> Self
    where
        Tz::Offset: Display,
    {
        Self {
            kind: event.kind,
            label: locale.kind_label(event.kind),
            time: locale.clock(&event.instant),
            date: locale.short_date(&event.instant),
            height: format_height(event.height),
        }
    }
}

/// Format every event as a display row.
pub fn rows<Tz: TimeZone>(
    events: &[NormalizedTideEvent<Tz>],
    locale: DisplayLocale,
) -> Vec<TideRow>
where
    Tz::Offset: Display,
{
    events.iter().map(|event| TideRow::from_event(event, locale)).collect()
}

/// Render rows as an aligned text table.
pub fn render_table(rows: &[TideRow], offline: bool, locale: DisplayLocale) -> String {
    let mut out = String::new();

    if offline {
        out.push_str("⚠ OFFLINE\n\n");
    }

    if rows.is_empty() {
        out.push_str(locale.empty_message());
        out.push('\n');
        return out;
    }

    let label_width = rows.iter().map(|r| r.label.chars().count()).max().unwrap_or(0);
    let when_width = rows
        .iter()
        .map(|r| r.time.chars().count() + r.date.chars().count() + 3)
        .max()
        .unwrap_or(0);

    for row in rows {
        let arrow = match row.kind {
            TideKind::High => '↑',
            TideKind::Low => '↓',
        };
        let when = format!("{} - {}", row.time, row.date);
        out.push_str(&format!(
            "{} {:<label_width$}  {:<when_width$}  {:>6}\n",
            arrow, row.label, when, row.height
        ));
    }

    out
}

/// Print rows to stdout.
pub fn draw_table(rows: &[TideRow], offline: bool, locale: DisplayLocale) {
    print!("{}", render_table(rows, offline, locale));
}

/// Print rows to stdout as pretty JSON.
pub fn draw_json(rows: &[TideRow]) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(rows)?);
    Ok(())
}

/// Plot the hourly height curve as ASCII art.
///
/// One column per sample, highest water on the top row. The sample closest to
/// `now` is marked with `X`. Returns `None` when fewer than two samples have a
/// readable timestamp.
pub fn render_ascii<Tz: TimeZone>(hourly: &[HourlyTide], now: &DateTime<Tz>) -> Option<String> {
    const ROWS: usize = 12;
    const Y_AXIS_WIDTH: usize = 6; // Space for Y-axis labels

    let tz = now.timezone();
    let samples: Vec<(DateTime<Tz>, f64)> = hourly
        .iter()
        .filter(|h| h.height.is_finite())
        .filter_map(|h| clock::parse_absolute(&h.time, &tz).map(|t| (t, h.height)))
        .collect();

    if samples.len() < 2 {
        return None;
    }

    let (min_m, max_m) = samples
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), (_, h)| {
            (min.min(*h), max.max(*h))
        });
    let span = (max_m - min_m).max(f64::EPSILON);

    let height_to_row = |h: f64| {
        let normalized = (h - min_m) / span;
        ((1.0 - normalized) * (ROWS as f64 - 1.0)).round() as usize
    };

    let now_index = samples
        .iter()
        .enumerate()
        .min_by_key(|(_, (t, _))| (t.clone() - now.clone()).num_seconds().abs())
        .map(|(i, _)| i);

    let mut grid = vec![vec![' '; samples.len() + Y_AXIS_WIDTH]; ROWS];

    // Y-axis labels at top and bottom
    for (value, row) in [(max_m, 0), (min_m, ROWS - 1)] {
        let label = format!("{:<width$.1}", value, width = Y_AXIS_WIDTH - 1);
        for (i, ch) in label.chars().take(Y_AXIS_WIDTH - 1).enumerate() {
            grid[row][i] = ch;
        }
    }
    for row in grid.iter_mut() {
        row[Y_AXIS_WIDTH - 1] = '│';
    }

    for (column, (_, h)) in samples.iter().enumerate() {
        let row = height_to_row(*h);
        grid[row][column + Y_AXIS_WIDTH] = if Some(column) == now_index { 'X' } else { '•' };
    }

    let mut out = String::new();
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    Some(out)
}

/// Print the hourly curve to stdout, if there is one to plot.
pub fn draw_ascii<Tz: TimeZone>(hourly: &[HourlyTide], now: &DateTime<Tz>) {
    if let Some(chart) = render_ascii(hourly, now) {
        print!("{}", chart);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::TimeForm;
    use chrono::FixedOffset;

    fn tz() -> FixedOffset {
        FixedOffset::east_opt(2 * 3600).unwrap()
    }

    fn event(
        time: &str,
        form: TimeForm,
        instant: DateTime<FixedOffset>,
    ) -> NormalizedTideEvent<FixedOffset> {
        NormalizedTideEvent {
            kind: TideKind::High,
            height: Some(1.23),
            instant,
            original_time: time.to_string(),
            form,
        }
    }

    #[test]
    fn test_french_row() {
        // 2024-06-15 is a Saturday
        let instant = tz().with_ymd_and_hms(2024, 6, 15, 14, 5, 0).unwrap();
        let row = TideRow::from_event(&event("14h05", TimeForm::Bare, instant), DisplayLocale::Fr);

        assert_eq!(row.label, "Marée haute");
        assert_eq!(row.time, "14:05");
        assert_eq!(row.date, "sam. 15");
        assert_eq!(row.height, "1.23m");
    }

    #[test]
    fn test_english_row() {
        let instant = tz().with_ymd_and_hms(2024, 6, 15, 14, 5, 0).unwrap();
        let row = TideRow::from_event(&event("14h05", TimeForm::Bare, instant), DisplayLocale::En);

        assert_eq!(row.label, "High tide");
        assert_eq!(row.time, "2:05 PM");
        assert_eq!(row.date, "Sat 15");
    }

    #[test]
    fn test_absolute_row_shows_stated_clock() {
        let original = "2024-06-15T12:05:00Z";
        let instant = clock::parse_absolute(original, &tz()).unwrap();
        let absolute = event(original, TimeForm::Absolute, instant);
        let row = TideRow::from_event(&absolute, DisplayLocale::Fr);

        assert_eq!(row.time, "14:05");
    }

    #[test]
    fn test_absolute_row_uses_instant_not_original_text() {
        // Row follows the resolved instant even when the source text disagrees
        let instant = tz().with_ymd_and_hms(2024, 6, 16, 9, 30, 0).unwrap();
        let absolute = event("2024-06-15T12:05:00Z", TimeForm::Absolute, instant);
        let row = TideRow::from_event(&absolute, DisplayLocale::Fr);

        assert_eq!(row.time, "09:30");
        assert_eq!(row.date, "dim. 16");
    }

    #[test]
    fn test_unknown_height_placeholder() {
        let instant = tz().with_ymd_and_hms(2024, 6, 15, 14, 5, 0).unwrap();
        let mut unknown = event("14h05", TimeForm::Bare, instant);
        unknown.height = None;

        assert_eq!(TideRow::from_event(&unknown, DisplayLocale::Fr).height, "N/A");
    }

    #[test]
    fn test_table_rendering() {
        let instant = tz().with_ymd_and_hms(2024, 6, 15, 14, 5, 0).unwrap();
        let rows = rows(&[event("14h05", TimeForm::Bare, instant)], DisplayLocale::En);

        let table = render_table(&rows, false, DisplayLocale::En);
        assert!(table.starts_with('↑'));
        assert!(table.contains("2:05 PM - Sat 15"));
        assert!(table.contains("1.23m"));
        assert!(!table.contains("OFFLINE"));
    }

    #[test]
    fn test_table_offline_and_empty() {
        let table = render_table(&[], true, DisplayLocale::En);
        assert!(table.starts_with("⚠ OFFLINE"));
        assert!(table.contains("No upcoming tides"));
    }

    #[test]
    fn test_ascii_chart_marks_now() {
        let hourly: Vec<HourlyTide> = (0..6)
            .map(|h| HourlyTide {
                time: format!("2024-06-15T{:02}:00:00+02:00", h),
                height: [1.0, 2.0, 3.0, 4.0, 3.0, 2.0][h],
            })
            .collect();
        let now = tz().with_ymd_and_hms(2024, 6, 15, 3, 10, 0).unwrap();

        let chart = render_ascii(&hourly, &now).unwrap();
        let lines: Vec<&str> = chart.lines().collect();

        assert_eq!(lines.len(), 12);
        // Peak at 03:00 is nearest to now and sits on the top row
        assert!(lines[0].ends_with('X'));
        assert!(lines[0].starts_with("4.0"));
        assert!(lines[11].starts_with("1.0"));
    }

    #[test]
    fn test_ascii_chart_needs_two_samples() {
        let now = tz().with_ymd_and_hms(2024, 6, 15, 3, 0, 0).unwrap();
        let hourly = vec![HourlyTide {
            time: "2024-06-15T03:00:00+02:00".to_string(),
            height: 2.0,
        }];
        assert!(render_ascii(&hourly, &now).is_none());
    }
}
