//! Wall-clock parsing and rendering.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Hour (24h) used as the anchor when the ceremony time cannot be parsed.
pub const FALLBACK_CEREMONY_HOUR: u32 = 12;

/// Parse a wall-clock string.
///
/// Formats are tried in order and the first match wins:
/// `4:30 PM`, `4 PM`, `16:30`. Matching is case-insensitive and ignores
/// surrounding whitespace.
pub fn parse_clock_time(input: &str) -> Option<NaiveTime> {
    let s = input.trim().to_ascii_uppercase();
    if s.is_empty() {
        return None;
    }

    NaiveTime::parse_from_str(&s, "%I:%M %p")
        .ok()
        .or_else(|| parse_hour_meridiem(&s))
        .or_else(|| NaiveTime::parse_from_str(&s, "%H:%M").ok())
}

/// `4 PM` style: an hour with no minutes. chrono refuses to build a time
/// without a minute field, so this one is parsed by hand.
fn parse_hour_meridiem(s: &str) -> Option<NaiveTime> {
    let (hour, pm) = if let Some(h) = s.strip_suffix("AM") {
        (h, false)
    } else if let Some(h) = s.strip_suffix("PM") {
        (h, true)
    } else {
        return None;
    };

    let hour: u32 = hour.trim().parse().ok()?;
    if !(1..=12).contains(&hour) {
        return None;
    }
    let hour = match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, false) => h,
        (h, true) => h + 12,
    };
    NaiveTime::from_hms_opt(hour, 0, 0)
}

/// The ceremony start as an absolute instant on the event date.
///
/// Unparseable input degrades to noon instead of failing.
pub fn ceremony_anchor(event_date: NaiveDate, ceremony_time: &str) -> NaiveDateTime {
    let time = parse_clock_time(ceremony_time).unwrap_or_else(|| {
        tracing::debug!(
            ceremony_time,
            "unrecognised ceremony time, anchoring at noon"
        );
        NaiveTime::from_hms_opt(FALLBACK_CEREMONY_HOUR, 0, 0).unwrap_or_default()
    });
    event_date.and_time(time)
}

/// Render an instant as `4:30 PM` (no leading zero on the hour).
pub fn render_clock(at: NaiveDateTime) -> String {
    at.format("%-I:%M %p").to_string()
}
