use chrono::{DateTime, NaiveDateTime, Timelike};
use tracing::debug;

/// Minutes in a day; the exclusive upper bound of [`minute_of_day`].
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Naive formats accepted for textual timestamps, tried in order.
///
/// ISO forms come first. Day-first forms precede the US month-first form
/// because device exports outside the US write dates day-first.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %I:%M:%S %p",
];

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse a textual timestamp into a wall-clock [`NaiveDateTime`].
///
/// RFC 3339 strings keep their local wall time and drop the offset; no
/// timezone conversion is applied. Returns `None` for empty strings or
/// unrecognised formats.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let normalised = if let Some(stripped) = s.strip_suffix('Z') {
        format!("{}+00:00", stripped)
    } else {
        s.to_string()
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
        return Some(dt.naive_local());
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive);
        }
    }

    debug!("could not parse timestamp \"{}\"", s);
    None
}

// ── Time-of-day coordinates ───────────────────────────────────────────────────

/// Minutes since midnight, seconds discarded. Always `< MINUTES_PER_DAY`.
pub fn minute_of_day(ts: &NaiveDateTime) -> u32 {
    ts.hour() * 60 + ts.minute()
}

/// Time of day in fractional hours, `hour + minute / 60`.
pub fn time_of_day(ts: &NaiveDateTime) -> f64 {
    minutes_to_hours(minute_of_day(ts))
}

/// Convert minutes since midnight to fractional hours.
pub fn minutes_to_hours(minutes: u32) -> f64 {
    f64::from(minutes / 60) + f64::from(minutes % 60) / 60.0
}

/// Format fractional hours as `HH:MM`, e.g. `8.5` → `"08:30"`.
pub fn format_time_of_day(hours: f64) -> String {
    let total = (hours * 60.0).round().max(0.0) as u32 % MINUTES_PER_DAY;
    format!("{:02}:{:02}", total / 60, total % 60)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
