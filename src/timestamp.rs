//! Timestamp normalization for stored log rows.
//!
//! Every stored timestamp is rendered in one time zone with a fixed-width
//! layout, which is what lets the query layer filter and sort on the raw
//! text column.

use chrono::{
    DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Offset, TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;

/// Layout of every stored timestamp, e.g. `2024-06-01T08:00:00.000000-04:00`.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f%:z";

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTimestamp {
    pub input: String,
}

impl std::fmt::Display for InvalidTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid timestamp format: {}", self.input)
    }
}

impl std::error::Error for InvalidTimestamp {}

/// Parse an ISO-8601 timestamp and express it in `zone`.
///
/// A trailing `Z` means UTC. Values without an offset are read as local
/// time in `zone`; a bare date means midnight. Instants that would not fit
/// the canonical layout are rejected: years outside 1..=9999, leap seconds
/// and offsets with a seconds part such as New York's pre-1883 LMT.
pub fn parse(raw: &str, zone: &Tz) -> Result<DateTime<Tz>, InvalidTimestamp> {
    parse_any(raw.trim(), zone)
        .filter(fits_canonical)
        .ok_or_else(|| InvalidTimestamp {
            input: raw.to_string(),
        })
}

fn parse_any(trimmed: &str, zone: &Tz) -> Option<DateTime<Tz>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(zone));
    }

    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(trimmed, fmt).ok())
    {
        return Some(dt.with_timezone(zone));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .and_then(|naive| zone.from_local_datetime(&naive).earliest())
}

fn fits_canonical(dt: &DateTime<Tz>) -> bool {
    (1..=9999).contains(&dt.year())
        && dt.nanosecond() < 1_000_000_000
        && dt.offset().fix().local_minus_utc() % 60 == 0
}

pub fn to_canonical(dt: &DateTime<Tz>) -> String {
    dt.format(CANONICAL_FORMAT).to_string()
}

/// Parse a client timestamp and re-render it in the canonical layout.
pub fn normalize(raw: &str, zone: &Tz) -> Result<String, InvalidTimestamp> {
    parse(raw, zone).map(|dt| to_canonical(&dt))
}

pub fn now_in_zone(zone: &Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(zone)
}

/// Canonical `(start, end)` bounds covering the `days` days that end at `now`.
pub fn trailing_window(now: DateTime<Tz>, days: i64) -> (String, String) {
    let start = now - Duration::days(days);
    (to_canonical(&start), to_canonical(&now))
}
