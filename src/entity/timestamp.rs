//! Serde helpers for note timestamps.
//!
//! Timestamps are written as RFC 3339 UTC strings with millisecond precision
//! (`2024-05-01T09:30:00.000Z`). Older databases stored the creation time in
//! the display format (`2024-05-01 12:30:00`, Moscow time), so that shape is
//! still accepted when reading.

use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Format used for human-readable timestamps in responses.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Offset the legacy display-format timestamps were written in.
const LEGACY_OFFSET_SECS: i32 = 3 * 3600;

/// Current time truncated to what survives a round trip through storage.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

pub fn to_rfc3339(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Render a timestamp in the display format at the given offset.
pub fn to_display(ts: &DateTime<Utc>, offset: &FixedOffset) -> String {
    ts.with_timezone(offset).format(DISPLAY_FORMAT).to_string()
}

/// Parse a stored timestamp, accepting RFC 3339 and the legacy display format.
pub fn parse_stored(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(s, DISPLAY_FORMAT).ok()?;
    let offset = FixedOffset::east_opt(LEGACY_OFFSET_SECS)?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&to_rfc3339(ts))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_stored(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
}
