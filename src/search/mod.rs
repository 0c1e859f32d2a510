//! List filtering and pagination.
//!
//! Query parameters arrive as raw strings and are parsed leniently: a value
//! that does not parse is treated as if it had not been given, never as an
//! error.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::Note;

/// Raw list query as received from the client.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub title: Option<String>,
    pub content: Option<String>,
    pub created_before: Option<String>,
    pub created_after: Option<String>,
    pub offset: Option<String>,
    pub limit: Option<String>,
}

impl ListQuery {
    /// Collect raw `key=value` pairs. The first occurrence of a repeated key
    /// wins and unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "title" => &mut query.title,
                "content" => &mut query.content,
                "createdBefore" => &mut query.created_before,
                "createdAfter" => &mut query.created_after,
                "offset" => &mut query.offset,
                "limit" => &mut query.limit,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query
    }
}

/// Offset/limit window applied after filtering.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Page {
    /// Never negative.
    pub offset: f64,
    /// Only set for strictly positive limits.
    pub limit: Option<f64>,
}

impl Page {
    pub fn parse(offset: Option<&str>, limit: Option<&str>) -> Self {
        let offset = offset.and_then(parse_number).unwrap_or(0.0).max(0.0);
        let limit = limit.and_then(parse_number).filter(|l| *l > 0.0);
        Self { offset, limit }
    }

    /// Slice `items` to this window. Windows past the end yield nothing.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        let len = items.len();
        // `as usize` truncates toward zero and saturates, matching slice semantics.
        let start = (self.offset as usize).min(len);
        let end = match self.limit {
            Some(limit) => ((self.offset + limit) as usize).clamp(start, len),
            None => len,
        };
        items.into_iter().skip(start).take(end - start).collect()
    }
}

/// Parsed note filter.
#[derive(Debug, Default, Clone)]
pub struct NoteFilter {
    /// Lowercased title substring.
    pub title: Option<String>,
    /// Lowercased content substring.
    pub content: Option<String>,
    /// Keep notes created strictly before this instant.
    pub created_before: Option<DateTime<Utc>>,
    /// Keep notes created strictly after this instant.
    pub created_after: Option<DateTime<Utc>>,
    pub page: Page,
}

impl NoteFilter {
    /// Create an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a filter from raw query values.
    ///
    /// Dates without an explicit offset are read at `local`.
    pub fn from_query(query: &ListQuery, local: &FixedOffset) -> Self {
        Self {
            title: non_empty(query.title.as_deref()).map(str::to_lowercase),
            content: non_empty(query.content.as_deref()).map(str::to_lowercase),
            created_before: non_empty(query.created_before.as_deref())
                .and_then(|s| parse_date(s, local)),
            created_after: non_empty(query.created_after.as_deref())
                .and_then(|s| parse_date(s, local)),
            page: Page::parse(query.offset.as_deref(), query.limit.as_deref()),
        }
    }

    /// Check if filter has any constraints.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.created_before.is_none()
            && self.created_after.is_none()
            && self.page == Page::default()
    }

    pub fn matches(&self, note: &Note) -> bool {
        if let Some(ref t) = self.title {
            if !note.title.to_lowercase().contains(t) {
                return false;
            }
        }
        if let Some(ref c) = self.content {
            if !note.content.to_lowercase().contains(c) {
                return false;
            }
        }
        if let Some(before) = self.created_before {
            if note.created >= before {
                return false;
            }
        }
        if let Some(after) = self.created_after {
            if note.created <= after {
                return false;
            }
        }
        true
    }

    /// Filter `notes` in order, then paginate.
    pub fn apply(&self, notes: Vec<Note>) -> Vec<Note> {
        let matched: Vec<Note> = notes.into_iter().filter(|n| self.matches(n)).collect();
        self.page.apply(matched)
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

/// Parse a numeric query value. Blank strings count as zero.
fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// Parse a date string into DateTime<Utc>.
///
/// Accepts RFC 3339 (offsets with or without the colon), a bare date, month
/// or year (midnight UTC on the first day of the period), or a date-time
/// without offset, which is read at `local`.
fn parse_date(s: &str, local: &FixedOffset) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%z"];
    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt.with_timezone(&Utc));
    }

    if let Some(date) = parse_calendar_date(s) {
        let datetime = date.and_hms_opt(0, 0, 0)?;
        return Some(DateTime::from_naive_utc_and_offset(datetime, Utc));
    }

    const NAIVE_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    NAIVE_FORMATS.iter().find_map(|fmt| {
        let naive = NaiveDateTime::parse_from_str(s, fmt).ok()?;
        local
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
    })
}

/// `YYYY-MM-DD`, `YYYY-MM` or `YYYY`; missing parts default to the first.
fn parse_calendar_date(s: &str) -> Option<NaiveDate> {
    if !s.is_ascii() {
        return None;
    }
    let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    match s.len() {
        7 if is_digits(&s[..4]) && s.as_bytes()[4] == b'-' && is_digits(&s[5..]) => {
            NaiveDate::from_ymd_opt(s[..4].parse().ok()?, s[5..].parse().ok()?, 1)
        }
        4 if is_digits(s) => NaiveDate::from_ymd_opt(s.parse().ok()?, 1, 1),
        _ => NaiveDate::parse_from_str(s, "%Y-%m-%d").ok(),
    }
}
