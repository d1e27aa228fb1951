use crate::errors::ValidationError;
use crate::types::DateBounds;
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use std::sync::OnceLock;

// Common regex patterns
fn date_only_regex() -> &'static Regex {
    static DATE_ONLY_REGEX: OnceLock<Regex> = OnceLock::new();
    DATE_ONLY_REGEX.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap())
}

/// Which side of a range a raw date bound is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundKind {
    /// A date-only value means the start of that day
    Start,
    /// A date-only value means the last millisecond of that day
    End,
}

/// Treat blank query values the same as absent ones. Non-blank values are
/// kept exactly as received.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parse a `from`/`to` query value.
///
/// Accepts full RFC 3339 timestamps (normalized to UTC) or plain `YYYY-MM-DD`
/// calendar dates, which are interpreted in UTC according to `kind`.
pub fn parse_date_bound(field: &str, raw: &str, kind: BoundKind) -> Result<DateTime<Utc>, ValidationError> {
    let raw = raw.trim();

    if date_only_regex().is_match(raw) {
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|e| ValidationError::format(field, &format!("invalid calendar date '{}': {}", raw, e)))?;
        let naive = match kind {
            BoundKind::Start => date.and_hms_milli_opt(0, 0, 0, 0),
            BoundKind::End => date.and_hms_milli_opt(23, 59, 59, 999),
        }
        .ok_or_else(|| ValidationError::format(field, &format!("invalid calendar date '{}'", raw)))?;
        return Ok(naive.and_utc());
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ValidationError::format(
            field,
            &format!("'{}' is not an RFC 3339 timestamp or YYYY-MM-DD date", raw),
        ))
}

/// Build the shared range predicate from the raw query strings.
pub fn parse_date_bounds(from: Option<&str>, to: Option<&str>) -> Result<DateBounds, ValidationError> {
    let from = from
        .map(|raw| parse_date_bound("from", raw, BoundKind::Start))
        .transpose()?;
    let to = to
        .map(|raw| parse_date_bound("to", raw, BoundKind::End))
        .transpose()?;
    Ok(DateBounds::new(from, to))
}
