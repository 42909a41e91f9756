//! Day input handling
//!
//! Operators type dates as `DD/MM/YYYY` (`DD-MM-YYYY` is accepted too).
//! Absent or unparseable input falls back to "now" rather than failing.

use chrono::{DateTime, NaiveDate, Utc};

/// Parse `DD/MM/YYYY` or `DD-MM-YYYY`
///
/// Returns `None` for anything that is not a real calendar date with a
/// four-digit year.
pub fn parse_day(input: &str) -> Option<NaiveDate> {
    let normalized = input.trim().replace('-', "/");
    let mut parts = normalized.split('/').map(str::trim);

    let day: u32 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next()?.parse().ok()?;
    let year_token = parts.next()?;
    if parts.next().is_some()
        || year_token.len() != 4
        || !year_token.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    let year: i32 = year_token.parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Resolve an optional day input to a UTC timestamp (midnight of that day)
pub fn resolve_day(input: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    input
        .and_then(parse_day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or(now)
}

/// Render a timestamp as `DD/MM/YYYY`
pub fn format_day(ts: DateTime<Utc>) -> String {
    ts.format("%d/%m/%Y").to_string()
}
