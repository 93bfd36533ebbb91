//! Release date parsing.
//!
//! Dates are tried against the strict formats first, then a handful of looser shapes. A value
//! that matches none of them is missing, the row itself is kept.

use chrono::{NaiveDate, NaiveDateTime};

/// Formats tried in order before falling back to [`parse_lenient`].
pub const STRICT_FORMATS: [&str; 2] = ["%d-%m-%Y", "%Y-%m-%d"];

const LENIENT_DATE_FORMATS: [&str; 4] = ["%d/%m/%Y", "%Y/%m/%d", "%d.%m.%Y", "%d %B %Y"];
const LENIENT_DATETIME_FORMATS: [&str; 3] =
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%d-%m-%Y %H:%M:%S"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDate {
    Strict(NaiveDate),
    Lenient(NaiveDate),
    Missing,
}

impl ParsedDate {
    #[must_use]
    pub const fn date(self) -> Option<NaiveDate> {
        match self {
            Self::Strict(date) | Self::Lenient(date) => Some(date),
            Self::Missing => None,
        }
    }
}

/// Parse a raw release date.
#[must_use]
pub fn parse_release_date(raw: &str) -> ParsedDate {
    let raw = raw.trim();
    if raw.is_empty() {
        return ParsedDate::Missing;
    }

    STRICT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .map(ParsedDate::Strict)
        .or_else(|| parse_lenient(raw).map(ParsedDate::Lenient))
        .unwrap_or(ParsedDate::Missing)
}

/// Day-first best effort parsing, including the reduced precision dates (`2019`, `2019-06`)
/// that streaming services use for older releases.
fn parse_lenient(raw: &str) -> Option<NaiveDate> {
    if let Some(date) = LENIENT_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
    {
        return Some(date);
    }
    if let Some(datetime) = LENIENT_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(datetime.date());
    }
    if let Ok(datetime) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.date_naive());
    }

    let mut parts = raw.splitn(2, '-');
    let year = parts.next().filter(|y| y.len() == 4)?.parse::<i32>().ok()?;
    match parts.next() {
        None => NaiveDate::from_ymd_opt(year, 1, 1),
        Some(month) if (1..=2).contains(&month.len()) => {
            NaiveDate::from_ymd_opt(year, month.parse().ok()?, 1)
        }
        Some(_) => None,
    }
}
