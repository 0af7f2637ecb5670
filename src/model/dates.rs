// File: ./src/model/dates.rs
//! Free-text date parsing for user-typed dates in notes and tags.
use chrono::{Datelike, Days, NaiveDate, Weekday};

const SEPARATORS: [char; 3] = ['.', '/', '-'];

/// Splits `s` on the first separator kind it contains and returns the numeric parts.
/// Mixed separators ("01.02/2025") are rejected.
fn split_numeric(s: &str) -> Option<(char, Vec<u32>)> {
    let sep = s.chars().find(|c| SEPARATORS.contains(c))?;
    let mut parts = Vec::with_capacity(3);
    for part in s.split(sep) {
        if part.is_empty() || part.len() > 4 || !part.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        parts.push(part.parse::<u32>().ok()?);
    }
    Some((sep, parts))
}

fn expand_year(raw: &str, value: u32) -> Option<i32> {
    match raw.len() {
        2 => Some(2000 + value as i32),
        4 => Some(value as i32),
        _ => None,
    }
}

/// Parses a date that carries its own year.
///
/// Accepted: `YYYY-MM-DD`, `YYYY/MM/DD`, `DD.MM.YYYY`, `DD/MM/YYYY`, `DD-MM-YYYY`.
/// A two-digit trailing year is read as `20YY`.
pub fn parse_full_date(text: &str) -> Option<NaiveDate> {
    let s = text.trim();
    let (sep, parts) = split_numeric(s)?;
    if parts.len() != 3 {
        return None;
    }
    let raw: Vec<&str> = s.split(sep).collect();

    if raw[0].len() == 4 {
        // Year first. Dotted ISO-ish dates ("2025.01.02") are not a thing users type.
        if sep == '.' {
            return None;
        }
        return NaiveDate::from_ymd_opt(parts[0] as i32, parts[1], parts[2]);
    }
    if raw[0].len() > 2 || raw[1].len() > 2 {
        return None;
    }
    let year = expand_year(raw[2], parts[2])?;
    NaiveDate::from_ymd_opt(year, parts[1], parts[0])
}

/// Parses a day/month pair without a year (`DD.MM`, `DD/MM`, `DD-MM`).
///
/// Validation is done against a leap year so that `29.02` is accepted.
pub fn parse_day_month(text: &str) -> Option<(u32, u32)> {
    let s = text.trim();
    let (_, parts) = split_numeric(s)?;
    if parts.len() != 2 || s.len() > 5 {
        return None;
    }
    let (day, month) = (parts[0], parts[1]);
    if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
        return None;
    }
    NaiveDate::from_ymd_opt(2000, month, day)?;
    Some((day, month))
}

/// Full dates first, then `DD.MM` placed in `reference_year`.
pub fn parse_date_string(text: &str, reference_year: i32) -> Option<NaiveDate> {
    if let Some(date) = parse_full_date(text) {
        return Some(date);
    }
    let (day, month) = parse_day_month(text)?;
    NaiveDate::from_ymd_opt(reference_year, month, day)
}

/// Like [`parse_date_string`], with `today`/`tomorrow`/`yesterday` relative to `today`.
pub fn parse_smart_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    match text.trim().to_lowercase().as_str() {
        "today" => Some(today),
        "tomorrow" => today.checked_add_days(Days::new(1)),
        "yesterday" => today.checked_sub_days(Days::new(1)),
        other => parse_date_string(other, today.year()),
    }
}

/// English weekday names, full or three-letter, case-insensitive.
pub fn parse_weekday(text: &str) -> Option<Weekday> {
    match text.trim().to_lowercase().as_str() {
        "mon" | "monday" => Some(Weekday::Mon),
        "tue" | "tuesday" => Some(Weekday::Tue),
        "wed" | "wednesday" => Some(Weekday::Wed),
        "thu" | "thursday" => Some(Weekday::Thu),
        "fri" | "friday" => Some(Weekday::Fri),
        "sat" | "saturday" => Some(Weekday::Sat),
        "sun" | "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Converts a Sunday-based day number (0=Sunday..6=Saturday) into the
/// Monday-based index used by the engine (0=Monday..6=Sunday).
pub fn monday_index_from_sunday_based(day: u32) -> u32 {
    (day % 7 + 6) % 7
}

/// First date on or after `from` that falls on `target`.
pub fn next_weekday_on_or_after(from: NaiveDate, target: Weekday) -> Option<NaiveDate> {
    let ahead = (7 + target.num_days_from_monday() - from.weekday().num_days_from_monday()) % 7;
    from.checked_add_days(Days::new(ahead as u64))
}
