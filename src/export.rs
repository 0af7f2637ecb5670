// File: ./src/export.rs
//! iCalendar export of future-log entries.
use crate::future_log::FutureLogEntry;
use crate::model::{OccurrenceWindow, Recurrence, RecurrenceEngine, RecurrenceRule};
use crate::model::{DEFAULT_HORIZON_YEARS, parse_rule_in_year};
use chrono::{Datelike, NaiveDate, Weekday};
use icalendar::{Calendar, Component, Event, EventLike};
use rrule::RRuleSet;
use std::str::FromStr;

fn byday_code(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

/// RFC 5545 `RRULE` value (without the `RRULE:` prefix). `UNTIL` is date-only.
pub fn to_rrule(rule: &RecurrenceRule) -> Option<String> {
    let until = |end: NaiveDate| end.format("%Y%m%d").to_string();
    match rule.pattern {
        Recurrence::Daily => Some("FREQ=DAILY".to_string()),
        Recurrence::DailyRange { end, .. } => Some(format!("FREQ=DAILY;UNTIL={}", until(end))),
        Recurrence::Weekly(wd) => Some(format!("FREQ=WEEKLY;BYDAY={}", byday_code(wd))),
        Recurrence::WeeklyRange { weekday, end, .. } => Some(format!(
            "FREQ=WEEKLY;BYDAY={};UNTIL={}",
            byday_code(weekday),
            until(end)
        )),
        Recurrence::Annual { month, day } => Some(format!(
            "FREQ=YEARLY;BYMONTH={};BYMONTHDAY={}",
            month, day
        )),
        Recurrence::Unrecognized => None,
    }
}

/// Checks that `rrule` with the given start is accepted by the `rrule` crate.
///
/// The crate wants UNTIL to match DTSTART's type, and DTSTART is given as a UTC
/// datetime here, so a date-only UNTIL is upgraded to end of day.
pub fn validate_rrule(dtstart: NaiveDate, rrule: &str) -> bool {
    let mut rule_part = rrule.trim().to_string();
    if let Some(idx) = rule_part.find("UNTIL=") {
        let value_start = idx + 6;
        let value_end = rule_part[value_start..]
            .find(';')
            .map(|i| value_start + i)
            .unwrap_or(rule_part.len());
        let value = &rule_part[value_start..value_end];
        if value.len() == 8 && !value.contains('T') {
            let upgraded = format!("{}T235959Z", value);
            rule_part.replace_range(value_start..value_end, &upgraded);
        }
    }

    let text = format!(
        "DTSTART:{}T000000Z\nRRULE:{}\n",
        dtstart.format("%Y%m%d"),
        rule_part
    );
    match RRuleSet::from_str(&text) {
        Ok(_) => true,
        Err(e) => {
            log::warn!("Rejected RRULE '{}': {}", rrule, e);
            false
        }
    }
}

/// A `VCALENDAR` with one all-day `VEVENT` per entry that still has an upcoming date.
///
/// DTSTART is the entry's next occurrence from `today`.
pub fn to_ics_string(entries: &[FutureLogEntry], today: NaiveDate) -> String {
    let window = OccurrenceWindow::years_ahead(today, DEFAULT_HORIZON_YEARS);
    let mut calendar = Calendar::new();

    for entry in entries {
        let rule = parse_rule_in_year(&entry.rule, today.year());
        let Some(rrule) = to_rrule(&rule) else {
            log::warn!("Skipping '{}': unrecognized rule '{}'", entry.title, entry.rule);
            continue;
        };
        let Some(first) = RecurrenceEngine::first_occurrence(&rule, &window, today) else {
            log::debug!("Skipping '{}': no upcoming occurrence", entry.title);
            continue;
        };
        if !validate_rrule(first, &rrule) {
            continue;
        }

        let event = Event::new()
            .uid(&entry.id)
            .summary(&entry.title)
            .all_day(first)
            .add_property("RRULE", &rrule)
            .done();
        calendar.push(event);
    }

    calendar.to_string()
}
