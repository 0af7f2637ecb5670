// File: ./src/planner.rs
//! Scheduled-items scanner feeding the weekly planner grid.
//!
//! Any line of a note carrying `SCHEDULED: <date>` and/or `REPEAT: <rule>` is a
//! planner item. Tags may be bare or wrapped in parentheses.
use crate::model::{OccurrenceWindow, RecurrenceEngine, RecurrenceRule, parse_rule_in_year};
use crate::model::dates::parse_smart_date;
use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use strum::{Display, EnumIter, EnumString};

const SCHEDULED_KEYWORD: &str = "scheduled:";
const REPEAT_KEYWORD: &str = "repeat:";
const TAG_KEYWORDS: [&str; 2] = [SCHEDULED_KEYWORD, REPEAT_KEYWORD];

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

/// One line of a note, reduced to what the planner cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerEntry {
    pub title: String,
    pub done: bool,
    pub scheduled: Option<NaiveDate>,
    pub repeat: Option<RecurrenceRule>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledItem {
    pub date: NaiveDate,
    pub title: String,
    /// 1-based line number in the scanned document.
    pub line: usize,
    pub done: bool,
    pub recurring: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayColumn {
    pub date: NaiveDate,
    pub items: Vec<ScheduledItem>,
}

struct TagSpan {
    start: usize,
    end: usize,
    value: String,
}

/// Finds `keyword` where it is not glued to a preceding word ("unscheduled:" is not a tag).
fn find_keyword(lower: &str, keyword: &str) -> Option<usize> {
    lower.match_indices(keyword).map(|(idx, _)| idx).find(|&idx| {
        lower[..idx]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric())
    })
}

fn find_tag(line: &str, lower: &str, keyword: &str, single_word: bool) -> Option<TagSpan> {
    let kw_at = find_keyword(lower, keyword)?;
    let before = lower[..kw_at].trim_end_matches([' ', '\t']);
    let parenthesised = before.ends_with('(');

    let value_start = kw_at + keyword.len();
    let rest = &lower[value_start..];
    let mut stop = rest.find(')').unwrap_or(rest.len());
    for other in TAG_KEYWORDS.iter().filter(|k| **k != keyword) {
        if let Some(pos) = find_keyword(rest, other) {
            stop = stop.min(pos);
        }
    }

    let raw_value = &line[value_start..value_start + stop];
    let (value, mut end) = if single_word {
        let lead = raw_value.len() - raw_value.trim_start().len();
        let word = raw_value.trim_start().split_whitespace().next().unwrap_or("");
        (word.to_string(), value_start + lead + word.len())
    } else {
        // A following parenthesised tag leaves its "(" at the end of our value.
        let kept = raw_value.trim_end_matches(|c: char| c.is_whitespace() || c == '(');
        (kept.trim().to_string(), value_start + kept.len())
    };

    let mut start = kw_at;
    if parenthesised {
        let tail = &lower[end..];
        let gap = tail.len() - tail.trim_start_matches([' ', '\t']).len();
        if tail[gap..].starts_with(')') {
            start = before.len() - 1;
            end += gap + 1;
        }
    }

    Some(TagSpan { start, end, value })
}

fn clean_title(line: &str, spans: &[&TagSpan]) -> (String, bool) {
    let mut kept = String::with_capacity(line.len());
    let mut last = 0;
    let mut ordered: Vec<&&TagSpan> = spans.iter().collect();
    ordered.sort_by_key(|s| s.start);
    for span in ordered {
        if span.start > last {
            kept.push_str(&line[last..span.start]);
        }
        kept.push(' ');
        last = last.max(span.end);
    }
    kept.push_str(&line[last..]);

    let mut rest = kept.trim_start();
    for bullet in ["- ", "* ", "+ "] {
        if let Some(stripped) = rest.strip_prefix(bullet) {
            rest = stripped.trim_start();
            break;
        }
    }
    let mut done = false;
    if let Some(stripped) = rest.strip_prefix("[ ]") {
        rest = stripped;
    } else if let Some(stripped) = rest
        .strip_prefix("[x]")
        .or_else(|| rest.strip_prefix("[X]"))
    {
        rest = stripped;
        done = true;
    }

    (rest.split_whitespace().collect::<Vec<_>>().join(" "), done)
}

/// Parses one line. Returns `None` when the line has no usable planner tag.
pub fn parse_entry(line: &str, today: NaiveDate) -> Option<PlannerEntry> {
    let lower = line.to_ascii_lowercase();
    let scheduled_tag = find_tag(line, &lower, SCHEDULED_KEYWORD, true);
    let repeat_tag = find_tag(line, &lower, REPEAT_KEYWORD, false);
    if scheduled_tag.is_none() && repeat_tag.is_none() {
        return None;
    }

    let scheduled = scheduled_tag.as_ref().and_then(|tag| {
        let date = parse_smart_date(&tag.value, today);
        if date.is_none() {
            log::debug!("Ignoring unparsable SCHEDULED date '{}'", tag.value);
        }
        date
    });
    let repeat = repeat_tag
        .as_ref()
        .map(|tag| parse_rule_in_year(&tag.value, today.year()));
    if scheduled.is_none() && repeat.is_none() {
        return None;
    }

    let spans: Vec<&TagSpan> = scheduled_tag.iter().chain(repeat_tag.iter()).collect();
    let (title, done) = clean_title(line, &spans);
    Some(PlannerEntry {
        title,
        done,
        scheduled,
        repeat,
    })
}

/// Every planner item of `document` falling inside `window`, sorted by date then line.
///
/// Items with the same title on the same day are reported once.
pub fn scan_document(
    document: &str,
    window: &OccurrenceWindow,
    today: NaiveDate,
) -> Vec<ScheduledItem> {
    let mut items = Vec::new();
    let mut seen = HashSet::new();

    for (idx, line) in document.lines().enumerate() {
        let Some(entry) = parse_entry(line, today) else {
            continue;
        };
        let repeat = entry.repeat.as_ref().filter(|rule| rule.is_recognized());
        if repeat.is_none() && entry.repeat.is_some() {
            log::debug!(
                "Line {}: unrecognized repeat rule, using the scheduled date only",
                idx + 1
            );
        }
        let dates = match repeat {
            Some(rule) => {
                let anchored = rule.clone().with_anchor(entry.scheduled);
                RecurrenceEngine::expand(&anchored, window, today)
            }
            None => entry.scheduled.into_iter().collect(),
        };
        for date in dates.into_iter().filter(|d| window.contains(*d)) {
            if !seen.insert((date, entry.title.clone())) {
                continue;
            }
            items.push(ScheduledItem {
                date,
                title: entry.title.clone(),
                line: idx + 1,
                done: entry.done,
                recurring: repeat.is_some(),
            });
        }
    }

    items.sort_by(|a, b| a.date.cmp(&b.date).then(a.line.cmp(&b.line)));
    log::debug!("Planner scan found {} item(s)", items.len());
    items
}

pub fn start_of_week(date: NaiveDate, week_start: WeekStart) -> NaiveDate {
    let offset = match week_start {
        WeekStart::Monday => date.weekday().num_days_from_monday(),
        WeekStart::Sunday => date.weekday().num_days_from_sunday(),
    };
    date.checked_sub_days(Days::new(offset as u64))
        .unwrap_or(NaiveDate::MIN)
}

/// Seven columns starting at `week_start`, each holding that day's items in order.
pub fn week_grid(items: &[ScheduledItem], week_start: NaiveDate) -> Vec<DayColumn> {
    week_start
        .iter_days()
        .take(7)
        .map(|date| DayColumn {
            date,
            items: items.iter().filter(|i| i.date == date).cloned().collect(),
        })
        .collect()
}

/// Scans `document` for the week beginning at `week_start` and lays it out as a grid.
pub fn scan_week(document: &str, week_start: NaiveDate, today: NaiveDate) -> Vec<DayColumn> {
    let week_end = week_start
        .checked_add_days(Days::new(6))
        .unwrap_or(NaiveDate::MAX);
    let Some(window) = OccurrenceWindow::new(week_start, week_end) else {
        return Vec::new();
    };
    week_grid(&scan_document(document, &window, today), week_start)
}
