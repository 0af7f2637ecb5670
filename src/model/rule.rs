// File: ./src/model/rule.rs
use crate::model::dates::{parse_date_string, parse_day_month, parse_full_date, parse_weekday};
use chrono::{Datelike, Local, NaiveDate, Weekday};
use strum::{Display, EnumIter};

/// Discriminant of a [`Recurrence`], handy for display and matching without payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum RuleKind {
    Daily,
    DailyRange,
    Weekly,
    WeeklyRange,
    Annual,
    Unrecognized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recurrence {
    Daily,
    DailyRange {
        start: NaiveDate,
        end: NaiveDate,
    },
    Weekly(Weekday),
    WeeklyRange {
        weekday: Weekday,
        start: NaiveDate,
        end: NaiveDate,
    },
    /// Month and day; the year of the source date (if any) is dropped.
    Annual {
        month: u32,
        day: u32,
    },
    Unrecognized,
}

/// A parsed `REPEAT:` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub pattern: Recurrence,
    /// Date from a `SCHEDULED:` companion tag. Nothing is produced before it.
    pub anchor: Option<NaiveDate>,
    /// Trimmed rule text as the user wrote it.
    pub source: String,
}

impl RecurrenceRule {
    pub fn kind(&self) -> RuleKind {
        match self.pattern {
            Recurrence::Daily => RuleKind::Daily,
            Recurrence::DailyRange { .. } => RuleKind::DailyRange,
            Recurrence::Weekly(_) => RuleKind::Weekly,
            Recurrence::WeeklyRange { .. } => RuleKind::WeeklyRange,
            Recurrence::Annual { .. } => RuleKind::Annual,
            Recurrence::Unrecognized => RuleKind::Unrecognized,
        }
    }

    pub fn is_recognized(&self) -> bool {
        self.pattern != Recurrence::Unrecognized
    }

    pub fn weekday(&self) -> Option<Weekday> {
        match self.pattern {
            Recurrence::Weekly(wd) | Recurrence::WeeklyRange { weekday: wd, .. } => Some(wd),
            _ => None,
        }
    }

    /// `(start, end)` for the bounded kinds.
    pub fn range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match self.pattern {
            Recurrence::DailyRange { start, end } | Recurrence::WeeklyRange { start, end, .. } => {
                Some((start, end))
            }
            _ => None,
        }
    }

    pub fn with_anchor(mut self, anchor: Option<NaiveDate>) -> Self {
        self.anchor = anchor;
        self
    }
}

/// Parses rule text, reading partial `DD.MM` range bounds in the current local year.
pub fn parse_rule(text: &str) -> RecurrenceRule {
    parse_rule_in_year(text, Local::now().year())
}

/// Parses rule text. Never fails: anything outside the grammar becomes
/// [`Recurrence::Unrecognized`].
///
/// Grammar, first match wins:
/// `everyday`, `everyday from <d1> to <d2>`, `every <weekday> from <d1> to <d2>`,
/// `every <weekday>`, a full date (annual), `DD.MM` (annual).
pub fn parse_rule_in_year(text: &str, reference_year: i32) -> RecurrenceRule {
    let source = text.trim().to_string();
    let lower = source.to_lowercase();
    let words: Vec<&str> = lower.split_whitespace().collect();

    let pattern = match words.as_slice() {
        ["everyday"] => Some(Recurrence::Daily),
        ["everyday", "from", d1, "to", d2] => {
            parse_range(d1, d2, reference_year)
                .map(|(start, end)| Recurrence::DailyRange { start, end })
        }
        ["every", wd, "from", d1, "to", d2] => parse_weekday(wd).and_then(|weekday| {
            parse_range(d1, d2, reference_year).map(|(start, end)| Recurrence::WeeklyRange {
                weekday,
                start,
                end,
            })
        }),
        ["every", wd] => parse_weekday(wd).map(Recurrence::Weekly),
        [single] => parse_annual(single),
        _ => None,
    };

    let pattern = pattern.unwrap_or_else(|| {
        log::debug!("Unrecognized repeat rule: '{}'", source);
        Recurrence::Unrecognized
    });

    RecurrenceRule {
        pattern,
        anchor: None,
        source,
    }
}

fn parse_range(d1: &str, d2: &str, reference_year: i32) -> Option<(NaiveDate, NaiveDate)> {
    Some((
        parse_date_string(d1, reference_year)?,
        parse_date_string(d2, reference_year)?,
    ))
}

fn parse_annual(word: &str) -> Option<Recurrence> {
    if let Some(date) = parse_full_date(word) {
        return Some(Recurrence::Annual {
            month: date.month(),
            day: date.day(),
        });
    }
    parse_day_month(word).map(|(day, month)| Recurrence::Annual { month, day })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_between_keywords_is_free() {
        let rule = parse_rule_in_year("  Every   MONDAY ", 2025);
        assert_eq!(rule.pattern, Recurrence::Weekly(Weekday::Mon));
        assert_eq!(rule.source, "Every   MONDAY");
    }

    #[test]
    fn partial_range_dates_use_reference_year() {
        let rule = parse_rule_in_year("everyday from 01.07 to 03.07", 2031);
        assert_eq!(
            rule.range(),
            Some((
                NaiveDate::from_ymd_opt(2031, 7, 1).unwrap(),
                NaiveDate::from_ymd_opt(2031, 7, 3).unwrap()
            ))
        );
    }

    #[test]
    fn trailing_words_are_not_ignored() {
        assert_eq!(
            parse_rule_in_year("every monday please", 2025).kind(),
            RuleKind::Unrecognized
        );
        assert_eq!(
            parse_rule_in_year("everyday from 2025-01-01", 2025).kind(),
            RuleKind::Unrecognized
        );
    }
}
