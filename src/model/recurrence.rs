// File: ./src/model/recurrence.rs
use crate::model::dates::next_weekday_on_or_after;
use crate::model::rule::{Recurrence, RecurrenceRule};
use chrono::{Datelike, Days, Months, NaiveDate};

/// Lookahead used when a caller only wants "the next time".
pub const DEFAULT_HORIZON_YEARS: u32 = 2;

/// Hard cap on how far past `today` an expansion may reach, whatever the window says.
pub const MAX_EXPANSION_YEARS: u32 = 25;

/// Inclusive `[start, end]` date range bounding an expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccurrenceWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl OccurrenceWindow {
    /// Returns `None` when `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// `[start, start + months]`, saturating at the largest representable date.
    pub fn months_ahead(start: NaiveDate, months: u32) -> Self {
        let end = start
            .checked_add_months(Months::new(months))
            .unwrap_or(NaiveDate::MAX);
        Self { start, end }
    }

    pub fn years_ahead(start: NaiveDate, years: u32) -> Self {
        Self::months_ahead(start, years.saturating_mul(12))
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

pub struct RecurrenceEngine;

impl RecurrenceEngine {
    /// Concrete dates `rule` occupies, ascending and without duplicates.
    ///
    /// Open-ended rules (`everyday`, `every <weekday>`) start at `today`, not at
    /// `window.start`. Range rules start at their own start date and drop anything
    /// before `today`. With an anchor, `today` is raised to the anchor.
    pub fn expand(
        rule: &RecurrenceRule,
        window: &OccurrenceWindow,
        today: NaiveDate,
    ) -> Vec<NaiveDate> {
        let floor = rule.anchor.map_or(today, |anchor| anchor.max(today));
        let cap = today
            .checked_add_months(Months::new(MAX_EXPANSION_YEARS * 12))
            .unwrap_or(NaiveDate::MAX);
        let last = window.end.min(cap);

        match rule.pattern {
            Recurrence::Daily => step_through(Some(floor), last, 1),
            Recurrence::DailyRange { start, end } => {
                step_through(Some(start.max(floor)), end.min(last), 1)
            }
            Recurrence::Weekly(weekday) => {
                step_through(next_weekday_on_or_after(floor, weekday), last, 7)
            }
            // Every date on `weekday` at or after `start` is 7-day aligned with the
            // first match after `start`, so starting from max(start, floor) is the same
            // as stepping from `start` and discarding the past.
            Recurrence::WeeklyRange {
                weekday,
                start,
                end,
            } => step_through(
                next_weekday_on_or_after(start.max(floor), weekday),
                end.min(last),
                7,
            ),
            Recurrence::Annual { month, day } => (today.year()..=last.year().saturating_add(1))
                .filter_map(|year| NaiveDate::from_ymd_opt(year, month, day))
                .filter(|date| *date >= floor && *date <= last)
                .collect(),
            Recurrence::Unrecognized => Vec::new(),
        }
    }

    /// Smallest expanded date that is not before `today`.
    pub fn first_occurrence(
        rule: &RecurrenceRule,
        window: &OccurrenceWindow,
        today: NaiveDate,
    ) -> Option<NaiveDate> {
        Self::expand(rule, window, today)
            .into_iter()
            .find(|date| *date >= today)
    }

    /// First occurrence within `horizon_years` of `reference`, or `None`.
    pub fn next_occurrence(
        rule: &RecurrenceRule,
        reference: NaiveDate,
        horizon_years: u32,
    ) -> Option<NaiveDate> {
        let window = OccurrenceWindow::years_ahead(reference, horizon_years);
        Self::expand(rule, &window, reference).into_iter().next()
    }
}

fn step_through(first: Option<NaiveDate>, last: NaiveDate, step_days: u64) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut cursor = first;
    while let Some(date) = cursor {
        if date > last {
            break;
        }
        dates.push(date);
        cursor = date.checked_add_days(Days::new(step_days));
    }
    dates
}
