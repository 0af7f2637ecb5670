use chrono::{Datelike, NaiveDate, Weekday};
use daybook::export::to_rrule;
use daybook::model::{OccurrenceWindow, RecurrenceEngine, RecurrenceRule, parse_rule};
use rrule::RRuleSet;
use std::str::FromStr;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn window(start: &str, end: &str) -> OccurrenceWindow {
    OccurrenceWindow::new(date(start), date(end)).unwrap()
}

fn expand(rule: &str, today: &str, win: (&str, &str)) -> Vec<NaiveDate> {
    RecurrenceEngine::expand(&parse_rule(rule), &window(win.0, win.1), date(today))
}

fn dates(list: &[&str]) -> Vec<NaiveDate> {
    list.iter().map(|s| date(s)).collect()
}

fn assert_strictly_ascending(list: &[NaiveDate]) {
    for pair in list.windows(2) {
        assert!(pair[0] < pair[1], "{:?} not ascending", pair);
    }
}

#[test]
fn test_daily_range_skips_past_days() {
    let got = expand(
        "everyday from 2025-07-01 to 2025-07-03",
        "2025-07-02",
        ("2025-07-02", "2025-12-31"),
    );
    assert_eq!(got, dates(&["2025-07-02", "2025-07-03"]));
}

#[test]
fn test_every_friday_from_wednesday() {
    let got = expand("every friday", "2025-07-16", ("2025-07-16", "2025-08-16"));
    assert_eq!(
        got,
        dates(&[
            "2025-07-18",
            "2025-07-25",
            "2025-08-01",
            "2025-08-08",
            "2025-08-15"
        ])
    );
}

#[test]
fn test_annual_day_month() {
    let got = expand("25.12", "2025-07-01", ("2025-07-01", "2026-12-31"));
    assert_eq!(got, dates(&["2025-12-25", "2026-12-25"]));
}

#[test]
fn test_unrecognized_expands_to_nothing() {
    assert!(expand("every fortnight", "2025-07-01", ("2025-07-01", "2026-12-31")).is_empty());
    assert!(expand("every fortnight", "2000-01-01", ("1999-01-01", "2100-12-31")).is_empty());
}

#[test]
fn test_weekly_includes_today_when_it_matches() {
    // 2025-07-14 is a Monday
    let got = expand("every monday", "2025-07-14", ("2025-07-14", "2025-08-14"));
    assert_eq!(got.first().copied(), Some(date("2025-07-14")));
    assert_eq!(got.len(), 5);
}

#[test]
fn test_leap_day_only_in_leap_years() {
    let got = expand("29.02", "2025-01-01", ("2025-01-01", "2030-12-31"));
    assert_eq!(got, dates(&["2028-02-29"]));

    let got = expand("29.02.2024", "2023-06-01", ("2023-06-01", "2033-06-01"));
    assert_eq!(got, dates(&["2024-02-29", "2028-02-29", "2032-02-29"]));
}

#[test]
fn test_annual_today_is_included() {
    let got = expand("16.07", "2025-07-16", ("2025-07-16", "2026-07-16"));
    assert_eq!(got, dates(&["2025-07-16", "2026-07-16"]));
}

#[test]
fn test_daily_runs_from_today_not_window_start() {
    let got = expand("everyday", "2025-07-10", ("2025-07-01", "2025-07-12"));
    assert_eq!(got, dates(&["2025-07-10", "2025-07-11", "2025-07-12"]));
}

#[test]
fn test_weekly_range_clipped_to_range_and_today() {
    let got = expand(
        "every friday from 01.07.2025 to 01.09.2025",
        "2025-07-16",
        ("2025-07-16", "2025-12-31"),
    );
    assert_eq!(
        got,
        dates(&[
            "2025-07-18",
            "2025-07-25",
            "2025-08-01",
            "2025-08-08",
            "2025-08-15",
            "2025-08-22",
            "2025-08-29"
        ])
    );
}

#[test]
fn test_weekly_range_clipped_to_window_end() {
    let got = expand(
        "every friday from 2025-07-01 to 2025-09-01",
        "2025-07-01",
        ("2025-07-01", "2025-07-20"),
    );
    assert_eq!(got, dates(&["2025-07-04", "2025-07-11", "2025-07-18"]));
}

#[test]
fn test_reversed_ranges_are_empty() {
    assert!(
        expand(
            "everyday from 2025-03-01 to 2025-01-01",
            "2024-12-01",
            ("2024-12-01", "2025-12-31")
        )
        .is_empty()
    );
    assert!(
        expand(
            "every monday from 2025-03-01 to 2025-01-01",
            "2024-12-01",
            ("2024-12-01", "2025-12-31")
        )
        .is_empty()
    );
}

#[test]
fn test_range_entirely_in_the_past() {
    assert!(
        expand(
            "everyday from 2024-01-01 to 2024-01-31",
            "2025-07-01",
            ("2025-07-01", "2026-07-01")
        )
        .is_empty()
    );
}

#[test]
fn test_open_rules_stay_inside_today_and_window_end() {
    let today = date("2025-03-05");
    let win = window("2025-01-01", "2025-06-30");
    for text in [
        "everyday",
        "every monday",
        "every tuesday",
        "every wednesday",
        "every sunday",
    ] {
        let got = RecurrenceEngine::expand(&parse_rule(text), &win, today);
        assert!(!got.is_empty(), "{}", text);
        assert!(got.iter().all(|d| *d >= today && *d <= win.end()), "{}", text);
        assert_strictly_ascending(&got);
    }
}

#[test]
fn test_range_rules_respect_weekday_and_bounds() {
    let today = date("2025-02-10");
    let win = window("2025-02-10", "2025-05-15");
    let rule = parse_rule("every thursday from 2025-01-20 to 2025-06-30");
    let got = RecurrenceEngine::expand(&rule, &win, today);

    let (range_start, range_end) = rule.range().unwrap();
    let lower = range_start.max(today);
    let upper = range_end.min(win.end());
    assert!(!got.is_empty());
    for d in &got {
        assert_eq!(d.weekday(), Weekday::Thu);
        assert!(*d >= lower && *d <= upper);
    }
    assert_strictly_ascending(&got);
}

#[test]
fn test_expand_is_repeatable() {
    let rule = parse_rule("every saturday from 2025-01-01 to 2025-12-31");
    let win = window("2025-04-01", "2025-10-01");
    let today = date("2025-04-01");
    assert_eq!(
        RecurrenceEngine::expand(&rule, &win, today),
        RecurrenceEngine::expand(&rule, &win, today)
    );
}

#[test]
fn test_first_occurrence() {
    let win = window("2025-07-16", "2025-12-31");
    let today = date("2025-07-16");
    let rule = parse_rule("every friday from 2025-07-01 to 2025-09-01");
    assert_eq!(
        RecurrenceEngine::first_occurrence(&rule, &win, today),
        Some(date("2025-07-18"))
    );
    let gone = parse_rule("every friday from 2025-01-01 to 2025-02-01");
    assert_eq!(RecurrenceEngine::first_occurrence(&gone, &win, today), None);
}

#[test]
fn test_next_occurrence_matches_expansion_head() {
    let today = date("2025-07-16");
    for text in [
        "everyday",
        "every friday",
        "25.12",
        "29.02",
        "everyday from 2025-07-01 to 2025-07-03",
        "every monday from 2026-01-01 to 2026-03-01",
        "every fortnight",
    ] {
        let rule = parse_rule(text);
        let win = OccurrenceWindow::years_ahead(today, 2);
        let expected = RecurrenceEngine::expand(&rule, &win, today).first().copied();
        assert_eq!(
            RecurrenceEngine::next_occurrence(&rule, today, 2),
            expected,
            "{}",
            text
        );
    }
}

#[test]
fn test_next_occurrence_none_beyond_horizon() {
    let rule = parse_rule("29.02");
    // 2029-03-01 + 2 years reaches 2031-03-01: no leap day in between.
    assert_eq!(
        RecurrenceEngine::next_occurrence(&rule, date("2029-03-01"), 2),
        None
    );
    assert_eq!(
        RecurrenceEngine::next_occurrence(&rule, date("2029-03-01"), 4),
        Some(date("2032-02-29"))
    );
}

#[test]
fn test_anchor_delays_open_rules() {
    let rule: RecurrenceRule = parse_rule("every friday").with_anchor(Some(date("2025-08-01")));
    let got = RecurrenceEngine::expand(&rule, &window("2025-07-16", "2025-08-16"), date("2025-07-16"));
    assert_eq!(got, dates(&["2025-08-01", "2025-08-08", "2025-08-15"]));

    // An anchor in the past changes nothing.
    let rule = parse_rule("every friday").with_anchor(Some(date("2025-01-01")));
    let got = RecurrenceEngine::expand(&rule, &window("2025-07-16", "2025-07-31"), date("2025-07-16"));
    assert_eq!(got, dates(&["2025-07-18", "2025-07-25"]));
}

#[test]
fn test_weekly_range_agrees_with_rrule() {
    let rule = parse_rule("every friday from 2025-07-01 to 2025-09-01");
    let today = date("2025-07-16");
    let ours = RecurrenceEngine::expand(&rule, &window("2025-07-16", "2025-12-31"), today);

    let rrule = to_rrule(&rule).unwrap().replace("UNTIL=20250901", "UNTIL=20250901T235959Z");
    let set = RRuleSet::from_str(&format!("DTSTART:20250701T000000Z\nRRULE:{}\n", rrule)).unwrap();
    let theirs: Vec<NaiveDate> = set
        .into_iter()
        .map(|dt| dt.date_naive())
        .filter(|d| *d >= today)
        .collect();

    assert_eq!(ours, theirs);
}
