use chrono::NaiveDate;
use daybook::cli::{Command, parse_args};
use daybook::export::{to_ics_string, to_rrule, validate_rrule};
use daybook::future_log::FutureLog;
use daybook::model::parse_rule;
use std::path::PathBuf;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn test_args_default_to_help() {
    let empty: Vec<String> = Vec::new();
    assert_eq!(parse_args(empty).unwrap().command, Command::Help);
    assert_eq!(parse_args(["next", "--help"]).unwrap().command, Command::Help);
}

#[test]
fn test_args_rule_words_are_joined() {
    let inv = parse_args(["next", "every", "friday", "--today", "2025-07-16"]).unwrap();
    assert_eq!(
        inv.command,
        Command::Next {
            rule: "every friday".to_string()
        }
    );
    assert_eq!(inv.today.as_deref(), Some("2025-07-16"));

    let inv = parse_args(["--months", "3", "expand", "everyday"]).unwrap();
    assert_eq!(
        inv.command,
        Command::Expand {
            rule: "everyday".to_string(),
            months: Some(3)
        }
    );
}

#[test]
fn test_args_flags_and_subcommands() {
    let inv = parse_args(["-r", "/tmp/db", "-v", "scan", "week.md", "--week", "tomorrow"]).unwrap();
    assert_eq!(inv.root, Some(PathBuf::from("/tmp/db")));
    assert!(inv.verbose);
    assert_eq!(
        inv.command,
        Command::Scan {
            file: PathBuf::from("week.md"),
            week: Some("tomorrow".to_string())
        }
    );

    assert_eq!(parse_args(["future"]).unwrap().command, Command::FutureList);
    assert_eq!(parse_args(["future", "export"]).unwrap().command, Command::FutureExport);
    assert_eq!(
        parse_args(["future", "add", "25.12", "Christmas", "dinner"]).unwrap().command,
        Command::FutureAdd {
            rule: "25.12".to_string(),
            title: "Christmas dinner".to_string()
        }
    );
    assert_eq!(
        parse_args(["future", "remove", "abc"]).unwrap().command,
        Command::FutureRemove {
            id: "abc".to_string()
        }
    );
}

#[test]
fn test_args_errors() {
    assert!(parse_args(["frobnicate"]).is_err());
    assert!(parse_args(["next"]).is_err());
    assert!(parse_args(["future", "add", "25.12"]).is_err());
    assert!(parse_args(["expand", "everyday", "--months"]).is_err());
    assert!(parse_args(["expand", "everyday", "--months", "many"]).is_err());
}

#[test]
fn test_rrule_strings() {
    let cases = [
        ("everyday", Some("FREQ=DAILY")),
        ("everyday from 2025-01-01 to 2025-03-01", Some("FREQ=DAILY;UNTIL=20250301")),
        ("every friday", Some("FREQ=WEEKLY;BYDAY=FR")),
        (
            "every sunday from 2025-01-01 to 2025-03-01",
            Some("FREQ=WEEKLY;BYDAY=SU;UNTIL=20250301"),
        ),
        ("25.12", Some("FREQ=YEARLY;BYMONTH=12;BYMONTHDAY=25")),
        ("every fortnight", None),
    ];
    for (text, expected) in cases {
        assert_eq!(to_rrule(&parse_rule(text)).as_deref(), expected, "{}", text);
    }
}

#[test]
fn test_validate_rrule() {
    assert!(validate_rrule(date("2025-07-18"), "FREQ=WEEKLY;BYDAY=FR;UNTIL=20250901"));
    assert!(validate_rrule(date("2028-02-29"), "FREQ=YEARLY;BYMONTH=2;BYMONTHDAY=29"));
    assert!(!validate_rrule(date("2025-07-18"), "FREQ=SOMETIMES"));
}

#[test]
fn test_ics_export() {
    let today = date("2025-07-16");
    let mut log = FutureLog::new();
    log.add("Christmas", "25.12", today).unwrap();
    log.add("Gym", "every friday", today).unwrap();
    log.add("Old course", "everyday from 2020-01-01 to 2020-02-01", today)
        .unwrap();

    let ics = to_ics_string(log.entries(), today);
    assert!(ics.contains("BEGIN:VCALENDAR"));
    assert_eq!(ics.matches("BEGIN:VEVENT").count(), 2);
    assert!(ics.contains("SUMMARY:Christmas"));
    assert!(ics.contains("20251225"));
    assert!(ics.contains("BYMONTHDAY=25"));
    assert!(ics.contains("SUMMARY:Gym"));
    assert!(ics.contains("20250718"));
    assert!(ics.contains("BYDAY=FR"));
    assert!(!ics.contains("Old course"));
}

#[test]
fn test_future_add_accepts_multiword_rules() {
    let cases = [
        (vec!["future", "add", "every", "friday", "Payday"], "every friday", "Payday"),
        (vec!["future", "add", "every friday", "Payday"], "every friday", "Payday"),
        (
            vec!["future", "add", "everyday", "from", "01.07", "to", "31.07", "Stretch", "more"],
            "everyday from 01.07 to 31.07",
            "Stretch more",
        ),
        (vec!["future", "add", "someday", "Maybe"], "someday", "Maybe"),
    ];
    for (args, rule, title) in cases {
        assert_eq!(
            parse_args(args.clone()).unwrap().command,
            Command::FutureAdd {
                rule: rule.to_string(),
                title: title.to_string()
            },
            "{:?}",
            args
        );
    }
}
