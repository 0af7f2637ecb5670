// File: ./src/model/mod.rs
pub mod dates;
pub mod recurrence;
pub mod rule;

pub use dates::{parse_date_string, parse_full_date, parse_smart_date, parse_weekday};
pub use recurrence::{
    DEFAULT_HORIZON_YEARS, MAX_EXPANSION_YEARS, OccurrenceWindow, RecurrenceEngine,
};
pub use rule::{Recurrence, RecurrenceRule, RuleKind, parse_rule, parse_rule_in_year};
