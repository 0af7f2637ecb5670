// File: ./src/future_log.rs
//! Future-log widget state: recurring reminders grouped by upcoming month.
use crate::model::{MAX_EXPANSION_YEARS, OccurrenceWindow, RecurrenceEngine, parse_rule_in_year};
use crate::storage::KeyValueStore;
use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const STORAGE_KEY: &str = "future-log";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FutureLogEntry {
    pub id: String,
    pub title: String,
    /// Rule text as typed, e.g. `every friday` or `25.12`.
    pub rule: String,
    pub created: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthBucket {
    pub year: i32,
    pub month: u32,
    /// `(date, title)`, sorted by date then title.
    pub items: Vec<(NaiveDate, String)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FutureLog {
    entries: Vec<FutureLogEntry>,
}

impl FutureLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[FutureLogEntry] {
        &self.entries
    }

    /// Adds an entry. Empty titles and rules outside the grammar are rejected
    /// here, since a stored rule that never fires would be invisible.
    pub fn add(&mut self, title: &str, rule: &str, today: NaiveDate) -> Result<&FutureLogEntry> {
        let title = title.trim();
        if title.is_empty() {
            anyhow::bail!("Future log entry needs a title");
        }
        let parsed = parse_rule_in_year(rule, today.year());
        if !parsed.is_recognized() {
            anyhow::bail!("Unrecognized repeat rule: '{}'", rule.trim());
        }

        self.entries.push(FutureLogEntry {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            rule: parsed.source,
            created: today,
        });
        log::info!("Added future log entry '{}'", title);
        self.entries
            .last()
            .ok_or_else(|| anyhow::anyhow!("Future log entry vanished after insert"))
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        before != self.entries.len()
    }

    /// One bucket per calendar month from today's month through `today + months`,
    /// empty months included. `months` is capped at the engine's expansion limit.
    pub fn upcoming(&self, today: NaiveDate, months: u32) -> Vec<MonthBucket> {
        let max_months = MAX_EXPANSION_YEARS * 12;
        if months > max_months {
            log::debug!("Future log limited to {} months (asked for {})", max_months, months);
        }
        let window = OccurrenceWindow::months_ahead(today, months.min(max_months));

        let mut buckets = Vec::new();
        let (mut year, mut month) = (today.year(), today.month());
        while (year, month) <= (window.end().year(), window.end().month()) {
            buckets.push(MonthBucket {
                year,
                month,
                items: Vec::new(),
            });
            (year, month) = if month == 12 {
                (year + 1, 1)
            } else {
                (year, month + 1)
            };
        }

        for entry in &self.entries {
            let rule = parse_rule_in_year(&entry.rule, today.year());
            for date in RecurrenceEngine::expand(&rule, &window, today) {
                if let Some(bucket) = buckets
                    .iter_mut()
                    .find(|b| b.year == date.year() && b.month == date.month())
                {
                    bucket.items.push((date, entry.title.clone()));
                }
            }
        }
        for bucket in &mut buckets {
            bucket.items.sort();
        }
        buckets
    }

    pub fn load(store: &dyn KeyValueStore) -> Result<Self> {
        match store.get(STORAGE_KEY)? {
            Some(json) => {
                serde_json::from_str(&json).context("Failed to parse stored future log")
            }
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<()> {
        let json = serde_json::to_string(self)?;
        store.set(STORAGE_KEY, &json)
    }
}
