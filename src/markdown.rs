// File: ./src/markdown.rs
//! Inline `(REPEAT: ...)` tags in rendered notes.
//!
//! Each tag is resolved to the next concrete date of its rule and rewritten
//! into a link pointing at that date. Tags without an occurrence inside the
//! horizon stay plain text.
use crate::model::{RecurrenceEngine, parse_rule_in_year};
use chrono::{Datelike, NaiveDate};

const TAG_KEYWORD: &str = "repeat:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatTag {
    /// Byte offset of the opening parenthesis.
    pub start: usize,
    /// Byte offset just past the closing parenthesis.
    pub end: usize,
    /// The tag exactly as written, parentheses included.
    pub raw: String,
    /// Trimmed rule text after `REPEAT:`.
    pub rule: String,
}

/// Finds every `(REPEAT: <rule>)` in `text`. The tag must close on the line it opens.
pub fn find_repeat_tags(text: &str) -> Vec<RepeatTag> {
    // ASCII lowering keeps byte offsets identical to `text`.
    let lower = text.to_ascii_lowercase();
    let mut tags = Vec::new();
    let mut cursor = 0;

    while let Some(rel) = lower[cursor..].find('(') {
        let open = cursor + rel;
        cursor = open + 1;

        let after = &lower[cursor..];
        let trimmed = after.trim_start_matches([' ', '\t']);
        if !trimmed.starts_with(TAG_KEYWORD) {
            continue;
        }
        let body_start = cursor + (after.len() - trimmed.len()) + TAG_KEYWORD.len();
        let Some(stop_rel) = lower[body_start..].find([')', '\n']) else {
            break;
        };
        let stop = body_start + stop_rel;
        if lower.as_bytes()[stop] != b')' {
            continue;
        }

        tags.push(RepeatTag {
            start: open,
            end: stop + 1,
            raw: text[open..=stop].to_string(),
            rule: text[body_start..stop].trim().to_string(),
        });
        cursor = stop + 1;
    }
    tags
}

/// Rewrites each repeat tag with `render(tag, next)`, where `next` is the first
/// occurrence of the tag's rule within `horizon_years` of `today`.
pub fn link_repeat_tags<F>(text: &str, today: NaiveDate, horizon_years: u32, render: F) -> String
where
    F: Fn(&RepeatTag, Option<NaiveDate>) -> String,
{
    let tags = find_repeat_tags(text);
    if tags.is_empty() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len() + tags.len() * 64);
    let mut last = 0;
    for tag in &tags {
        let rule = parse_rule_in_year(&tag.rule, today.year());
        let next = RecurrenceEngine::next_occurrence(&rule, today, horizon_years);
        if next.is_none() {
            log::debug!("No occurrence for '{}' within {} years", tag.rule, horizon_years);
        }
        out.push_str(&text[last..tag.start]);
        out.push_str(&render(tag, next));
        last = tag.end;
    }
    out.push_str(&text[last..]);
    out
}

/// Default renderer: an anchor to `{prefix}{YYYY-MM-DD}`, or the escaped tag text.
pub fn render_html_link(prefix: &str) -> impl Fn(&RepeatTag, Option<NaiveDate>) -> String + '_ {
    move |tag: &RepeatTag, next: Option<NaiveDate>| match next {
        Some(date) => {
            let iso = date.format("%Y-%m-%d");
            format!(
                "<a class=\"repeat-link\" href=\"{}{}\" title=\"Next: {}\">{}</a>",
                escape_html(prefix),
                iso,
                iso,
                escape_html(&tag.raw)
            )
        }
        None => escape_html(&tag.raw),
    }
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}
