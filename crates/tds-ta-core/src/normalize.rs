//! Text cleaning and best-effort date extraction for scraped content.
//!
//! [`clean`] strips scraped text down to words, whitespace, and basic
//! punctuation. [`extract_date`] finds a publication date using an ordered
//! list of pattern rules.
//!
//! # Date rules
//!
//! | Priority | Rule | Example |
//! |----------|------|---------|
//! | 1 | day month year | `15 April 2025` |
//! | 2 | month day, year | `April 15, 2025` |
//! | 3 | ISO | `2025-04-15` |
//!
//! Only the first regex match of a rule is considered. The matched text is
//! parsed with every entry of [`DATE_FORMATS`] in order; a format that does
//! not fit is skipped silently. What happens when *no* format fits is
//! governed by [`DateFallthrough`].

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

static DISALLOWED_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s.,!?\-]").expect("character filter pattern"));

/// `strftime`-style formats tried against every matched date substring.
pub const DATE_FORMATS: [&str; 3] = ["%d %B %Y", "%B %d, %Y", "%Y-%m-%d"];

/// Month names accepted by `%B`. Abbreviations such as `Apr` are rejected.
const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

struct DateRule {
    name: &'static str,
    pattern: Regex,
}

static DATE_RULES: LazyLock<Vec<DateRule>> = LazyLock::new(|| {
    [
        ("day-month-year", r"(\d{1,2}\s+\w+\s+\d{4})"),
        ("month-day-year", r"(\w+\s+\d{1,2},\s+\d{4})"),
        ("iso", r"(\d{4}-\d{2}-\d{2})"),
    ]
    .into_iter()
    .map(|(name, pattern)| DateRule {
        name,
        pattern: Regex::new(pattern).expect("date pattern"),
    })
    .collect()
});

/// What [`extract_date_with`] does when a rule matches but none of the
/// formats can parse the matched text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum DateFallthrough {
    /// Give up: the first rule that matches decides the outcome.
    #[default]
    #[serde(rename = "stop")]
    StopAtFirstMatch,
    /// Keep trying the lower-priority rules.
    #[serde(rename = "next-pattern")]
    NextPattern,
}

/// Clean scraped text.
///
/// Removes every character that is not a word character, whitespace, or one
/// of `. , ! ? -`, collapses whitespace runs to a single space, and trims.
/// Filtering happens before collapsing so that `clean(clean(t)) == clean(t)`.
pub fn clean(text: &str) -> String {
    let filtered = DISALLOWED_CHARS.replace_all(text, "");
    let collapsed = WHITESPACE_RUN.replace_all(&filtered, " ");
    collapsed.trim().to_string()
}

/// Extract a date with the default [`DateFallthrough::StopAtFirstMatch`] policy.
pub fn extract_date(text: &str) -> Option<NaiveDate> {
    extract_date_with(text, DateFallthrough::default())
}

/// Extract a date from `text`, trying the rules in priority order.
pub fn extract_date_with(text: &str, fallthrough: DateFallthrough) -> Option<NaiveDate> {
    for rule in DATE_RULES.iter() {
        let Some(found) = rule.pattern.find(text) else {
            continue;
        };
        if let Some(date) = parse_candidate(found.as_str()) {
            return Some(date);
        }
        if fallthrough == DateFallthrough::StopAtFirstMatch {
            return None;
        }
    }
    None
}

/// Name of the first rule whose pattern matches `text`, if any.
pub fn matching_rule(text: &str) -> Option<&'static str> {
    DATE_RULES
        .iter()
        .find(|rule| rule.pattern.is_match(text))
        .map(|rule| rule.name)
}

fn parse_candidate(candidate: &str) -> Option<NaiveDate> {
    let candidate = candidate.split_whitespace().collect::<Vec<_>>().join(" ");
    if !words_are_full_month_names(&candidate) {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&candidate, fmt).ok())
}

/// chrono's `%B` also parses abbreviated names, so the spelled-out form is
/// checked separately.
fn words_are_full_month_names(candidate: &str) -> bool {
    candidate
        .split(|c: char| !c.is_alphabetic())
        .filter(|word| !word.is_empty())
        .all(|word| MONTH_NAMES.iter().any(|name| name.eq_ignore_ascii_case(word)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_clean_collapses_whitespace() {
        assert_eq!(clean("  hello \n\n\t world  "), "hello world");
    }

    #[test]
    fn test_clean_strips_disallowed_characters() {
        assert_eq!(clean("What's GA5? (due: today!)"), "Whats GA5? due today!");
        assert_eq!(clean("a-b, c. d_e"), "a-b, c. d_e");
    }

    #[test]
    fn test_clean_removal_does_not_leave_double_spaces() {
        assert_eq!(clean("a @ b"), "a b");
        assert_eq!(clean("x * * * y"), "x y");
    }

    #[test]
    fn test_clean_is_idempotent() {
        let samples = [
            "",
            "   ",
            "plain text",
            "a @ b # c",
            "Line one\r\nLine two\t\ttabbed",
            "**Bold** and `code` [link](http://x)",
            "emoji 🎉 and ünïcödé",
            " - leading dash - ",
        ];
        for s in samples {
            let once = clean(s);
            assert_eq!(clean(&once), once, "not idempotent for {:?}", s);
        }
    }

    #[test]
    fn test_clean_empty_input() {
        assert_eq!(clean(""), "");
        assert_eq!(clean("@#$%"), "");
    }

    #[test]
    fn test_extract_day_month_year() {
        assert_eq!(extract_date("15 April 2025"), ymd(2025, 4, 15));
        assert_eq!(extract_date("posted on 5 may 2024 by staff"), ymd(2024, 5, 5));
    }

    #[test]
    fn test_extract_month_day_year() {
        assert_eq!(extract_date("April 15, 2025"), ymd(2025, 4, 15));
    }

    #[test]
    fn test_extract_iso() {
        assert_eq!(extract_date("2025-04-15"), ymd(2025, 4, 15));
        assert_eq!(
            extract_date("https://discourse.example/t/ga5/2025-01-31/12"),
            ymd(2025, 1, 31)
        );
    }

    #[test]
    fn test_extract_none() {
        assert_eq!(extract_date("no date here"), None);
        assert_eq!(extract_date(""), None);
    }

    #[test]
    fn test_extract_multiline_whitespace_in_match() {
        assert_eq!(extract_date("15\n  April   2025"), ymd(2025, 4, 15));
    }

    #[test]
    fn test_malformed_match_is_skipped_not_raised() {
        assert_eq!(extract_date("2025-13-45"), None);
        assert_eq!(extract_date("31 February 2025"), None);
    }

    #[test]
    fn test_abbreviated_month_is_not_a_date() {
        assert_eq!(extract_date("15 Apr 2025"), None);
        assert_eq!(extract_date("Apr 15, 2025"), None);
        assert_eq!(extract_date("1 SEPT 2024"), None);
        assert_eq!(extract_date("15 APRIL 2025"), ymd(2025, 4, 15));
    }

    #[test]
    fn test_abbreviated_month_falls_through_to_iso() {
        let text = "15 Apr 2025, updated 2025-05-01";
        assert_eq!(extract_date(text), None);
        assert_eq!(
            extract_date_with(text, DateFallthrough::NextPattern),
            ymd(2025, 5, 1)
        );
    }

    #[test]
    fn test_stop_at_first_matching_rule() {
        // "12 items 2024" matches the day-month-year rule but is not a date.
        let text = "12 items 2024, later on 2025-04-15";
        assert_eq!(matching_rule(text), Some("day-month-year"));
        assert_eq!(extract_date(text), None);
        assert_eq!(
            extract_date_with(text, DateFallthrough::StopAtFirstMatch),
            None
        );
    }

    #[test]
    fn test_next_pattern_fallthrough() {
        let text = "12 items 2024, later on 2025-04-15";
        assert_eq!(
            extract_date_with(text, DateFallthrough::NextPattern),
            ymd(2025, 4, 15)
        );
    }

    #[test]
    fn test_fallthrough_deserializes_from_config_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: DateFallthrough,
        }
        let w: Wrapper = serde_json::from_str(r#"{"policy": "next-pattern"}"#).unwrap();
        assert_eq!(w.policy, DateFallthrough::NextPattern);
        let w: Wrapper = serde_json::from_str(r#"{"policy": "stop"}"#).unwrap();
        assert_eq!(w.policy, DateFallthrough::StopAtFirstMatch);
    }
}
