use phonenumber::{Mode, country};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Digit runs that could be a phone number: an optional `+`, then digits
/// broken up by spaces, dots, dashes, slashes or parentheses.
static CANDIDATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+?\(?\d[\d\s().\-/]{4,}\d").expect("candidate pattern compiles")
});

/// `22.6.2022`, `01/02/2023`, `2022-06-22`
static DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d{1,2}[./-]\d{1,2}[./-]\d{2,4}|\d{4}-\d{1,2}-\d{1,2})$")
        .expect("date pattern compiles")
});

/// `8.00 - 17.00`, `08:30`
static TIME_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{1,2}[.:]\d{2}(?:\s*[-/]\s*\d{1,2}[.:]\d{2})?$")
        .expect("time pattern compiles")
});

/// Digit groups inside a candidate, split on whitespace and `/`
static GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\s/]+").expect("group pattern compiles"));

const MIN_DIGITS: usize = 6;

fn is_date_or_time(raw: &str) -> bool {
    DATE.is_match(raw) || TIME_RANGE.is_match(raw)
}

/// A phone number found in a text unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneMatch {
    /// The text as it appeared on the page
    pub raw: String,
    international: String,
}

impl PhoneMatch {
    pub fn new(raw: impl Into<String>, international: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            international: international.into(),
        }
    }

    /// E.164 rendering: `+`, country code, national number
    pub fn to_international(&self) -> &str {
        &self.international
    }
}

/// Finds phone numbers in a piece of text.
pub trait PhoneMatcher: Send + Sync {
    /// All numbers in `text`, in order of appearance. National-format
    /// numbers are only recognised when a `region` is given.
    fn match_all(&self, text: &str, region: Option<country::Id>) -> Vec<PhoneMatch>;
}

/// Matcher backed by libphonenumber metadata; only numbers the metadata
/// considers valid for their region are returned.
#[derive(Debug, Default, Clone, Copy)]
pub struct LibPhoneMatcher;

impl LibPhoneMatcher {
    pub fn new() -> Self {
        Self
    }

    fn parse_candidate(raw: &str, region: Option<country::Id>) -> Option<PhoneMatch> {
        let digits = raw.chars().filter(char::is_ascii_digit).count();
        if digits < MIN_DIGITS || is_date_or_time(raw) {
            return None;
        }

        // "+49 (0) 40 ..." carries the national trunk prefix inside an
        // international number
        let cleaned = if raw.starts_with('+') {
            raw.replace("(0)", "")
        } else {
            raw.to_string()
        };

        let number = phonenumber::parse(region, &cleaned).ok()?;
        if !phonenumber::is_valid(&number) {
            debug!("Rejected invalid number candidate '{}'", raw);
            return None;
        }

        let international = number.format().mode(Mode::E164).to_string();
        Some(PhoneMatch::new(raw, international))
    }

    /// Numbers in one regex candidate. Neighbouring numbers ("040 3006990 /
    /// 040 3006991") or a date in front of a number run together into a
    /// single invalid candidate; those are split into digit groups and
    /// re-read from the left, taking the shortest valid run each time.
    fn candidate_matches(raw: &str, region: Option<country::Id>) -> Vec<PhoneMatch> {
        if is_date_or_time(raw) {
            return Vec::new();
        }
        if let Some(found) = Self::parse_candidate(raw, region) {
            return vec![found];
        }

        let groups: Vec<_> = GROUP.find_iter(raw).collect();
        let mut found = Vec::new();
        let mut start = 0;

        while start < groups.len() {
            if is_date_or_time(groups[start].as_str()) {
                start += 1;
                continue;
            }

            let mut next = start + 1;
            for end in start..groups.len() {
                if end > start && is_date_or_time(groups[end].as_str()) {
                    break;
                }
                let span = &raw[groups[start].start()..groups[end].end()];
                if let Some(number) = Self::parse_candidate(span, region) {
                    found.push(number);
                    next = end + 1;
                    break;
                }
            }
            start = next;
        }

        found
    }
}

impl PhoneMatcher for LibPhoneMatcher {
    fn match_all(&self, text: &str, region: Option<country::Id>) -> Vec<PhoneMatch> {
        CANDIDATE
            .find_iter(text)
            .flat_map(|candidate| Self::candidate_matches(candidate.as_str().trim(), region))
            .collect()
    }
}
