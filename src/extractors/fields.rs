// src/extractors/fields.rs
//! Pure label parsers. Every function here is total: a label of the wrong
//! shape yields default (empty) fields, never an error.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::non_empty;

/// Separator between a date range and its duration ("Jan 2020 - Mar 2022 · 2 yrs 2 mos").
pub const MIDDLE_DOT: char = '·';

static RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<from>.+?)\s+[-–—]\s+(?P<to>.+)$").expect("Failed to compile RANGE_RE")
});

// "2019" or "Jan 2019"
static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\p{L}+\.?\s+)?\d{4}$").expect("Failed to compile DATE_RE")
});

// Open-ended range end such as "Present"
static OPEN_END_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\p{L}+$").expect("Failed to compile OPEN_END_RE"));

static LEADING_COUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?P<count>\d[\d,.]*)").expect("Failed to compile LEADING_COUNT_RE")
});

static HEADCOUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?P<count>[\d,]+)\s*associated members").expect("Failed to compile HEADCOUNT_RE")
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkTimes {
    pub from: Option<String>,
    pub to: Option<String>,
    pub duration: Option<String>,
}

/// "Jan 2020 - Mar 2022" -> ("Jan 2020", "Mar 2022"). A lone "2019" is a range with no end.
pub fn parse_date_range(label: &str) -> DateRange {
    let label = label.trim();
    if let Some(caps) = RANGE_RE.captures(label) {
        let from = caps["from"].trim();
        let to = caps["to"].trim();
        if DATE_RE.is_match(from) && (DATE_RE.is_match(to) || OPEN_END_RE.is_match(to)) {
            return DateRange {
                from: non_empty(from),
                to: non_empty(to),
            };
        }
        return DateRange::default();
    }
    if DATE_RE.is_match(label) {
        return DateRange { from: non_empty(label), to: None };
    }
    DateRange::default()
}

/// "Jan 2020 - Mar 2022 · 2 yrs 2 mos" -> from, to and duration.
pub fn parse_work_times(label: &str) -> WorkTimes {
    let mut parts = label.split(MIDDLE_DOT);
    let times = parts.next().unwrap_or_default();
    let range = parse_date_range(times);
    if range.from.is_none() {
        return WorkTimes::default();
    }
    WorkTimes {
        from: range.from,
        to: range.to,
        duration: parts.next().and_then(non_empty),
    }
}

/// Leading integer of a label: "4 endorsements" -> 4, "99+ endorsements" -> 99, "1,204" -> 1204.
pub fn parse_leading_count(label: &str) -> Option<u32> {
    let caps = LEADING_COUNT_RE.captures(label)?;
    caps["count"].replace([',', '.'], "").parse().ok()
}

/// "14,436 associated members" -> 14436.
pub fn parse_headcount(label: &str) -> Option<u64> {
    let caps = HEADCOUNT_RE.captures(label)?;
    caps["count"].replace(',', "").parse().ok()
}

/// "Issued Mar 2021" -> "Mar 2021".
pub fn strip_issued(label: &str) -> Option<String> {
    non_empty(label.trim().strip_prefix("Issued ").unwrap_or(label.trim()))
}

/// "Credential ID ABC-123" -> "ABC-123"; other labels carry no id.
pub fn credential_id(label: &str) -> Option<String> {
    label.trim().strip_prefix("Credential ID ").and_then(non_empty)
}

/// "Rust, Distributed systems" -> one specialty per line.
pub fn split_specialties(label: &str) -> Option<String> {
    let lines: Vec<&str> = label
        .split(", ")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    non_empty(lines.join("\n"))
}

/// One distinct text fragment of an honors entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HonorLine {
    IssuedBy { issuer: Option<String>, date: Option<String> },
    AssociatedWith(String),
    Plain(String),
}

pub fn classify_honor_line(text: &str) -> HonorLine {
    if text.contains("Issued by ") {
        let rest = text.replacen("Issued by ", "", 1);
        let mut parts = rest.split(" · ");
        return HonorLine::IssuedBy {
            issuer: parts.next().and_then(non_empty),
            date: parts.next().and_then(non_empty),
        };
    }
    if text.contains("Associated with ") {
        return HonorLine::AssociatedWith(text.replacen("Associated with ", "", 1).trim().to_string());
    }
    HonorLine::Plain(text.to_string())
}
