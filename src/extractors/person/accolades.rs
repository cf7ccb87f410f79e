// src/extractors/person/accolades.rs
//! Certifications and honors. Both render one card per entry with every label
//! duplicated for screen readers.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::extractors::fields::{self, HonorLine};
use crate::extractors::Parsed;
use crate::models::{non_empty, Certification, HonorAward};
use crate::utils::text::{href, is_empty_section_placeholder, outermost, span_texts, unique_span_texts};

use super::{main_list, main_list_items, LIST_ITEM};

static CREDENTIAL_LINK: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("a[href*='credential']").expect("Failed to compile CREDENTIAL_LINK")
});

/// Parses `details/certifications`: name, organization, "Issued ..." and "Credential ID ..." labels in order.
pub fn parse_certifications(html: &str) -> Parsed<Certification> {
    let document = Html::parse_document(html);
    let Some(items) = main_list_items(&document) else {
        return Parsed::anchor_missing();
    };

    let mut parsed = Parsed::found();
    for item in items {
        let labels = span_texts(item);
        let label_at = |i: usize| labels.get(i).cloned().and_then(non_empty);
        let Some(name) = label_at(0) else {
            continue;
        };
        if is_empty_section_placeholder(&name) {
            continue;
        }
        parsed.items.push(Certification {
            name,
            organization: label_at(1),
            issue_date: labels.get(2).and_then(|label| fields::strip_issued(label)),
            credential_id: labels.get(3).and_then(|label| fields::credential_id(label)),
            credential_url: item.select(&CREDENTIAL_LINK).next().and_then(href),
        });
    }
    parsed
}

/// Parses `details/honors`.
pub fn parse_honors(html: &str) -> Parsed<HonorAward> {
    let document = Html::parse_document(html);
    let Some(list) = main_list(&document) else {
        return Parsed::anchor_missing();
    };

    let mut parsed = Parsed::found();
    for item in outermost(list, &LIST_ITEM) {
        if let Some(honor) = honor_from_lines(&unique_span_texts(item)) {
            parsed.items.push(honor);
        }
    }
    parsed
}

/// First plain line is the title, later plain lines form the description.
fn honor_from_lines(lines: &[String]) -> Option<HonorAward> {
    let mut title: Option<String> = None;
    let mut issuer = None;
    let mut issue_date = None;
    let mut associated_with = None;
    let mut description: Vec<&str> = Vec::new();

    for line in lines {
        match fields::classify_honor_line(line) {
            HonorLine::IssuedBy { issuer: by, date } => {
                issuer = by;
                issue_date = date;
            }
            HonorLine::AssociatedWith(with) => associated_with = non_empty(with),
            HonorLine::Plain(_) if title.is_none() => title = Some(line.clone()),
            HonorLine::Plain(_) => description.push(line),
        }
    }

    let title = title?;
    if is_empty_section_placeholder(&title) {
        return None;
    }
    Some(HonorAward {
        title,
        issuer,
        issue_date,
        description: non_empty(description.join(" ")),
        associated_with,
    })
}
