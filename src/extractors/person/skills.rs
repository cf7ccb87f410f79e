// src/extractors/person/skills.rs
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::extractors::fields;
use crate::extractors::Parsed;
use crate::models::{non_empty, Language, Skill};
use crate::utils::text::{element_text, is_empty_section_placeholder, outermost, span_texts, ARIA_HIDDEN_SPAN};

use super::{main_list, main_list_items, LIST_ITEM};

static SKILL_LINK: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("a[href*='keywords=']").expect("Failed to compile SKILL_LINK")
});

static ENDORSERS_LINK: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("a[href*='endorsers']").expect("Failed to compile ENDORSERS_LINK")
});

/// Parses the `details/skills` page.
pub fn parse_skills(html: &str) -> Parsed<Skill> {
    let document = Html::parse_document(html);
    let Some(list) = main_list(&document) else {
        return Parsed::anchor_missing();
    };

    let mut parsed = Parsed::found();
    for item in outermost(list, &LIST_ITEM) {
        // Items without a skill link are layout rows, not skills
        let Some(name) = first_label(item, &SKILL_LINK) else {
            continue;
        };
        if is_empty_section_placeholder(&name) {
            continue;
        }
        let endorsements = first_label(item, &ENDORSERS_LINK)
            .and_then(|label| fields::parse_leading_count(&label))
            .unwrap_or(0);
        parsed.items.push(Skill { name, endorsements });
    }
    parsed
}

fn first_label(item: ElementRef, link: &Selector) -> Option<String> {
    let link = item.select(link).next()?;
    let span = link.select(&ARIA_HIDDEN_SPAN).next()?;
    non_empty(element_text(span))
}

/// Parses the `details/languages` page: name and proficiency are the first two visible labels.
pub fn parse_languages(html: &str) -> Parsed<Language> {
    let document = Html::parse_document(html);
    let Some(items) = main_list_items(&document) else {
        return Parsed::anchor_missing();
    };

    let mut parsed = Parsed::found();
    for item in items {
        let mut labels = span_texts(item).into_iter();
        let Some(name) = labels.next().and_then(non_empty) else {
            continue;
        };
        if is_empty_section_placeholder(&name) {
            continue;
        }
        parsed.items.push(Language {
            name,
            proficiency: labels.next().and_then(non_empty),
        });
    }
    parsed
}
