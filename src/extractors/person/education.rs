// src/extractors/person/education.rs
use scraper::{ElementRef, Html};

use crate::extractors::fields;
use crate::extractors::Parsed;
use crate::models::{non_empty, Education};
use crate::utils::text::{element_children, first_element_child, href, outermost};

use super::experience::{description_text, ENTITY};
use super::{main_list, row_text, LIST_ITEM};

/// Parses the `details/education` page.
pub fn parse_educations(html: &str) -> Parsed<Education> {
    let document = Html::parse_document(html);
    let Some(list) = main_list(&document) else {
        return Parsed::anchor_missing();
    };

    let mut parsed = Parsed::found();
    for item in outermost(list, &LIST_ITEM) {
        parsed.push(parse_entry(item));
    }
    parsed
}

fn parse_entry(item: ElementRef) -> Option<Education> {
    let entity = item.select(&ENTITY).next()?;
    let children = element_children(entity);
    if children.len() < 2 {
        return None;
    }

    // Schools without a page are still listed
    let institution_url = first_element_child(children[0]).and_then(href);

    let details = element_children(children[1]);
    let summary = *details.first()?;
    let summary_text = details.get(1).copied();
    let rows = element_children(first_element_child(summary)?);
    let text_at = |i: usize| rows.get(i).map(|row| row_text(*row)).and_then(non_empty);

    let institution_name = text_at(0);
    institution_name.as_ref()?;

    let dates = text_at(2)
        .map(|label| fields::parse_date_range(&label))
        .unwrap_or_default();

    Some(Education {
        institution_name,
        institution_url,
        degree: text_at(1),
        from_date: dates.from,
        to_date: dates.to,
        description: summary_text.and_then(description_text),
    })
}
