// src/extractors/person/accomplishments.rs
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::extractors::Parsed;
use crate::models::{non_empty, Accomplishment};
use crate::utils::text::element_text;

/// Legacy accomplishments card on the profile page.
pub const ACCOMPLISHMENTS_SELECTOR: &str = ".pv-profile-section.pv-accomplishments-section";

static SECTION: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(ACCOMPLISHMENTS_SELECTOR).expect("Failed to compile SECTION")
});

static BLOCK: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("div.pv-accomplishments-block__content").expect("Failed to compile BLOCK")
});

static CATEGORY: Lazy<Selector> = Lazy::new(|| Selector::parse("h3").expect("Failed to compile CATEGORY"));

static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("ul li").expect("Failed to compile TITLE"));

/// One record per title, tagged with its block heading ("Publications", "Patents", ...).
pub fn parse_accomplishments(html: &str) -> Parsed<Accomplishment> {
    let document = Html::parse_document(html);
    let Some(section) = document.select(&SECTION).next() else {
        return Parsed::anchor_missing();
    };

    let mut parsed = Parsed::found();
    for block in section.select(&BLOCK) {
        let Some(category) = block.select(&CATEGORY).next().map(element_text).and_then(non_empty) else {
            parsed.skipped += 1;
            continue;
        };
        for title in block.select(&TITLE).map(element_text).filter_map(non_empty) {
            parsed.items.push(Accomplishment { category: category.clone(), title });
        }
    }
    parsed
}
