// src/extractors/company/public.rs
//! Signed-out company page. Fields are addressed by class name, and several of
//! them render a subtitle line ("Website") above the value.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::extractors::Parsed;
use crate::models::{non_empty, CompanyProfile, CompanySummary};
use crate::utils::text::{self, element_text, href, text_lines, text_under_subtitle};

pub const SHOWCASE_TRIGGER_SELECTOR: &str = "#view-other-showcase-pages-dialog";
pub const DIALOG_SELECTOR: &str = "#dialog";
pub const DIALOG_CLOSE_SELECTOR: &str = ".dialog-close";
pub const CAROUSEL_NEXT_SELECTOR: &str = ".affiliated-companies .carousel-control-next";

/// Affiliated names revealed per carousel step.
pub const CAROUSEL_PAGE: usize = 3;

static SHOWCASE_PAGES: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".company-showcase-pages").expect("Failed to compile SHOWCASE_PAGES")
});

static AFFILIATED_NAME: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".affiliated-companies .affiliated-company-name").expect("Failed to compile AFFILIATED_NAME")
});

static AFFILIATED: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".affiliated-companies").expect("Failed to compile AFFILIATED")
});

static LI: Lazy<Selector> = Lazy::new(|| Selector::parse("li").expect("Failed to compile LI"));
static NAME: Lazy<Selector> = Lazy::new(|| Selector::parse(".name").expect("Failed to compile NAME"));
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("Failed to compile LINK"));

enum Reading {
    Text,
    UnderSubtitle,
}

/// Public fields by class, with how each one is read.
const PUBLIC_FIELDS: &[(&str, Reading)] = &[
    ("name", Reading::Text),
    ("basic-info-description", Reading::Text),
    ("specialties", Reading::UnderSubtitle),
    ("website", Reading::UnderSubtitle),
    ("phone", Reading::UnderSubtitle),
    ("adr", Reading::Text),
    ("industry", Reading::Text),
    ("company-size", Reading::Text),
    ("type", Reading::UnderSubtitle),
    ("founded", Reading::UnderSubtitle),
];

/// Values keyed by class name, in `PUBLIC_FIELDS` order; absent classes are skipped.
pub fn parse_public_fields(html: &str) -> Vec<(&'static str, String)> {
    let document = Html::parse_document(html);
    let mut found = Vec::new();
    for (class, reading) in PUBLIC_FIELDS {
        let selector = match text::selector(&format!(".{class}")) {
            Ok(selector) => selector,
            Err(e) => {
                tracing::debug!("Skipping public field: {}", e);
                continue;
            }
        };
        let Some(element) = document.select(&selector).next() else {
            continue;
        };
        let value = match reading {
            Reading::Text => element_text(element),
            Reading::UnderSubtitle => text_under_subtitle(element),
        };
        if let Some(value) = non_empty(value) {
            found.push((*class, value));
        }
    }
    found
}

/// Copies parsed public fields onto `company`.
pub fn apply_public_fields(company: &mut CompanyProfile, fields: Vec<(&'static str, String)>) {
    for (class, value) in fields {
        let slot = match class {
            "name" => &mut company.name,
            "basic-info-description" => &mut company.about_us,
            "specialties" => &mut company.specialties,
            "website" => &mut company.website,
            "phone" => &mut company.phone,
            "adr" => &mut company.headquarters,
            "industry" => &mut company.industry,
            "company-size" => &mut company.company_size,
            "type" => &mut company.company_type,
            "founded" => &mut company.founded,
            _ => continue,
        };
        *slot = Some(value);
    }
}

/// Showcase dialog: the second `.company-showcase-pages` block lists one page per `li`.
pub fn parse_showcase_dialog(html: &str) -> Parsed<CompanySummary> {
    let document = Html::parse_document(html);
    let Some(pages) = document.select(&SHOWCASE_PAGES).nth(1) else {
        return Parsed::anchor_missing();
    };

    let mut parsed = Parsed::found();
    for page in pages.select(&LI) {
        let summary = page.select(&NAME).next().and_then(|name| {
            Some(CompanySummary {
                linkedin_url: name.select(&LINK).next().and_then(href),
                name: non_empty(element_text(name))?,
                followers: text_lines(page).into_iter().nth(1),
            })
        });
        parsed.push(summary);
    }
    parsed
}

/// Number of affiliated names in the carousel, or `None` without a carousel.
pub fn affiliated_count(html: &str) -> Option<usize> {
    let document = Html::parse_document(html);
    document.select(&AFFILIATED).next()?;
    Some(document.select(&AFFILIATED_NAME).count())
}

pub fn parse_affiliated_carousel(html: &str) -> Parsed<CompanySummary> {
    let document = Html::parse_document(html);
    if document.select(&AFFILIATED).next().is_none() {
        return Parsed::anchor_missing();
    }

    let mut parsed = Parsed::found();
    for entry in document.select(&AFFILIATED_NAME) {
        let summary = non_empty(element_text(entry)).map(|name| CompanySummary {
            linkedin_url: entry.select(&LINK).next().and_then(href),
            name,
            followers: None,
        });
        parsed.push(summary);
    }
    parsed
}
