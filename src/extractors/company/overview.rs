// src/extractors/company/overview.rs
//! Logged-in company header and `/about` page.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::extractors::fields;
use crate::models::{non_empty, CompanyProfile};
use crate::utils::text::element_text;

static HEADING: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").expect("Failed to compile HEADING"));

static TOP_CARD_TITLE: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".org-top-card-summary__title").expect("Failed to compile TOP_CARD_TITLE")
});

static MAIN: Lazy<Selector> = Lazy::new(|| Selector::parse("main").expect("Failed to compile MAIN"));
static H2: Lazy<Selector> = Lazy::new(|| Selector::parse("h2").expect("Failed to compile H2"));
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").expect("Failed to compile PARAGRAPH"));
static DT: Lazy<Selector> = Lazy::new(|| Selector::parse("dt").expect("Failed to compile DT"));
static DD: Lazy<Selector> = Lazy::new(|| Selector::parse("dd").expect("Failed to compile DD"));
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("Failed to compile LINK"));

/// Company name from the page heading, falling back to the top card title.
pub fn parse_company_name(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&HEADING)
        .chain(document.select(&TOP_CARD_TITLE))
        .map(element_text)
        .find_map(non_empty)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AboutPage {
    pub main_found: bool,
    pub overview: Option<String>,
    /// `dt` label and `dd` value, paired by position.
    pub details: Vec<(String, String)>,
    pub headcount: Option<u64>,
}

pub fn parse_about_page(html: &str) -> AboutPage {
    let document = Html::parse_document(html);

    let labels = document.select(&DT).map(element_text);
    let values = document.select(&DD).map(element_text);

    AboutPage {
        main_found: document.select(&MAIN).next().is_some(),
        overview: overview_text(&document),
        details: labels.zip(values).collect(),
        headcount: document
            .select(&LINK)
            .map(element_text)
            .filter(|text| text.contains("associated members"))
            .find_map(|text| fields::parse_headcount(&text)),
    }
}

/// Paragraph after the "Overview" heading, else the first paragraph on the page.
fn overview_text(document: &Html) -> Option<String> {
    let after_heading = document
        .select(&H2)
        .find(|heading| element_text(*heading).contains("Overview"))
        .and_then(following_paragraph);
    after_heading
        .or_else(|| document.select(&PARAGRAPH).next())
        .map(element_text)
        .and_then(non_empty)
}

fn following_paragraph(heading: ElementRef) -> Option<ElementRef> {
    heading
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| sibling.value().name() == "p")
}

/// Copies the known detail rows onto `company`. Returns how many rows were recognized.
pub fn apply_details(company: &mut CompanyProfile, details: &[(String, String)]) -> usize {
    let mut applied = 0;
    for (label, value) in details {
        let slot = match label.as_str() {
            "Website" => &mut company.website,
            "Phone" => &mut company.phone,
            "Industry" => &mut company.industry,
            "Company size" => &mut company.company_size,
            "Headquarters" => &mut company.headquarters,
            "Type" => &mut company.company_type,
            "Founded" => &mut company.founded,
            "Specialties" => {
                company.specialties = fields::split_specialties(value);
                applied += 1;
                continue;
            }
            other => {
                tracing::trace!("Ignoring company detail '{}'", other);
                continue;
            }
        };
        *slot = non_empty(value.as_str());
        applied += 1;
    }
    applied
}
