// src/extractors/company/related.rs
//! Showcase pages and affiliated companies of the logged-in layout.
//!
//! The page renders two `.company-list` blocks: the first lists showcase
//! pages, the second affiliated companies.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::extractors::Parsed;
use crate::models::{non_empty, CompanySummary};
use crate::utils::text::{element_text, href};

pub const COMPANY_LIST_SELECTOR: &str = ".company-list";
pub const SHOW_MORE_SELECTOR: &str = "#org-related-companies-module__show-more-btn";

static COMPANY_LIST: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(COMPANY_LIST_SELECTOR).expect("Failed to compile COMPANY_LIST")
});

static CARD: Lazy<Selector> = Lazy::new(|| Selector::parse(".org-company-card").expect("Failed to compile CARD"));

static NAME_LINK: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".company-name-link").expect("Failed to compile NAME_LINK")
});

static FOLLOWERS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".company-followers-count").expect("Failed to compile FOLLOWERS")
});

#[derive(Debug, Clone, PartialEq)]
pub struct RelatedCompanies {
    pub showcase: Parsed<CompanySummary>,
    pub affiliated: Parsed<CompanySummary>,
}

pub fn parse_related_companies(html: &str) -> RelatedCompanies {
    let document = Html::parse_document(html);
    let mut lists = document.select(&COMPANY_LIST);
    RelatedCompanies {
        showcase: parse_cards(lists.next()),
        affiliated: parse_cards(lists.next()),
    }
}

fn parse_cards(list: Option<ElementRef>) -> Parsed<CompanySummary> {
    let Some(list) = list else {
        return Parsed::anchor_missing();
    };
    let mut parsed = Parsed::found();
    for card in list.select(&CARD) {
        parsed.push(parse_card(card));
    }
    parsed
}

fn parse_card(card: ElementRef) -> Option<CompanySummary> {
    let link = card.select(&NAME_LINK).next()?;
    Some(CompanySummary {
        linkedin_url: href(link),
        name: non_empty(element_text(link))?,
        followers: card.select(&FOLLOWERS).next().map(element_text).and_then(non_empty),
    })
}

#[cfg(test)]
pub(super) mod tests {
    use super::*;
    use crate::extractors::SectionOutcome;

    pub(crate) const RELATED_LISTS: &str = r#"
        <ul class="company-list">
          <li class="org-company-card">
            <a class="company-name-link" href="https://site.test/showcase/acme-labs/">Acme Labs</a>
            <span class="company-followers-count">1,204 followers</span>
          </li>
        </ul>
        <ul class="company-list">
          <li class="org-company-card">
            <a class="company-name-link" href="https://site.test/company/roadrunner-inc/">Roadrunner Inc</a>
          </li>
          <li class="org-company-card"><span>Unnamed</span></li>
        </ul>
        <button id="org-related-companies-module__show-more-btn">Show more</button>
    "#;

    #[test]
    fn test_showcase_and_affiliated_are_distinct_lists() {
        let related = parse_related_companies(&format!("<main>{RELATED_LISTS}</main>"));

        assert_eq!(related.showcase.items.len(), 1);
        assert_eq!(related.showcase.items[0].name, "Acme Labs");
        assert_eq!(related.showcase.items[0].followers.as_deref(), Some("1,204 followers"));

        assert_eq!(related.affiliated.outcome(), SectionOutcome::Extracted { items: 1, skipped: 1 });
        assert_eq!(related.affiliated.items[0].name, "Roadrunner Inc");
        assert_eq!(
            related.affiliated.items[0].linkedin_url.as_deref(),
            Some("https://site.test/company/roadrunner-inc/")
        );
    }

    #[test]
    fn test_single_list_leaves_affiliated_missing() {
        let related = parse_related_companies(r#"<ul class="company-list"></ul>"#);
        assert_eq!(related.showcase.outcome(), SectionOutcome::Empty);
        assert_eq!(related.affiliated.outcome(), SectionOutcome::AnchorMissing);
    }
}
