// src/extractors/company/employees.rs
use std::collections::HashSet;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::config::ScrapeConfig;
use crate::extractors::pagination::Paginator;
use crate::extractors::{save_snapshot, section_url, Parsed, Section, SectionOutcome};
use crate::models::{non_empty, Employee};
use crate::session::PageSession;
use crate::utils::error::SessionError;
use crate::utils::text::{element_text, href, outermost, text_lines, ARIA_HIDDEN_SPAN};

pub const ROSTER_SELECTOR: &str = ".list-style-none";
pub const ROSTER_ITEM_SELECTOR: &str = ".list-style-none li";
pub const NEXT_SELECTOR: &str = "button[aria-label='Next']";
const NAME_FALLBACK_SELECTOR: &str = "span[dir='ltr']";

static ROSTER: Lazy<Selector> = Lazy::new(|| Selector::parse(ROSTER_SELECTOR).expect("Failed to compile ROSTER"));
static LI: Lazy<Selector> = Lazy::new(|| Selector::parse("li").expect("Failed to compile LI"));
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("Failed to compile LINK"));
static SUBTITLE: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".artdeco-entity-lockup__subtitle").expect("Failed to compile SUBTITLE")
});

/// Employee cards in one snapshot of the `/people` page.
pub fn parse_employees(html: &str) -> Parsed<Employee> {
    let document = Html::parse_document(html);
    let Some(roster) = document.select(&ROSTER).next() else {
        return Parsed::anchor_missing();
    };

    let mut parsed = Parsed::found();
    for card in outermost(roster, &LI) {
        parsed.push(parse_card(card));
    }
    parsed
}

fn parse_card(card: ElementRef) -> Option<Employee> {
    // Cards without a profile link are placeholders ("LinkedIn Member")
    let linkedin_url = card.select(&LINK).next().and_then(href)?;
    let lines = text_lines(card);

    let name = card
        .select(&ARIA_HIDDEN_SPAN)
        .next()
        .map(element_text)
        .and_then(non_empty)
        .or_else(|| lines.first().cloned().and_then(non_empty))?;
    let designation = card
        .select(&SUBTITLE)
        .next()
        .map(element_text)
        .and_then(non_empty)
        .or_else(|| lines.get(3).cloned().and_then(non_empty));

    Some(Employee {
        name,
        designation,
        linkedin_url,
    })
}

/// Accumulates roster snapshots, keeping the first card seen for each profile URL.
#[derive(Debug, Default)]
pub struct RosterMerge {
    seen: HashSet<String>,
    employees: Vec<Employee>,
    skipped: usize,
    anchor_found: bool,
}

impl RosterMerge {
    pub fn add_snapshot(&mut self, html: &str) {
        let parsed = parse_employees(html);
        self.anchor_found |= parsed.anchor_found;
        // Cards stay on the page as it grows, so the latest count covers earlier ones
        self.skipped = self.skipped.max(parsed.skipped);
        for employee in parsed.items {
            if self.seen.insert(employee.linkedin_url.clone()) {
                self.employees.push(employee);
            }
        }
    }

    pub fn into_parsed(self) -> Parsed<Employee> {
        Parsed {
            items: self.employees,
            skipped: self.skipped,
            anchor_found: self.anchor_found,
        }
    }
}

/// Loads `/people` and pages through the roster until it stops growing.
pub(super) async fn extract_employees(
    session: &mut dyn PageSession,
    config: &ScrapeConfig,
    company_url: &str,
    sink: &mut Vec<Employee>,
) -> SectionOutcome {
    let url = section_url(company_url, "people");
    tracing::info!("Extracting {} from {}", Section::Employees, url);
    match walk_roster(session, config, &url).await {
        Ok(merge) => merge.into_parsed().drain_into(sink),
        Err(e) => SectionOutcome::Failed { reason: e.to_string() },
    }
}

async fn walk_roster(
    session: &mut dyn PageSession,
    config: &ScrapeConfig,
    url: &str,
) -> Result<RosterMerge, SessionError> {
    session.goto(url).await?;
    let listed = session
        .wait_for(ROSTER_SELECTOR, config.company_wait, config.poll_interval)
        .await?;
    if !listed {
        session
            .wait_or_sleep(NAME_FALLBACK_SELECTOR, config.company_wait, config.poll_interval, config.fallback_sleep)
            .await?;
    }
    for fraction in [0.5, 0.75] {
        session.scroll_to(fraction).await?;
        tokio::time::sleep(config.scroll_pause).await;
    }

    let mut merge = RosterMerge::default();
    let mut paginator = Paginator::new(&config.pagination, ROSTER_ITEM_SELECTOR, ROSTER_SELECTOR, NEXT_SELECTOR)
        .with_waits(config.employee_wait, config.poll_interval, config.scroll_pause);
    let visible = paginator
        .run(session, |html| {
            save_snapshot(config, Section::Employees, html);
            merge.add_snapshot(html);
        })
        .await?;
    tracing::debug!("Roster stopped at {} visible cards", visible);
    Ok(merge)
}

#[cfg(test)]
pub(super) mod tests {
    use super::*;
    use crate::session::snapshot::SnapshotSession;

    pub(crate) const PEOPLE_PAGE: &str = r#"<html><body><main>
        <ul class="list-style-none">
          <li>
            <a href="https://site.test/in/wile/"><span aria-hidden="true">Wile E. Coyote</span></a>
            <div class="artdeco-entity-lockup__subtitle">Head of Research</div>
          </li>
          <li>
            <a href="https://site.test/in/road/"></a>
            <div>Road Runner</div><div>2nd</div><div>Connect</div><div>Speed Consultant</div>
          </li>
          <li><div>LinkedIn Member</div><div>Sales</div></li>
          <li>
            <a href="https://site.test/in/wile/"><span aria-hidden="true">Wile E. Coyote</span></a>
          </li>
        </ul>
        <button aria-label="Next">Next</button>
    </main></body></html>"#;

    #[test]
    fn test_cards() {
        let parsed = parse_employees(PEOPLE_PAGE);
        assert_eq!(parsed.skipped, 1);
        assert_eq!(parsed.items.len(), 3);

        assert_eq!(parsed.items[0].name, "Wile E. Coyote");
        assert_eq!(parsed.items[0].designation.as_deref(), Some("Head of Research"));
        assert_eq!(parsed.items[1].name, "Road Runner");
        assert_eq!(parsed.items[1].designation.as_deref(), Some("Speed Consultant"));
        assert_eq!(parsed.items[1].linkedin_url, "https://site.test/in/road/");
    }

    #[test]
    fn test_merge_keeps_first_occurrence_by_url() {
        let mut merge = RosterMerge::default();
        merge.add_snapshot(PEOPLE_PAGE);
        merge.add_snapshot(PEOPLE_PAGE);
        let parsed = merge.into_parsed();
        assert_eq!(parsed.items.len(), 2);
        assert_eq!(parsed.items[0].designation.as_deref(), Some("Head of Research"));
        assert_eq!(parsed.skipped, 1);
    }

    #[tokio::test]
    async fn test_roster_walk_terminates_on_static_page() {
        let mut session = SnapshotSession::new().with_page("https://site.test/company/acme/people", PEOPLE_PAGE);
        let mut employees = Vec::new();
        let outcome =
            extract_employees(&mut session, &ScrapeConfig::immediate(), "https://site.test/company/acme/", &mut employees)
                .await;

        assert_eq!(outcome, SectionOutcome::Extracted { items: 2, skipped: 1 });
        assert_eq!(employees[1].name, "Road Runner");
    }

    #[tokio::test]
    async fn test_missing_roster() {
        let mut session = SnapshotSession::new();
        let mut employees = Vec::new();
        let outcome =
            extract_employees(&mut session, &ScrapeConfig::immediate(), "https://site.test/company/acme", &mut employees)
                .await;
        assert_eq!(outcome, SectionOutcome::AnchorMissing);
    }
}
