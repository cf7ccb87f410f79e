// src/extractors/person/interests.rs
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::config::ScrapeConfig;
use crate::extractors::fields::MIDDLE_DOT;
use crate::extractors::{load_page, save_snapshot, Parsed, Section, SectionOutcome};
use crate::models::{non_empty, Interest};
use crate::session::PageSession;
use crate::utils::error::SessionError;
use crate::utils::text::{collapse_doubled, element_text, href, normalize, outermost, unique_texts, ARIA_HIDDEN_SPAN};

use super::{LIST_ITEM, MAIN};

/// Tab buttons ("Top Voices", "Companies", "Groups", ...).
pub const TAB_SELECTOR: &str = "main button[role='tab']";

static TAB: Lazy<Selector> = Lazy::new(|| Selector::parse(TAB_SELECTOR).expect("Failed to compile TAB"));

static TAB_PANEL: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("main div[role='tabpanel']").expect("Failed to compile TAB_PANEL")
});

static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("Failed to compile LINK"));

/// Tab labels in page order; `None` when the page has no `main`.
pub fn parse_tab_labels(html: &str) -> Option<Vec<String>> {
    let document = Html::parse_document(html);
    document.select(&MAIN).next()?;
    Some(document.select(&TAB).map(tab_label).collect())
}

fn tab_label(tab: ElementRef) -> String {
    match tab.select(&ARIA_HIDDEN_SPAN).next() {
        Some(span) => element_text(span),
        // Without the visual copy the text is both copies run together
        None => collapse_doubled(&normalize(&tab.text().collect::<String>())),
    }
}

/// Parses the open tab panel. Each item becomes one interest tagged with `tab`.
pub fn parse_tab_panel(html: &str, tab: &str) -> Parsed<Interest> {
    let document = Html::parse_document(html);
    let Some(panel) = document.select(&TAB_PANEL).next() else {
        return Parsed::anchor_missing();
    };

    let mut parsed = Parsed::found();
    for item in outermost(panel, &LIST_ITEM) {
        let texts = unique_texts(
            item.select(&ARIA_HIDDEN_SPAN)
                .map(element_text)
                .filter(|text| !text.starts_with(MIDDLE_DOT)),
        );
        let mut texts = texts.into_iter();
        let Some(name) = texts.next() else {
            continue;
        };
        let title = match texts.next() {
            Some(description) => format!("{tab}: {description}"),
            None => tab.to_string(),
        };
        parsed.items.push(Interest {
            name,
            url: item.select(&LINK).next().and_then(href),
            title,
        });
    }
    parsed
}

/// Visits `details/interests` and walks every tab.
pub(super) async fn extract_interests(
    session: &mut dyn PageSession,
    config: &ScrapeConfig,
    url: &str,
    sink: &mut Vec<Interest>,
) -> SectionOutcome {
    tracing::info!("Extracting {} from {}", Section::Interests, url);
    match walk_tabs(session, config, url).await {
        Ok(parsed) => parsed.drain_into(sink),
        Err(e) => SectionOutcome::Failed { reason: e.to_string() },
    }
}

async fn walk_tabs(
    session: &mut dyn PageSession,
    config: &ScrapeConfig,
    url: &str,
) -> Result<Parsed<Interest>, SessionError> {
    let html = load_page(session, url, TAB_SELECTOR, config).await?;
    let Some(tabs) = parse_tab_labels(&html) else {
        return Ok(Parsed::anchor_missing());
    };

    let mut combined = Parsed::found();
    for (index, tab) in tabs.iter().enumerate() {
        let Some(tab) = non_empty(tab.as_str()) else {
            combined.skipped += 1;
            continue;
        };
        if !session.click(TAB_SELECTOR, index).await? {
            tracing::debug!("Interests tab '{}' vanished before it was clicked", tab);
            combined.skipped += 1;
            continue;
        }
        tokio::time::sleep(config.tab_wait).await;
        session.scroll_to(0.5).await?;
        session.scroll_to_bottom().await?;

        let panel = session.content().await?;
        save_snapshot(config, Section::Interests, &panel);
        let parsed = parse_tab_panel(&panel, &tab);
        tracing::debug!("Interests tab '{}': {} items", tab, parsed.items.len());
        combined.items.extend(parsed.items);
        combined.skipped += parsed.skipped;
    }
    Ok(combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::snapshot::SnapshotSession;

    const URL: &str = "https://site.test/in/jane/details/interests";

    const TABS_PAGE: &str = r#"<main>
        <div role="tablist">
          <button role="tab"><span aria-hidden="true">Top Voices</span><span class="visually-hidden">Top Voices</span></button>
          <button role="tab"><span>Companies</span><span>Companies</span></button>
        </div>
        <div role="tabpanel"></div>
    </main>"#;

    const VOICES_PANEL: &str = r#"<main><div role="tabpanel"><ul>
        <li class="pvs-list__paged-list-item">
          <a href="https://site.test/in/grace/"><span aria-hidden="true">Grace Hopper</span></a>
          <span aria-hidden="true">· 3rd</span>
          <span aria-hidden="true">Rear Admiral</span>
          <span aria-hidden="true">Grace Hopper</span>
        </li>
    </ul></div></main>"#;

    const COMPANIES_PANEL: &str = r#"<main><div role="tabpanel"><ul>
        <li class="pvs-list__paged-list-item">
          <a href="https://site.test/company/acme/"><span aria-hidden="true">Acme Corp</span></a>
        </li>
    </ul></div></main>"#;

    #[test]
    fn test_tab_labels_collapse_doubled_text() {
        let labels = parse_tab_labels(TABS_PAGE).unwrap();
        assert_eq!(labels, vec!["Top Voices", "Companies"]);
        assert_eq!(parse_tab_labels("<div></div>"), None);
    }

    #[test]
    fn test_panel_skips_dot_prefixed_texts() {
        let parsed = parse_tab_panel(VOICES_PANEL, "Top Voices");
        assert_eq!(parsed.items.len(), 1);
        let voice = &parsed.items[0];
        assert_eq!(voice.name, "Grace Hopper");
        assert_eq!(voice.title, "Top Voices: Rear Admiral");
        assert_eq!(voice.url.as_deref(), Some("https://site.test/in/grace/"));
    }

    #[tokio::test]
    async fn test_walks_every_tab() {
        let mut session = SnapshotSession::new()
            .with_page(URL, TABS_PAGE)
            .with_click_page(TAB_SELECTOR, 0, &VOICES_PANEL.replace("<main>", &format!("<main>{}", tabs_only())))
            .with_click_page(TAB_SELECTOR, 1, &COMPANIES_PANEL.replace("<main>", &format!("<main>{}", tabs_only())));

        let mut interests = Vec::new();
        let outcome = extract_interests(&mut session, &ScrapeConfig::immediate(), URL, &mut interests).await;

        assert_eq!(outcome, SectionOutcome::Extracted { items: 2, skipped: 0 });
        assert_eq!(interests[1].name, "Acme Corp");
        assert_eq!(interests[1].title, "Companies");
        assert_eq!(session.clicks().len(), 2);
    }

    fn tabs_only() -> &'static str {
        r#"<button role="tab"><span aria-hidden="true">Top Voices</span></button><button role="tab">CompaniesCompanies</button>"#
    }
}
