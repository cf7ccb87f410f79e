// src/extractors/mod.rs
//! Section extraction: an async shell that drives the page session, and pure
//! parsers that turn one HTML snapshot into records.

pub mod auth;
pub mod company;
pub mod fields;
pub mod pagination;
pub mod person;

use std::fmt;

use serde::Serialize;

use crate::config::ScrapeConfig;
use crate::session::PageSession;
use crate::utils::error::SessionError;
use crate::utils::html_debug;

pub use company::Company;
pub use person::Person;

/// Sections of a profile or company page, in extraction order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    TopCard,
    About,
    Experience,
    Education,
    Skills,
    Languages,
    Certifications,
    Honors,
    Interests,
    Accomplishments,
    Contacts,
    CompanyName,
    CompanyOverview,
    CompanyDetails,
    Headcount,
    Showcase,
    Affiliated,
    Employees,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::TopCard => "top_card",
            Section::About => "about",
            Section::Experience => "experience",
            Section::Education => "education",
            Section::Skills => "skills",
            Section::Languages => "languages",
            Section::Certifications => "certifications",
            Section::Honors => "honors",
            Section::Interests => "interests",
            Section::Accomplishments => "accomplishments",
            Section::Contacts => "contacts",
            Section::CompanyName => "company_name",
            Section::CompanyOverview => "company_overview",
            Section::CompanyDetails => "company_details",
            Section::Headcount => "headcount",
            Section::Showcase => "showcase",
            Section::Affiliated => "affiliated",
            Section::Employees => "employees",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to one section. Distinguishes "absent" from "present but empty".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SectionOutcome {
    Extracted { items: usize, skipped: usize },
    Empty,
    AnchorMissing,
    /// Not run: disabled, or not part of the active strategy.
    Skipped,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionReport {
    pub section: Section,
    #[serde(flatten)]
    pub outcome: SectionOutcome,
}

/// Which extraction path the authentication gate selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    LoggedIn,
    Public,
    Refused,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrapeReport {
    pub strategy: Strategy,
    pub sections: Vec<SectionReport>,
}

impl ScrapeReport {
    pub fn new(strategy: Strategy) -> Self {
        Self { strategy, sections: Vec::new() }
    }

    pub fn record(&mut self, section: Section, outcome: SectionOutcome) {
        match &outcome {
            SectionOutcome::Extracted { items, skipped } => {
                tracing::info!("{}: {} extracted, {} skipped", section, items, skipped)
            }
            SectionOutcome::Empty => tracing::info!("{}: present but empty", section),
            SectionOutcome::AnchorMissing => tracing::warn!("{}: anchor element missing", section),
            SectionOutcome::Skipped => tracing::debug!("{}: skipped", section),
            SectionOutcome::Failed { reason } => tracing::warn!("{}: failed: {}", section, reason),
        }
        self.sections.push(SectionReport { section, outcome });
    }

    /// Latest outcome recorded for `section`.
    pub fn outcome(&self, section: Section) -> Option<&SectionOutcome> {
        self.sections
            .iter()
            .rev()
            .find(|report| report.section == section)
            .map(|report| &report.outcome)
    }

    pub fn failures(&self) -> usize {
        self.sections
            .iter()
            .filter(|r| matches!(r.outcome, SectionOutcome::Failed { .. }))
            .count()
    }
}

/// Result of parsing one snapshot for one section.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    pub items: Vec<T>,
    pub skipped: usize,
    pub anchor_found: bool,
}

impl<T> Parsed<T> {
    pub fn anchor_missing() -> Self {
        Self { items: Vec::new(), skipped: 0, anchor_found: false }
    }

    pub fn found() -> Self {
        Self { items: Vec::new(), skipped: 0, anchor_found: true }
    }

    /// Keeps a parsed item or counts a shape mismatch.
    pub fn push(&mut self, item: Option<T>) {
        match item {
            Some(item) => self.items.push(item),
            None => self.skipped += 1,
        }
    }

    pub fn outcome(&self) -> SectionOutcome {
        if !self.anchor_found {
            SectionOutcome::AnchorMissing
        } else if self.items.is_empty() && self.skipped == 0 {
            SectionOutcome::Empty
        } else {
            SectionOutcome::Extracted { items: self.items.len(), skipped: self.skipped }
        }
    }

    /// Moves the items into `sink` and reports the outcome.
    pub fn drain_into(self, sink: &mut Vec<T>) -> SectionOutcome {
        let outcome = self.outcome();
        sink.extend(self.items);
        outcome
    }
}

/// Outcome for a single-valued field (name, about text, ...).
pub fn field_outcome(anchor_found: bool, value: &Option<String>) -> SectionOutcome {
    match (anchor_found, value) {
        (false, _) => SectionOutcome::AnchorMissing,
        (true, Some(_)) => SectionOutcome::Extracted { items: 1, skipped: 0 },
        (true, None) => SectionOutcome::Empty,
    }
}

/// `.../in/jane/` + `details/experience` -> `.../in/jane/details/experience`.
pub fn section_url(base: &str, suffix: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), suffix.trim_start_matches('/'))
}

/// Page skeleton every section page renders before its lists.
pub(crate) const PAGE_SKELETON: &str = "main";

/// Navigate, scroll to trigger lazy content, wait for `anchor` (falling back to a fixed sleep), snapshot.
pub(crate) async fn load_page(
    session: &mut dyn PageSession,
    url: &str,
    anchor: &str,
    config: &ScrapeConfig,
) -> Result<String, SessionError> {
    session.goto(url).await?;
    session
        .wait_for(PAGE_SKELETON, config.wait_timeout, config.poll_interval)
        .await?;
    session.scroll_to(0.5).await?;
    session.scroll_to_bottom().await?;
    // Lists render after the scroll
    session
        .wait_or_sleep(anchor, config.wait_timeout, config.poll_interval, config.fallback_sleep)
        .await?;
    session.content().await
}

/// Loads a page and hands its snapshot to `parse`. Session errors become `Failed`.
pub(crate) async fn run_section<T>(
    session: &mut dyn PageSession,
    config: &ScrapeConfig,
    section: Section,
    url: &str,
    anchor: &str,
    parse: fn(&str) -> Parsed<T>,
    sink: &mut Vec<T>,
) -> SectionOutcome {
    tracing::info!("Extracting {} from {}", section, url);
    match load_page(session, url, anchor, config).await {
        Ok(html) => {
            save_snapshot(config, section, &html);
            parse(&html).drain_into(sink)
        }
        Err(e) => SectionOutcome::Failed { reason: e.to_string() },
    }
}

/// Writes an annotated copy of `html` when a debug directory is configured. Best effort.
pub(crate) fn save_snapshot(config: &ScrapeConfig, section: Section, html: &str) {
    let Some(dir) = &config.debug_dir else {
        return;
    };
    if let Err(e) = std::fs::create_dir_all(dir) {
        tracing::warn!("Cannot create debug directory {}: {}", dir.display(), e);
        return;
    }
    let path = dir.join(format!("{}_{}.html", section, chrono::Utc::now().format("%H%M%S%3f")));
    let owned = html_debug::section_patterns(&["pvs-list__container", "company-list", "mn-connections"]);
    let patterns: Vec<(&str, &str)> = owned.iter().map(|(p, t)| (p.as_str(), *t)).collect();
    if let Err(e) = html_debug::create_debug_html(html, &path, &patterns) {
        tracing::warn!("Failed to create debug HTML: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_outcomes() {
        let missing: Parsed<u8> = Parsed::anchor_missing();
        assert_eq!(missing.outcome(), SectionOutcome::AnchorMissing);

        let mut parsed = Parsed::found();
        assert_eq!(parsed.outcome(), SectionOutcome::Empty);
        parsed.push(Some(1u8));
        parsed.push(None);
        assert_eq!(parsed.outcome(), SectionOutcome::Extracted { items: 1, skipped: 1 });

        let mut sink = vec![0u8];
        parsed.drain_into(&mut sink);
        assert_eq!(sink, vec![0, 1]);
    }

    #[test]
    fn test_all_items_failing_is_not_empty() {
        let mut parsed: Parsed<u8> = Parsed::found();
        parsed.push(None);
        parsed.push(None);
        assert_eq!(parsed.outcome(), SectionOutcome::Extracted { items: 0, skipped: 2 });
    }

    #[test]
    fn test_section_url() {
        assert_eq!(
            section_url("https://site.test/in/jane/", "details/experience"),
            "https://site.test/in/jane/details/experience"
        );
        assert_eq!(section_url("https://site.test/company/acme", "/about"), "https://site.test/company/acme/about");
    }

    #[test]
    fn test_report_serializes_flat_outcomes() {
        let mut report = ScrapeReport::new(Strategy::LoggedIn);
        report.record(Section::Skills, SectionOutcome::Extracted { items: 3, skipped: 0 });
        report.record(Section::Contacts, SectionOutcome::Failed { reason: "closed".into() });

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["strategy"], "logged_in");
        assert_eq!(json["sections"][0]["section"], "skills");
        assert_eq!(json["sections"][0]["status"], "extracted");
        assert_eq!(json["sections"][0]["items"], 3);
        assert_eq!(report.failures(), 1);
        assert_eq!(report.outcome(Section::Skills), Some(&SectionOutcome::Extracted { items: 3, skipped: 0 }));
        assert_eq!(report.outcome(Section::About), None);
    }

    #[test]
    fn test_field_outcome() {
        assert_eq!(field_outcome(false, &None), SectionOutcome::AnchorMissing);
        assert_eq!(field_outcome(true, &None), SectionOutcome::Empty);
        assert_eq!(field_outcome(true, &Some("x".into())), SectionOutcome::Extracted { items: 1, skipped: 0 });
    }
}
