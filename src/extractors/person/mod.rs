// src/extractors/person/mod.rs
//! Profile extraction. The top card comes from the profile page itself; every
//! list section lives on its own `details/<section>` page.

pub mod accolades;
pub mod accomplishments;
pub mod contacts;
pub mod education;
pub mod experience;
pub mod interests;
pub mod skills;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::config::ScrapeConfig;
use crate::extractors::auth;
use crate::extractors::{
    field_outcome, run_section, save_snapshot, section_url, ScrapeReport, Section, SectionOutcome, Strategy,
};
use crate::models::{non_empty, Profile};
use crate::session::PageSession;
use crate::utils::text::{element_text, first_span_text, outermost, parent_element, ARIA_HIDDEN_SPAN};

use self::accomplishments::ACCOMPLISHMENTS_SELECTOR;
use self::contacts::{CONNECTIONS_PATH, CONNECTIONS_SELECTOR};

pub(crate) const LIST_CONTAINER_CLASS: &str = "pvs-list__container";

pub(crate) static MAIN: Lazy<Selector> = Lazy::new(|| Selector::parse("main").expect("Failed to compile MAIN"));

pub(crate) static LIST_ITEM: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".pvs-list__paged-list-item").expect("Failed to compile LIST_ITEM")
});

/// Anchor of the `details/*` pages built from paged list containers.
pub const MAIN_LIST_SELECTOR: &str = "main .pvs-list__container";

/// Anchor of the `details/*` pages built from a plain list (languages, certifications).
pub const MAIN_UL_SELECTOR: &str = "main ul";

static MAIN_LIST: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(MAIN_LIST_SELECTOR).expect("Failed to compile MAIN_LIST")
});

static MAIN_UL: Lazy<Selector> = Lazy::new(|| Selector::parse(MAIN_UL_SELECTOR).expect("Failed to compile MAIN_UL"));

static LI: Lazy<Selector> = Lazy::new(|| Selector::parse("li").expect("Failed to compile LI"));

static TOP_PANEL_NAME: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".mt2.relative h1").expect("Failed to compile TOP_PANEL_NAME")
});

static TOP_PANEL_LOCATION: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".text-body-small.inline.t-black--light.break-words").expect("Failed to compile TOP_PANEL_LOCATION")
});

static ABOUT_ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("#about").expect("Failed to compile ABOUT_ANCHOR"));

static ABOUT_TEXT: Lazy<Selector> = Lazy::new(|| Selector::parse(".display-flex").expect("Failed to compile ABOUT_TEXT"));

static PROFILE_PICTURE: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".pv-top-card-profile-picture img").expect("Failed to compile PROFILE_PICTURE")
});

const OPEN_TO_WORK_MARKER: &str = "#OPEN_TO_WORK";

/// Sections a logged-in profile pass visits, in order.
pub const PERSON_SECTIONS: [Section; 11] = [
    Section::TopCard,
    Section::About,
    Section::Experience,
    Section::Education,
    Section::Skills,
    Section::Languages,
    Section::Certifications,
    Section::Honors,
    Section::Interests,
    Section::Accomplishments,
    Section::Contacts,
];

/// First list container inside `main`.
pub(crate) fn main_list(document: &Html) -> Option<ElementRef<'_>> {
    document.select(&MAIN_LIST).next()
}

/// Items of the first plain `ul` inside `main`; the languages and certifications pages use it.
pub(crate) fn main_list_items(document: &Html) -> Option<Vec<ElementRef<'_>>> {
    document.select(&MAIN_UL).next().map(|list| outermost(list, &LI))
}

/// Visible text of one positional row: the `aria-hidden` copy, else the first span, else everything.
pub(crate) fn row_text(row: ElementRef) -> String {
    if let Some(span) = row.select(&ARIA_HIDDEN_SPAN).next() {
        return element_text(span);
    }
    let span = first_span_text(row);
    if span.is_empty() {
        element_text(row)
    } else {
        span
    }
}

/// Fields read from the profile page itself.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TopCard {
    pub panel_found: bool,
    pub name: Option<String>,
    pub location: Option<String>,
    pub about_found: bool,
    pub about: Option<String>,
    pub open_to_work: bool,
}

pub fn parse_top_card(html: &str) -> TopCard {
    let document = Html::parse_document(html);
    let name = document.select(&TOP_PANEL_NAME).next();

    let about_block = document
        .select(&ABOUT_ANCHOR)
        .next()
        .and_then(parent_element)
        .and_then(|section| section.select(&ABOUT_TEXT).next());

    TopCard {
        panel_found: name.is_some(),
        name: name.map(element_text).and_then(non_empty),
        location: document
            .select(&TOP_PANEL_LOCATION)
            .next()
            .map(element_text)
            .and_then(non_empty),
        about_found: about_block.is_some(),
        about: about_block.and_then(experience::description_text),
        open_to_work: document
            .select(&PROFILE_PICTURE)
            .filter_map(|img| img.value().attr("title"))
            .any(|title| title.contains(OPEN_TO_WORK_MARKER)),
    }
}

/// Orchestrates one profile pass and owns everything it extracts.
#[derive(Debug)]
pub struct Person {
    profile: Profile,
    config: ScrapeConfig,
}

impl Person {
    pub fn new(linkedin_url: impl Into<String>, config: ScrapeConfig) -> Self {
        Self {
            profile: Profile::new(linkedin_url),
            config,
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn into_profile(self) -> Profile {
        self.profile
    }

    /// Runs every section against `session`. Signed-out sessions are refused without touching any section.
    pub async fn scrape(&mut self, session: &mut dyn PageSession) -> ScrapeReport {
        let url = self.profile.linkedin_url.clone();
        tracing::info!("Scraping profile {}", url);

        if let Err(e) = session.goto(&url).await {
            tracing::warn!("Cannot open profile {}: {}", url, e);
            let mut report = ScrapeReport::new(Strategy::Refused);
            report.record(Section::TopCard, SectionOutcome::Failed { reason: e.to_string() });
            return report;
        }

        if !auth::is_signed_in(session, &self.config).await {
            tracing::warn!("Not signed in; profile sections need an authenticated session");
            let mut report = ScrapeReport::new(Strategy::Refused);
            for section in PERSON_SECTIONS {
                report.record(section, SectionOutcome::Skipped);
            }
            return report;
        }

        let mut report = ScrapeReport::new(Strategy::LoggedIn);
        self.scrape_top_card(session, &mut report).await;

        let config = &self.config;
        let profile = &mut self.profile;

        let page = section_url(&url, "details/experience");
        let outcome = run_section(
            session,
            config,
            Section::Experience,
            &page,
            MAIN_LIST_SELECTOR,
            experience::parse_experiences,
            &mut profile.experiences,
        )
        .await;
        report.record(Section::Experience, outcome);

        let page = section_url(&url, "details/education");
        let outcome = run_section(
            session,
            config,
            Section::Education,
            &page,
            MAIN_LIST_SELECTOR,
            education::parse_educations,
            &mut profile.educations,
        )
        .await;
        report.record(Section::Education, outcome);

        let page = section_url(&url, "details/skills");
        let outcome = run_section(
            session,
            config,
            Section::Skills,
            &page,
            MAIN_LIST_SELECTOR,
            skills::parse_skills,
            &mut profile.skills,
        )
        .await;
        report.record(Section::Skills, outcome);

        let page = section_url(&url, "details/languages");
        let outcome = run_section(
            session,
            config,
            Section::Languages,
            &page,
            MAIN_UL_SELECTOR,
            skills::parse_languages,
            &mut profile.languages,
        )
        .await;
        report.record(Section::Languages, outcome);

        let page = section_url(&url, "details/certifications");
        let outcome = run_section(
            session,
            config,
            Section::Certifications,
            &page,
            MAIN_UL_SELECTOR,
            accolades::parse_certifications,
            &mut profile.certifications,
        )
        .await;
        report.record(Section::Certifications, outcome);

        let page = section_url(&url, "details/honors");
        let outcome = run_section(
            session,
            config,
            Section::Honors,
            &page,
            MAIN_LIST_SELECTOR,
            accolades::parse_honors,
            &mut profile.honors_awards,
        )
        .await;
        report.record(Section::Honors, outcome);

        let interests_page = section_url(&url, "details/interests");
        let outcome = interests::extract_interests(session, config, &interests_page, &mut profile.interests).await;
        report.record(Section::Interests, outcome);

        let outcome = run_section(
            session,
            config,
            Section::Accomplishments,
            &url,
            ACCOMPLISHMENTS_SELECTOR,
            accomplishments::parse_accomplishments,
            &mut profile.accomplishments,
        )
        .await;
        report.record(Section::Accomplishments, outcome);

        let outcome = if config.include_contacts {
            run_section(
                session,
                config,
                Section::Contacts,
                &config.site_url(CONNECTIONS_PATH),
                CONNECTIONS_SELECTOR,
                contacts::parse_contacts,
                &mut profile.contacts,
            )
            .await
        } else {
            SectionOutcome::Skipped
        };
        report.record(Section::Contacts, outcome);

        tracing::info!(
            "Profile {} done: {} experiences, {} educations, {} failed sections",
            url,
            profile.experiences.len(),
            profile.educations.len(),
            report.failures()
        );
        report
    }

    async fn scrape_top_card(&mut self, session: &mut dyn PageSession, report: &mut ScrapeReport) {
        let config = &self.config;
        let snapshot = async {
            session
                .wait_or_sleep("main", config.wait_timeout, config.poll_interval, config.fallback_sleep)
                .await?;
            tokio::time::sleep(config.settle).await;
            let html = session.content().await?;
            session.scroll_to(0.5).await?;
            session.scroll_to(1.0 / 1.5).await?;
            Ok::<_, crate::utils::error::SessionError>(html)
        };

        let html = match snapshot.await {
            Ok(html) => html,
            Err(e) => {
                report.record(Section::TopCard, SectionOutcome::Failed { reason: e.to_string() });
                report.record(Section::About, SectionOutcome::Skipped);
                return;
            }
        };
        save_snapshot(config, Section::TopCard, &html);

        let card = parse_top_card(&html);
        report.record(Section::TopCard, field_outcome(card.panel_found, &card.name));
        report.record(Section::About, field_outcome(card.about_found, &card.about));
        if card.open_to_work {
            tracing::debug!("Profile is marked open to work");
        }

        self.profile.name = card.name;
        self.profile.location = card.location;
        self.profile.about = card.about;
        self.profile.open_to_work = card.open_to_work;
    }
}
