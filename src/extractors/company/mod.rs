// src/extractors/company/mod.rs
//! Company extraction. The authentication gate picks between the logged-in
//! layout (header, `/about`, related company lists) and the public layout; the
//! two share nothing but the employee roster.

pub mod employees;
pub mod overview;
pub mod public;
pub mod related;

use crate::config::ScrapeConfig;
use crate::extractors::auth;
use crate::extractors::{
    field_outcome, save_snapshot, section_url, Parsed, ScrapeReport, Section, SectionOutcome, Strategy,
};
use crate::models::{CompanyProfile, CompanySummary};
use crate::session::PageSession;
use crate::utils::error::SessionError;

use self::public::{
    CAROUSEL_NEXT_SELECTOR, CAROUSEL_PAGE, DIALOG_CLOSE_SELECTOR, DIALOG_SELECTOR, SHOWCASE_TRIGGER_SELECTOR,
};
use self::related::{COMPANY_LIST_SELECTOR, SHOW_MORE_SELECTOR};

/// Orchestrates one company pass and owns everything it extracts.
#[derive(Debug)]
pub struct Company {
    company: CompanyProfile,
    config: ScrapeConfig,
}

impl Company {
    pub fn new(linkedin_url: impl Into<String>, config: ScrapeConfig) -> Self {
        Self {
            company: CompanyProfile::new(linkedin_url),
            config,
        }
    }

    pub fn profile(&self) -> &CompanyProfile {
        &self.company
    }

    pub fn into_profile(self) -> CompanyProfile {
        self.company
    }

    pub async fn scrape(&mut self, session: &mut dyn PageSession) -> ScrapeReport {
        let url = self.company.linkedin_url.clone();
        tracing::info!("Scraping company {}", url);

        if let Err(e) = session.goto(&url).await {
            tracing::warn!("Cannot open company page {}: {}", url, e);
            let mut report = ScrapeReport::new(Strategy::Refused);
            report.record(Section::CompanyName, SectionOutcome::Failed { reason: e.to_string() });
            return report;
        }

        let mut report = if auth::is_signed_in(session, &self.config).await {
            let mut report = ScrapeReport::new(Strategy::LoggedIn);
            self.scrape_logged_in(session, &url, &mut report).await;
            report
        } else {
            tracing::info!("Not signed in; using the public company layout");
            let mut report = ScrapeReport::new(Strategy::Public);
            self.scrape_public(session, &mut report).await;
            report
        };

        let outcome = if self.config.include_employees {
            employees::extract_employees(session, &self.config, &url, &mut self.company.employees).await
        } else {
            SectionOutcome::Skipped
        };
        report.record(Section::Employees, outcome);

        tracing::info!(
            "Company {} done: {} employees, {} failed sections",
            url,
            self.company.employees.len(),
            report.failures()
        );
        report
    }

    async fn scrape_logged_in(&mut self, session: &mut dyn PageSession, url: &str, report: &mut ScrapeReport) {
        let config = &self.config;
        let company = &mut self.company;

        match snapshot(session, config, Section::CompanyName).await {
            Ok(html) => {
                company.name = overview::parse_company_name(&html);
                let outcome = match company.name {
                    Some(_) => SectionOutcome::Extracted { items: 1, skipped: 0 },
                    None => SectionOutcome::AnchorMissing,
                };
                report.record(Section::CompanyName, outcome);
            }
            Err(e) => report.record(Section::CompanyName, failed(&e)),
        }

        let about_url = section_url(url, "about");
        let about = async {
            session.goto(&about_url).await?;
            let html = snapshot(session, config, Section::CompanyOverview).await?;
            tokio::time::sleep(config.fallback_sleep).await;
            Ok::<_, SessionError>(html)
        };
        match about.await {
            Ok(html) => {
                let about = overview::parse_about_page(&html);
                company.about_us = about.overview;
                report.record(Section::CompanyOverview, field_outcome(about.main_found, &company.about_us));

                let applied = overview::apply_details(company, &about.details);
                let details = if applied > 0 {
                    SectionOutcome::Extracted { items: applied, skipped: about.details.len() - applied }
                } else if about.main_found {
                    SectionOutcome::Empty
                } else {
                    SectionOutcome::AnchorMissing
                };
                report.record(Section::CompanyDetails, details);

                company.headcount = about.headcount;
                let headcount = match (about.main_found, about.headcount) {
                    (false, _) => SectionOutcome::AnchorMissing,
                    (true, Some(_)) => SectionOutcome::Extracted { items: 1, skipped: 0 },
                    (true, None) => SectionOutcome::Empty,
                };
                report.record(Section::Headcount, headcount);
            }
            Err(e) => {
                for section in [Section::CompanyOverview, Section::CompanyDetails, Section::Headcount] {
                    report.record(section, failed(&e));
                }
            }
        }

        match related_snapshot(session, config).await {
            Ok(html) => {
                let related = related::parse_related_companies(&html);
                report.record(Section::Showcase, related.showcase.drain_into(&mut company.showcase_pages));
                report.record(Section::Affiliated, related.affiliated.drain_into(&mut company.affiliated_companies));
            }
            Err(e) => {
                report.record(Section::Showcase, failed(&e));
                report.record(Section::Affiliated, failed(&e));
            }
        }
    }

    async fn scrape_public(&mut self, session: &mut dyn PageSession, report: &mut ScrapeReport) {
        let config = &self.config;
        let company = &mut self.company;

        match snapshot(session, config, Section::CompanyName).await {
            Ok(html) => {
                let fields = public::parse_public_fields(&html);
                let detail_count = fields
                    .iter()
                    .filter(|(class, _)| !matches!(*class, "name" | "basic-info-description"))
                    .count();
                public::apply_public_fields(company, fields);

                let name = match company.name {
                    Some(_) => SectionOutcome::Extracted { items: 1, skipped: 0 },
                    None => SectionOutcome::AnchorMissing,
                };
                report.record(Section::CompanyName, name);
                report.record(Section::CompanyOverview, field_outcome(true, &company.about_us));
                let details = if detail_count > 0 {
                    SectionOutcome::Extracted { items: detail_count, skipped: 0 }
                } else {
                    SectionOutcome::Empty
                };
                report.record(Section::CompanyDetails, details);
            }
            Err(e) => {
                for section in [Section::CompanyName, Section::CompanyOverview, Section::CompanyDetails] {
                    report.record(section, failed(&e));
                }
            }
        }
        report.record(Section::Headcount, SectionOutcome::Skipped);

        let outcome = match showcase_dialog(session, config).await {
            Ok(parsed) => parsed.drain_into(&mut company.showcase_pages),
            Err(e) => failed(&e),
        };
        report.record(Section::Showcase, outcome);

        let outcome = match affiliated_carousel(session, config).await {
            Ok(parsed) => parsed.drain_into(&mut company.affiliated_companies),
            Err(e) => failed(&e),
        };
        report.record(Section::Affiliated, outcome);
    }
}

fn failed(error: &SessionError) -> SectionOutcome {
    SectionOutcome::Failed { reason: error.to_string() }
}

/// Waits for `main` on the current page and snapshots it.
async fn snapshot(session: &mut dyn PageSession, config: &ScrapeConfig, section: Section) -> Result<String, SessionError> {
    session
        .wait_or_sleep("main", config.company_wait, config.poll_interval, config.fallback_sleep)
        .await?;
    let html = session.content().await?;
    save_snapshot(config, section, &html);
    Ok(html)
}

/// Scrolls to the related company lists and expands them when a "show more" control exists.
async fn related_snapshot(session: &mut dyn PageSession, config: &ScrapeConfig) -> Result<String, SessionError> {
    session.scroll_to(0.5).await?;
    let listed = session
        .wait_for(COMPANY_LIST_SELECTOR, config.company_wait, config.poll_interval)
        .await?;
    if listed && !session.click(SHOW_MORE_SELECTOR, 0).await? {
        tracing::debug!("No show-more control for related companies");
    }
    let html = session.content().await?;
    save_snapshot(config, Section::Showcase, &html);
    Ok(html)
}

async fn showcase_dialog(
    session: &mut dyn PageSession,
    config: &ScrapeConfig,
) -> Result<Parsed<CompanySummary>, SessionError> {
    if !session.click(SHOWCASE_TRIGGER_SELECTOR, 0).await? {
        return Ok(Parsed::anchor_missing());
    }
    session
        .wait_for(DIALOG_SELECTOR, config.company_wait, config.poll_interval)
        .await?;
    let html = session.content().await?;
    save_snapshot(config, Section::Showcase, &html);
    let parsed = public::parse_showcase_dialog(&html);
    if let Err(e) = session.click(DIALOG_CLOSE_SELECTOR, 0).await {
        tracing::warn!("Could not close the showcase dialog: {}", e);
    }
    Ok(parsed)
}

/// Steps the carousel so every name has been rendered, then reads them all.
async fn affiliated_carousel(
    session: &mut dyn PageSession,
    config: &ScrapeConfig,
) -> Result<Parsed<CompanySummary>, SessionError> {
    let html = session.content().await?;
    let Some(count) = public::affiliated_count(&html) else {
        return Ok(Parsed::anchor_missing());
    };
    for _ in (0..count).step_by(CAROUSEL_PAGE) {
        if !session.click(CAROUSEL_NEXT_SELECTOR, 0).await? {
            break;
        }
        tokio::time::sleep(config.scroll_pause).await;
    }
    let html = session.content().await?;
    save_snapshot(config, Section::Affiliated, &html);
    Ok(public::parse_affiliated_carousel(&html))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::snapshot::SnapshotSession;

    const COMPANY_URL: &str = "https://site.test/company/acme/";

    const COMPANY_PAGE: &str = r#"<html><body>
        <nav><a class="global-nav__primary-link" href="/feed/">Home</a></nav>
        <main><h1>Acme</h1></main>
    </body></html>"#;

    fn session() -> SnapshotSession {
        let about_page = overview::tests::ABOUT_PAGE.replace("</main>", &format!("{}</main>", related::tests::RELATED_LISTS));
        SnapshotSession::new()
            .with_page(COMPANY_URL, COMPANY_PAGE)
            .with_page("https://site.test/company/acme/about", &about_page)
            .with_page("https://site.test/company/acme/people", employees::tests::PEOPLE_PAGE)
    }

    #[tokio::test]
    async fn test_logged_in_company() {
        let mut session = session();
        let mut company = Company::new(COMPANY_URL, ScrapeConfig::immediate());
        let report = company.scrape(&mut session).await;

        assert_eq!(report.strategy, Strategy::LoggedIn);
        let profile = company.profile();
        assert_eq!(profile.name.as_deref(), Some("Acme"));
        assert_eq!(profile.about_us.as_deref(), Some("Acme builds rockets and anvils."));
        assert_eq!(profile.industry.as_deref(), Some("Aerospace"));
        assert_eq!(profile.headcount, Some(14436));
        assert_eq!(profile.showcase_pages.len(), 1);
        assert_eq!(profile.affiliated_companies.len(), 1);
        assert_ne!(profile.showcase_pages[0], profile.affiliated_companies[0]);
        assert_eq!(profile.employees.len(), 2);

        assert_eq!(report.outcome(Section::CompanyDetails), Some(&SectionOutcome::Extracted { items: 7, skipped: 1 }));
        assert_eq!(report.outcome(Section::Employees), Some(&SectionOutcome::Extracted { items: 2, skipped: 1 }));
        assert_eq!(report.failures(), 0);
    }

    #[tokio::test]
    async fn test_public_company() {
        let mut session = SnapshotSession::new()
            .with_page(COMPANY_URL, public::tests::PUBLIC_PAGE)
            .with_click_page(SHOWCASE_TRIGGER_SELECTOR, 0, public::tests::SHOWCASE_DIALOG)
            .with_click_page(DIALOG_CLOSE_SELECTOR, 0, public::tests::PUBLIC_PAGE);
        let config = ScrapeConfig {
            include_employees: false,
            ..ScrapeConfig::immediate()
        };
        let mut company = Company::new(COMPANY_URL, config);
        let report = company.scrape(&mut session).await;

        assert_eq!(report.strategy, Strategy::Public);
        let profile = company.profile();
        assert_eq!(profile.name.as_deref(), Some("Acme"));
        assert_eq!(profile.showcase_pages[0].name, "Acme Labs");
        assert_eq!(profile.affiliated_companies.len(), 2);
        assert_eq!(report.outcome(Section::CompanyDetails), Some(&SectionOutcome::Extracted { items: 6, skipped: 0 }));
        assert_eq!(report.outcome(Section::Headcount), Some(&SectionOutcome::Skipped));
        assert_eq!(report.outcome(Section::Employees), Some(&SectionOutcome::Skipped));
        assert!(session.clicks().iter().any(|(selector, _)| selector == DIALOG_CLOSE_SELECTOR));
    }

    #[tokio::test]
    async fn test_stuck_showcase_dialog_keeps_parsed_pages() {
        let mut session = SnapshotSession::new()
            .with_page(COMPANY_URL, public::tests::PUBLIC_PAGE)
            .with_click_page(SHOWCASE_TRIGGER_SELECTOR, 0, public::tests::SHOWCASE_DIALOG)
            .with_click_failure(DIALOG_CLOSE_SELECTOR);
        let config = ScrapeConfig {
            include_employees: false,
            ..ScrapeConfig::immediate()
        };
        let mut company = Company::new(COMPANY_URL, config);
        let report = company.scrape(&mut session).await;

        assert!(matches!(report.outcome(Section::Showcase), Some(SectionOutcome::Extracted { .. })));
        assert_eq!(company.profile().showcase_pages[0].name, "Acme Labs");
    }

    #[tokio::test]
    async fn test_failed_about_page_is_isolated() {
        let mut session = session().with_failure("https://site.test/company/acme/about");
        let mut company = Company::new(COMPANY_URL, ScrapeConfig::immediate());
        let report = company.scrape(&mut session).await;

        assert!(matches!(report.outcome(Section::CompanyOverview), Some(SectionOutcome::Failed { .. })));
        assert_eq!(company.profile().name.as_deref(), Some("Acme"));
        assert_eq!(company.into_profile().employees.len(), 2);
    }
}
