// src/extractors/auth.rs
use crate::config::ScrapeConfig;
use crate::session::PageSession;

/// Global navigation link only rendered for signed-in members.
pub const VERIFY_LOGIN_SELECTOR: &str = ".global-nav__primary-link";

/// True when the current page shows the signed-in chrome. Query errors count as signed out.
pub async fn is_signed_in(session: &mut dyn PageSession, config: &ScrapeConfig) -> bool {
    match session
        .wait_for(VERIFY_LOGIN_SELECTOR, config.wait_timeout, config.poll_interval)
        .await
    {
        Ok(found) => {
            tracing::debug!("Signed-in check: {}", found);
            found
        }
        Err(e) => {
            tracing::debug!("Signed-in check failed, assuming signed out: {}", e);
            false
        }
    }
}
