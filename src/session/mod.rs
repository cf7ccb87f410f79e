//! The page session: one browser tab, driven strictly sequentially.
//!
//! Extractors only ever see `&mut dyn PageSession`, so a single tab can never be
//! touched by two extractors at once. Scraping several entities concurrently
//! needs one session per entity.

use std::time::Duration;

use async_trait::async_trait;
use scraper::Html;
use tokio::time::Instant;

use crate::utils::error::SessionError;
use crate::utils::text;

#[cfg(feature = "browser")]
pub mod browser;
#[cfg(test)]
pub mod snapshot;

#[cfg(feature = "browser")]
pub use browser::ChromeSession;

#[async_trait]
pub trait PageSession: Send {
    /// Navigates the tab and waits for the load event.
    async fn goto(&mut self, url: &str) -> Result<(), SessionError>;

    /// Serialized DOM of the current page.
    async fn content(&mut self) -> Result<String, SessionError>;

    /// Runs inline script for its side effects.
    async fn execute(&mut self, script: &str) -> Result<(), SessionError>;

    /// Clicks the `index`-th match of `selector`. `Ok(false)` when there is no such element.
    async fn click(&mut self, selector: &str, index: usize) -> Result<bool, SessionError>;

    async fn close(&mut self) -> Result<(), SessionError>;

    async fn count(&mut self, selector: &str) -> Result<usize, SessionError> {
        let html = self.content().await?;
        count_matches(&html, selector)
    }

    async fn exists(&mut self, selector: &str) -> Result<bool, SessionError> {
        Ok(self.count(selector).await? > 0)
    }

    /// Polls for `selector` until it appears or `timeout` elapses.
    async fn wait_for(
        &mut self,
        selector: &str,
        timeout: Duration,
        poll: Duration,
    ) -> Result<bool, SessionError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.exists(selector).await? {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(poll.min(deadline.saturating_duration_since(Instant::now()))).await;
        }
    }

    /// Bounded wait; on timeout degrade to a fixed sleep and carry on.
    async fn wait_or_sleep(
        &mut self,
        selector: &str,
        timeout: Duration,
        poll: Duration,
        fallback: Duration,
    ) -> Result<bool, SessionError> {
        let found = self.wait_for(selector, timeout, poll).await?;
        if !found {
            tracing::debug!("'{}' did not appear within {:?}, sleeping {:?}", selector, timeout, fallback);
            tokio::time::sleep(fallback).await;
        }
        Ok(found)
    }

    /// Scrolls to `fraction` of the document height to trigger lazy loading.
    async fn scroll_to(&mut self, fraction: f64) -> Result<(), SessionError> {
        self.execute(&scroll_script(fraction)).await
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), SessionError> {
        self.scroll_to(1.0).await
    }
}

/// `window.scrollTo` call for a fraction of the page height.
pub fn scroll_script(fraction: f64) -> String {
    format!("window.scrollTo(0, Math.ceil(document.body.scrollHeight*{fraction}));")
}

/// Number of matches of `selector` in an HTML snapshot.
pub fn count_matches(html: &str, selector: &str) -> Result<usize, SessionError> {
    let selector = text::selector(selector)
        .map_err(|_| SessionError::InvalidSelector(selector.to_string()))?;
    let document = Html::parse_document(html);
    let count = document.select(&selector).count();
    Ok(count)
}
