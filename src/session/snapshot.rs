//! In-memory session serving captured HTML per URL. Test fixture.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::session::PageSession;
use crate::utils::error::SessionError;

const BLANK_PAGE: &str = "<html><head></head><body></body></html>";

#[derive(Debug, Default)]
pub struct SnapshotSession {
    pages: HashMap<String, String>,
    click_pages: HashMap<(String, usize), String>,
    failing: HashSet<String>,
    failing_clicks: HashSet<String>,
    current: Option<String>,
    override_html: Option<String>,
    visited: Vec<String>,
    scripts: Vec<String>,
    clicks: Vec<(String, usize)>,
    closed: bool,
}

impl SnapshotSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    /// After clicking match `index` of `selector`, the tab shows `html`.
    pub fn with_click_page(mut self, selector: &str, index: usize, html: &str) -> Self {
        self.click_pages.insert((selector.to_string(), index), html.to_string());
        self
    }

    /// Navigation to `url` fails.
    pub fn with_failure(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    /// Clicking any present match of `selector` errors.
    pub fn with_click_failure(mut self, selector: &str) -> Self {
        self.failing_clicks.insert(selector.to_string());
        self
    }

    pub fn visited(&self) -> &[String] {
        &self.visited
    }

    pub fn scripts(&self) -> &[String] {
        &self.scripts
    }

    pub fn clicks(&self) -> &[(String, usize)] {
        &self.clicks
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn current_html(&self) -> String {
        if let Some(html) = &self.override_html {
            return html.clone();
        }
        self.current
            .as_ref()
            .and_then(|url| self.pages.get(url))
            .cloned()
            .unwrap_or_else(|| BLANK_PAGE.to_string())
    }
}

#[async_trait]
impl PageSession for SnapshotSession {
    async fn goto(&mut self, url: &str) -> Result<(), SessionError> {
        if self.closed {
            return Err(SessionError::Closed);
        }
        self.visited.push(url.to_string());
        if self.failing.contains(url) {
            return Err(SessionError::Navigation {
                url: url.to_string(),
                reason: "net::ERR_CONNECTION_RESET".to_string(),
            });
        }
        self.current = Some(url.to_string());
        self.override_html = None;
        Ok(())
    }

    async fn content(&mut self) -> Result<String, SessionError> {
        if self.closed {
            return Err(SessionError::Closed);
        }
        Ok(self.current_html())
    }

    async fn execute(&mut self, script: &str) -> Result<(), SessionError> {
        self.scripts.push(script.to_string());
        Ok(())
    }

    async fn click(&mut self, selector: &str, index: usize) -> Result<bool, SessionError> {
        let present = crate::session::count_matches(&self.current_html(), selector)? > index;
        if !present {
            return Ok(false);
        }
        if self.failing_clicks.contains(selector) {
            return Err(SessionError::Query {
                selector: selector.to_string(),
                reason: "element is not clickable".to_string(),
            });
        }
        self.clicks.push((selector.to_string(), index));
        if let Some(html) = self.click_pages.get(&(selector.to_string(), index)) {
            self.override_html = Some(html.clone());
        }
        Ok(true)
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        self.closed = true;
        Ok(())
    }
}
