// src/extractors/pagination.rs
//! Infinite-scroll / "next page" driver for long lists.
//!
//! `Loaded(n)` -> scroll to bottom -> poll up to `retries` times for more than
//! `n` items -> `Loaded(n')` or `Stalled`. Every round either grows the list
//! or ends it, and `max_pages` caps the number of rounds, so the loop always
//! terminates.

use std::time::Duration;

use crate::config::PaginationConfig;
use crate::session::PageSession;
use crate::utils::error::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    Loaded(usize),
    /// Retry budget exhausted (or page cap reached); terminal.
    Stalled(usize),
}

pub struct Paginator<'a> {
    config: &'a PaginationConfig,
    item_selector: &'a str,
    container_selector: &'a str,
    next_selector: &'a str,
    container_wait: Duration,
    poll: Duration,
    scroll_pause: Duration,
    visible: usize,
    rounds: u32,
}

impl<'a> Paginator<'a> {
    pub fn new(
        config: &'a PaginationConfig,
        item_selector: &'a str,
        container_selector: &'a str,
        next_selector: &'a str,
    ) -> Self {
        Self {
            config,
            item_selector,
            container_selector,
            next_selector,
            container_wait: Duration::from_secs(10),
            poll: Duration::from_millis(250),
            scroll_pause: Duration::from_secs(1),
            visible: 0,
            rounds: 0,
        }
    }

    pub fn with_waits(mut self, container_wait: Duration, poll: Duration, scroll_pause: Duration) -> Self {
        self.container_wait = container_wait;
        self.poll = poll;
        self.scroll_pause = scroll_pause;
        self
    }

    pub fn visible(&self) -> usize {
        self.visible
    }

    /// Counts what is already on the page.
    pub async fn start(&mut self, session: &mut dyn PageSession) -> Result<PageState, SessionError> {
        self.visible = session.count(self.item_selector).await?;
        self.rounds = 0;
        tracing::debug!("Pagination starts with {} items", self.visible);
        Ok(PageState::Loaded(self.visible))
    }

    /// One round: wait for growth, then turn the page if there is a control for it.
    pub async fn advance(&mut self, session: &mut dyn PageSession) -> Result<PageState, SessionError> {
        if self.rounds >= self.config.max_pages {
            tracing::warn!("Pagination stopped at the {} round cap", self.config.max_pages);
            return Ok(PageState::Stalled(self.visible));
        }

        let state = self.await_growth(session).await?;
        match state {
            PageState::Loaded(count) => {
                self.visible = count;
                self.rounds += 1;
                self.turn_page(session).await?;
            }
            PageState::Stalled(count) => {
                tracing::debug!("Pagination stalled at {} items after {} retries", count, self.config.retries);
            }
        }
        Ok(state)
    }

    /// Drives the list to its terminal state, handing every snapshot to `on_page`.
    pub async fn run<F>(&mut self, session: &mut dyn PageSession, mut on_page: F) -> Result<usize, SessionError>
    where
        F: FnMut(&str) + Send,
    {
        self.start(session).await?;
        on_page(&session.content().await?);
        loop {
            let state = self.advance(session).await?;
            on_page(&session.content().await?);
            if let PageState::Stalled(count) = state {
                return Ok(count);
            }
        }
    }

    async fn await_growth(&mut self, session: &mut dyn PageSession) -> Result<PageState, SessionError> {
        session.scroll_to_bottom().await?;
        let mut count = session.count(self.item_selector).await?;
        let mut attempts = 0;
        while count <= self.visible && attempts < self.config.retries {
            tokio::time::sleep(self.config.delay).await;
            session.scroll_to_bottom().await?;
            count = session.count(self.item_selector).await?;
            attempts += 1;
        }
        if count > self.visible {
            Ok(PageState::Loaded(count))
        } else {
            Ok(PageState::Stalled(count))
        }
    }

    async fn turn_page(&mut self, session: &mut dyn PageSession) -> Result<(), SessionError> {
        // Scroll-only lists have no next control
        match session.click(self.next_selector, 0).await {
            Ok(clicked) => tracing::trace!("Next page control clicked: {}", clicked),
            Err(e) => tracing::debug!("Next page control not usable: {}", e),
        }
        session
            .wait_for(self.container_selector, self.container_wait, self.poll)
            .await?;
        for fraction in [0.5, 2.0 / 3.0, 0.75, 1.0] {
            session.scroll_to(fraction).await?;
            tokio::time::sleep(self.scroll_pause).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{count_matches, scroll_script};
    use async_trait::async_trait;

    /// A list that gains `step` items per bottom scroll until `growth_scrolls` scrolls happened.
    struct GrowingList {
        initial: usize,
        step: usize,
        growth_scrolls: Option<usize>,
        bottom_scrolls: usize,
        next_control: bool,
        clicks: Vec<String>,
    }

    impl GrowingList {
        fn new(initial: usize, step: usize, growth_scrolls: Option<usize>) -> Self {
            Self { initial, step, growth_scrolls, bottom_scrolls: 0, next_control: false, clicks: Vec::new() }
        }

        fn with_next_control(mut self) -> Self {
            self.next_control = true;
            self
        }

        fn items(&self) -> usize {
            let grown = match self.growth_scrolls {
                Some(limit) => self.bottom_scrolls.min(limit),
                None => self.bottom_scrolls,
            };
            self.initial + grown * self.step
        }

        fn html(&self) -> String {
            let items: String = (0..self.items()).map(|i| format!("<li>member {i}</li>")).collect();
            let next = if self.next_control { r#"<button aria-label="Next">Next</button>"# } else { "" };
            format!(r#"<main><ul class="list-style-none">{items}</ul>{next}</main>"#)
        }
    }

    #[async_trait]
    impl PageSession for GrowingList {
        async fn goto(&mut self, _url: &str) -> Result<(), SessionError> {
            Ok(())
        }

        async fn content(&mut self) -> Result<String, SessionError> {
            Ok(self.html())
        }

        async fn execute(&mut self, script: &str) -> Result<(), SessionError> {
            if script == scroll_script(1.0) {
                self.bottom_scrolls += 1;
            }
            Ok(())
        }

        async fn click(&mut self, selector: &str, index: usize) -> Result<bool, SessionError> {
            let present = count_matches(&self.html(), selector)? > index;
            if present {
                self.clicks.push(selector.to_string());
            }
            Ok(present)
        }

        async fn close(&mut self) -> Result<(), SessionError> {
            Ok(())
        }
    }

    fn fast(retries: u32, max_pages: u32) -> PaginationConfig {
        PaginationConfig { retries, delay: Duration::ZERO, max_pages }
    }

    fn paginator(config: &PaginationConfig) -> Paginator<'_> {
        Paginator::new(config, ".list-style-none li", ".list-style-none", "button[aria-label='Next']")
            .with_waits(Duration::ZERO, Duration::from_millis(1), Duration::ZERO)
    }

    #[tokio::test]
    async fn test_stalls_after_growth_stops() {
        let config = fast(5, 200);
        let mut list = GrowingList::new(2, 2, Some(3));
        let mut pager = paginator(&config);

        assert_eq!(pager.start(&mut list).await.unwrap(), PageState::Loaded(2));
        let mut states = Vec::new();
        loop {
            let state = pager.advance(&mut list).await.unwrap();
            states.push(state);
            if matches!(state, PageState::Stalled(_)) {
                break;
            }
            assert!(states.len() < 10, "pagination did not terminate");
        }

        assert_eq!(states, vec![PageState::Loaded(4), PageState::Loaded(8), PageState::Stalled(8)]);
        // Two growth rounds (each with a trailing bottom scroll), then 1 + 5 retries
        assert_eq!(list.bottom_scrolls, 2 * 2 + 1 + 5);
    }

    #[tokio::test]
    async fn test_run_yields_items_visible_at_stall_time() {
        let config = fast(5, 200);
        let mut list = GrowingList::new(2, 2, Some(3));
        let mut pager = paginator(&config);

        let mut last_snapshot_items = 0;
        let mut snapshots = 0;
        let total = pager
            .run(&mut list, |html| {
                snapshots += 1;
                last_snapshot_items = count_matches(html, "li").unwrap();
            })
            .await
            .unwrap();

        assert_eq!(total, 8);
        assert_eq!(last_snapshot_items, 8);
        assert_eq!(snapshots, 4);
    }

    #[tokio::test]
    async fn test_zero_retries_checks_once() {
        let config = fast(0, 200);
        let mut list = GrowingList::new(3, 1, Some(0));
        let mut pager = paginator(&config);

        pager.start(&mut list).await.unwrap();
        assert_eq!(pager.advance(&mut list).await.unwrap(), PageState::Stalled(3));
        assert_eq!(list.bottom_scrolls, 1);
    }

    #[tokio::test]
    async fn test_endless_list_is_capped() {
        let config = fast(5, 4);
        let mut list = GrowingList::new(1, 1, None);
        let mut pager = paginator(&config);

        let total = pager.run(&mut list, |_| {}).await.unwrap();
        assert_eq!(pager.rounds, 4);
        assert_eq!(total, pager.visible());
        assert!(total > 1);
    }

    #[tokio::test]
    async fn test_next_control_clicked_after_each_growth() {
        let config = fast(1, 200);
        let mut list = GrowingList::new(2, 2, Some(2)).with_next_control();
        let mut pager = paginator(&config);

        let total = pager.run(&mut list, |_| {}).await.unwrap();

        assert_eq!(total, 6);
        assert_eq!(list.clicks, vec!["button[aria-label='Next']".to_string(); 2]);
    }

    #[tokio::test]
    async fn test_scroll_only_list_is_never_clicked() {
        let config = fast(1, 200);
        let mut list = GrowingList::new(2, 2, Some(1));
        let mut pager = paginator(&config);
        pager.run(&mut list, |_| {}).await.unwrap();
        assert!(list.clicks.is_empty());
    }

    #[tokio::test]
    async fn test_empty_list_stalls() {
        let config = fast(2, 200);
        let mut list = GrowingList::new(0, 0, Some(0));
        let mut pager = paginator(&config);
        let total = tokio_test::assert_ok!(pager.run(&mut list, |_| {}).await);
        assert_eq!(total, 0);
    }
}
