//! Scrape and browser configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default site root. Connections live outside any one profile, so they need it.
pub const DEFAULT_BASE_URL: &str = "https://www.linkedin.com";

/// Retry budget for the employee roster loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Consecutive scrolls without growth before the roster counts as stalled.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Pause between growth checks.
    #[serde(default = "default_pagination_delay", with = "millis")]
    pub delay: Duration,

    /// Hard cap on growth rounds so an endlessly growing list still terminates.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            retries: default_retries(),
            delay: default_pagination_delay(),
            max_pages: default_max_pages(),
        }
    }
}

fn default_retries() -> u32 {
    5
}

fn default_pagination_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_pages() -> u32 {
    200
}

/// Timing and scope knobs for one orchestrator pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Bound on waiting for an anchor element.
    #[serde(with = "millis")]
    pub wait_timeout: Duration,

    #[serde(with = "millis")]
    pub poll_interval: Duration,

    /// Fixed sleep used when an anchor wait times out.
    #[serde(with = "millis")]
    pub fallback_sleep: Duration,

    /// Pause after the profile top card appears.
    #[serde(with = "millis")]
    pub settle: Duration,

    #[serde(with = "millis")]
    pub scroll_pause: Duration,

    /// Pause after switching an interests tab.
    #[serde(with = "millis")]
    pub tab_wait: Duration,

    /// Anchor wait on company pages.
    #[serde(with = "millis")]
    pub company_wait: Duration,

    /// Wait for the roster container after each page turn.
    #[serde(with = "millis")]
    pub employee_wait: Duration,

    pub base_url: String,
    pub include_contacts: bool,
    pub include_employees: bool,

    /// When set, every section snapshot is written here as annotated HTML.
    pub debug_dir: Option<PathBuf>,

    pub pagination: PaginationConfig,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            wait_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(250),
            fallback_sleep: Duration::from_secs(2),
            settle: Duration::from_secs(5),
            scroll_pause: Duration::from_secs(1),
            tab_wait: Duration::from_secs(1),
            company_wait: Duration::from_secs(3),
            employee_wait: Duration::from_secs(10),
            base_url: DEFAULT_BASE_URL.to_string(),
            include_contacts: true,
            include_employees: true,
            debug_dir: None,
            pagination: PaginationConfig::default(),
        }
    }
}

impl ScrapeConfig {
    /// Every wait and pause collapsed to zero; for replaying captured pages.
    pub fn immediate() -> Self {
        Self {
            wait_timeout: Duration::ZERO,
            poll_interval: Duration::from_millis(1),
            fallback_sleep: Duration::ZERO,
            settle: Duration::ZERO,
            scroll_pause: Duration::ZERO,
            tab_wait: Duration::ZERO,
            company_wait: Duration::ZERO,
            employee_wait: Duration::ZERO,
            pagination: PaginationConfig {
                delay: Duration::ZERO,
                ..PaginationConfig::default()
            },
            ..Self::default()
        }
    }

    /// Absolute URL on the site root.
    pub fn site_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

/// Browser process configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserSettings {
    /// Explicit browser executable; detected from common locations when unset.
    #[serde(default)]
    pub chrome_path: Option<PathBuf>,

    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Profile directory to reuse, which carries an existing signed-in session.
    #[serde(default)]
    pub user_data_dir: Option<PathBuf>,

    /// Remote DevTools URL (e.g. "ws://localhost:9222"). Attaches instead of launching.
    #[serde(default)]
    pub remote_url: Option<String>,

    #[serde(default)]
    pub chrome_args: Vec<String>,

    /// CDP request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            chrome_path: None,
            headless: default_headless(),
            user_data_dir: None,
            remote_url: None,
            chrome_args: Vec::new(),
            request_timeout: default_request_timeout(),
        }
    }
}

fn default_headless() -> bool {
    true
}

fn default_request_timeout() -> u64 {
    30
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_site_timings() {
        let config = ScrapeConfig::default();
        assert_eq!(config.wait_timeout, Duration::from_secs(5));
        assert_eq!(config.pagination.retries, 5);
        assert!(config.include_employees);
    }

    #[test]
    fn test_site_url_joins_once() {
        let mut config = ScrapeConfig::default();
        config.base_url = "https://example.test/".into();
        assert_eq!(
            config.site_url("/mynetwork/invite-connect/connections/"),
            "https://example.test/mynetwork/invite-connect/connections/"
        );
    }

    #[test]
    fn test_durations_serialize_as_millis() {
        let json = serde_json::to_value(PaginationConfig::default()).unwrap();
        assert_eq!(json["delay"], 1000);
        let back: PaginationConfig = serde_json::from_str(r#"{"retries": 2}"#).unwrap();
        assert_eq!(back.retries, 2);
        assert_eq!(back.max_pages, 200);
    }
}
