//! Chromium page session over the DevTools protocol.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::handler::{Handler, HandlerConfig};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::BrowserSettings;
use crate::session::PageSession;
use crate::utils::error::SessionError;

/// Common Chrome executable paths to check.
const CHROME_PATHS: &[&str] = &[
    // Linux
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    // macOS
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/opt/google/chrome/google-chrome",
];

/// One browser with one tab, exclusively owned.
pub struct ChromeSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    closed: bool,
}

impl ChromeSession {
    /// Launches a browser, or attaches to `remote_url` when one is configured.
    pub async fn open(settings: &BrowserSettings) -> Result<Self, SessionError> {
        match settings.remote_url.as_deref() {
            Some(remote) => Self::connect(remote, settings.request_timeout).await,
            None => Self::launch(settings).await,
        }
    }

    async fn launch(settings: &BrowserSettings) -> Result<Self, SessionError> {
        info!("Launching browser (headless={})", settings.headless);

        let mut builder = BrowserConfig::builder()
            .request_timeout(Duration::from_secs(settings.request_timeout));

        if let Some(path) = settings.chrome_path.clone().or_else(find_chrome) {
            info!("Using browser executable: {}", path.display());
            builder = builder.chrome_executable(path);
        }

        // with_head means NOT headless
        if !settings.headless {
            builder = builder.with_head();
        }

        if let Some(dir) = &settings.user_data_dir {
            builder = builder.user_data_dir(dir);
        }

        builder = builder
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check");

        for arg in &settings.chrome_args {
            builder = builder.arg(arg);
        }

        let config = builder.build().map_err(SessionError::Launch)?;

        let (browser, handler) = Browser::launch(config)
            .await
            .map_err(|e| SessionError::Launch(e.to_string()))?;

        Self::with_browser(browser, handler).await
    }

    async fn connect(remote_url: &str, timeout_secs: u64) -> Result<Self, SessionError> {
        info!("Connecting to remote browser at {} (timeout: {}s)", remote_url, timeout_secs);

        let ws_url = if remote_url.contains("/devtools/browser/") {
            remote_url.to_string()
        } else {
            resolve_debugger_url(remote_url).await?
        };

        let handler_config = HandlerConfig {
            request_timeout: Duration::from_secs(timeout_secs),
            ..Default::default()
        };

        let (browser, handler) = Browser::connect_with_config(&ws_url, handler_config)
            .await
            .map_err(|e| SessionError::Launch(e.to_string()))?;

        Self::with_browser(browser, handler).await
    }

    async fn with_browser(
        browser: Browser,
        mut handler: Handler,
    ) -> Result<Self, SessionError> {
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| SessionError::Launch(e.to_string()))?;

        Ok(Self { browser, page, handler, closed: false })
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.closed {
            return Err(SessionError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl PageSession for ChromeSession {
    async fn goto(&mut self, url: &str) -> Result<(), SessionError> {
        self.ensure_open()?;
        tracing::debug!("Navigating to {}", url);
        let navigation_error = |e: chromiumoxide::error::CdpError| SessionError::Navigation {
            url: url.to_string(),
            reason: e.to_string(),
        };
        self.page.goto(url).await.map_err(navigation_error)?;
        self.page.wait_for_navigation().await.map_err(navigation_error)?;
        Ok(())
    }

    async fn content(&mut self) -> Result<String, SessionError> {
        self.ensure_open()?;
        self.page.content().await.map_err(|e| SessionError::Script(e.to_string()))
    }

    async fn execute(&mut self, script: &str) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.page
            .evaluate(script)
            .await
            .map_err(|e| SessionError::Script(e.to_string()))?;
        Ok(())
    }

    async fn click(&mut self, selector: &str, index: usize) -> Result<bool, SessionError> {
        self.ensure_open()?;
        let elements = self.page.find_elements(selector).await.map_err(|e| SessionError::Query {
            selector: selector.to_string(),
            reason: e.to_string(),
        })?;
        let Some(element) = elements.get(index) else {
            return Ok(false);
        };
        element.click().await.map_err(|e| SessionError::Query {
            selector: selector.to_string(),
            reason: e.to_string(),
        })?;
        Ok(true)
    }

    async fn count(&mut self, selector: &str) -> Result<usize, SessionError> {
        self.ensure_open()?;
        let elements = self.page.find_elements(selector).await.map_err(|e| SessionError::Query {
            selector: selector.to_string(),
            reason: e.to_string(),
        })?;
        Ok(elements.len())
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let result = self.browser.close().await;
        self.handler.abort();
        result.map(|_| ()).map_err(|e| SessionError::Script(e.to_string()))
    }
}

/// Finds a Chrome executable in the usual install locations or on PATH.
fn find_chrome() -> Option<PathBuf> {
    if let Some(path) = CHROME_PATHS.iter().map(Path::new).find(|p| p.exists()) {
        return Some(path.to_path_buf());
    }

    for cmd in ["google-chrome", "google-chrome-stable", "chromium", "chromium-browser"] {
        if let Ok(output) = std::process::Command::new("which").arg(cmd).output() {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    return Some(PathBuf::from(path));
                }
            }
        }
    }

    // Let chromiumoxide apply its own detection
    None
}

/// Reads `webSocketDebuggerUrl` from the DevTools `/json/version` endpoint.
async fn resolve_debugger_url(remote_url: &str) -> Result<String, SessionError> {
    let http_url = remote_url.replace("ws://", "http://").replace("wss://", "https://");
    let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

    let launch_error = |e: reqwest::Error| SessionError::Launch(format!("{version_url}: {e}"));
    let response: serde_json::Value = reqwest::get(&version_url)
        .await
        .map_err(launch_error)?
        .json()
        .await
        .map_err(launch_error)?;

    response
        .get("webSocketDebuggerUrl")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| SessionError::Launch("No webSocketDebuggerUrl in response".to_string()))
}
