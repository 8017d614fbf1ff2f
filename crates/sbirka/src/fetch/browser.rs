//! Rendered-mode fetcher driving headless Chromium via chromiumoxide.
//!
//! Some providers only assemble their document bodies client-side, so a
//! static GET comes back hollow. This fetcher keeps one browser process for
//! the life of the server, opens a fresh page per request, and reads the
//! rendered DOM with an in-page evaluation. The page is always closed before
//! the request returns, whatever the outcome.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info, warn};

use super::{MarkupFetcher, USER_AGENT};
use crate::error::FetchError;

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. SBIRKA_CHROMIUM_PATH env
    if let Ok(p) = std::env::var("SBIRKA_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. System PATH
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 3. Common macOS location
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    // 4. Local headless-shell install
    if let Some(home) = dirs::home_dir() {
        let candidates = [
            home.join(".local/share/chromium/chrome"),
            home.join(".cache/chromium/chrome-linux64/chrome"),
        ];
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    None
}

/// Knobs for the rendered session.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Upper bound on navigation per page load.
    pub nav_timeout: Duration,
    /// CSS selector whose appearance signals that the document body has been
    /// assembled. `None` falls back to a fixed settle delay.
    pub wait_selector: Option<String>,
    /// How long to poll for the selector; doubles as the settle delay when
    /// no selector is configured.
    pub wait_timeout: Duration,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            nav_timeout: Duration::from_secs(15),
            wait_selector: None,
            wait_timeout: Duration::from_secs(5),
        }
    }
}

/// Shared headless-browser transport.
///
/// The browser launches lazily on the first fetch; concurrent first callers
/// all await the same launch, so only one Chromium process ever starts. A
/// failed launch leaves the cell empty and the next fetch tries again.
pub struct BrowserFetcher {
    options: RenderOptions,
    session: OnceCell<Mutex<Browser>>,
}

impl BrowserFetcher {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            session: OnceCell::new(),
        }
    }

    async fn session(&self) -> Result<&Mutex<Browser>, FetchError> {
        self.session
            .get_or_try_init(|| async {
                let browser = launch_browser().await?;
                Ok(Mutex::new(browser))
            })
            .await
    }

    async fn open_page(&self) -> Result<Page, FetchError> {
        let session = self.session().await?;
        let browser = session.lock().await;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| FetchError::Browser(format!("failed to create page: {e}")))?;
        drop(browser);

        if let Err(e) = page.set_user_agent(USER_AGENT).await {
            debug!("user-agent override failed: {e}");
        }
        Ok(page)
    }

    async fn render(&self, page: &Page, url: &str) -> Result<String, FetchError> {
        let nav = tokio::time::timeout(self.options.nav_timeout, page.goto(url)).await;
        match nav {
            Ok(Ok(_response)) => {}
            Ok(Err(e)) => return Err(FetchError::Browser(format!("navigation failed: {e}"))),
            Err(_) => return Err(FetchError::Timeout(self.options.nav_timeout)),
        }

        // Wait for page to be loaded
        let _ = page.wait_for_navigation().await;
        self.await_content(page).await;

        let result = page
            .evaluate("document.documentElement.outerHTML")
            .await
            .map_err(|e| FetchError::Browser(format!("failed to get HTML: {e}")))?;

        result
            .into_value()
            .map_err(|e| FetchError::Browser(format!("failed to convert HTML result: {e:?}")))
    }

    /// Poll for the structural marker, or just let the page settle when no
    /// marker is configured. Never fails: a marker that never shows up means
    /// we proceed with whatever DOM is there.
    async fn await_content(&self, page: &Page) {
        let Some(selector) = self.options.wait_selector.as_deref() else {
            tokio::time::sleep(self.options.wait_timeout).await;
            return;
        };

        let probe = format!(
            "document.querySelector({}) !== null",
            serde_json::to_string(selector).unwrap_or_default()
        );
        let deadline = tokio::time::Instant::now() + self.options.wait_timeout;
        loop {
            if let Ok(result) = page.evaluate(probe.as_str()).await {
                if result.into_value::<bool>().unwrap_or(false) {
                    return;
                }
            }
            if tokio::time::Instant::now() >= deadline {
                debug!("marker {selector:?} never appeared, proceeding with current DOM");
                return;
            }
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
    }
}

#[async_trait]
impl MarkupFetcher for BrowserFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let page = self.open_page().await?;
        let outcome = self.render(&page, url).await;

        // The page must not outlive the request, success or not.
        if let Err(e) = page.close().await {
            debug!("page close failed: {e}");
        }

        outcome
    }

    async fn shutdown(&self) {
        let Some(session) = self.session.get() else {
            return;
        };
        let mut browser = session.lock().await;
        match tokio::time::timeout(Duration::from_secs(5), browser.close()).await {
            Ok(Ok(_)) => info!("browser session closed"),
            Ok(Err(e)) => warn!("browser close failed: {e}"),
            Err(_) => warn!("browser close timed out"),
        }
    }
}

async fn launch_browser() -> Result<Browser, FetchError> {
    let chrome_path = find_chromium().ok_or_else(|| {
        FetchError::Browser(
            "Chromium not found; install it or set SBIRKA_CHROMIUM_PATH".to_string(),
        )
    })?;

    let config = BrowserConfig::builder()
        .chrome_executable(chrome_path)
        .arg("--headless=new")
        .arg("--disable-gpu")
        .arg("--no-sandbox")
        .arg("--disable-dev-shm-usage")
        .arg("--disable-extensions")
        .arg("--disable-background-networking")
        .build()
        .map_err(|e| FetchError::Browser(format!("failed to build browser config: {e}")))?;

    let (browser, mut handler) = Browser::launch(config)
        .await
        .map_err(|e| FetchError::Browser(format!("failed to launch Chromium: {e}")))?;

    // Spawn the handler task
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            let _ = event;
        }
    });

    info!("launched shared Chromium session");
    Ok(browser)
}
