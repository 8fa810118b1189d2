//! The live page handle and navigation controller.
//!
//! A [`Session`] exclusively owns the WebDriver client for its lifetime and
//! is re-pointed at a new document on every successful [`Session::navigate`].
//! Callers must sequence strictly: navigate, then query or extract, then
//! mutate. Issuing queries before `navigate` has returned `true` for the
//! current URL yields stale results, not an error.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use fantoccini::error::CmdError;
use fantoccini::{Client, Locator};
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, warn};

use drover_common::BrowserTimeouts;

use crate::extract::page_to_markdown;
use crate::fault::{classify, is_recoverable, Fault};
use crate::sanitize::{clean_url, is_navigable};
use crate::scripts::PageScripts;

const READY_POLL_PERIOD: Duration = Duration::from_millis(250);

/// Case-insensitive substrings marking a bot-verification interstitial.
const CHALLENGE_MARKERS: [&str; 3] = ["checking your browser", "verifying", "captcha"];

/// A link harvested from the live DOM. Transient; never persisted.
#[derive(Debug, Clone)]
pub struct Link {
    pub url: String,
    pub display_text: String,
    pub visible: bool,
}

/// A live browser session. See the module docs for the sequencing contract.
pub struct Session {
    pub(crate) client: Client,
    pub(crate) timeouts: BrowserTimeouts,
}

impl Session {
    pub(crate) fn new(client: Client, timeouts: BrowserTimeouts) -> Self {
        Self { client, timeouts }
    }

    /// Navigate to `url` and wait out loading and verification screens.
    ///
    /// Polls until the document reports `readyState == "complete"` and the
    /// rendered source carries no challenge marker, bounded by the page-load
    /// timeout. `Ok(false)` covers the expected failures (challenge never
    /// clears, page-level network errors); the session stays usable for a
    /// subsequent `navigate`. Broken-substrate errors propagate.
    pub async fn navigate(&self, url: &str) -> Result<bool> {
        if let Err(err) = self.client.goto(url).await {
            return self.absorb(err, false, "navigation");
        }

        let deadline = Instant::now() + Duration::from_secs(self.timeouts.page_load_secs);
        loop {
            match self.page_settled().await {
                Ok(true) => break,
                Ok(false) => {}
                Err(err) if classify(&err) == Fault::Recoverable => {
                    // The document can be mid-replacement while a challenge
                    // resolves itself; treat as not settled yet.
                    debug!(error = %err, "settle probe failed, retrying");
                }
                Err(err) => return Err(err.into()),
            }
            if Instant::now() >= deadline {
                warn!(%url, "stuck on loading or verification screen");
                return Ok(false);
            }
            sleep(READY_POLL_PERIOD).await;
        }

        self.apply_web_safety().await;
        info!(%url, "navigated");
        Ok(true)
    }

    async fn page_settled(&self) -> std::result::Result<bool, CmdError> {
        let ready = self
            .client
            .execute("return document.readyState;", vec![])
            .await?;
        if ready.as_str() != Some("complete") {
            return Ok(false);
        }
        let source = self.client.source().await?.to_lowercase();
        Ok(!CHALLENGE_MARKERS.iter().any(|m| source.contains(m)))
    }

    /// Fire-and-forget defensive mutation of the freshly loaded page.
    async fn apply_web_safety(&self) {
        if let Err(err) = self.client.execute(PageScripts::safety(), vec![]).await {
            debug!(error = %err, "safety injection failed");
        }
    }

    /// Extract the current page as filtered Markdown, or `None` when the
    /// page resists extraction.
    pub async fn extract_text(&self) -> Option<String> {
        match self.client.source().await {
            Ok(html) => page_to_markdown(&html),
            Err(err) => {
                error!(error = %err, "failed to read page source");
                None
            }
        }
    }

    /// Collect the cleaned URLs of all visible, navigable links on the
    /// current page.
    pub async fn navigable_links(&self) -> Result<Vec<String>> {
        let anchors = match self.client.find_all(Locator::Css("a")).await {
            Ok(a) => a,
            Err(err) => return self.absorb(err, Vec::new(), "link discovery"),
        };

        let mut harvested = Vec::new();
        for anchor in anchors {
            let href = match anchor.attr("href").await {
                Ok(Some(href)) => href,
                Ok(None) => continue,
                // An anchor going stale mid-harvest is page churn; a broken
                // driver is not.
                Err(err) if is_recoverable(&err) => continue,
                Err(err) => return Err(err.into()),
            };
            if !href.starts_with("http") {
                continue;
            }
            harvested.push(Link {
                display_text: anchor.text().await.unwrap_or_default().trim().to_string(),
                visible: anchor.is_displayed().await.unwrap_or(false),
                url: href,
            });
        }
        info!(count = harvested.len(), "found candidate links");

        Ok(harvested
            .into_iter()
            .filter(|link| link.visible && is_navigable(&link.url))
            .map(|link| clean_url(&link.url))
            .collect())
    }

    /// URL of the current page.
    pub async fn current_url(&self) -> Result<String> {
        Ok(self.client.current_url().await.map(|u| u.to_string())?)
    }

    /// Title of the current page.
    pub async fn title(&self) -> Result<String> {
        Ok(self.client.title().await?)
    }

    /// Scroll to the bottom of the page. Failure is reported, not raised.
    pub async fn scroll_to_bottom(&self) -> bool {
        let script = "window.scrollTo(0, document.body.scrollHeight);";
        match self.client.execute(script, vec![]).await {
            Ok(_) => {
                sleep(Duration::from_secs(1)).await;
                true
            }
            Err(err) => {
                error!(error = %err, "failed to scroll");
                false
            }
        }
    }

    /// Capture a PNG screenshot to `path`. Failure is reported, not raised.
    pub async fn screenshot(&self, path: &Path) -> bool {
        let png = match self.client.screenshot().await {
            Ok(png) => png,
            Err(err) => {
                error!(error = %err, "failed to capture screenshot");
                return false;
            }
        };
        match std::fs::write(path, &png) {
            Ok(()) => {
                info!(path = %path.display(), "screenshot saved");
                true
            }
            Err(err) => {
                error!(error = %err, "failed to write screenshot");
                false
            }
        }
    }

    /// Close the underlying browser session.
    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }

    /// Apply the failure policy: expected page-level trouble becomes the
    /// caller-supplied negative result, substrate breakage propagates.
    pub(crate) fn absorb<T>(&self, err: CmdError, fallback: T, what: &str) -> Result<T> {
        match classify(&err) {
            Fault::Recoverable => {
                warn!(error = %err, "{what} failed");
                Ok(fallback)
            }
            Fault::Substrate => {
                error!(error = %err, "{what} hit a driver-level failure");
                Err(err.into())
            }
        }
    }
}
