//! Drives a remote browser through navigation and PDF export.
//!
//! A render never raises: every failure is logged and surfaces as `None`.
//! The session is closed on every path once it has been opened.

use crate::browser::{BrowserSession, PdfArtifact, RemoteBrowser, RequestObserver};
use crate::print_options::PrintOptions;
use crate::wait::{wait_until, ReadySignal, WaitConfig, WaitOutcome, DEFAULT_POLL_INTERVAL};
use crate::BrowserError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Default deadline for the page load event.
pub const DEFAULT_PAGE_LOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// What to do when the page load event does not fire before the deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadTimeoutPolicy {
    /// Print whatever has rendered so far.
    #[default]
    BestEffort,
    /// Treat the timeout as a render failure.
    FailFast,
}

#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub page_load_timeout: Duration,
    pub poll_interval: Duration,
    pub load_timeout_policy: LoadTimeoutPolicy,
    /// Query and log the browser version before each render.
    pub log_browser_version: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            page_load_timeout: DEFAULT_PAGE_LOAD_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            load_timeout_policy: LoadTimeoutPolicy::default(),
            log_browser_version: false,
        }
    }
}

/// A single render job.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub url: String,
    pub options: PrintOptions,
}

#[derive(Debug, thiserror::Error)]
enum RenderFailure {
    #[error(transparent)]
    Browser(#[from] BrowserError),
    #[error("page did not finish loading within {0:?}")]
    LoadTimeout(Duration),
    #[error("render cancelled")]
    Cancelled,
}

pub struct Renderer<B> {
    browser: B,
    settings: RenderSettings,
}

impl<B: RemoteBrowser> Renderer<B> {
    pub fn new(browser: B, settings: RenderSettings) -> Self {
        Self { browser, settings }
    }

    /// Renders `request.url` to PDF, or returns `None` if any step fails.
    pub async fn render(
        &self,
        request: RenderRequest,
        cancel: &CancellationToken,
    ) -> Option<PdfArtifact> {
        if self.settings.log_browser_version {
            match self.browser.version().await {
                Ok(version) => info!(
                    browser = %version.browser,
                    protocol = %version.protocol_version,
                    "CDP version info"
                ),
                Err(e) => warn!(error = %e, "CDP version info unavailable"),
            }
        }

        let mut session = match self.open(&request.url).await {
            Ok(session) => session,
            Err(e) => {
                error!(url = %request.url, error = %e, "Unable to open browser session");
                return None;
            }
        };

        let result = self.drive(&session, &request, cancel).await;

        if let Err(e) = session.close().await {
            warn!(error = %e, "Failed to close browser session");
        }

        match result {
            Ok(artifact) => {
                info!(url = %request.url, bytes = artifact.len(), "Rendered PDF");
                Some(artifact)
            }
            Err(e) => {
                error!(url = %request.url, error = %e, "Render failed");
                None
            }
        }
    }

    async fn open(&self, url: &str) -> Result<B::Session, BrowserError> {
        let targets = self.browser.list_targets().await?;
        let target = targets.first().ok_or(BrowserError::NoTargets)?;
        info!(target = %target.id, url, "Opening browser session");
        self.browser.open_session(target).await
    }

    async fn drive(
        &self,
        session: &B::Session,
        request: &RenderRequest,
        cancel: &CancellationToken,
    ) -> Result<PdfArtifact, RenderFailure> {
        let loaded = ReadySignal::new();
        let log_request: RequestObserver = Arc::new(|url: &str| {
            info!(url, "Chrome is sending request");
        });
        session.observe_requests(log_request).await?;
        session.observe_load(loaded.clone()).await?;

        futures::try_join!(session.enable_network(), session.enable_page())?;

        session.navigate(&request.url).await?;

        let wait = WaitConfig {
            deadline: self.settings.page_load_timeout,
            poll_interval: self.settings.poll_interval,
        };
        match wait_until(&loaded, wait, cancel).await {
            WaitOutcome::Ready => {}
            WaitOutcome::Cancelled => return Err(RenderFailure::Cancelled),
            WaitOutcome::TimedOut => match self.settings.load_timeout_policy {
                LoadTimeoutPolicy::BestEffort => {
                    warn!(
                        url = %request.url,
                        timeout = ?wait.deadline,
                        "Page load event did not fire; printing what has rendered"
                    );
                }
                LoadTimeoutPolicy::FailFast => {
                    return Err(RenderFailure::LoadTimeout(wait.deadline));
                }
            },
        }

        Ok(session.print_to_pdf(&request.options).await?)
    }
}
