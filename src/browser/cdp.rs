//! Chrome DevTools Protocol transport.
//!
//! Target discovery and version info go through the browser's `/json` HTTP
//! endpoints; the session itself is a chromiumoxide websocket connection to an
//! already running Chrome. Closing a session drops the connection only and
//! never shuts the browser down.

use super::{
    BrowserError, BrowserSession, BrowserVersion, PdfArtifact, RemoteBrowser, RequestObserver,
    TargetInfo,
};
use crate::print_options::PrintOptions;
use crate::wait::ReadySignal;
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams as NetworkEnableParams, EventRequestWillBeSent,
};
use chromiumoxide::cdp::browser_protocol::page::{
    EnableParams as PageEnableParams, EventLoadEventFired, NavigateParams, PrintToPdfParams,
};
use chromiumoxide::error::CdpError;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub const DEFAULT_DEBUGGING_HOST: &str = "127.0.0.1";
pub const DEFAULT_DEBUGGING_PORT: u16 = 9222;

/// Timeout for `/json` endpoint requests.
const ENDPOINT_TIMEOUT: Duration = Duration::from_secs(10);

impl From<CdpError> for BrowserError {
    fn from(err: CdpError) -> Self {
        BrowserError::Protocol(err.to_string())
    }
}

/// A Chrome instance reachable on its remote debugging port.
#[derive(Debug, Clone)]
pub struct CdpBrowser {
    host: String,
    port: u16,
    client: reqwest::Client,
}

impl Default for CdpBrowser {
    fn default() -> Self {
        Self::new(DEFAULT_DEBUGGING_HOST, DEFAULT_DEBUGGING_PORT)
    }
}

impl CdpBrowser {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        let client = reqwest::Client::builder()
            .no_proxy()
            .timeout(ENDPOINT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            host: host.into(),
            port,
            client,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, BrowserError> {
        let url = format!("{}{}", self.endpoint(), path);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl RemoteBrowser for CdpBrowser {
    type Session = CdpSession;

    async fn version(&self) -> Result<BrowserVersion, BrowserError> {
        self.get_json("/json/version").await
    }

    async fn list_targets(&self) -> Result<Vec<TargetInfo>, BrowserError> {
        let targets: Vec<TargetInfo> = self.get_json("/json/list").await?;
        Ok(targets
            .into_iter()
            .filter(|target| target.kind == "page")
            .collect())
    }

    async fn open_session(&self, target: &TargetInfo) -> Result<CdpSession, BrowserError> {
        let version = self.version().await?;
        let ws_url = version.web_socket_debugger_url.ok_or_else(|| {
            BrowserError::Protocol("browser did not report a webSocketDebuggerUrl".to_string())
        })?;

        let (mut browser, mut handler) = Browser::connect(ws_url).await?;
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("CDP handler event error: {}", e);
                }
            }
        });

        let page = match attach_page(&mut browser, target).await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                return Err(e);
            }
        };

        Ok(CdpSession {
            page,
            browser: Some(browser),
            handler_task: Some(handler_task),
            observers: Mutex::new(Vec::new()),
        })
    }
}

async fn attach_page(browser: &mut Browser, target: &TargetInfo) -> Result<Page, BrowserError> {
    browser.fetch_targets().await?;
    let existing = browser
        .pages()
        .await?
        .into_iter()
        .find(|page| page.target_id().inner() == &target.id);

    match existing {
        Some(page) => Ok(page),
        None => {
            warn!(
                target = %target.id,
                "Target not attachable; opening a blank page instead"
            );
            Ok(browser.new_page("about:blank").await?)
        }
    }
}

/// An open connection to one page target.
pub struct CdpSession {
    page: Page,
    browser: Option<Browser>,
    handler_task: Option<JoinHandle<()>>,
    observers: Mutex<Vec<JoinHandle<()>>>,
}

impl CdpSession {
    fn track(&self, task: JoinHandle<()>) {
        match self.observers.lock() {
            Ok(mut observers) => observers.push(task),
            Err(poisoned) => poisoned.into_inner().push(task),
        }
    }

    fn abort_tasks(&mut self) {
        let observers = match self.observers.get_mut() {
            Ok(observers) => observers,
            Err(poisoned) => poisoned.into_inner(),
        };
        for task in observers.drain(..) {
            task.abort();
        }
        if let Some(task) = self.handler_task.take() {
            task.abort();
        }
    }

    fn ensure_open(&self) -> Result<(), BrowserError> {
        if self.browser.is_none() {
            return Err(BrowserError::Closed);
        }
        Ok(())
    }
}

impl Drop for CdpSession {
    fn drop(&mut self) {
        self.abort_tasks();
    }
}

#[async_trait]
impl BrowserSession for CdpSession {
    async fn observe_requests(&self, observer: RequestObserver) -> Result<(), BrowserError> {
        self.ensure_open()?;
        let mut events = self
            .page
            .event_listener::<EventRequestWillBeSent>()
            .await?;
        self.track(tokio::spawn(async move {
            while let Some(event) = events.next().await {
                observer(&event.request.url);
            }
        }));
        Ok(())
    }

    async fn observe_load(&self, loaded: ReadySignal) -> Result<(), BrowserError> {
        self.ensure_open()?;
        let mut events = self.page.event_listener::<EventLoadEventFired>().await?;
        self.track(tokio::spawn(async move {
            if events.next().await.is_some() {
                loaded.set();
            }
        }));
        Ok(())
    }

    async fn enable_network(&self) -> Result<(), BrowserError> {
        self.ensure_open()?;
        self.page.execute(NetworkEnableParams::default()).await?;
        Ok(())
    }

    async fn enable_page(&self) -> Result<(), BrowserError> {
        self.ensure_open()?;
        self.page.execute(PageEnableParams::default()).await?;
        Ok(())
    }

    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        self.ensure_open()?;
        let response = self.page.execute(NavigateParams::new(url)).await?;
        if let Some(error_text) = &response.result.error_text {
            // The error page still renders; printing proceeds.
            warn!(url, error = %error_text, "Navigation reported an error");
        }
        Ok(())
    }

    async fn print_to_pdf(&self, options: &PrintOptions) -> Result<PdfArtifact, BrowserError> {
        self.ensure_open()?;
        let bytes = self.page.pdf(to_cdp_params(options)).await?;
        Ok(PdfArtifact::new(bytes))
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        self.abort_tasks();
        if self.browser.take().is_some() {
            debug!("CDP session closed");
        }
        Ok(())
    }
}

fn to_cdp_params(options: &PrintOptions) -> PrintToPdfParams {
    PrintToPdfParams {
        landscape: Some(options.landscape),
        display_header_footer: Some(options.display_header_footer),
        print_background: Some(options.print_background),
        scale: Some(options.scale),
        paper_width: Some(options.paper_width),
        paper_height: Some(options.paper_height),
        margin_top: Some(options.margin_top),
        margin_bottom: Some(options.margin_bottom),
        margin_left: Some(options.margin_left),
        margin_right: Some(options.margin_right),
        page_ranges: if options.page_ranges.is_empty() {
            None
        } else {
            Some(options.page_ranges.clone())
        },
        ..Default::default()
    }
}
