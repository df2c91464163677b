//! Remote browser capability.
//!
//! The render pipeline drives a browser through the [`RemoteBrowser`] and
//! [`BrowserSession`] traits so it can run against any debugging transport.
//!
//! # Module Structure
//!
//! - [`cdp`] - Chrome DevTools Protocol transport (chromiumoxide + `/json` HTTP endpoints)
//!
//! # Example
//!
//! ```no_run
//! use pdfprint_lib::{CdpBrowser, RemoteBrowser};
//!
//! # async fn example() -> Result<(), pdfprint_lib::BrowserError> {
//! let browser = CdpBrowser::new("127.0.0.1", 9222);
//! let targets = browser.list_targets().await?;
//! println!("{} page targets", targets.len());
//! # Ok(())
//! # }
//! ```

mod cdp;

use crate::print_options::PrintOptions;
use crate::wait::ReadySignal;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

pub use cdp::{CdpBrowser, CdpSession, DEFAULT_DEBUGGING_HOST, DEFAULT_DEBUGGING_PORT};

/// Callback invoked with the URL of every request the page sends.
pub type RequestObserver = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("no page targets available on the remote browser")]
    NoTargets,
    #[error("debugging endpoint request failed: {0}")]
    Endpoint(#[from] reqwest::Error),
    #[error("CDP error: {0}")]
    Protocol(String),
    #[error("session is closed")]
    Closed,
}

/// A debuggable target as listed by the remote browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetInfo {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub web_socket_debugger_url: Option<String>,
}

/// Version info reported by the remote browser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserVersion {
    #[serde(rename = "Browser", default)]
    pub browser: String,
    #[serde(rename = "Protocol-Version", default)]
    pub protocol_version: String,
    #[serde(rename = "User-Agent", default)]
    pub user_agent: String,
    #[serde(rename = "webSocketDebuggerUrl", default)]
    pub web_socket_debugger_url: Option<String>,
}

/// A rendered PDF document.
#[derive(Clone, PartialEq, Eq)]
pub struct PdfArtifact {
    bytes: Vec<u8>,
}

impl PdfArtifact {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl std::fmt::Debug for PdfArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfArtifact")
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Entry point to a remote browser.
#[async_trait]
pub trait RemoteBrowser: Send + Sync {
    type Session: BrowserSession;

    async fn version(&self) -> Result<BrowserVersion, BrowserError>;

    async fn list_targets(&self) -> Result<Vec<TargetInfo>, BrowserError>;

    async fn open_session(&self, target: &TargetInfo) -> Result<Self::Session, BrowserError>;
}

/// A connection to a single target.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Registers a passive observer for outgoing network requests.
    async fn observe_requests(&self, observer: RequestObserver) -> Result<(), BrowserError>;

    /// Registers an observer that sets `loaded` when the page load event fires.
    async fn observe_load(&self, loaded: ReadySignal) -> Result<(), BrowserError>;

    async fn enable_network(&self) -> Result<(), BrowserError>;

    async fn enable_page(&self) -> Result<(), BrowserError>;

    async fn navigate(&self, url: &str) -> Result<(), BrowserError>;

    async fn print_to_pdf(&self, options: &PrintOptions) -> Result<PdfArtifact, BrowserError>;

    /// Releases the connection. Must be safe to call more than once.
    async fn close(&mut self) -> Result<(), BrowserError>;
}
