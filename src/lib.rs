//! pdfprint Library
//!
//! Renders a URL to PDF in a remote Chrome over the DevTools protocol and
//! publishes the result to S3-compatible storage.
//!
//! # Module Overview
//!
//! - [`print_options`] - Print option defaults and loose-typed normalization
//! - [`wait`] - Deadline-bounded waiting on load and upload signals
//! - [`browser`] - Remote browser abstraction and the CDP implementation
//! - [`render`] - Navigation and PDF export against one browser session
//! - [`storage`] - Object keys, S3 transport and the upload waiter
//! - [`pipeline`] - Request/response handler composing the above
//! - [`server`] - HTTP front end for the pipeline
//! - [`config`] - Configuration file and environment support
//! - [`output`] - JSON output schemas for the CLI
//!
//! # Example
//!
//! ```no_run
//! use pdfprint_lib::{CdpBrowser, PipelineRequest, PrintHandler, Renderer, RenderSettings};
//! use pdfprint_lib::{S3Store, UploadSettings, Uploader};
//!
//! # async fn example() -> pdfprint_lib::Result<()> {
//! let renderer = Renderer::new(CdpBrowser::default(), RenderSettings::default());
//! let uploader = Uploader::new(
//!     S3Store::new("us-west-2", None),
//!     UploadSettings::new("us-west-2", "my-bucket"),
//! );
//! let handler = PrintHandler::new(renderer, uploader);
//!
//! let response = handler
//!     .handle(PipelineRequest::new([("url", "https://example.com"), ("landscape", "true")]))
//!     .await?;
//! println!("{}", response.body);
//! # Ok(())
//! # }
//! ```

pub mod browser;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod print_options;
pub mod render;
pub mod server;
pub mod storage;
pub mod telemetry;
pub mod wait;

pub use browser::{
    BrowserError, BrowserSession, BrowserVersion, CdpBrowser, CdpSession, PdfArtifact,
    RemoteBrowser, RequestObserver, TargetInfo,
};
pub use config::Config;
pub use error::{ErrorCategory, ErrorPayload, PrintError, Result, UNABLE_TO_PRINT};
pub use output::{CliOutput, ErrorOutput, PDFPRINT_OUTPUT_VERSION};
pub use pipeline::{PipelineRequest, PipelineResponse, PrintHandler, ResponseBody};
pub use print_options::{normalize, normalize_query, OptionValue, PrintOptions};
pub use render::{LoadTimeoutPolicy, RenderRequest, RenderSettings, Renderer};
pub use storage::{
    ArtifactUrl, Credentials, ObjectAcl, ObjectStore, PutObject, S3Store, StorageError,
    UploadSettings, Uploader,
};
pub use wait::{ReadySignal, WaitConfig, WaitOutcome};
