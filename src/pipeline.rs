//! Request-in/response-out composition of normalize → render → upload.

use crate::browser::RemoteBrowser;
use crate::print_options::normalize_query;
use crate::render::{RenderRequest, Renderer};
use crate::storage::{ArtifactUrl, ObjectStore, Uploader};
use crate::{PrintError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Query parameter carrying the page to print; every other parameter is a print option.
pub const URL_PARAM: &str = "url";

/// Incoming event: query string parameters as delivered by the hosting framework.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRequest {
    #[serde(default)]
    pub query_string_parameters: HashMap<String, String>,
}

impl PipelineRequest {
    pub fn new<K, V, I>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            query_string_parameters: params
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// JSON body of a successful response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseBody {
    pub url: Option<ArtifactUrl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResponse {
    pub status_code: u16,
    /// JSON-encoded [`ResponseBody`].
    pub body: String,
    pub headers: BTreeMap<String, String>,
}

impl PipelineResponse {
    pub fn ok(url: Option<ArtifactUrl>) -> Result<Self> {
        let body = serde_json::to_string(&ResponseBody { url })?;
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Ok(Self {
            status_code: 200,
            body,
            headers,
        })
    }

    pub fn parsed_body(&self) -> Result<ResponseBody> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Top-level handler. Render failures abort the request with a generic
/// error; upload failures degrade to a `null` URL with status 200.
pub struct PrintHandler<B, S> {
    renderer: Renderer<B>,
    uploader: Uploader<S>,
    /// The first browser target is shared, so renders run one at a time.
    render_slots: Arc<Semaphore>,
    shutdown: CancellationToken,
}

impl<B: RemoteBrowser, S: ObjectStore> PrintHandler<B, S> {
    pub fn new(renderer: Renderer<B>, uploader: Uploader<S>) -> Self {
        Self {
            renderer,
            uploader,
            render_slots: Arc::new(Semaphore::new(1)),
            shutdown: CancellationToken::new(),
        }
    }

    /// Uses `token` to abandon in-flight waits, e.g. on server shutdown.
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn handle(&self, request: PipelineRequest) -> Result<PipelineResponse> {
        let mut params = request.query_string_parameters;
        let url = params.remove(URL_PARAM);
        let options = normalize_query(&params);

        info!(url = ?url, options = ?options, "Processing PDFification");
        let start = Instant::now();

        let Some(url) = url.filter(|u| !u.trim().is_empty()) else {
            error!("Error printing pdf: missing `{URL_PARAM}` parameter");
            return Err(PrintError::UnableToPrint);
        };

        let artifact = {
            let _slot = self
                .render_slots
                .acquire()
                .await
                .map_err(|_| PrintError::UnableToPrint)?;
            self.renderer
                .render(
                    RenderRequest {
                        url: url.clone(),
                        options,
                    },
                    &self.shutdown,
                )
                .await
        };

        let Some(artifact) = artifact else {
            error!(url = %url, "Error printing pdf");
            return Err(PrintError::UnableToPrint);
        };

        let artifact_url = self.uploader.upload(artifact, &self.shutdown).await;

        info!(
            url = %url,
            artifact = ?artifact_url.as_ref().map(ArtifactUrl::as_str),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Finished PDFification"
        );

        PipelineResponse::ok(artifact_url)
    }
}
