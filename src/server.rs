//! HTTP front end: `GET /print?url=...` runs the pipeline, `GET /health` reports liveness.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::browser::RemoteBrowser;
use crate::pipeline::{PipelineRequest, PipelineResponse, PrintHandler};
use crate::storage::ObjectStore;
use crate::{PrintError, Result};

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

pub fn router<B, S>(handler: Arc<PrintHandler<B, S>>) -> Router
where
    B: RemoteBrowser + 'static,
    S: ObjectStore,
{
    Router::new()
        .route("/print", get(print::<B, S>))
        .route("/health", get(health))
        .with_state(handler)
}

/// Serves until `shutdown` is cancelled. In-flight waits observe the same token.
pub async fn serve<B, S>(
    listener: TcpListener,
    handler: Arc<PrintHandler<B, S>>,
    shutdown: CancellationToken,
) -> Result<()>
where
    B: RemoteBrowser + 'static,
    S: ObjectStore,
{
    info!(addr = ?listener.local_addr().ok(), "pdfprint listening");
    axum::serve(listener, router(handler))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    Ok(())
}

async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn print<B, S>(
    State(handler): State<Arc<PrintHandler<B, S>>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response
where
    B: RemoteBrowser + 'static,
    S: ObjectStore,
{
    let request = PipelineRequest {
        query_string_parameters: params,
    };
    match handler.handle(request).await {
        Ok(response) => into_http(response),
        Err(err) => error_response(err),
    }
}

fn into_http(response: PipelineResponse) -> Response {
    let status = StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::OK);
    let mut http = (status, response.body).into_response();
    for (name, value) in &response.headers {
        match (
            HeaderName::try_from(name.as_str()),
            HeaderValue::try_from(value.as_str()),
        ) {
            (Ok(name), Ok(value)) => {
                http.headers_mut().insert(name, value);
            }
            _ => warn!(header = %name, "Dropping invalid response header"),
        }
    }
    http
}

fn error_response(err: PrintError) -> Response {
    let message = err.to_payload().message;
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody { message })).into_response()
}
