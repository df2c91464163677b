use crate::error::ErrorPayload;
use crate::pipeline::PipelineResponse;
use serde::{Deserialize, Serialize};

/// Schema version for CLI output payloads.
pub const PDFPRINT_OUTPUT_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum CliOutput {
    Response(PipelineResponse),
    Error(ErrorOutput),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOutput {
    pub version: String,
    pub message: String,
    pub error: ErrorPayload,
}

impl ErrorOutput {
    pub fn new(error: ErrorPayload) -> Self {
        Self {
            version: PDFPRINT_OUTPUT_VERSION.to_string(),
            message: error.message.clone(),
            error,
        }
    }
}
