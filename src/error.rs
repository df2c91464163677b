use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::ParseError;

/// Message surfaced to callers when a render fails; the underlying cause is only logged.
pub const UNABLE_TO_PRINT: &str = "Unable to print pdf";

#[derive(Debug, Error)]
pub enum PrintError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] ParseError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unable to print pdf")]
    UnableToPrint,
}

impl PrintError {
    pub fn config(message: impl Into<String>) -> Self {
        PrintError::Config(message.into())
    }

    pub fn to_payload(&self) -> ErrorPayload {
        match self {
            PrintError::Io(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Check file paths/permissions.",
            ),
            PrintError::InvalidUrl(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Verify URL/format (e.g., https://example.com).",
            ),
            PrintError::Serialization(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Check the event JSON shape: {\"queryStringParameters\": {\"url\": \"...\"}}.",
            ),
            PrintError::Config(msg) => {
                let lower = msg.to_ascii_lowercase();
                if lower.contains("bucket") || lower.contains("region") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Set S3_REGION and S3_BUCKET (or [storage] region/bucket in the config file).",
                    )
                } else if lower.contains("access key") || lower.contains("secret") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Provide both S3_ACCESS_KEY_ID and S3_SECRET_ACCESS_KEY, or neither for unsigned uploads.",
                    )
                } else if lower.contains("timeout") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Use a non-zero duration such as \"60s\" or \"500ms\".",
                    )
                } else {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Check flags and the config file (TOML); CLI flags override config.",
                    )
                }
            }
            PrintError::UnableToPrint => ErrorPayload::new(
                ErrorCategory::Render,
                UNABLE_TO_PRINT.to_string(),
                "Re-run with --verbose to see the render failure in the logs.",
            ),
        }
    }
}

pub type Result<T> = std::result::Result<T, PrintError>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Config,
    Render,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub category: ErrorCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl ErrorPayload {
    pub fn new(category: ErrorCategory, message: String, remediation: impl Into<String>) -> Self {
        Self {
            category,
            message,
            remediation: Some(remediation.into()),
        }
    }
}
