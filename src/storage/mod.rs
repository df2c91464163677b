//! Object storage for rendered artifacts.
//!
//! # Module Structure
//!
//! - [`key`] - Collision-resistant object key generation
//! - [`s3`] - Path-style S3 `PUT` transport over reqwest
//! - [`sigv4`] - AWS Signature Version 4 request signing
//! - [`uploader`] - Bounded wait on upload completion and public URL assembly

mod key;
mod s3;
mod sigv4;
mod uploader;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub use key::generate_object_key;
pub use s3::{s3_object_url, S3Store};
pub use sigv4::Credentials;
pub use uploader::{ArtifactUrl, UploadSettings, Uploader, DEFAULT_OBJECT_EXPIRY, DEFAULT_UPLOAD_TIMEOUT};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("storage rejected upload ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("invalid storage configuration: {0}")]
    InvalidConfig(String),
}

/// Canned access policy applied to an uploaded object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectAcl {
    PublicRead,
}

impl ObjectAcl {
    pub fn as_header_value(self) -> &'static str {
        match self {
            ObjectAcl::PublicRead => "public-read",
        }
    }
}

/// A single object write.
#[derive(Debug, Clone)]
pub struct PutObject {
    pub bucket: String,
    pub key: String,
    pub body: Vec<u8>,
    pub content_type: String,
    pub acl: ObjectAcl,
    /// Sent as the object's `Expires` header, relative to upload time.
    pub expires_in: Duration,
}

/// Storage capability used by the [`Uploader`].
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    async fn put_object(&self, request: PutObject) -> Result<(), StorageError>;
}
