use super::key::generate_object_key;
use super::s3::s3_object_url;
use super::{ObjectAcl, ObjectStore, PutObject};
use crate::browser::PdfArtifact;
use crate::wait::{wait_for_completion, WaitError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Default deadline for the upload completion signal.
pub const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Default `Expires` offset for uploaded objects.
pub const DEFAULT_OBJECT_EXPIRY: Duration = Duration::from_secs(360);

const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Publicly resolvable location of an uploaded artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactUrl(String);

impl ArtifactUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub region: String,
    pub bucket: String,
    /// Replaces `https://s3-<region>.amazonaws.com/<bucket>` in returned URLs.
    pub public_base_url: Option<String>,
    pub timeout: Duration,
    pub object_expiry: Duration,
}

impl UploadSettings {
    pub fn new(region: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            bucket: bucket.into(),
            public_base_url: None,
            timeout: DEFAULT_UPLOAD_TIMEOUT,
            object_expiry: DEFAULT_OBJECT_EXPIRY,
        }
    }

    pub fn public_url(&self, key: &str) -> ArtifactUrl {
        match &self.public_base_url {
            Some(base) => ArtifactUrl(format!("{}/{}", base.trim_end_matches('/'), key)),
            None => ArtifactUrl(s3_object_url(&self.region, &self.bucket, key)),
        }
    }
}

/// Uploads artifacts and waits, up to a deadline, for the store to confirm.
pub struct Uploader<S> {
    store: Arc<S>,
    settings: UploadSettings,
}

impl<S> Clone for Uploader<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            settings: self.settings.clone(),
        }
    }
}

impl<S: ObjectStore> Uploader<S> {
    pub fn new(store: S, settings: UploadSettings) -> Self {
        Self {
            store: Arc::new(store),
            settings,
        }
    }

    /// Stores `artifact` under a fresh key. Returns `None` when the store
    /// reports an error or does not confirm before the upload timeout; a
    /// timed-out upload is aborted rather than left running.
    pub async fn upload(
        &self,
        artifact: PdfArtifact,
        cancel: &CancellationToken,
    ) -> Option<ArtifactUrl> {
        let key = generate_object_key();
        let request = PutObject {
            bucket: self.settings.bucket.clone(),
            key: key.clone(),
            body: artifact.into_bytes(),
            content_type: PDF_CONTENT_TYPE.to_string(),
            acl: ObjectAcl::PublicRead,
            expires_in: self.settings.object_expiry,
        };

        let (done, completion) = oneshot::channel();
        let store = Arc::clone(&self.store);
        let task = tokio::spawn(async move {
            let _ = done.send(store.put_object(request).await);
        });

        match wait_for_completion(completion, self.settings.timeout, cancel).await {
            Ok(Ok(())) => {
                let url = self.settings.public_url(&key);
                info!(%url, "Uploaded PDF");
                Some(url)
            }
            Ok(Err(e)) => {
                warn!(key = %key, error = %e, "Upload failed");
                None
            }
            Err(WaitError::Closed) => {
                warn!(key = %key, "Upload task ended without reporting completion");
                None
            }
            Err(e) => {
                task.abort();
                warn!(key = %key, error = %e, "Upload abandoned");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_url_defaults_to_s3_path_style() {
        let settings = UploadSettings::new("us-west-2", "docs");
        assert_eq!(
            settings.public_url("k.pdf").as_str(),
            "https://s3-us-west-2.amazonaws.com/docs/k.pdf"
        );
    }

    #[test]
    fn public_url_honours_base_override() {
        let settings = UploadSettings {
            public_base_url: Some("https://cdn.example.com/pdf/".to_string()),
            ..UploadSettings::new("us-west-2", "docs")
        };
        assert_eq!(
            settings.public_url("k.pdf").to_string(),
            "https://cdn.example.com/pdf/k.pdf"
        );
    }

    #[test]
    fn default_timeouts() {
        let settings = UploadSettings::new("r", "b");
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert_eq!(settings.object_expiry, Duration::from_secs(360));
    }

    #[test]
    fn artifact_url_serializes_as_string() {
        let url = UploadSettings::new("r", "b").public_url("k.pdf");
        assert_eq!(
            serde_json::to_string(&url).unwrap(),
            "\"https://s3-r.amazonaws.com/b/k.pdf\""
        );
    }
}
