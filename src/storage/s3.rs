use super::sigv4::{self, Credentials, SignableRequest};
use super::{ObjectStore, PutObject, StorageError};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::EXPIRES;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Per-request timeout; the uploader applies its own, usually shorter, deadline on top.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Public URL of an object on the legacy regional path-style endpoint.
pub fn s3_object_url(region: &str, bucket: &str, key: &str) -> String {
    format!("https://s3-{region}.amazonaws.com/{bucket}/{key}")
}

/// Path-style S3 client.
#[derive(Debug, Clone)]
pub struct S3Store {
    client: reqwest::Client,
    region: String,
    endpoint: String,
    credentials: Option<Credentials>,
}

impl S3Store {
    pub fn new(region: impl Into<String>, credentials: Option<Credentials>) -> Self {
        let region = region.into();
        let endpoint = format!("https://s3-{region}.amazonaws.com");
        Self::with_endpoint(region, endpoint, credentials)
    }

    /// Uses a custom endpoint, e.g. an S3-compatible service or a local stub.
    pub fn with_endpoint(
        region: impl Into<String>,
        endpoint: impl Into<String>,
        credentials: Option<Credentials>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            region: region.into(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn object_url(&self, bucket: &str, key: &str) -> Result<Url, StorageError> {
        let raw = format!("{}/{}/{}", self.endpoint, bucket, sigv4::encode_key(key));
        Url::parse(&raw).map_err(|e| StorageError::InvalidConfig(format!("{raw}: {e}")))
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put_object(&self, request: PutObject) -> Result<(), StorageError> {
        let url = self.object_url(&request.bucket, &request.key)?;
        let now = Utc::now();
        let expires_at = now
            + chrono::Duration::from_std(request.expires_in)
                .map_err(|e| StorageError::InvalidConfig(e.to_string()))?;

        let mut headers: Vec<(&str, String)> = vec![
            ("content-type", request.content_type.clone()),
            ("x-amz-acl", request.acl.as_header_value().to_string()),
        ];

        if let Some(credentials) = &self.credentials {
            let host = match (url.host_str(), url.port()) {
                (Some(host), Some(port)) => format!("{host}:{port}"),
                (Some(host), None) => host.to_string(),
                (None, _) => {
                    return Err(StorageError::InvalidConfig(format!(
                        "endpoint has no host: {}",
                        self.endpoint
                    )))
                }
            };
            let payload_sha256 = sigv4::sha256_hex(&request.body);
            headers.push(("host", host));
            headers.push(("x-amz-content-sha256", payload_sha256.clone()));
            headers.push(("x-amz-date", sigv4::amz_date(now)));

            let signable = SignableRequest {
                method: "PUT",
                path: url.path(),
                headers: &headers,
                payload_sha256: &payload_sha256,
            };
            let authorization =
                sigv4::authorization(credentials, &self.region, "s3", now, &signable);
            headers.push(("authorization", authorization));
            // reqwest sets Host itself.
            headers.retain(|(name, _)| *name != "host");
        }

        let mut builder = self
            .client
            .put(url.clone())
            .header(EXPIRES, http_date(expires_at))
            .body(request.body);
        for (name, value) in &headers {
            builder = builder.header(*name, value);
        }

        debug!(url = %url, "Uploading object");
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                message: message.trim().to_string(),
            });
        }
        Ok(())
    }
}

fn http_date(at: chrono::DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
