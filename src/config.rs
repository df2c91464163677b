use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::browser::{DEFAULT_DEBUGGING_HOST, DEFAULT_DEBUGGING_PORT};
use crate::render::{LoadTimeoutPolicy, RenderSettings, DEFAULT_PAGE_LOAD_TIMEOUT};
use crate::storage::{
    Credentials, UploadSettings, DEFAULT_OBJECT_EXPIRY, DEFAULT_UPLOAD_TIMEOUT,
};
use crate::wait::DEFAULT_POLL_INTERVAL;
use crate::{PrintError, Result};

pub const ENV_REGION: &str = "S3_REGION";
pub const ENV_BUCKET: &str = "S3_BUCKET";
pub const ENV_ACCESS_KEY_ID: &str = "S3_ACCESS_KEY_ID";
pub const ENV_SECRET_ACCESS_KEY: &str = "S3_SECRET_ACCESS_KEY";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub chrome: ChromeConfig,
    pub storage: StorageConfig,
    /// Log observed requests and browser version at info level.
    pub logging: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChromeConfig {
    pub host: String,
    pub port: u16,
    #[serde(with = "humantime_serde")]
    pub page_load_timeout: Duration,
    pub load_timeout_policy: LoadTimeoutPolicy,
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DEBUGGING_HOST.to_string(),
            port: DEFAULT_DEBUGGING_PORT,
            page_load_timeout: DEFAULT_PAGE_LOAD_TIMEOUT,
            load_timeout_policy: LoadTimeoutPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub region: String,
    pub bucket: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    #[serde(with = "humantime_serde")]
    pub upload_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub object_expiry: Duration,
    pub public_base_url: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            region: String::new(),
            bucket: String::new(),
            access_key_id: None,
            secret_access_key: None,
            upload_timeout: DEFAULT_UPLOAD_TIMEOUT,
            object_expiry: DEFAULT_OBJECT_EXPIRY,
            public_base_url: None,
        }
    }
}

impl StorageConfig {
    /// Returns credentials when both halves are configured.
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(id), Some(secret)) => Some(Credentials {
                access_key_id: id.clone(),
                secret_access_key: secret.clone(),
            }),
            _ => None,
        }
    }

    pub fn upload_settings(&self) -> UploadSettings {
        UploadSettings {
            public_base_url: self.public_base_url.clone(),
            timeout: self.upload_timeout,
            object_expiry: self.object_expiry,
            ..UploadSettings::new(&self.region, &self.bucket)
        }
    }
}

impl Config {
    /// `~/.config/pdfprint/config.toml`, if a config directory exists.
    pub fn central_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pdfprint").join("config.toml"))
    }

    /// Loads `path`, else the central config if it exists, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::central_config_path().filter(|p| p.is_file()),
        };
        match path {
            Some(p) => {
                let raw = std::fs::read_to_string(&p)?;
                Self::from_toml(&raw)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| PrintError::config(e.to_string()))
    }

    /// Applies `S3_*` overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());
        if let Some(region) = get(ENV_REGION) {
            self.storage.region = region;
        }
        if let Some(bucket) = get(ENV_BUCKET) {
            self.storage.bucket = bucket;
        }
        if let Some(id) = get(ENV_ACCESS_KEY_ID) {
            self.storage.access_key_id = Some(id);
        }
        if let Some(secret) = get(ENV_SECRET_ACCESS_KEY) {
            self.storage.secret_access_key = Some(secret);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.chrome.host.trim().is_empty() {
            return Err(PrintError::config("chrome.host must not be empty"));
        }
        if self.chrome.page_load_timeout.is_zero() {
            return Err(PrintError::config("chrome.page_load_timeout must be greater than zero"));
        }
        if self.storage.region.trim().is_empty() {
            return Err(PrintError::config(format!(
                "storage region is not set (use {ENV_REGION} or storage.region)"
            )));
        }
        if self.storage.bucket.trim().is_empty() {
            return Err(PrintError::config(format!(
                "storage bucket is not set (use {ENV_BUCKET} or storage.bucket)"
            )));
        }
        if self.storage.upload_timeout.is_zero() {
            return Err(PrintError::config("storage.upload_timeout must be greater than zero"));
        }
        if self.storage.access_key_id.is_some() != self.storage.secret_access_key.is_some() {
            return Err(PrintError::config(
                "access key id and secret access key must be set together",
            ));
        }
        Ok(())
    }

    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            page_load_timeout: self.chrome.page_load_timeout,
            poll_interval: DEFAULT_POLL_INTERVAL,
            load_timeout_policy: self.chrome.load_timeout_policy,
            log_browser_version: self.logging,
        }
    }
}
