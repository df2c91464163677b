use std::path::Path;
use std::time::Duration;

use pdfprint_lib::{Config, PrintError};

use crate::cli::ChromeArgs;

/// Load config from a TOML file, central config, or return defaults, then
/// apply `S3_*` environment overrides and CLI flags.
/// Priority: CLI flags > env > explicit path > ~/.config/pdfprint/config.toml > defaults
pub fn load_config(
    path: Option<&Path>,
    overrides: &ChromeArgs,
    verbose: bool,
) -> Result<Config, PrintError> {
    let mut cfg = Config::load(path).map_err(|e| {
        let loc = path
            .map(|p| p.display().to_string())
            .or_else(|| Config::central_config_path().map(|p| p.display().to_string()))
            .unwrap_or_else(|| "defaults".to_string());
        PrintError::config(format!("Failed to read config {}: {}", loc, e))
    })?;

    cfg.apply_env();
    apply_overrides(&mut cfg, overrides);
    cfg.logging |= verbose;

    cfg.validate().map_err(|e| {
        let prefix = path
            .map(|p| format!("Invalid config ({}): {}", p.display(), e))
            .unwrap_or_else(|| format!("Invalid config: {}", e));
        PrintError::config(prefix)
    })?;
    Ok(cfg)
}

/// Merge CLI flags into `cfg`; a flag wins whenever it was given.
pub fn apply_overrides(cfg: &mut Config, overrides: &ChromeArgs) {
    if let Some(host) = &overrides.chrome_host {
        cfg.chrome.host = host.clone();
    }
    if let Some(port) = overrides.chrome_port {
        cfg.chrome.port = port;
    }
    if let Some(secs) = overrides.page_load_timeout {
        cfg.chrome.page_load_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = overrides.upload_timeout {
        cfg.storage.upload_timeout = Duration::from_secs(secs);
    }
}

/// Format effective config as a single-line string. Credentials are reported only as present/absent.
pub fn format_effective_config(cfg: &Config, config_source: Option<&Path>) -> String {
    let source = config_source
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    format!(
        "Effective config [{source}]: chrome={}:{}, timeouts: page-load={:?} ({:?}), upload={:?}, storage: region={}, bucket={}, signed={}, expiry={:?}",
        cfg.chrome.host,
        cfg.chrome.port,
        cfg.chrome.page_load_timeout,
        cfg.chrome.load_timeout_policy,
        cfg.storage.upload_timeout,
        cfg.storage.region,
        cfg.storage.bucket,
        cfg.storage.credentials().is_some(),
        cfg.storage.object_expiry,
    )
}
