use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{PrintError, Result};

/// Default level: `info` when request logging is on, `warn` otherwise.
pub fn default_level(logging: bool) -> LevelFilter {
    if logging {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    }
}

/// Install a global fmt subscriber writing to stderr. `RUST_LOG` overrides the default level.
pub fn init(logging: bool) -> Result<()> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level(logging).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|err| PrintError::config(format!("failed to install tracing subscriber: {err}")))
}
