use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{build_handler, init_logging};
use crate::cli::{ChromeArgs, OutputFormat};
use crate::formatting::render_error;
use crate::settings::{format_effective_config, load_config};

/// Run the serve command until Ctrl-C.
pub async fn run_serve(
    config_path: Option<PathBuf>,
    verbose: bool,
    listen: SocketAddr,
    chrome: ChromeArgs,
) -> ExitCode {
    let config = match load_config(config_path.as_deref(), &chrome, verbose) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, OutputFormat::Json, None),
    };
    init_logging(&config);
    info!("{}", format_effective_config(&config, config_path.as_deref()));

    let listener = match TcpListener::bind(listen).await {
        Ok(listener) => listener,
        Err(err) => return render_error(err.into(), OutputFormat::Json, None),
    };

    let shutdown = CancellationToken::new();
    let handler = Arc::new(build_handler(&config).with_shutdown(shutdown.clone()));

    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutting down");
                signal.cancel();
            }
            Err(err) => warn!(error = %err, "Unable to listen for shutdown signal"),
        }
    });

    match pdfprint_lib::server::serve(listener, handler, shutdown).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => render_error(err, OutputFormat::Json, None),
    }
}
