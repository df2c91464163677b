use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use pdfprint_lib::{CliOutput, PipelineRequest, PrintError};
use tracing::debug;

use super::{build_handler, init_logging};
use crate::cli::{ChromeArgs, OutputFormat};
use crate::formatting::{render_error, write_output};
use crate::settings::{format_effective_config, load_config};

/// Run the handle command.
pub async fn run_handle(
    config_path: Option<PathBuf>,
    verbose: bool,
    event: Option<PathBuf>,
    chrome: ChromeArgs,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> ExitCode {
    let request = match read_event(event.as_deref()) {
        Ok(request) => request,
        Err(err) => return render_error(err, format, output),
    };
    let config = match load_config(config_path.as_deref(), &chrome, verbose) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, format, output),
    };
    init_logging(&config);
    debug!("{}", format_effective_config(&config, config_path.as_deref()));

    let handler = build_handler(&config);
    match handler.handle(request).await {
        Ok(response) => {
            let body = CliOutput::Response(response);
            match write_output(&body, format, output.clone()) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => render_error(PrintError::config(err.to_string()), format, output),
            }
        }
        Err(err) => render_error(err, format, output),
    }
}

/// Reads the event from `path`, or stdin when absent or `-`.
fn read_event(path: Option<&Path>) -> Result<PipelineRequest, PrintError> {
    let raw = match path {
        Some(p) if p != Path::new("-") => std::fs::read_to_string(p)?,
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_event_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event.json");
        std::fs::write(
            &path,
            r#"{"queryStringParameters": {"url": "https://example.com", "landscape": "true"}}"#,
        )
        .unwrap();

        let request = read_event(Some(&path)).unwrap();
        assert_eq!(request.query_string_parameters.len(), 2);
    }

    #[test]
    fn malformed_event_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event.json");
        std::fs::write(&path, "not json").unwrap();

        let err = read_event(Some(&path)).unwrap_err();
        assert!(matches!(err, PrintError::Serialization(_)));
    }
}
