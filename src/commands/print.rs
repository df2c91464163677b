use std::path::PathBuf;
use std::process::ExitCode;

use pdfprint_lib::pipeline::URL_PARAM;
use pdfprint_lib::{CliOutput, PipelineRequest, PrintError};
use tracing::debug;

use super::{build_handler, init_logging};
use crate::cli::{ChromeArgs, OutputFormat};
use crate::formatting::{render_error, write_output};
use crate::settings::{format_effective_config, load_config};

/// Run the print command.
pub async fn run_print(
    config_path: Option<PathBuf>,
    verbose: bool,
    url: String,
    options: Vec<(String, String)>,
    chrome: ChromeArgs,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> ExitCode {
    let config = match load_config(config_path.as_deref(), &chrome, verbose) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, format, output),
    };
    init_logging(&config);
    if let Err(err) = url::Url::parse(&url) {
        return render_error(PrintError::InvalidUrl(err), format, output);
    }
    debug!("{}", format_effective_config(&config, config_path.as_deref()));

    let mut params = options;
    params.retain(|(key, _)| key != URL_PARAM);
    params.push((URL_PARAM.to_string(), url));

    let handler = build_handler(&config);
    match handler.handle(PipelineRequest::new(params)).await {
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
