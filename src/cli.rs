use clap::{Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdfprint")]
#[command(
    version,
    about = "pdfprint - Render web pages to PDF through a remote Chrome and publish them to S3",
    long_about = "pdfprint\n\nModes:\n- print: render one URL and upload the PDF.\n- handle: run a Lambda-style event ({\"queryStringParameters\": {...}}) through the pipeline.\n- serve: expose GET /print?url=... over HTTP.\n\nChrome must be running with --remote-debugging-port. Storage is configured via S3_REGION, S3_BUCKET, S3_ACCESS_KEY_ID and S3_SECRET_ACCESS_KEY or the [storage] config section."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Enable verbose output (info-level logs)")]
    pub verbose: bool,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Optional config file (TOML) with [chrome] and [storage] sections; CLI flags and S3_* env override config"
    )]
    pub config: Option<PathBuf>,
}

/// Flags shared by every command that talks to Chrome.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ChromeArgs {
    #[arg(long, value_name = "HOST", help = "Chrome remote debugging host")]
    pub chrome_host: Option<String>,

    #[arg(long, value_name = "PORT", help = "Chrome remote debugging port")]
    pub chrome_port: Option<u16>,

    #[arg(
        long,
        value_name = "SECS",
        help = "Seconds to wait for the page load event before printing"
    )]
    pub page_load_timeout: Option<u64>,

    #[arg(
        long,
        value_name = "SECS",
        help = "Seconds to wait for the upload to be confirmed"
    )]
    pub upload_timeout: Option<u64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a URL to PDF and upload it
    Print {
        #[arg(long, help = "Page to print")]
        url: String,

        #[arg(
            long = "option",
            short = 'o',
            value_name = "KEY=VALUE",
            value_parser = parse_key_val,
            help = "Print option override (e.g. landscape=true, scale=0.8); repeatable"
        )]
        options: Vec<(String, String)>,

        #[command(flatten)]
        chrome: ChromeArgs,

        #[arg(long, value_enum, default_value = "json", help = "Output format")]
        format: OutputFormat,

        #[arg(long, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },

    /// Run a Lambda-style event through the pipeline
    Handle {
        #[arg(
            long,
            value_name = "FILE",
            help = "Event JSON file; reads stdin when omitted or '-'"
        )]
        event: Option<PathBuf>,

        #[command(flatten)]
        chrome: ChromeArgs,

        #[arg(long, value_enum, default_value = "json", help = "Output format")]
        format: OutputFormat,

        #[arg(long, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },

    /// Serve GET /print over HTTP
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000", help = "Address to listen on")]
        listen: SocketAddr,

        #[command(flatten)]
        chrome: ChromeArgs,
    },
}

#[derive(Clone, Copy, ValueEnum, Default, Debug)]
pub enum OutputFormat {
    #[default]
    Json,
    Pretty,
}

fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got `{raw}`")),
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}
