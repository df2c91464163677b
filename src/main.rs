mod cli;
mod commands;
mod formatting;
mod settings;

use std::process::ExitCode;

use cli::Commands;
use commands::{run_handle, run_print, run_serve};

#[tokio::main]
async fn main() -> ExitCode {
    run().await
}

async fn run() -> ExitCode {
    let args = cli::parse();

    match args.command {
        Commands::Print {
            url,
            options,
            chrome,
            format,
            output,
        } => {
            run_print(
                args.config,
                args.verbose,
                url,
                options,
                chrome,
                format,
                output,
            )
            .await
        }
        Commands::Handle {
            event,
            chrome,
            format,
            output,
        } => run_handle(args.config, args.verbose, event, chrome, format, output).await,
        Commands::Serve { listen, chrome } => {
            run_serve(args.config, args.verbose, listen, chrome).await
        }
    }
}
