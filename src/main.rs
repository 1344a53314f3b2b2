//! Binary entrypoint for the `dotlink` CLI.

use std::process::ExitCode;

use clap::Parser;
use dotlink::cli::Cli;
use dotlink::logging::init_logging;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match dotlink::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
