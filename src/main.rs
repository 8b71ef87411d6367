//! Entry point for the dupman CLI.

use clap::Parser;
use dupman::{cli::Cli, error::ExitCode, logging};

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet);

    match dupman::run(cli) {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            eprintln!("[{}] Error: {:#}", ExitCode::GeneralError.code_prefix(), err);
            std::process::exit(ExitCode::GeneralError.as_i32());
        }
    }
}
