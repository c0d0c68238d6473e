use clap::error::ErrorKind;
use clap::Parser;
use procfind::{lookup, ProcfsSource};
use std::io;
use std::process::ExitCode;
use tracing::debug;

mod cli;
mod logging;

use cli::Cli;

fn main() -> ExitCode {
    logging::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            // Help and version go to stdout
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            debug!(error = %e, "argument parsing failed");
            eprintln!("Invalid usage, try --help");
            return ExitCode::from(1);
        }
    };

    let options = cli.options();
    debug!(?options, tokens = cli.targets.len(), "starting lookup");

    let result = {
        let mut out = io::stdout().lock();
        let mut err = io::stderr().lock();
        lookup(&ProcfsSource, &options, &cli.targets, &mut out, &mut err)
    };

    match result {
        Ok(outcome) => {
            debug!(matched = outcome.matched, failed = outcome.failed, "lookup finished");
            if outcome.success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            eprintln!("procfind: {}", e);
            ExitCode::from(1)
        }
    }
}
