use std::process::ExitCode;

use clap::Parser;
use gymtree::{config, shell::Shell};

fn main() -> ExitCode {
    let config = config::Config::parse();
    if let Err(err) = config::init_logging(&config) {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut shell = Shell::open(&config.data, stdin.lock(), stdout.lock());
    match shell.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "membership shell stopped");
            ExitCode::FAILURE
        }
    }
}
