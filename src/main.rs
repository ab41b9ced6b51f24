//! Entry point of the `linguist-qm` command.

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use linguist_qm::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Parses the command line and runs it.
fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let mut stdout = std::io::stdout().lock();
    let mut stderr = std::io::stderr().lock();

    match cli.execute(&mut stdout, &mut stderr) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::debug!(?error, "Command failed");
            let _ = writeln!(stderr, "linguist-qm: {error}");
            ExitCode::FAILURE
        }
    }
}
