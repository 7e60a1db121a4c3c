// Entrypoint for the `pikarama` binary.
// - Parses arguments, sets up logging and wires the real HTTP client, token
//   file and terminal into a `Session`.
// - Every failure lands in `main`: it is printed once and the process exits
//   with status 1. Backing out of a prompt exits with status 0.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use crossterm::style::Stylize;
use tracing_subscriber::EnvFilter;

use pikarama_cli::api::ApiClient;
use pikarama_cli::cli::Cli;
use pikarama_cli::commands::{self, Session};
use pikarama_cli::config::{default_config_dir, FileTokenStore};
use pikarama_cli::error::report;
use pikarama_cli::ui::TerminalConsole;
use pikarama_cli::Error;

const LOG_ENV: &str = "PIKARAMA_LOG";

/// Logs go to stderr; stdout is reserved for command output.
fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut transport = ApiClient::new(&cli.api_url)?;
    let store = FileTokenStore::new(cli.config_dir.clone().unwrap_or_else(default_config_dir));
    let mut console = TerminalConsole::new();
    let mut out = io::stdout();

    let mut session = Session {
        store: &store,
        transport: &mut transport,
        console: &mut console,
        out: &mut out,
        mode: cli.output.mode(),
    };

    match cli.command {
        Some(command) => commands::dispatch(&mut session, command)?,
        None => commands::interactive(&mut session)?,
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<Error>() {
            Some(Error::Cancelled) => {
                eprintln!("{}", "Cancelled".dark_grey());
                ExitCode::SUCCESS
            }
            Some(err) => {
                eprintln!("{}", report(err));
                ExitCode::FAILURE
            }
            None => {
                eprintln!("Error: {e:#}");
                ExitCode::FAILURE
            }
        },
    }
}
