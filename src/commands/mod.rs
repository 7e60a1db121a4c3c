//! Command implementations for the CLI.
//!
//! Each handler takes a [`Session`]: the token store, the transport, the
//! console for prompts and notices, and the writer that `--json`/`--quiet`/
//! human output goes to. The binary wires real implementations in; tests
//! use in-memory ones.

use std::io::Write;

use crate::api::Transport;
use crate::cli::Commands;
use crate::config::{require_token, TokenStore};
use crate::endpoints::Pikarama;
use crate::error::{Error, Result};
use crate::nav::{Exit, Navigator};
use crate::output::OutputMode;
use crate::ui::{Console, Level};

pub mod auth;
pub mod events;
pub mod groups;
pub mod karma;
pub mod me;
pub mod poll;

pub struct Session<'a> {
    pub store: &'a dyn TokenStore,
    pub transport: &'a mut dyn Transport,
    pub console: &'a mut dyn Console,
    pub out: &'a mut dyn Write,
    pub mode: OutputMode,
}

impl Session<'_> {
    /// Missing arguments may be asked for only in human mode on a terminal.
    pub fn can_prompt(&self) -> bool {
        self.mode == OutputMode::Human && self.console.is_interactive()
    }
}

/// Load the stored token into the transport, failing before any request
/// when there is none.
pub fn authorize<'t>(store: &dyn TokenStore, transport: &'t mut dyn Transport) -> Result<Pikarama<'t>> {
    let token = require_token(store)?;
    transport.set_token(&token);
    let transport: &'t dyn Transport = transport;
    Ok(Pikarama::new(transport))
}

/// Error for a missing argument that could not be prompted for.
pub(crate) fn usage(line: &str) -> Error {
    Error::cli(format!("Usage: {line}"))
}

pub fn dispatch(session: &mut Session, command: Commands) -> Result<()> {
    match command {
        Commands::Login { token } => auth::login(session, token),
        Commands::Logout => auth::logout(session),
        Commands::Groups { action } => groups::run(session, action),
        Commands::Events(args) => events::run(session, args),
        Commands::Poll(args) => poll::run(session, args),
        Commands::Karma { group_id } => karma::run(session, group_id.as_deref()),
        Commands::Me => me::run(session),
    }
}

/// The menu entered when no subcommand is given. Offers to log in first
/// when no token is stored.
pub fn interactive(session: &mut Session) -> Result<()> {
    if !session.console.is_interactive() {
        return Err(Error::cli(
            "The interactive menu needs a terminal. Run `pikarama --help` for commands.",
        ));
    }

    if session.store.token()?.is_none() {
        session
            .console
            .notify(Level::Warn, "Not logged in. Please run: pikarama login");
        if !session.console.confirm("Login now?")? {
            return Ok(());
        }
        auth::login(session, None)?;
    }

    let api = authorize(session.store, &mut *session.transport)?;
    let exit = Navigator::new(api, &mut *session.console, session.store).run()?;
    if exit == Exit::Finished {
        session.console.notify(Level::Info, "Goodbye! 👋");
    }
    Ok(())
}
