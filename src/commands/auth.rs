// `login` and `logout`.
//
// A token is only stored after the API accepted it for a group listing.

use tracing::info;

use crate::commands::{usage, Session};
use crate::config::TOKEN_URL;
use crate::endpoints::Pikarama;
use crate::error::{Error, Result};
use crate::ui::Level;

const TOKEN_PREFIX: &str = "pk_";

/// Local shape check, before anything is sent.
pub fn check_token(token: &str) -> Result<()> {
    if token.is_empty() {
        return Err(Error::cli("API token cannot be empty"));
    }
    if !token.starts_with(TOKEN_PREFIX) {
        return Err(Error::cli(format!("Token should start with {TOKEN_PREFIX}")));
    }
    Ok(())
}

/// Prompt until the token at least looks right.
fn prompt_token(session: &mut Session) -> Result<String> {
    session
        .console
        .notify(Level::Info, &format!("Get your API token at {TOKEN_URL}"));
    loop {
        let token = session.console.secret("API token")?;
        match check_token(&token) {
            Ok(()) => return Ok(token),
            Err(e) => session.console.notify(Level::Warn, &e.to_string()),
        }
    }
}

pub fn login(session: &mut Session, token: Option<String>) -> Result<()> {
    let token = match token.map(|t| t.trim().to_string()) {
        Some(token) => {
            check_token(&token)?;
            token
        }
        None if session.console.is_interactive() => prompt_token(session)?,
        None => return Err(usage("pikarama login <token>")),
    };

    session.transport.set_token(&token);
    session.console.start_progress("Validating token...");
    let verified = Pikarama::new(&*session.transport).groups();
    if let Err(e) = verified {
        session.console.finish_progress("Failed");
        return Err(e);
    }

    session.store.set_token(&token)?;
    info!("stored API token");
    session
        .console
        .finish_progress("✅ Token saved! You are now logged in.");
    Ok(())
}

pub fn logout(session: &mut Session) -> Result<()> {
    session.store.clear()?;
    session
        .console
        .notify(Level::Success, "Logged out. Stored token removed.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Method;
    use crate::config::TokenStore;
    use crate::output::OutputMode;
    use crate::testing::{Answer, FakeTransport, Rig, ScriptedConsole};
    use serde_json::json;

    #[test]
    fn token_shape() {
        assert!(check_token("pk_abc").is_ok());
        assert_eq!(check_token("").unwrap_err().to_string(), "API token cannot be empty");
        assert_eq!(check_token("sk_abc").unwrap_err().to_string(), "Token should start with pk_");
    }

    #[test]
    fn login_verifies_before_saving() {
        let transport = FakeTransport::new().on(Method::GET, "/groups", json!([]));
        let mut rig = Rig::new(transport, ScriptedConsole::headless()).logged_out();

        login(&mut rig.session(OutputMode::Human), Some("pk_ok".into())).unwrap();

        assert_eq!(rig.transport.token(), Some("pk_ok"));
        assert_eq!(rig.transport.calls().len(), 1);
        assert_eq!(rig.store.token().unwrap().as_deref(), Some("pk_ok"));
        assert_eq!(
            rig.console.progress,
            vec!["Validating token...", "✅ Token saved! You are now logged in."]
        );
    }

    #[test]
    fn rejected_token_is_not_saved() {
        let transport =
            FakeTransport::new().fail(Method::GET, "/groups", 401, json!({ "error": "invalid token" }));
        let mut rig = Rig::new(transport, ScriptedConsole::headless()).logged_out();

        let err = login(&mut rig.session(OutputMode::Human), Some("pk_bad".into())).unwrap_err();

        assert_eq!(err.status(), Some(401));
        assert_eq!(rig.store.token().unwrap(), None);
        assert_eq!(rig.console.progress.last().map(String::as_str), Some("Failed"));
    }

    #[test]
    fn malformed_token_never_reaches_the_api() {
        let mut rig = Rig::new(FakeTransport::new(), ScriptedConsole::headless()).logged_out();

        let err = login(&mut rig.session(OutputMode::Human), Some("abc".into())).unwrap_err();
        assert!(matches!(err, Error::Cli(_)));
        assert!(rig.transport.calls().is_empty());
    }

    #[test]
    fn prompt_repeats_until_token_looks_valid() {
        let transport = FakeTransport::new().on(Method::GET, "/groups", json!([]));
        let console = ScriptedConsole::new(vec![Answer::Text("nope"), Answer::Text("pk_yes")]);
        let mut rig = Rig::new(transport, console).logged_out();

        login(&mut rig.session(OutputMode::Human), None).unwrap();

        assert!(rig.console.has_notice(Level::Warn, "Token should start with pk_"));
        assert_eq!(rig.store.token().unwrap().as_deref(), Some("pk_yes"));
    }

    #[test]
    fn missing_token_without_terminal_is_a_usage_error() {
        let mut rig = Rig::new(FakeTransport::new(), ScriptedConsole::headless()).logged_out();
        let err = login(&mut rig.session(OutputMode::Human), None).unwrap_err();
        assert_eq!(err.to_string(), "Usage: pikarama login <token>");
    }

    #[test]
    fn logout_clears_even_when_empty() {
        let mut rig = Rig::new(FakeTransport::new(), ScriptedConsole::headless());

        logout(&mut rig.session(OutputMode::Human)).unwrap();
        logout(&mut rig.session(OutputMode::Human)).unwrap();
        assert_eq!(rig.store.token().unwrap(), None);
        assert!(rig.console.has_notice(Level::Success, "Logged out. Stored token removed."));
    }
}
