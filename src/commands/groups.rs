// `groups`, `groups show|create|join`.

use crate::cli::GroupsAction;
use crate::commands::{authorize, usage, Session};
use crate::error::Result;
use crate::flows;
use crate::output::{emit, CreatedGroup, GroupDetails, GroupTable, JoinedGroup, Render};

pub fn run(session: &mut Session, action: Option<GroupsAction>) -> Result<()> {
    match action {
        None => list(session),
        Some(GroupsAction::Show { group_id }) => show(session, group_id),
        Some(GroupsAction::Create { name }) => create(session, name),
        Some(GroupsAction::Join { code }) => join(session, code),
    }
}

/// List groups. On a terminal, pick one and show its details instead.
fn list(session: &mut Session) -> Result<()> {
    let can_prompt = session.can_prompt();
    let api = authorize(session.store, &mut *session.transport)?;
    let groups = api.groups()?;

    if can_prompt && !groups.data.is_empty() {
        if let Some(id) = flows::select_group(&api, &mut *session.console)? {
            let group = api.group(&id)?;
            GroupDetails(&group.data).human(&mut *session.out)?;
        }
        return Ok(());
    }

    emit(&mut *session.out, session.mode, &groups.raw, &GroupTable(&groups.data))?;
    Ok(())
}

fn show(session: &mut Session, group_id: Option<String>) -> Result<()> {
    let can_prompt = session.can_prompt();
    let api = authorize(session.store, &mut *session.transport)?;

    let id = match group_id {
        Some(id) => id,
        None if can_prompt => match flows::select_group(&api, &mut *session.console)? {
            Some(id) => id,
            None => return Ok(()),
        },
        None => return Err(usage("pikarama groups show <groupId>")),
    };

    let group = api.group(&id)?;
    emit(&mut *session.out, session.mode, &group.raw, &GroupDetails(&group.data))?;
    Ok(())
}

fn create(session: &mut Session, name: Option<String>) -> Result<()> {
    let can_prompt = session.can_prompt();
    let api = authorize(session.store, &mut *session.transport)?;

    let name = match name {
        Some(name) => name,
        None if can_prompt => session.console.text("Group name", "e.g., Friday Night Crew")?,
        None => String::new(),
    };
    if name.trim().is_empty() {
        return Err(usage("pikarama groups create <name>"));
    }

    let created = api.create_group(name.trim())?;
    emit(&mut *session.out, session.mode, &created.raw, &CreatedGroup(&created.data))?;
    Ok(())
}

fn join(session: &mut Session, code: Option<String>) -> Result<()> {
    let can_prompt = session.can_prompt();
    let api = authorize(session.store, &mut *session.transport)?;

    let code = match code {
        Some(code) => code,
        None if can_prompt => session.console.text("Invite code", "e.g., ABC123")?,
        None => String::new(),
    };
    if code.trim().is_empty() {
        return Err(usage("pikarama groups join <code>"));
    }

    let joined = api.join_group(code.trim())?;
    emit(&mut *session.out, session.mode, &joined.raw, &JoinedGroup(&joined.data))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Method;
    use crate::error::Error;
    use crate::output::OutputMode;
    use crate::testing::{Answer, FakeTransport, Rig, ScriptedConsole};
    use serde_json::json;

    #[test]
    fn listing_off_terminal_prints_table() {
        let transport = FakeTransport::new().on(
            Method::GET,
            "/groups",
            json!({ "groups": [{ "id": 7, "name": "Crew", "memberCount": 3 }] }),
        );
        let mut rig = Rig::new(transport, ScriptedConsole::headless());
        run(&mut rig.session(OutputMode::Human), None).unwrap();

        let text = rig.output();
        assert!(text.starts_with("ID  Name  Members"));
        assert!(text.contains("7   Crew  3"));
        assert_eq!(rig.transport.token(), Some("pk_test"));
    }

    #[test]
    fn listing_on_terminal_selects_and_shows() {
        let transport = FakeTransport::new()
            .on(Method::GET, "/groups", json!({ "groups": [{ "id": "g1", "name": "Crew" }] }))
            .on(Method::GET, "/groups/g1", json!({ "group": { "id": "g1", "name": "Crew", "invite_code": "XYZ" } }));
        let mut rig = Rig::new(transport, ScriptedConsole::new(vec![Answer::Choose("Crew")]));
        run(&mut rig.session(OutputMode::Human), None).unwrap();

        assert!(rig.output().contains("Invite: XYZ"));
    }

    #[test]
    fn json_listing_never_prompts() {
        let transport = FakeTransport::new()
            .on(Method::GET, "/groups", json!({ "data": [{ "id": "g1", "name": "Crew" }] }));
        let mut rig = Rig::new(transport, ScriptedConsole::new(vec![]));
        run(&mut rig.session(OutputMode::Json), None).unwrap();

        assert!(rig.console.menus.is_empty());
        let printed: serde_json::Value = serde_json::from_str(&rig.output()).unwrap();
        assert_eq!(printed, json!([{ "id": "g1", "name": "Crew" }]));
    }

    #[test]
    fn show_without_id_off_terminal_is_usage_error() {
        let mut rig = Rig::new(FakeTransport::new(), ScriptedConsole::new(vec![]));
        let err = run(&mut rig.session(OutputMode::Json), Some(GroupsAction::Show { group_id: None }))
            .unwrap_err();
        assert_eq!(err.to_string(), "Usage: pikarama groups show <groupId>");
        assert!(rig.transport.calls().is_empty());
    }

    #[test]
    fn create_prints_share_link() {
        let transport = FakeTransport::new().on(
            Method::POST,
            "/groups",
            json!({ "group": { "id": "g9", "name": "Crew", "invite_code": "AB12" } }),
        );
        let mut rig = Rig::new(transport, ScriptedConsole::headless());
        let action = GroupsAction::Create { name: Some("Crew".into()) };
        run(&mut rig.session(OutputMode::Human), Some(action)).unwrap();

        assert_eq!(rig.transport.calls()[0].body, Some(json!({ "name": "Crew" })));
        assert!(rig.output().contains("Share: https://www.pikarama.com/join/AB12"));
    }

    #[test]
    fn join_quiet_prints_id() {
        let transport = FakeTransport::new().on(
            Method::POST,
            "/groups/join",
            json!({ "group": { "id": "g3", "name": "Crew" } }),
        );
        let mut rig = Rig::new(transport, ScriptedConsole::headless());
        let action = GroupsAction::Join { code: Some("AB12".into()) };
        run(&mut rig.session(OutputMode::Quiet), Some(action)).unwrap();

        assert_eq!(rig.transport.calls()[0].body, Some(json!({ "code": "AB12" })));
        assert_eq!(rig.output(), "g3\n");
    }

    #[test]
    fn no_token_fails_first() {
        let mut rig = Rig::new(FakeTransport::new(), ScriptedConsole::headless()).logged_out();
        let err = run(&mut rig.session(OutputMode::Human), None).unwrap_err();
        assert!(matches!(err, Error::Cli(_)));
        assert!(rig.transport.calls().is_empty());
    }
}
