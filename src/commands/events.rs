// `events` and its subcommands.

use serde_json::{json, Value};

use crate::cli::{EventsAction, EventsArgs};
use crate::commands::{authorize, usage, Session};
use crate::error::{Error, Result};
use crate::flows::{self, VoteOutcome, MIN_PICKS};
use crate::models::EventStatus;
use crate::output::{emit, CreatedEvent, Done, EventDetails, EventTable, OutputMode, Render};
use crate::ui::Level;

const OPEN_STATUSES: &str = "submitting,voting";

pub fn run(session: &mut Session, args: EventsArgs) -> Result<()> {
    match args.action {
        None => list(session, args.status.as_deref()),
        Some(EventsAction::Show { event_id }) => show(session, event_id),
        Some(EventsAction::Create { topic_id, name }) => create(session, topic_id, name),
        Some(EventsAction::Submit { event_id, picks }) => submit(session, event_id, picks),
        Some(EventsAction::Vote {
            event_id,
            submission_ids,
        }) => vote(session, event_id, submission_ids),
        Some(EventsAction::Advance { event_id }) => advance(session, event_id),
    }
}

/// List events. On a terminal, pick one, show it, and offer the action its
/// phase allows.
fn list(session: &mut Session, status: Option<&str>) -> Result<()> {
    let can_prompt = session.can_prompt();
    let api = authorize(session.store, &mut *session.transport)?;
    let events = api.events(status)?;

    if !can_prompt || events.data.is_empty() {
        emit(&mut *session.out, session.mode, &events.raw, &EventTable(&events.data))?;
        return Ok(());
    }

    let console = &mut *session.console;
    let Some(id) = flows::select_event(&api, console, status)? else {
        return Ok(());
    };
    let event = api.event(&id)?.data;
    EventDetails(&event).human(&mut *session.out)?;

    match event.status {
        EventStatus::Submitting if !event.is_poll => {
            if console.confirm("Submit a pick?")? {
                flows::submit_picks(&api, console, &event.id)?;
            }
        }
        EventStatus::Voting if !(event.submissions.is_empty() && event.poll_options.is_empty()) => {
            if console.confirm("Cast a vote?")? {
                flows::vote(&api, console, &event)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn show(session: &mut Session, event_id: Option<String>) -> Result<()> {
    let can_prompt = session.can_prompt();
    let api = authorize(session.store, &mut *session.transport)?;

    let id = match event_id {
        Some(id) => id,
        None if can_prompt => match flows::select_event(&api, &mut *session.console, None)? {
            Some(id) => id,
            None => return Ok(()),
        },
        None => return Err(usage("pikarama events show <eventId>")),
    };

    let event = api.event(&id)?;
    emit(&mut *session.out, session.mode, &event.raw, &EventDetails(&event.data))?;
    Ok(())
}

fn create(session: &mut Session, topic_id: Option<String>, name: Option<String>) -> Result<()> {
    let can_prompt = session.can_prompt();
    let api = authorize(session.store, &mut *session.transport)?;
    let console = &mut *session.console;

    let topic_id = match topic_id {
        Some(id) => id,
        None if can_prompt => {
            console.notify(Level::Info, "Create new event");
            match flows::select_topic(&api, console, None)? {
                Some(id) => id,
                None => return Ok(()),
            }
        }
        None => return Err(usage("pikarama events create <topicId> <name>")),
    };
    let name = match name {
        Some(name) => name,
        None if can_prompt => console.text("Event name", "e.g., Friday Movie Night")?,
        None => String::new(),
    };
    if name.trim().is_empty() {
        return Err(usage("pikarama events create <topicId> <name>"));
    }

    let created = api.create_event(&topic_id, name.trim())?;
    emit(&mut *session.out, session.mode, &created.raw, &CreatedEvent(&created.data))?;
    Ok(())
}

/// Submit every pick in order. All results are reported; any failure makes
/// the command fail afterwards.
fn submit(session: &mut Session, event_id: Option<String>, picks: Vec<String>) -> Result<()> {
    let can_prompt = session.can_prompt();
    let api = authorize(session.store, &mut *session.transport)?;
    let console = &mut *session.console;

    let id = match event_id {
        Some(id) => id,
        None if can_prompt => match flows::select_event(&api, console, Some("submitting"))? {
            Some(id) => id,
            None => return Ok(()),
        },
        None => return Err(usage("pikarama events submit <eventId> <pick>...")),
    };
    let mut picks: Vec<String> = picks
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    if picks.is_empty() && can_prompt {
        console.notify(Level::Info, "Enter your picks (leave empty when done):");
        picks = flows::collect_entries(console, "Pick", "e.g., The Matrix", MIN_PICKS)?;
    }
    if picks.is_empty() {
        return Err(usage("pikarama events submit <eventId> <pick>..."));
    }

    let ledger = flows::submit_all(&api, &id, &picks);
    let failed = match session.mode {
        OutputMode::Human => flows::report_picks(console, &ledger),
        mode => {
            let raw: Vec<Value> = ledger
                .iter()
                .map(|o| match &o.result {
                    Ok(response) => json!({ "title": o.title, "ok": true, "response": response }),
                    Err(e) => json!({ "title": o.title, "ok": false, "status": e.status(), "error": e.summary() }),
                })
                .collect();
            emit(&mut *session.out, mode, &Value::Array(raw), &Done(""))?;
            ledger.iter().filter(|o| o.result.is_err()).count()
        }
    };

    if failed > 0 {
        return Err(Error::cli(format!("{} of {} picks failed", failed, ledger.len())));
    }
    Ok(())
}

/// One id is a single vote, several are one batched vote. On a terminal
/// with no ids given, choose from the event's submissions.
fn vote(session: &mut Session, event_id: Option<String>, submission_ids: Vec<String>) -> Result<()> {
    let can_prompt = session.can_prompt();
    let api = authorize(session.store, &mut *session.transport)?;
    let console = &mut *session.console;

    let id = match event_id {
        Some(id) => id,
        None if can_prompt => match flows::select_event(&api, console, Some("voting"))? {
            Some(id) => id,
            None => return Ok(()),
        },
        None => return Err(usage("pikarama events vote <eventId> <submissionId>...")),
    };
    if submission_ids.is_empty() {
        if !can_prompt {
            return Err(usage("pikarama events vote <eventId> <submissionId>..."));
        }
        let event = api.event(&id)?.data;
        return flows::vote(&api, console, &event);
    }

    let raw = match flows::cast_votes(&api, &id, &submission_ids) {
        VoteOutcome::Failed(e) => return Err(e),
        outcome if session.mode == OutputMode::Human => {
            flows::report_vote(console, &outcome);
            return Ok(());
        }
        VoteOutcome::Cast(n) => {
            json!({ "eventId": id, "submissionIds": submission_ids, "votes": n })
        }
        outcome @ VoteOutcome::AlreadyVoted(_) => {
            flows::report_vote(console, &outcome);
            json!({ "eventId": id, "submissionIds": submission_ids, "alreadyVoted": true })
        }
    };
    emit(&mut *session.out, session.mode, &raw, &Done("Vote cast!"))?;
    Ok(())
}

fn advance(session: &mut Session, event_id: Option<String>) -> Result<()> {
    let can_prompt = session.can_prompt();
    let api = authorize(session.store, &mut *session.transport)?;

    let id = match event_id {
        Some(id) => id,
        None if can_prompt => {
            match flows::select_event(&api, &mut *session.console, Some(OPEN_STATUSES))? {
                Some(id) => id,
                None => return Ok(()),
            }
        }
        None => return Err(usage("pikarama events advance <eventId>")),
    };

    let response = api.advance(&id)?;
    emit(&mut *session.out, session.mode, &response, &Done("Event advanced!"))?;
    Ok(())
}
