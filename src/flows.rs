//! Action flows: short, bounded prompt sequences that end in one or more
//! API calls.
//!
//! API failures are reported on the console and swallowed so the menu the
//! flow was started from keeps running. Cancellation is never swallowed.

use serde_json::Value;

use crate::endpoints::Pikarama;
use crate::error::{Error, Result};
use crate::models::{Event, Group, Submission};
use crate::output::{event_lines, group_lines, karma_line, share_link};
use crate::ui::{Console, Level};

/// A poll needs at least this many options.
pub const MIN_POLL_OPTIONS: usize = 2;
/// A submission round needs at least one pick.
pub const MIN_PICKS: usize = 1;

/// Report a failed call. Cancellation passes through untouched.
fn attempt<T>(console: &mut dyn Console, result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(Error::Cancelled) => Err(Error::Cancelled),
        Err(e) => {
            console.notify(Level::Error, &format!("Failed: {}", e.summary()));
            Ok(None)
        }
    }
}

/// Prompt for entries one at a time until an empty answer arrives after at
/// least `min` entries.
pub fn collect_entries(
    console: &mut dyn Console,
    noun: &str,
    example: &str,
    min: usize,
) -> Result<Vec<String>> {
    let mut entries: Vec<String> = Vec::new();
    loop {
        let hint = if entries.len() >= min {
            "leave empty to finish"
        } else {
            example
        };
        let entry = console.text(&format!("{} {}", noun, entries.len() + 1), hint)?;
        let entry = entry.trim();

        if !entry.is_empty() {
            entries.push(entry.to_string());
        } else if entries.len() >= min {
            return Ok(entries);
        } else if min == 1 {
            console.notify(Level::Warn, &format!("Enter at least one {}", noun.to_lowercase()));
        } else {
            console.notify(
                Level::Warn,
                &format!("Need at least {} {}s", min, noun.to_lowercase()),
            );
        }
    }
}

/// Ask for a required line of text; an empty answer abandons the flow.
fn required_text(console: &mut dyn Console, prompt: &str, hint: &str) -> Result<Option<String>> {
    let value = console.text(prompt, hint)?;
    Ok(Some(value).filter(|v| !v.is_empty()))
}

pub fn create_group(api: &Pikarama, console: &mut dyn Console) -> Result<()> {
    let Some(name) = required_text(console, "Group name", "e.g., Friday Night Crew")? else {
        return Ok(());
    };
    if let Some(created) = attempt(console, api.create_group(&name))? {
        let group = created.data;
        console.notify(
            Level::Success,
            &format!("Created group \"{}\" ({})", group.name.as_deref().unwrap_or(&name), group.id),
        );
        if let Some(code) = &group.invite_code {
            console.notify(Level::Info, &format!("📨 Invite code: {code}"));
            console.notify(Level::Info, &format!("   Share: {}", share_link(code)));
        }
    }
    Ok(())
}

pub fn join_group(api: &Pikarama, console: &mut dyn Console) -> Result<()> {
    let Some(code) = required_text(console, "Invite code", "e.g., ABC123")? else {
        return Ok(());
    };
    if let Some(joined) = attempt(console, api.join_group(&code))? {
        console.notify(
            Level::Success,
            &format!("Joined \"{}\"!", joined.data.display_name()),
        );
    }
    Ok(())
}

pub fn create_event(api: &Pikarama, console: &mut dyn Console, topic_id: Option<&str>) -> Result<()> {
    let topic_id = match topic_id {
        Some(id) => id.to_string(),
        None => match select_topic(api, console, None)? {
            Some(id) => id,
            None => return Ok(()),
        },
    };
    let Some(name) = required_text(console, "Event name", "e.g., Movie Night")? else {
        return Ok(());
    };
    if let Some(created) = attempt(console, api.create_event(&topic_id, &name))? {
        let event = created.data;
        console.notify(
            Level::Success,
            &format!("Event created! \"{}\" ({})", event.name.as_deref().unwrap_or(&name), event.id),
        );
    }
    Ok(())
}

pub fn create_poll(api: &Pikarama, console: &mut dyn Console, topic_id: Option<&str>) -> Result<()> {
    let topic_id = match topic_id {
        Some(id) => id.to_string(),
        None => match select_topic(api, console, None)? {
            Some(id) => id,
            None => return Ok(()),
        },
    };
    let Some(question) = required_text(console, "Poll question", "e.g., Where should we eat?")? else {
        return Ok(());
    };
    console.notify(
        Level::Info,
        "Enter poll options (minimum 2, leave empty when done):",
    );
    let options = collect_entries(console, "Option", "enter option", MIN_POLL_OPTIONS)?;

    if let Some(created) = attempt(console, api.create_poll(&topic_id, &question, &options))? {
        let id = created.data.id.unwrap_or_else(|| "unknown id".to_string());
        console.notify(Level::Success, &format!("Poll created! ({id})"));
    }
    Ok(())
}

/// Result of submitting one pick.
#[derive(Debug)]
pub struct PickOutcome {
    pub title: String,
    pub result: Result<Value>,
}

/// Submit picks in entry order, one call each, collecting every result.
/// A failure does not stop later picks and nothing is rolled back.
pub fn submit_all(api: &Pikarama, event_id: &str, picks: &[String]) -> Vec<PickOutcome> {
    picks.iter().fold(Vec::with_capacity(picks.len()), |mut ledger, title| {
        ledger.push(PickOutcome {
            title: title.clone(),
            result: api.submit_pick(event_id, title),
        });
        ledger
    })
}

/// Summarise a pick ledger. Returns how many picks failed.
pub fn report_picks(console: &mut dyn Console, ledger: &[PickOutcome]) -> usize {
    let failed: Vec<&PickOutcome> = ledger.iter().filter(|o| o.result.is_err()).collect();
    let submitted = ledger.len() - failed.len();

    if failed.is_empty() {
        console.notify(Level::Success, &format!("Submitted {submitted} pick(s)!"));
    } else if submitted > 0 {
        console.notify(
            Level::Warn,
            &format!("Submitted {} of {} picks.", submitted, ledger.len()),
        );
    } else {
        console.notify(Level::Error, "No picks were submitted.");
    }
    for outcome in failed {
        if let Err(e) = &outcome.result {
            console.notify(Level::Error, &format!("  \"{}\": {}", outcome.title, e.summary()));
        }
    }
    ledger.len() - submitted
}

pub fn submit_picks(api: &Pikarama, console: &mut dyn Console, event_id: &str) -> Result<()> {
    console.notify(Level::Info, "Enter your picks (leave empty when done):");
    let picks = collect_entries(console, "Pick", "e.g., The Matrix", MIN_PICKS)?;

    console.start_progress("Submitting picks...");
    let ledger = submit_all(api, event_id, &picks);
    console.finish_progress("");
    report_picks(console, &ledger);
    Ok(())
}

#[derive(Debug)]
pub enum VoteOutcome {
    Cast(usize),
    AlreadyVoted(usize),
    Failed(Error),
}

/// One id → single vote call; several → one batched call. A conflict
/// means the vote was already recorded.
pub fn cast_votes(api: &Pikarama, event_id: &str, ids: &[String]) -> VoteOutcome {
    let result = match ids {
        [single] => api.vote(event_id, single),
        many => api.vote_many(event_id, many),
    };
    match result {
        Ok(_) => VoteOutcome::Cast(ids.len()),
        Err(e) if e.is_conflict() => VoteOutcome::AlreadyVoted(ids.len()),
        Err(e) => VoteOutcome::Failed(e),
    }
}

pub fn report_vote(console: &mut dyn Console, outcome: &VoteOutcome) {
    match outcome {
        VoteOutcome::Cast(n) => console.notify(Level::Success, &format!("Cast {n} vote(s)!")),
        VoteOutcome::AlreadyVoted(1) => {
            console.notify(Level::Warn, "You already voted for this option.")
        }
        VoteOutcome::AlreadyVoted(_) => {
            console.notify(Level::Warn, "Already voted for all selected options.")
        }
        VoteOutcome::Failed(e) => console.notify(Level::Error, &format!("Failed: {}", e.summary())),
    }
}

/// Vote on an event's submissions, or its poll options when it has none.
pub fn vote(api: &Pikarama, console: &mut dyn Console, event: &Event) -> Result<()> {
    let candidates: Vec<(String, String)> = if !event.submissions.is_empty() {
        event
            .submissions
            .iter()
            .map(|s| (s.id.clone(), submission_label(s)))
            .collect()
    } else {
        event
            .poll_options
            .iter()
            .map(|o| (o.id.clone(), o.display_label().to_string()))
            .collect()
    };

    if candidates.is_empty() {
        console.notify(Level::Warn, "Nothing to vote on yet.");
        return Ok(());
    }

    let labels: Vec<String> = candidates.iter().map(|(_, label)| label.clone()).collect();
    let picked = console.multi_select("Select your vote(s)", &labels)?;
    if picked.is_empty() {
        console.notify(Level::Warn, "Select at least one option to vote.");
        return Ok(());
    }
    let ids: Vec<String> = picked.iter().map(|&i| candidates[i].0.clone()).collect();

    console.start_progress("Casting votes...");
    let outcome = cast_votes(api, &event.id, &ids);
    console.finish_progress("");
    report_vote(console, &outcome);
    Ok(())
}

pub fn advance(api: &Pikarama, console: &mut dyn Console, event_id: &str) -> Result<()> {
    if !console.confirm("Advance to next phase?")? {
        return Ok(());
    }
    if attempt(console, api.advance(event_id))?.is_some() {
        console.notify(Level::Success, "Event advanced!");
    }
    Ok(())
}

pub fn show_event(console: &mut dyn Console, event: &Event) {
    for line in event_lines(event) {
        console.notify(Level::Info, &line);
    }
}

pub fn show_group(console: &mut dyn Console, group: &Group) {
    for line in group_lines(group) {
        console.notify(Level::Info, &line);
    }
}

pub fn show_karma(api: &Pikarama, console: &mut dyn Console, group_id: Option<&str>) -> Result<()> {
    let Some(karma) = attempt(console, api.karma(group_id))? else {
        return Ok(());
    };
    if karma.data.is_empty() {
        console.notify(Level::Info, "No karma data yet. Win some decisions to earn karma!");
        return Ok(());
    }
    console.notify(Level::Info, "⭐ Your Karma:");
    for entry in &karma.data {
        console.notify(Level::Info, &format!("  {}", karma_line(entry)));
    }
    Ok(())
}

fn submission_label(s: &Submission) -> String {
    match &s.submitter {
        Some(by) => format!("{} (by {})", s.display_title(), by),
        None => s.display_title().to_string(),
    }
}

fn member_hint(group: &Group) -> String {
    match group.members {
        Some(n) if n > 0 => format!("{} · {} members", group.display_name(), n),
        _ => group.display_name().to_string(),
    }
}

pub fn event_label(event: &Event) -> String {
    let icon = event.topic.as_ref().and_then(|t| t.icon.as_deref()).unwrap_or("");
    let topic = event.topic.as_ref().and_then(|t| t.name.as_deref()).unwrap_or("");
    let context = format!("{icon} {topic}");
    let context = context.trim();
    if context.is_empty() {
        format!("{} · {}", event.display_name(), event.status)
    } else {
        format!("{} · {} • {}", event.display_name(), context, event.status)
    }
}

// Selectors used by the command-line surface when an argument is missing.
// They return `None` (after a warning) when there is nothing to choose.

pub fn select_group(api: &Pikarama, console: &mut dyn Console) -> Result<Option<String>> {
    let groups = api.groups()?.data;
    if groups.is_empty() {
        console.notify(Level::Warn, "No groups found. Create one at pikarama.com");
        return Ok(None);
    }
    let labels: Vec<String> = groups.iter().map(member_hint).collect();
    let i = console.select("Select a group", &labels)?;
    Ok(Some(groups[i].id.clone()))
}

pub fn select_topic(
    api: &Pikarama,
    console: &mut dyn Console,
    group_id: Option<&str>,
) -> Result<Option<String>> {
    let group_id = match group_id {
        Some(id) => id.to_string(),
        None => match select_group(api, console)? {
            Some(id) => id,
            None => return Ok(None),
        },
    };
    let group = api.group(&group_id)?.data;
    let topics = api.topics_of(&group)?;
    if topics.is_empty() {
        console.notify(Level::Warn, "No topics in this group. Create one at pikarama.com");
        return Ok(None);
    }
    let labels: Vec<String> = topics.iter().map(|t| t.label()).collect();
    let i = console.select("Select a topic", &labels)?;
    Ok(Some(topics[i].id.clone()))
}

pub fn select_event(
    api: &Pikarama,
    console: &mut dyn Console,
    status: Option<&str>,
) -> Result<Option<String>> {
    let events = api.events(status)?.data;
    if events.is_empty() {
        console.notify(Level::Warn, "No active events found.");
        return Ok(None);
    }
    let labels: Vec<String> = events.iter().map(event_label).collect();
    let i = console.select("Select an event", &labels)?;
    Ok(Some(events[i].id.clone()))
}
