// `poll [topicId] [question] -o A -o B ...`

use crate::cli::PollArgs;
use crate::commands::{authorize, usage, Session};
use crate::error::{Error, Result};
use crate::flows::{self, MIN_POLL_OPTIONS};
use crate::output::{emit, CreatedPoll};
use crate::ui::Level;

const USAGE: &str = "pikarama poll <topicId> <question> --option \"A\" --option \"B\"";

pub fn run(session: &mut Session, args: PollArgs) -> Result<()> {
    let can_prompt = session.can_prompt();
    let api = authorize(session.store, &mut *session.transport)?;
    let console = &mut *session.console;

    let PollArgs {
        topic_id,
        question,
        options,
    } = args;
    let mut options: Vec<String> = options
        .into_iter()
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect();

    let topic_id = match topic_id {
        Some(id) => id,
        None if can_prompt => {
            console.notify(Level::Info, "📊 Create a poll");
            match flows::select_topic(&api, console, None)? {
                Some(id) => id,
                None => return Ok(()),
            }
        }
        None => return Err(usage(USAGE)),
    };
    let question = match question {
        Some(q) => q,
        None if can_prompt => console.text("Poll question", "e.g., Where should we eat?")?,
        None => String::new(),
    };
    if question.trim().is_empty() {
        return Err(usage(USAGE));
    }
    if options.len() < MIN_POLL_OPTIONS && can_prompt {
        console.notify(Level::Info, "Add poll options (minimum 2, leave empty when done):");
        options = flows::collect_entries(console, "Option", "enter option", MIN_POLL_OPTIONS)?;
    }
    if options.len() < MIN_POLL_OPTIONS {
        return Err(Error::cli("Please provide at least two poll options."));
    }

    let question = question.trim();
    let created = api.create_poll(&topic_id, question, &options)?;
    let view = CreatedPoll {
        poll: &created.data,
        question,
        requested: &options,
    };
    emit(&mut *session.out, session.mode, &created.raw, &view)?;
    Ok(())
}
