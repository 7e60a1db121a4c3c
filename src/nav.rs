//! Interactive navigation.
//!
//! The menu is an explicit stack of typed frames: main → groups → group →
//! topics → topic, and main/group → events → event. Each turn renders the
//! top frame (fetching whatever it shows, fresh every time), then the
//! driver applies the resulting step: stay, push a child, pop, or exit.
//!
//! Cancelling a frame's own menu pops that frame; popping the main frame
//! ends the session. Cancelling inside an action flow only abandons the
//! flow and re-renders the frame it was started from.

use tracing::debug;

use crate::config::TokenStore;
use crate::endpoints::Pikarama;
use crate::error::{Error, Result};
use crate::flows;
use crate::models::EventStatus;
use crate::ui::{Console, Level};

const BACK: &str = "← Back";

#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Main,
    Groups,
    Group { id: String },
    Topics { group_id: String },
    Topic { id: String, name: String },
    Events { group_id: Option<String> },
    Event { id: String },
}

#[derive(Debug, PartialEq)]
enum Step {
    Stay,
    Push(Frame),
    Pop,
    Exit(Exit),
}

/// Why the navigator stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Finished,
    LoggedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventAction {
    Submit,
    Vote,
    Advance,
    View,
}

impl EventAction {
    fn label(self) -> &'static str {
        match self {
            EventAction::Submit => "📝 Submit Pick(s) · Add your suggestions",
            EventAction::Vote => "🗳️ Vote · Cast your vote(s)",
            EventAction::Advance => "⏭️ Advance Phase · Move to next phase",
            EventAction::View => "👁️ View Details · See submissions and votes",
        }
    }
}

/// Actions offered for an event. Submitting (non-poll) allows picks,
/// voting allows votes, both allow advancing; details are always there.
pub fn event_actions(status: &EventStatus, is_poll: bool) -> Vec<EventAction> {
    let mut actions = Vec::new();
    if *status == EventStatus::Submitting && !is_poll {
        actions.push(EventAction::Submit);
    }
    if *status == EventStatus::Voting {
        actions.push(EventAction::Vote);
    }
    if matches!(status, EventStatus::Submitting | EventStatus::Voting) {
        actions.push(EventAction::Advance);
    }
    actions.push(EventAction::View);
    actions
}

#[derive(Debug, Clone, Copy)]
enum MainChoice {
    Groups,
    Events,
    Poll,
    Karma,
    Logout,
    Exit,
}

#[derive(Debug, Clone, Copy)]
enum GroupsChoice {
    Back,
    Create,
    Join,
    Open(usize),
}

#[derive(Debug, Clone, Copy)]
enum GroupChoice {
    Back,
    Topics,
    Events,
    Karma,
    Details,
}

#[derive(Debug, Clone, Copy)]
enum TopicChoice {
    Back,
    CreateEvent,
    CreatePoll,
}

#[derive(Debug, Clone, Copy)]
enum ListChoice {
    Back,
    Open(usize),
}

#[derive(Debug, Clone, Copy)]
enum EventChoice {
    Back,
    Action(EventAction),
}

pub struct Navigator<'a> {
    api: Pikarama<'a>,
    console: &'a mut dyn Console,
    store: &'a dyn TokenStore,
    stack: Vec<Frame>,
}

impl<'a> Navigator<'a> {
    pub fn new(api: Pikarama<'a>, console: &'a mut dyn Console, store: &'a dyn TokenStore) -> Self {
        Navigator {
            api,
            console,
            store,
            stack: vec![Frame::Main],
        }
    }

    /// Drive the menus until the stack empties or a frame asks to exit.
    pub fn run(&mut self) -> Result<Exit> {
        while let Some(frame) = self.stack.last().cloned() {
            let step = match self.render(&frame) {
                Ok(step) => step,
                Err(Error::Cancelled) => Step::Pop,
                Err(e) if self.stack.len() > 1 => {
                    self.console
                        .notify(Level::Error, &format!("Failed: {}", e.summary()));
                    Step::Pop
                }
                Err(e) => return Err(e),
            };

            match step {
                Step::Stay => {}
                Step::Push(child) => {
                    debug!(frame = ?child, depth = self.stack.len() + 1, "entering menu");
                    self.stack.push(child);
                }
                Step::Pop => {
                    self.stack.pop();
                }
                Step::Exit(reason) => {
                    self.stack.clear();
                    return Ok(reason);
                }
            }
        }
        Ok(Exit::Finished)
    }

    fn choose<T: Copy>(&mut self, prompt: &str, options: &[(T, String)]) -> Result<T> {
        let labels: Vec<String> = options.iter().map(|(_, label)| label.clone()).collect();
        let index = self.console.select(prompt, &labels)?;
        Ok(options[index].0)
    }

    /// Outcome of an action flow: the frame stays either way.
    fn after_flow(&mut self, result: Result<()>) -> Result<Step> {
        match result {
            Ok(()) | Err(Error::Cancelled) => Ok(Step::Stay),
            Err(e) => {
                self.console
                    .notify(Level::Error, &format!("Failed: {}", e.summary()));
                Ok(Step::Stay)
            }
        }
    }

    fn render(&mut self, frame: &Frame) -> Result<Step> {
        match frame {
            Frame::Main => self.main_menu(),
            Frame::Groups => self.groups_menu(),
            Frame::Group { id } => self.group_menu(id),
            Frame::Topics { group_id } => self.topics_menu(group_id),
            Frame::Topic { id, name } => self.topic_menu(id, name),
            Frame::Events { group_id } => self.events_menu(group_id.as_deref()),
            Frame::Event { id } => self.event_menu(id),
        }
    }

    fn main_menu(&mut self) -> Result<Step> {
        let options = [
            (MainChoice::Groups, "👥 Browse Groups · View groups, topics, and members".to_string()),
            (MainChoice::Events, "📋 Browse Events · View and manage events".to_string()),
            (MainChoice::Poll, "📊 Create Poll · Quick poll creation".to_string()),
            (MainChoice::Karma, "⭐ View Karma · Check karma standings".to_string()),
            (MainChoice::Logout, "🚪 Logout · Clear saved credentials".to_string()),
            (MainChoice::Exit, "← Exit".to_string()),
        ];
        match self.choose("🎯 Pikarama — What would you like to do?", &options)? {
            MainChoice::Groups => Ok(Step::Push(Frame::Groups)),
            MainChoice::Events => Ok(Step::Push(Frame::Events { group_id: None })),
            MainChoice::Poll => {
                let result = flows::create_poll(&self.api, self.console, None);
                self.after_flow(result)
            }
            MainChoice::Karma => {
                let result = flows::show_karma(&self.api, self.console, None);
                self.after_flow(result)
            }
            MainChoice::Logout => {
                self.store.clear()?;
                self.console
                    .notify(Level::Success, "Logged out. Stored token removed.");
                Ok(Step::Exit(Exit::LoggedOut))
            }
            MainChoice::Exit => Ok(Step::Exit(Exit::Finished)),
        }
    }

    fn groups_menu(&mut self) -> Result<Step> {
        let groups = self.api.groups()?.data;
        if groups.is_empty() {
            self.console
                .notify(Level::Warn, "No groups found. Create or join one below.");
        }

        let mut options = vec![
            (GroupsChoice::Back, "← Back to main menu".to_string()),
            (GroupsChoice::Create, "➕ Create Group".to_string()),
            (GroupsChoice::Join, "🔑 Join Group · Use an invite code".to_string()),
        ];
        options.extend(groups.iter().enumerate().map(|(i, g)| {
            let label = match g.members {
                Some(n) if n > 0 => format!("{} · {} members", g.display_name(), n),
                _ => g.display_name().to_string(),
            };
            (GroupsChoice::Open(i), label)
        }));

        match self.choose("👥 Select a group", &options)? {
            GroupsChoice::Back => Ok(Step::Pop),
            GroupsChoice::Create => {
                let result = flows::create_group(&self.api, self.console);
                self.after_flow(result)
            }
            GroupsChoice::Join => {
                let result = flows::join_group(&self.api, self.console);
                self.after_flow(result)
            }
            GroupsChoice::Open(i) => Ok(Step::Push(Frame::Group {
                id: groups[i].id.clone(),
            })),
        }
    }

    fn group_menu(&mut self, group_id: &str) -> Result<Step> {
        let group = self.api.group(group_id)?.data;
        if group.id.is_empty() {
            self.console.notify(Level::Error, "Group not found");
            return Ok(Step::Pop);
        }

        let topic_count = match group.topics.len() {
            0 => group.topic_count.unwrap_or(0) as usize,
            n => n,
        };
        let options = [
            (GroupChoice::Back, "← Back to groups".to_string()),
            (GroupChoice::Topics, format!("📋 Browse Topics · {topic_count} topics")),
            (GroupChoice::Events, "📅 View Events · Active events in this group".to_string()),
            (GroupChoice::Karma, "⭐ Group Karma · Karma standings for this group".to_string()),
            (GroupChoice::Details, "👁️ Details · Members and invite code".to_string()),
        ];

        match self.choose(&format!("📁 {}", group.display_name()), &options)? {
            GroupChoice::Back => Ok(Step::Pop),
            GroupChoice::Topics => Ok(Step::Push(Frame::Topics {
                group_id: group.id.clone(),
            })),
            GroupChoice::Events => Ok(Step::Push(Frame::Events {
                group_id: Some(group.id.clone()),
            })),
            GroupChoice::Karma => {
                let result = flows::show_karma(&self.api, self.console, Some(&group.id));
                self.after_flow(result)
            }
            GroupChoice::Details => {
                flows::show_group(self.console, &group);
                Ok(Step::Stay)
            }
        }
    }

    fn topics_menu(&mut self, group_id: &str) -> Result<Step> {
        let group = self.api.group(group_id)?.data;
        let topics = self.api.topics_of(&group)?;
        if topics.is_empty() {
            self.console
                .notify(Level::Warn, "No topics in this group. Create one at pikarama.com");
            return Ok(Step::Pop);
        }

        let mut options = vec![(ListChoice::Back, BACK.to_string())];
        options.extend(topics.iter().enumerate().map(|(i, t)| (ListChoice::Open(i), t.label())));

        match self.choose("📋 Select a topic", &options)? {
            ListChoice::Back => Ok(Step::Pop),
            ListChoice::Open(i) => Ok(Step::Push(Frame::Topic {
                id: topics[i].id.clone(),
                name: topics[i].display_name().to_string(),
            })),
        }
    }

    fn topic_menu(&mut self, topic_id: &str, name: &str) -> Result<Step> {
        let options = [
            (TopicChoice::Back, "← Back to topics".to_string()),
            (TopicChoice::CreateEvent, "➕ Create Event · Start a new decision".to_string()),
            (TopicChoice::CreatePoll, "📊 Create Poll · Quick poll with preset options".to_string()),
        ];
        match self.choose(&format!("📋 {name}"), &options)? {
            TopicChoice::Back => Ok(Step::Pop),
            TopicChoice::CreateEvent => {
                let result = flows::create_event(&self.api, self.console, Some(topic_id));
                self.after_flow(result)
            }
            TopicChoice::CreatePoll => {
                let result = flows::create_poll(&self.api, self.console, Some(topic_id));
                self.after_flow(result)
            }
        }
    }

    fn events_menu(&mut self, group_id: Option<&str>) -> Result<Step> {
        let mut events = self.api.events(None)?.data;
        if let Some(group_id) = group_id {
            events.retain(|e| e.group_id() == Some(group_id));
        }
        if events.is_empty() {
            self.console.notify(Level::Warn, "No active events found.");
            return Ok(Step::Pop);
        }

        let mut options = vec![(ListChoice::Back, BACK.to_string())];
        options.extend(
            events
                .iter()
                .enumerate()
                .map(|(i, e)| (ListChoice::Open(i), flows::event_label(e))),
        );

        match self.choose("📅 Select an event", &options)? {
            ListChoice::Back => Ok(Step::Pop),
            ListChoice::Open(i) => Ok(Step::Push(Frame::Event {
                id: events[i].id.clone(),
            })),
        }
    }

    fn event_menu(&mut self, event_id: &str) -> Result<Step> {
        let event = self.api.event(event_id)?.data;
        if event.id.is_empty() {
            self.console.notify(Level::Error, "Event not found");
            return Ok(Step::Pop);
        }

        let mut options = vec![(EventChoice::Back, "← Back to events".to_string())];
        options.extend(
            event_actions(&event.status, event.is_poll)
                .into_iter()
                .map(|a| (EventChoice::Action(a), a.label().to_string())),
        );

        let prompt = format!(
            "{} {} ({})",
            event.status.emoji(),
            event.display_name(),
            event.status
        );
        let result = match self.choose(&prompt, &options)? {
            EventChoice::Back => return Ok(Step::Pop),
            EventChoice::Action(EventAction::Submit) => {
                flows::submit_picks(&self.api, self.console, &event.id)
            }
            EventChoice::Action(EventAction::Vote) => flows::vote(&self.api, self.console, &event),
            EventChoice::Action(EventAction::Advance) => {
                flows::advance(&self.api, self.console, &event.id)
            }
            EventChoice::Action(EventAction::View) => {
                flows::show_event(self.console, &event);
                Ok(())
            }
        };
        self.after_flow(result)
    }
}
