// Command-line argument structures (clap derive).
//
// Running `pikarama` with no subcommand opens the interactive menu. Every
// positional argument is optional: when one is missing on a terminal the
// command asks for it, otherwise it fails with a usage line.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::api::DEFAULT_BASE_URL;
use crate::output::OutputMode;

#[derive(Parser, Debug)]
#[command(
    name = "pikarama",
    author,
    version,
    about = "CLI for Pikarama - karma-weighted group decisions",
    long_about = "Browse groups, run events and polls, and check karma from the terminal.\n\
                  Run without a subcommand for the interactive menu."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Log requests and responses to stderr (PIKARAMA_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// API base URL
    #[arg(long, global = true, value_name = "URL", env = "PIKARAMA_API_URL", default_value = DEFAULT_BASE_URL)]
    pub api_url: String,

    /// Directory holding config.json (defaults to ~/.pikarama)
    #[arg(long, global = true, value_name = "DIR", env = "PIKARAMA_HOME")]
    pub config_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Copy, Default)]
pub struct OutputArgs {
    /// Output raw JSON from the API
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Minimal output (just IDs or status)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl OutputArgs {
    pub fn mode(&self) -> OutputMode {
        OutputMode::from_flags(self.json, self.quiet)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store your API token
    Login {
        /// API token (starts with pk_); prompted for when omitted
        token: Option<String>,
    },
    /// Forget your stored API token
    Logout,
    /// Manage your Pikarama groups
    Groups {
        #[command(subcommand)]
        action: Option<GroupsAction>,
    },
    /// Manage events
    Events(EventsArgs),
    /// Create a quick poll
    Poll(PollArgs),
    /// View karma standings
    Karma {
        /// Only show karma for this group
        group_id: Option<String>,
    },
    /// Show current user info (verify which account the API token belongs to)
    Me,
}

#[derive(Subcommand, Debug)]
pub enum GroupsAction {
    /// Show details about a specific group
    Show { group_id: Option<String> },
    /// Create a new group
    Create { name: Option<String> },
    /// Join a group via an invite code
    Join { code: Option<String> },
}

#[derive(Args, Debug)]
pub struct EventsArgs {
    /// Filter events by status (submitting, voting, completed; comma-separated)
    #[arg(short, long, value_name = "STATUS")]
    pub status: Option<String>,

    #[command(subcommand)]
    pub action: Option<EventsAction>,
}

#[derive(Subcommand, Debug)]
pub enum EventsAction {
    /// Show event details
    Show { event_id: Option<String> },
    /// Create a new event in a topic
    Create {
        topic_id: Option<String>,
        name: Option<String>,
    },
    /// Submit one or more picks for an event
    Submit {
        event_id: Option<String>,
        #[arg(value_name = "PICK")]
        picks: Vec<String>,
    },
    /// Vote for one or more submissions
    Vote {
        event_id: Option<String>,
        #[arg(value_name = "SUBMISSION_ID")]
        submission_ids: Vec<String>,
    },
    /// Advance an event to the next phase
    Advance { event_id: Option<String> },
}

#[derive(Args, Debug)]
pub struct PollArgs {
    pub topic_id: Option<String>,
    pub question: Option<String>,

    /// Poll option (repeat for multiple)
    #[arg(short = 'o', long = "option", value_name = "OPTION")]
    pub options: Vec<String>,
}
