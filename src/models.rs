//! Typed views of the API's resources.
//!
//! The service is inconsistent about field names across endpoints, so
//! several types decode through a raw mirror and settle on one canonical
//! field:
//! - submission tally: `voteCount`, else `votes`
//! - karma value: `karma`, else `weight`
//! - group size: `members_count`, else `memberCount`
//! - ids: JSON strings or numbers, always kept as `String`
//!
//! An explicit `null` reads like a missing field, and counts accept
//! whole-number floats such as `2.0`.

use std::fmt;

use serde::{Deserialize, Deserializer};

const UNTITLED: &str = "Untitled";
const DEFAULT_TOPIC_ICON: &str = "📋";

mod ids {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
        Missing(()),
    }

    pub fn required<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(optional(d)?.unwrap_or_default())
    }

    pub fn optional<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Id::deserialize(d)? {
            Id::Text(s) => Some(s),
            Id::Number(n) => Some(n.to_string()),
            Id::Missing(()) => None,
        })
    }
}

mod lenient {
    use super::*;

    /// `null` and a missing key both give `T::default()`.
    pub fn or_default<'de, D, T>(d: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Default,
    {
        Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
    }

    /// A non-negative number, integral or not, truncated to `u64`.
    pub fn count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
        Ok(Option::<f64>::deserialize(d)?
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v as u64))
    }

    pub fn count_or_zero<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        Ok(count(d)?.unwrap_or(0))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Topic {
    #[serde(default, deserialize_with = "ids::required")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

impl Topic {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNTITLED)
    }

    /// Icon plus name, as shown in menus.
    pub fn label(&self) -> String {
        format!(
            "{} {}",
            self.icon.as_deref().unwrap_or(DEFAULT_TOPIC_ICON),
            self.display_name()
        )
    }
}

/// A group reference embedded in another resource.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GroupRef {
    #[serde(default, deserialize_with = "ids::optional")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Deserialize)]
struct RawGroup {
    #[serde(default, deserialize_with = "ids::required")]
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient::count")]
    members_count: Option<u64>,
    #[serde(default, rename = "memberCount", deserialize_with = "lenient::count")]
    member_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient::count")]
    topic_count: Option<u64>,
    #[serde(default)]
    invite_code: Option<String>,
    #[serde(default)]
    topics: Option<Vec<Topic>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawGroup")]
pub struct Group {
    pub id: String,
    pub name: Option<String>,
    pub members: Option<u64>,
    pub topic_count: Option<u64>,
    pub invite_code: Option<String>,
    pub topics: Vec<Topic>,
}

impl From<RawGroup> for Group {
    fn from(raw: RawGroup) -> Self {
        Group {
            id: raw.id,
            name: raw.name,
            members: raw.members_count.or(raw.member_count),
            topic_count: raw.topic_count,
            invite_code: raw.invite_code,
            topics: raw.topics.unwrap_or_default(),
        }
    }
}

impl Group {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNTITLED)
    }
}

/// Phase of an event. Unknown strings are kept so they can still be shown.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "Option<String>")]
pub enum EventStatus {
    Submitting,
    Voting,
    Completed,
    #[default]
    Unknown,
    Other(String),
}

impl From<Option<String>> for EventStatus {
    fn from(value: Option<String>) -> Self {
        let Some(value) = value else {
            return EventStatus::Unknown;
        };
        match value.as_str() {
            "submitting" => EventStatus::Submitting,
            "voting" => EventStatus::Voting,
            "completed" => EventStatus::Completed,
            "" => EventStatus::Unknown,
            _ => EventStatus::Other(value),
        }
    }
}

impl EventStatus {
    pub fn as_str(&self) -> &str {
        match self {
            EventStatus::Submitting => "submitting",
            EventStatus::Voting => "voting",
            EventStatus::Completed => "completed",
            EventStatus::Unknown => "Unknown",
            EventStatus::Other(s) => s,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            EventStatus::Submitting => "📝",
            EventStatus::Voting => "🗳️",
            _ => "✅",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserRef {
    #[serde(default, deserialize_with = "ids::optional")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Deserialize)]
struct RawSubmission {
    #[serde(default, deserialize_with = "ids::required")]
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    by: Option<String>,
    #[serde(default)]
    user: Option<UserRef>,
    #[serde(default, deserialize_with = "lenient::count")]
    votes: Option<u64>,
    #[serde(default, rename = "voteCount", deserialize_with = "lenient::count")]
    vote_count: Option<u64>,
    #[serde(default, rename = "isWinner")]
    is_winner: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawSubmission")]
pub struct Submission {
    pub id: String,
    pub title: Option<String>,
    pub submitter: Option<String>,
    pub votes: u64,
    pub is_winner: bool,
}

impl From<RawSubmission> for Submission {
    fn from(raw: RawSubmission) -> Self {
        Submission {
            id: raw.id,
            title: raw.title,
            submitter: raw.by.or_else(|| raw.user.and_then(|u| u.name)),
            votes: raw.vote_count.or(raw.votes).unwrap_or(0),
            is_winner: raw.is_winner.unwrap_or(false),
        }
    }
}

impl Submission {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(UNTITLED)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PollOption {
    #[serde(default, deserialize_with = "ids::required")]
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub votes: Option<u64>,
}

impl PollOption {
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Event {
    #[serde(default, deserialize_with = "ids::required")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: EventStatus,
    #[serde(default, rename = "isPoll", deserialize_with = "lenient::or_default")]
    pub is_poll: bool,
    #[serde(default)]
    pub topic: Option<Topic>,
    #[serde(default)]
    pub group: Option<GroupRef>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub submissions: Vec<Submission>,
    #[serde(default, rename = "pollOptions", deserialize_with = "lenient::or_default")]
    pub poll_options: Vec<PollOption>,
}

impl Event {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNTITLED)
    }

    /// Topic name, else group name, else "Unknown".
    pub fn context_name(&self) -> &str {
        self.topic
            .as_ref()
            .and_then(|t| t.name.as_deref())
            .or_else(|| self.group.as_ref().and_then(|g| g.name.as_deref()))
            .unwrap_or("Unknown")
    }

    pub fn group_id(&self) -> Option<&str> {
        self.group.as_ref().and_then(|g| g.id.as_deref())
    }
}

/// Result of creating a poll.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Poll {
    #[serde(default, deserialize_with = "ids::optional")]
    pub id: Option<String>,
    #[serde(default, alias = "name")]
    pub question: Option<String>,
    #[serde(default, alias = "pollOptions", deserialize_with = "lenient::or_default")]
    pub options: Vec<PollOption>,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Deserialize)]
struct RawKarmaEntry {
    #[serde(default, deserialize_with = "ids::optional")]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    topic: Option<GroupRef>,
    #[serde(default)]
    group: Option<GroupRef>,
    #[serde(default)]
    karma: Option<f64>,
    #[serde(default)]
    weight: Option<f64>,
    #[serde(default)]
    topic_name: Option<String>,
    #[serde(default)]
    topic_icon: Option<String>,
    #[serde(default)]
    group_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawKarmaEntry")]
pub struct KarmaEntry {
    pub id: Option<String>,
    pub name: Option<String>,
    pub icon: Option<String>,
    pub group_name: Option<String>,
    pub karma: Option<f64>,
}

impl From<RawKarmaEntry> for KarmaEntry {
    fn from(raw: RawKarmaEntry) -> Self {
        let topic = raw.topic.unwrap_or_default();
        let group = raw.group.unwrap_or_default();
        KarmaEntry {
            id: raw.id.or(topic.id).or(group.id),
            name: raw.name.or(topic.name).or(raw.topic_name).or(group.name.clone()),
            icon: raw.topic_icon,
            group_name: raw.group_name.or(group.name),
            karma: raw.karma.or(raw.weight),
        }
    }
}

impl KarmaEntry {
    /// Karma without a trailing `.0` for whole numbers.
    pub fn karma_text(&self) -> Option<String> {
        self.karma.map(format_number)
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct User {
    #[serde(default, deserialize_with = "ids::required")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UsageStats {
    #[serde(default, deserialize_with = "lenient::count_or_zero")]
    pub groups: u64,
    #[serde(default, deserialize_with = "lenient::count_or_zero")]
    pub api_tokens: u64,
    #[serde(default, deserialize_with = "lenient::count_or_zero")]
    pub webhooks: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Me {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub user: User,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub stats: UsageStats,
}
