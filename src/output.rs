// Output formatting for the command-line surface.
//
// Each command hands `emit` the normalized JSON it fetched plus a typed
// view implementing `Render`. `--json` prints the JSON, `--quiet` prints one
// identifier per line, and the default prints the human form.

use std::io::{self, Write};

use chrono::DateTime;
use serde_json::Value;

use crate::models::{Event, Group, KarmaEntry, Me, Poll};

const SHARE_BASE: &str = "https://www.pikarama.com/join";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
    Quiet,
}

impl OutputMode {
    /// `json` wins over `quiet` when both are given.
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if json {
            OutputMode::Json
        } else if quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Human
        }
    }
}

pub trait Render {
    fn human(&self, out: &mut dyn Write) -> io::Result<()>;

    /// Lines for `--quiet`. `None` falls back to the generic id/name lookup.
    fn quiet(&self) -> Option<Vec<String>> {
        None
    }
}

pub fn emit(out: &mut dyn Write, mode: OutputMode, raw: &Value, view: &dyn Render) -> io::Result<()> {
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *out, raw)?;
            writeln!(out)
        }
        OutputMode::Quiet => {
            let lines = view.quiet().unwrap_or_else(|| quiet_fallback(raw));
            for line in lines {
                writeln!(out, "{line}")?;
            }
            Ok(())
        }
        OutputMode::Human => view.human(out),
    }
}

/// Generic quiet output: scalars as-is, arrays one entry per line, objects
/// by `id`, then `name`, then their JSON.
pub fn quiet_fallback(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(identify).collect(),
        other => vec![identify(other)],
    }
}

fn identify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Object(map) => match (map.get("id"), map.get("name")) {
            (Some(Value::String(id)), _) => id.clone(),
            (Some(Value::Number(id)), _) => id.to_string(),
            (_, Some(Value::String(name))) => name.clone(),
            _ => value.to_string(),
        },
        other => other.to_string(),
    }
}

/// Left-aligned plain text table.
pub fn write_table(out: &mut dyn Write, headers: &[&str], rows: &[Vec<String>]) -> io::Result<()> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    writeln!(out, "{}", line(headers.to_vec()))?;
    writeln!(
        out,
        "{}",
        widths.iter().map(|w| "─".repeat(*w)).collect::<Vec<_>>().join("  ")
    )?;
    for row in rows {
        writeln!(out, "{}", line(row.iter().map(String::as_str).collect()))?;
    }
    Ok(())
}

pub fn share_link(code: &str) -> String {
    format!("{SHARE_BASE}/{code}")
}

pub fn group_lines(group: &Group) -> Vec<String> {
    let mut lines = vec![
        format!("👥 {}", group.display_name()),
        format!("   ID: {}", group.id),
    ];
    if let Some(members) = group.members {
        lines.push(format!("   Members: {members}"));
    }
    if let Some(code) = &group.invite_code {
        lines.push(format!("   Invite: {code}"));
    }
    lines
}

pub fn event_lines(event: &Event) -> Vec<String> {
    let mut lines = vec![
        format!("📋 {}", event.display_name()),
        format!("   Status: {}", event.status),
        format!("   Topic:  {}", event.context_name()),
    ];

    if !event.submissions.is_empty() {
        lines.push("   Submissions:".to_string());
        for s in &event.submissions {
            let owner = s.submitter.as_deref().unwrap_or("Unknown");
            let winner = if s.is_winner { " 🏆" } else { "" };
            lines.push(format!(
                "     • {} (by {}, votes: {}){}",
                s.title.as_deref().unwrap_or("—"),
                owner,
                s.votes,
                winner
            ));
        }
    } else if event.poll_options.is_empty() {
        lines.push("   Submissions: None yet".to_string());
    }

    if !event.poll_options.is_empty() {
        lines.push("   Poll options:".to_string());
        for (i, option) in event.poll_options.iter().enumerate() {
            let votes = option
                .votes
                .map(|v| format!(" — {v} votes"))
                .unwrap_or_default();
            lines.push(format!("     {}. {}{}", i + 1, option.display_label(), votes));
        }
    }
    lines
}

pub fn karma_line(entry: &KarmaEntry) -> String {
    let icon = entry.icon.as_deref().unwrap_or("📋");
    let name = entry.name.as_deref().unwrap_or("Unknown topic");
    let group = entry
        .group_name
        .as_ref()
        .filter(|g| Some(*g) != entry.name.as_ref())
        .map(|g| format!(" ({g})"))
        .unwrap_or_default();
    let karma = entry.karma_text().unwrap_or_else(|| "0".to_string());
    format!("{icon} {name}{group} — {karma} karma")
}

fn print_lines(out: &mut dyn Write, lines: &[String]) -> io::Result<()> {
    writeln!(out)?;
    for line in lines {
        writeln!(out, "{line}")?;
    }
    writeln!(out)
}

// ---- Views used by the commands ----

pub struct GroupTable<'a>(pub &'a [Group]);

impl Render for GroupTable<'_> {
    fn human(&self, out: &mut dyn Write) -> io::Result<()> {
        if self.0.is_empty() {
            return writeln!(out, "No groups found.");
        }
        let rows: Vec<Vec<String>> = self
            .0
            .iter()
            .map(|g| {
                vec![
                    g.id.clone(),
                    g.display_name().to_string(),
                    g.members.map(|m| m.to_string()).unwrap_or_else(|| "—".into()),
                ]
            })
            .collect();
        write_table(out, &["ID", "Name", "Members"], &rows)
    }

    fn quiet(&self) -> Option<Vec<String>> {
        Some(self.0.iter().map(|g| g.id.clone()).collect())
    }
}

pub struct GroupDetails<'a>(pub &'a Group);

impl Render for GroupDetails<'_> {
    fn human(&self, out: &mut dyn Write) -> io::Result<()> {
        print_lines(out, &group_lines(self.0))
    }

    fn quiet(&self) -> Option<Vec<String>> {
        Some(vec![self.0.id.clone()])
    }
}

pub struct CreatedGroup<'a>(pub &'a Group);

impl Render for CreatedGroup<'_> {
    fn human(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "✔ Created group \"{}\" ({})", self.0.display_name(), self.0.id)?;
        if let Some(code) = &self.0.invite_code {
            writeln!(out)?;
            writeln!(out, "📨 Invite code: {code}")?;
            writeln!(out, "   Share: {}", share_link(code))?;
            writeln!(out)?;
        }
        Ok(())
    }

    fn quiet(&self) -> Option<Vec<String>> {
        Some(vec![self.0.id.clone()])
    }
}

pub struct JoinedGroup<'a>(pub &'a Group);

impl Render for JoinedGroup<'_> {
    fn human(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "✔ Joined \"{}\"!", self.0.display_name())
    }

    fn quiet(&self) -> Option<Vec<String>> {
        Some(vec![self.0.id.clone()])
    }
}

pub struct EventTable<'a>(pub &'a [Event]);

impl Render for EventTable<'_> {
    fn human(&self, out: &mut dyn Write) -> io::Result<()> {
        if self.0.is_empty() {
            return writeln!(out, "No events found.");
        }
        let rows: Vec<Vec<String>> = self
            .0
            .iter()
            .map(|e| {
                vec![
                    e.id.clone(),
                    e.display_name().to_string(),
                    e.context_name().to_string(),
                    e.status.to_string(),
                ]
            })
            .collect();
        write_table(out, &["ID", "Name", "Topic", "Status"], &rows)
    }

    fn quiet(&self) -> Option<Vec<String>> {
        Some(self.0.iter().map(|e| e.id.clone()).collect())
    }
}

pub struct EventDetails<'a>(pub &'a Event);

impl Render for EventDetails<'_> {
    fn human(&self, out: &mut dyn Write) -> io::Result<()> {
        print_lines(out, &event_lines(self.0))
    }

    fn quiet(&self) -> Option<Vec<String>> {
        Some(vec![self.0.id.clone()])
    }
}

pub struct CreatedEvent<'a>(pub &'a Event);

impl Render for CreatedEvent<'_> {
    fn human(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "✔ Created event \"{}\" ({})", self.0.display_name(), self.0.id)
    }

    fn quiet(&self) -> Option<Vec<String>> {
        Some(vec![self.0.id.clone()])
    }
}

/// One-line confirmation for calls whose response carries nothing to show.
/// Quiet mode prints nothing.
pub struct Done<'a>(pub &'a str);

impl Render for Done<'_> {
    fn human(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "✔ {}", self.0)
    }

    fn quiet(&self) -> Option<Vec<String>> {
        Some(Vec::new())
    }
}

/// A created poll, with the options the user asked for as a fallback when
/// the response does not echo them.
pub struct CreatedPoll<'a> {
    pub poll: &'a Poll,
    pub question: &'a str,
    pub requested: &'a [String],
}

impl Render for CreatedPoll<'_> {
    fn human(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(
            out,
            "✔ Poll created! ({})",
            self.poll.id.as_deref().unwrap_or("unknown id")
        )?;
        writeln!(out)?;
        writeln!(out, "📊 {}", self.question)?;
        if self.poll.options.is_empty() {
            for (i, choice) in self.requested.iter().enumerate() {
                writeln!(out, "   {}. {}", i + 1, choice)?;
            }
        } else {
            for (i, option) in self.poll.options.iter().enumerate() {
                writeln!(out, "   {}. {}", i + 1, option.display_label())?;
            }
        }
        if let Some(link) = &self.poll.link {
            writeln!(out, "   {link}")?;
        }
        writeln!(out)
    }

    fn quiet(&self) -> Option<Vec<String>> {
        Some(self.poll.id.iter().cloned().collect())
    }
}

pub struct KarmaTable<'a>(pub &'a [KarmaEntry]);

impl Render for KarmaTable<'_> {
    fn human(&self, out: &mut dyn Write) -> io::Result<()> {
        if self.0.is_empty() {
            return writeln!(out, "No karma data available.");
        }
        let rows: Vec<Vec<String>> = self
            .0
            .iter()
            .map(|k| {
                vec![
                    k.id.clone().unwrap_or_else(|| "—".into()),
                    k.name.clone().unwrap_or_else(|| "—".into()),
                    k.karma_text().unwrap_or_else(|| "—".into()),
                ]
            })
            .collect();
        write_table(out, &["ID", "Name", "Karma"], &rows)
    }

    fn quiet(&self) -> Option<Vec<String>> {
        Some(
            self.0
                .iter()
                .filter_map(|k| k.id.clone().or_else(|| k.name.clone()))
                .collect(),
        )
    }
}

pub struct Profile<'a>(pub &'a Me);

impl Render for Profile<'_> {
    fn human(&self, out: &mut dyn Write) -> io::Result<()> {
        let Me { user, stats } = self.0;
        let rule = "━".repeat(40);
        writeln!(out, "\n👤 Current User")?;
        writeln!(out, "{rule}")?;
        writeln!(out, "  ID:      {}", user.id)?;
        writeln!(out, "  Name:    {}", user.name.as_deref().unwrap_or("—"))?;
        writeln!(out, "  Email:   {}", user.email.as_deref().unwrap_or("—"))?;
        if let Some(since) = user.created_at.as_deref().map(format_date) {
            writeln!(out, "  Since:   {since}")?;
        }
        writeln!(out, "\n📊 Stats")?;
        writeln!(out, "{rule}")?;
        writeln!(out, "  Groups:     {}", stats.groups)?;
        writeln!(out, "  API Tokens: {}", stats.api_tokens)?;
        writeln!(out, "  Webhooks:   {}", stats.webhooks)?;
        writeln!(out)
    }

    fn quiet(&self) -> Option<Vec<String>> {
        Some(vec![self.0.user.id.clone()])
    }
}

/// RFC 3339 timestamps shown as a date; anything else passes through.
fn format_date(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(mode: OutputMode, raw: &Value, view: &dyn Render) -> String {
        let mut buf = Vec::new();
        emit(&mut buf, mode, raw, view).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn groups() -> (Value, Vec<Group>) {
        let raw = json!([{ "id": "g1", "name": "Crew", "members_count": 4 }, { "id": "g2" }]);
        let data = serde_json::from_value(raw.clone()).unwrap();
        (raw, data)
    }

    #[test]
    fn json_wins_over_quiet() {
        assert_eq!(OutputMode::from_flags(true, true), OutputMode::Json);
        assert_eq!(OutputMode::from_flags(false, true), OutputMode::Quiet);
        assert_eq!(OutputMode::from_flags(false, false), OutputMode::Human);
    }

    #[test]
    fn json_mode_prints_normalized_payload() {
        let (raw, data) = groups();
        let text = render(OutputMode::Json, &raw, &GroupTable(&data));
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, raw);
    }

    #[test]
    fn quiet_mode_prints_ids() {
        let (raw, data) = groups();
        assert_eq!(render(OutputMode::Quiet, &raw, &GroupTable(&data)), "g1\ng2\n");
    }

    #[test]
    fn human_mode_prints_table() {
        let (raw, data) = groups();
        let text = render(OutputMode::Human, &raw, &GroupTable(&data));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "ID  Name      Members");
        assert_eq!(lines[2], "g1  Crew      4");
        assert_eq!(lines[3], "g2  Untitled  —");
    }

    #[test]
    fn quiet_fallback_prefers_id_then_name() {
        let raw = json!([{ "id": 5 }, { "name": "n" }, { "x": 1 }, "plain", 3]);
        assert_eq!(quiet_fallback(&raw), vec!["5", "n", "{\"x\":1}", "plain", "3"]);
        assert_eq!(quiet_fallback(&json!({ "id": "solo" })), vec!["solo"]);
    }

    #[test]
    fn event_lines_show_canonical_votes_and_winner() {
        let event: Event = serde_json::from_value(json!({
            "id": "e1", "name": "Movie night", "status": "completed",
            "topic": { "id": "t", "name": "Movies" },
            "submissions": [{ "id": "s", "title": "Alien", "voteCount": 3, "isWinner": true, "user": { "name": "Ana" } }]
        }))
        .unwrap();
        let lines = event_lines(&event);
        assert_eq!(lines[1], "   Status: completed");
        assert_eq!(lines[2], "   Topic:  Movies");
        assert_eq!(lines[4], "     • Alien (by Ana, votes: 3) 🏆");
    }

    #[test]
    fn created_group_shows_share_link() {
        let group: Group =
            serde_json::from_value(json!({ "id": "g", "name": "Crew", "invite_code": "ABC" })).unwrap();
        let text = render(OutputMode::Human, &Value::Null, &CreatedGroup(&group));
        assert!(text.contains("Invite code: ABC"));
        assert!(text.contains("https://www.pikarama.com/join/ABC"));
    }

    #[test]
    fn profile_formats_since_date() {
        let me: Me = serde_json::from_value(json!({
            "user": { "id": "u1", "name": "Ana", "created_at": "2024-03-05T10:00:00Z" },
            "stats": { "groups": 2, "api_tokens": 1, "webhooks": 0 }
        }))
        .unwrap();
        let text = render(OutputMode::Human, &Value::Null, &Profile(&me));
        assert!(text.contains("  Since:   2024-03-05"));
        assert!(text.contains("  Groups:     2"));
        assert_eq!(render(OutputMode::Quiet, &Value::Null, &Profile(&me)), "u1\n");
    }

    #[test]
    fn karma_line_includes_group() {
        let entry: KarmaEntry = serde_json::from_value(json!({
            "topic_name": "Movies", "topic_icon": "🎬", "group_name": "Crew", "weight": 12
        }))
        .unwrap();
        assert_eq!(karma_line(&entry), "🎬 Movies (Crew) — 12 karma");
    }
}
