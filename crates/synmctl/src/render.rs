//! Plain terminal rendering of store snapshots.

use chrono::{Local, TimeZone};
use console::style;
use synm_common::{EntityDetail, EntitySummary, Roster, ServerSettings};

use crate::notice::{Notice, NoticeLevel};

pub fn roster(roster: &Roster) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} ({})\n",
        style("Online").green().bold(),
        roster.online.len()
    ));
    for s in &roster.online {
        out.push_str(&summary_line(s));
    }
    out.push_str(&format!(
        "{} ({})\n",
        style("Offline").dim().bold(),
        roster.offline.len()
    ));
    for s in &roster.offline {
        out.push_str(&summary_line(s));
    }
    out
}

fn summary_line(s: &EntitySummary) -> String {
    format!(
        "  {:<16} {}  {:>5.1}/{:<4} food {:>2}  {:<9}  {:.1} {:.1} {:.1}\n",
        s.username,
        style(s.uuid).dim(),
        s.health,
        s.max_health,
        s.food_level,
        s.game_mode,
        s.x,
        s.y,
        s.z
    )
}

pub fn detail(d: &EntityDetail) -> String {
    let s = &d.summary;
    let mut out = String::new();
    let status = if s.online {
        style("online").green()
    } else {
        style("offline").dim()
    };
    out.push_str(&format!("{} ({}) {}\n", style(&s.username).bold(), s.uuid, status));
    out.push_str(&format!(
        "  Health  {:.1}/{} ({:.0}%)   Food {}/20   Level {}\n",
        s.health,
        s.max_health,
        s.health_percent(),
        s.food_level,
        s.experience_level
    ));
    out.push_str(&format!(
        "  Mode    {}   Position {:.2}, {:.2}, {:.2} in {}\n",
        s.game_mode, s.x, s.y, s.z, s.dimension
    ));
    out.push_str(&format!(
        "  Played  {}   First joined {}   Last seen {}\n",
        s.total_play_time_formatted,
        timestamp(s.first_joined),
        timestamp(s.last_seen)
    ));

    let flags: Vec<&str> = [
        (d.frozen, "frozen"),
        (d.god_mode, "god mode"),
        (d.vanished, "vanished"),
        (d.can_fly, "can fly"),
        (d.is_flying, "flying"),
        (d.banned, "banned"),
    ]
    .iter()
    .filter(|(on, _)| *on)
    .map(|(_, name)| *name)
    .collect();
    if !flags.is_empty() {
        out.push_str(&format!("  Flags   {}\n", flags.join(", ")));
    }
    if !d.note.is_empty() {
        out.push_str(&format!("  Note    {}\n", d.note));
    }

    let held: Vec<String> = d
        .slots()
        .filter(|slot| !slot.is_empty)
        .map(|slot| format!("{} x{}", slot.display_name, slot.count))
        .collect();
    out.push_str(&format!(
        "  Items   {}\n",
        if held.is_empty() {
            "(empty)".to_string()
        } else {
            held.join(", ")
        }
    ));

    for e in &d.effects {
        out.push_str(&format!(
            "  Effect  {} {} ({}s)\n",
            e.effect,
            e.amplifier + 1,
            e.duration_seconds
        ));
    }

    if !d.sessions.is_empty() {
        out.push_str("  Sessions\n");
        for session in &d.sessions {
            let end = session
                .end
                .map(timestamp)
                .unwrap_or_else(|| "now".to_string());
            out.push_str(&format!(
                "    {} -> {}  {}\n",
                timestamp(session.start),
                end,
                session.ip.as_deref().unwrap_or("-")
            ));
        }
    }
    out
}

pub fn settings(s: &ServerSettings) -> String {
    let mut out = String::new();
    let value = serde_json::to_value(s).unwrap_or_default();
    if let Some(map) = value.as_object() {
        for (key, v) in map {
            if key == "customRules" {
                continue;
            }
            out.push_str(&format!("  {:<28} {}\n", key, v));
        }
    }
    out.push_str(&format!("  {}\n", style("customRules").bold()));
    for (i, rule) in s.custom_rules.iter().enumerate() {
        out.push_str(&format!("    {}. {}\n", i + 1, rule));
    }
    out
}

pub fn notice(n: &Notice) -> String {
    let tag = match n.level {
        NoticeLevel::Success => style("ok").green(),
        NoticeLevel::Warning => style("warn").yellow(),
        NoticeLevel::Error => style("error").red(),
    };
    format!("[{}] {}: {}", tag, n.title, n.message)
}

fn timestamp(millis: i64) -> String {
    match Local.timestamp_millis_opt(millis).single() {
        Some(t) if millis > 0 => t.format("%Y-%m-%d %H:%M").to_string(),
        _ => "-".to_string(),
    }
}
