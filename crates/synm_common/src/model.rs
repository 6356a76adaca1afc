//! Roster and per-entity records as they travel over the wire.
//!
//! Field names follow the store's camelCase JSON. Optional fields carry
//! `#[serde(default)]` because the store omits flight state for offline
//! entities and older stores omit effects entirely.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::SynmError;

/// Slots on the primary bar
pub const HOTBAR_SLOTS: usize = 9;

/// Armor slots (head, chest, legs, feet)
pub const ARMOR_SLOTS: usize = 4;

/// Food level considered full
pub const MAX_FOOD_LEVEL: u32 = 20;

/// Game mode of an entity. Stores report `unknown` (or any unrecognized
/// name) when the mode is not available; that decodes to `Unknown`, which
/// `FromStr` never produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[serde(alias = "SURVIVAL", alias = "Survival")]
    Survival,
    #[serde(alias = "CREATIVE", alias = "Creative")]
    Creative,
    #[serde(alias = "ADVENTURE", alias = "Adventure")]
    Adventure,
    #[serde(alias = "SPECTATOR", alias = "Spectator")]
    Spectator,
    #[serde(other)]
    Unknown,
}

impl GameMode {
    pub const ALL: [GameMode; 4] = [
        GameMode::Survival,
        GameMode::Creative,
        GameMode::Adventure,
        GameMode::Spectator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Survival => "survival",
            GameMode::Creative => "creative",
            GameMode::Adventure => "adventure",
            GameMode::Spectator => "spectator",
            GameMode::Unknown => "unknown",
        }
    }

    /// Modes that grant free flight
    pub fn is_creative_like(&self) -> bool {
        matches!(self, GameMode::Creative | GameMode::Spectator)
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for GameMode {
    type Err = SynmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "survival" => Ok(GameMode::Survival),
            "creative" => Ok(GameMode::Creative),
            "adventure" => Ok(GameMode::Adventure),
            "spectator" => Ok(GameMode::Spectator),
            other => Err(SynmError::InvalidInput(format!("unknown game mode '{}'", other))),
        }
    }
}

/// Lightweight view of a participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySummary {
    pub uuid: Uuid,
    pub username: String,
    pub online: bool,
    pub health: f64,
    pub max_health: f64,
    pub food_level: u32,
    pub game_mode: GameMode,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default)]
    pub dimension: String,
    #[serde(default)]
    pub total_play_time_formatted: String,
    #[serde(default)]
    pub experience_level: u32,
    /// Epoch millis
    #[serde(default)]
    pub first_joined: i64,
    /// Epoch millis
    #[serde(default)]
    pub last_seen: i64,
}

impl EntitySummary {
    /// Health as a 0..=100 percentage, treating a zero max as 20
    pub fn health_percent(&self) -> f64 {
        let max = if self.max_health > 0.0 { self.max_health } else { 20.0 };
        (self.health / max * 100.0).clamp(0.0, 100.0)
    }
}

/// One play session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Epoch millis
    pub start: i64,
    /// Epoch millis, absent while the session is open
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

/// One inventory slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSlot {
    pub display_name: String,
    pub count: u32,
    pub is_empty: bool,
}

impl ItemSlot {
    pub fn empty() -> Self {
        Self {
            display_name: String::new(),
            count: 0,
            is_empty: true,
        }
    }

    pub fn item(name: &str, count: u32) -> Self {
        Self {
            display_name: name.to_string(),
            count,
            is_empty: false,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::empty();
    }
}

impl Default for ItemSlot {
    fn default() -> Self {
        Self::empty()
    }
}

/// Active status effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveEffect {
    pub effect: String,
    pub duration_seconds: u32,
    pub amplifier: u32,
}

/// Full per-entity record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDetail {
    #[serde(flatten)]
    pub summary: EntitySummary,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub frozen: bool,
    #[serde(default)]
    pub god_mode: bool,
    #[serde(default)]
    pub vanished: bool,
    #[serde(default)]
    pub can_fly: bool,
    #[serde(default)]
    pub is_flying: bool,
    #[serde(default)]
    pub banned: bool,
    #[serde(default)]
    pub sessions: Vec<SessionRecord>,
    #[serde(default)]
    pub hotbar: Vec<ItemSlot>,
    #[serde(default)]
    pub armor: Vec<ItemSlot>,
    #[serde(default)]
    pub offhand: ItemSlot,
    #[serde(default)]
    pub effects: Vec<ActiveEffect>,
}

impl EntityDetail {
    pub fn uuid(&self) -> Uuid {
        self.summary.uuid
    }

    /// Every slot the entity holds, in display order
    pub fn slots(&self) -> impl Iterator<Item = &ItemSlot> {
        self.hotbar
            .iter()
            .chain(self.armor.iter())
            .chain(std::iter::once(&self.offhand))
    }

    pub fn slots_mut(&mut self) -> impl Iterator<Item = &mut ItemSlot> {
        self.hotbar
            .iter_mut()
            .chain(self.armor.iter_mut())
            .chain(std::iter::once(&mut self.offhand))
    }

    /// The session that has not ended yet, if any
    pub fn open_session_mut(&mut self) -> Option<&mut SessionRecord> {
        self.sessions.last_mut().filter(|s| s.end.is_none())
    }
}

/// Online/offline summary lists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub online: Vec<EntitySummary>,
    #[serde(default)]
    pub offline: Vec<EntitySummary>,
}

impl Roster {
    /// Look up a participant by username, ignoring case
    pub fn find_by_name(&self, name: &str) -> Option<&EntitySummary> {
        let name = name.trim();
        self.online
            .iter()
            .chain(self.offline.iter())
            .find(|p| p.username.eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        self.online.len() + self.offline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Format a playtime the way the roster shows it ("1d 2h 3m", "1h 23m", "4m 5s", "9s")
pub fn format_play_time(millis: u64) -> String {
    let seconds = millis / 1000;
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if days > 0 {
        format!("{}d {}h {}m", days, hours % 24, minutes % 60)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes % 60)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds % 60)
    } else {
        format!("{}s", seconds)
    }
}
