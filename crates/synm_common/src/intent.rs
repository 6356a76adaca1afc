//! Named commands the console can send to the store.
//!
//! An intent is transient: built, posted as a form to
//! `/api/action/{name}`, discarded. Everything except `broadcast` is
//! scoped to exactly one target entity.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::error::SynmError;
use crate::model::GameMode;

/// Form field carrying the target id
pub const TARGET_FIELD: &str = "uuid";

/// Status effects the store knows how to apply
pub const KNOWN_EFFECTS: &[&str] = &[
    "speed",
    "slowness",
    "haste",
    "mining_fatigue",
    "strength",
    "instant_health",
    "instant_damage",
    "jump_boost",
    "nausea",
    "regeneration",
    "resistance",
    "fire_resistance",
    "water_breathing",
    "invisibility",
    "blindness",
    "night_vision",
    "hunger",
    "weakness",
    "poison",
    "wither",
    "health_boost",
    "absorption",
    "saturation",
    "glowing",
    "levitation",
    "luck",
    "unluck",
    "slow_falling",
    "conduit_power",
    "dolphins_grace",
    "bad_omen",
    "hero_of_the_village",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    SetGameMode,
    Teleport,
    SetNote,
    Heal,
    Feed,
    Kill,
    RemoveHunger,
    ClearInventory,
    Freeze,
    GodMode,
    Fly,
    Vanish,
    Effect,
    ClearEffects,
    Kick,
    Ban,
    Unban,
    Broadcast,
    /// `creative`, `survival`, ...: `setgamemode` with the mode fixed
    ModeShortcut(GameMode),
}

impl Intent {
    pub const ALL: [Intent; 22] = [
        Intent::SetGameMode,
        Intent::Teleport,
        Intent::SetNote,
        Intent::Heal,
        Intent::Feed,
        Intent::Kill,
        Intent::RemoveHunger,
        Intent::ClearInventory,
        Intent::Freeze,
        Intent::GodMode,
        Intent::Fly,
        Intent::Vanish,
        Intent::Effect,
        Intent::ClearEffects,
        Intent::Kick,
        Intent::Ban,
        Intent::Unban,
        Intent::Broadcast,
        Intent::ModeShortcut(GameMode::Survival),
        Intent::ModeShortcut(GameMode::Creative),
        Intent::ModeShortcut(GameMode::Adventure),
        Intent::ModeShortcut(GameMode::Spectator),
    ];

    /// Path segment under `/api/action/`
    pub fn name(&self) -> &'static str {
        match self {
            Intent::SetGameMode => "setgamemode",
            Intent::Teleport => "teleport",
            Intent::SetNote => "setnote",
            Intent::Heal => "heal",
            Intent::Feed => "feed",
            Intent::Kill => "kill",
            Intent::RemoveHunger => "removehunger",
            Intent::ClearInventory => "clearinventory",
            Intent::Freeze => "freeze",
            Intent::GodMode => "godmode",
            Intent::Fly => "fly",
            Intent::Vanish => "vanish",
            Intent::Effect => "effect",
            Intent::ClearEffects => "cleareffects",
            Intent::Kick => "kick",
            Intent::Ban => "ban",
            Intent::Unban => "unban",
            Intent::Broadcast => "broadcast",
            Intent::ModeShortcut(mode) => mode.as_str(),
        }
    }

    /// Everything but broadcast needs a target entity
    pub fn is_targeted(&self) -> bool {
        !matches!(self, Intent::Broadcast)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Intent {
    type Err = SynmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Intent::ALL
            .iter()
            .copied()
            .find(|i| i.name() == wanted)
            .ok_or_else(|| SynmError::InvalidInput(format!("unknown intent '{}'", s)))
    }
}

/// One command plus its flat parameter map
#[derive(Debug, Clone, PartialEq)]
pub struct ActionIntent {
    pub intent: Intent,
    pub target: Option<Uuid>,
    pub params: BTreeMap<String, String>,
}

impl ActionIntent {
    pub fn new(intent: Intent, target: Option<Uuid>) -> Self {
        Self {
            intent,
            target,
            params: BTreeMap::new(),
        }
    }

    pub fn targeted(intent: Intent, target: Uuid) -> Self {
        Self::new(intent, Some(target))
    }

    pub fn broadcast(message: &str) -> Self {
        Self::new(Intent::Broadcast, None).param("message", message)
    }

    pub fn param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn with_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in params {
            self.params.insert(k.into(), v.into());
        }
        self
    }

    /// Set a toggle intent to an explicit state instead of flipping it
    pub fn desired(self, value: bool) -> Self {
        let key = self.intent.name();
        self.param(key, value.to_string())
    }

    /// Basic guards applied before anything is sent; the store remains the
    /// judge of whether a mutation is acceptable
    pub fn validate(&self) -> Result<(), SynmError> {
        if self.intent.is_targeted() && self.target.is_none() {
            return Err(SynmError::InvalidInput(format!(
                "{} needs a target entity",
                self.intent
            )));
        }

        match self.intent {
            Intent::Teleport => {
                for axis in ["x", "y", "z"] {
                    let raw = self.params.get(axis).map(|v| v.trim()).unwrap_or("");
                    if raw.is_empty() {
                        return Err(SynmError::InvalidInput(format!("missing {} coordinate", axis)));
                    }
                    match raw.parse::<f64>() {
                        Ok(v) if v.is_finite() => {}
                        _ => {
                            return Err(SynmError::InvalidInput(format!(
                                "{} coordinate '{}' is not a number",
                                axis, raw
                            )))
                        }
                    }
                }
            }
            Intent::SetGameMode => {
                let mode = self.params.get("gamemode").map(|v| v.trim()).unwrap_or("");
                if mode.is_empty() {
                    return Err(SynmError::InvalidInput("missing game mode".to_string()));
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// Form body: target first, then parameters in key order
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields = Vec::with_capacity(self.params.len() + 1);
        if let Some(target) = self.target {
            fields.push((TARGET_FIELD.to_string(), target.to_string()));
        }
        for (k, v) in &self.params {
            if k != TARGET_FIELD {
                fields.push((k.clone(), v.clone()));
            }
        }
        fields
    }

    pub fn path(&self) -> String {
        format!("/api/action/{}", self.intent.name())
    }
}
