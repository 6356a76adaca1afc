//! Server-wide configuration record and its partial-update merge.
//!
//! Merge is shallow: every top-level key in a patch replaces the stored
//! value for that key, keys absent from the patch are untouched. Lists are
//! top-level values too, so a patch carrying `customRules` replaces the
//! whole list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SynmError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    // World
    pub difficulty: String,
    pub gamemode: String,
    pub hardcore: bool,
    pub pvp: bool,
    pub spawn_protection: u32,
    pub max_players: u32,
    pub view_distance: u32,
    pub simulation_distance: u32,

    // Rules
    pub allow_flight: bool,
    pub allow_nether: bool,
    pub allow_end: bool,
    pub generate_structures: bool,
    pub spawn_animals: bool,
    pub spawn_monsters: bool,
    pub spawn_npcs: bool,

    // Chat and commands
    pub enable_command_block: bool,
    pub enable_query: bool,
    pub enable_rcon: bool,
    pub motd: String,
    pub player_idle_timeout: u32,

    // Performance
    pub max_tick_time: u64,
    pub max_world_size: u64,
    pub network_compression_threshold: i64,

    pub custom_rules: Vec<String>,

    /// Keys this build does not know about, kept so a newer store's
    /// settings survive a round trip through an older console
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            difficulty: "normal".to_string(),
            gamemode: "survival".to_string(),
            hardcore: false,
            pvp: true,
            spawn_protection: 16,
            max_players: 20,
            view_distance: 10,
            simulation_distance: 10,
            allow_flight: false,
            allow_nether: true,
            allow_end: true,
            generate_structures: true,
            spawn_animals: true,
            spawn_monsters: true,
            spawn_npcs: true,
            enable_command_block: false,
            enable_query: false,
            enable_rcon: false,
            motd: "A Minecraft Server".to_string(),
            player_idle_timeout: 0,
            max_tick_time: 60_000,
            max_world_size: 29_999_984,
            network_compression_threshold: 256,
            custom_rules: vec![
                "No griefing allowed".to_string(),
                "Be respectful to other players".to_string(),
                "No offensive builds or language".to_string(),
            ],
            extra: BTreeMap::new(),
        }
    }
}

impl ServerSettings {
    /// Apply a partial update, returning the merged record.
    ///
    /// Fails without touching `self` when the merged record no longer fits
    /// the known field types (e.g. `maxPlayers: "lots"`).
    pub fn merged(&self, patch: &Map<String, Value>) -> Result<ServerSettings, SynmError> {
        let mut current = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            _ => return Err(SynmError::Decode("settings did not serialize to an object".into())),
        };

        for (key, value) in patch {
            current.insert(key.clone(), value.clone());
        }

        serde_json::from_value(Value::Object(current))
            .map_err(|e| SynmError::InvalidInput(format!("settings patch rejected: {}", e)))
    }

    /// Parse a raw patch body, which must be a JSON object
    pub fn patch_from_value(value: Value) -> Result<Map<String, Value>, SynmError> {
        match value {
            Value::Object(map) => Ok(map),
            other => Err(SynmError::InvalidInput(format!(
                "settings patch must be an object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Build a single-key patch from `key=value` text. The value is read as
    /// JSON when it parses (numbers, booleans, arrays), else as a string.
    pub fn patch_from_pair(pair: &str) -> Result<Map<String, Value>, SynmError> {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| SynmError::InvalidInput(format!("expected key=value, got '{}'", pair)))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(SynmError::InvalidInput("empty settings key".to_string()));
        }
        let value = serde_json::from_str::<Value>(raw.trim())
            .unwrap_or_else(|_| Value::String(raw.to_string()));
        let mut map = Map::new();
        map.insert(key.to_string(), value);
        Ok(map)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn patch(value: Value) -> Map<String, Value> {
        ServerSettings::patch_from_value(value).unwrap()
    }

    #[test]
    fn test_partial_update_keeps_other_fields() {
        let base = ServerSettings::default();
        let merged = base.merged(&patch(json!({ "motd": "Hi" }))).unwrap();
        assert_eq!(merged.motd, "Hi");
        assert_eq!(merged.max_players, base.max_players);
        assert_eq!(merged.custom_rules, base.custom_rules);
        assert_eq!(merged.difficulty, "normal");
    }

    #[test]
    fn test_custom_rules_replace_wholesale() {
        let base = ServerSettings::default();
        let merged = base
            .merged(&patch(json!({ "customRules": ["Only one rule"] })))
            .unwrap();
        assert_eq!(merged.custom_rules, vec!["Only one rule".to_string()]);
    }

    #[test]
    fn test_unknown_keys_are_kept() {
        let base = ServerSettings::default();
        let merged = base.merged(&patch(json!({ "levelSeed": "42" }))).unwrap();
        assert_eq!(merged.extra.get("levelSeed"), Some(&json!("42")));

        let again = merged.merged(&patch(json!({ "pvp": false }))).unwrap();
        assert_eq!(again.extra.get("levelSeed"), Some(&json!("42")));
        assert!(!again.pvp);
    }

    #[test]
    fn test_type_mismatch_is_rejected() {
        let base = ServerSettings::default();
        let err = base.merged(&patch(json!({ "maxPlayers": "lots" })));
        assert!(matches!(err, Err(SynmError::InvalidInput(_))));
    }

    #[test]
    fn test_patch_must_be_object() {
        assert!(ServerSettings::patch_from_value(json!(["motd"])).is_err());
    }

    #[test]
    fn test_patch_from_pair() {
        let p = ServerSettings::patch_from_pair("maxPlayers=40").unwrap();
        assert_eq!(p["maxPlayers"], json!(40));
        let p = ServerSettings::patch_from_pair("motd=Welcome home").unwrap();
        assert_eq!(p["motd"], json!("Welcome home"));
        let p = ServerSettings::patch_from_pair("pvp=false").unwrap();
        assert_eq!(p["pvp"], json!(false));
        assert!(ServerSettings::patch_from_pair("novalue").is_err());
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        let value = serde_json::to_value(ServerSettings::default()).unwrap();
        assert!(value.get("networkCompressionThreshold").is_some());
        assert!(value.get("customRules").is_some());
        assert!(value.get("extra").is_none());
    }
}
