//! Intent handlers: the store-side effect of each `/api/action/{intent}`.
//!
//! Every handler runs under the store's write lock, so an intent applies
//! atomically to its target. The boolean result is what the console sees
//! as `{"success": ...}`.

use std::collections::HashMap;

use chrono::Utc;
use synm_common::intent::KNOWN_EFFECTS;
use synm_common::model::{format_play_time, MAX_FOOD_LEVEL};
use synm_common::{ActiveEffect, EntityDetail, GameMode, Intent};
use tracing::{info, warn};
use uuid::Uuid;

use crate::state::{EntityRecord, StoreState};

/// Effect duration when none (or garbage) is supplied
pub const DEFAULT_EFFECT_SECONDS: u32 = 60;

pub type Params = HashMap<String, String>;

/// Apply one intent. Broadcast ignores `target`; every other intent fails
/// when the target is unknown.
pub fn apply(state: &mut StoreState, intent: Intent, target: Option<Uuid>, params: &Params) -> bool {
    if intent == Intent::Broadcast {
        let message = params.get("message").map(String::as_str).unwrap_or("");
        let ok = state.announce(message);
        if ok {
            info!("[Announcement] {}", message.trim());
        }
        return ok;
    }

    let Some(id) = target else {
        warn!("{} without a target", intent);
        return false;
    };
    let Some(record) = state.record_mut(&id) else {
        warn!("{} for unknown entity {}", intent, id);
        return false;
    };

    let ok = apply_to(record, intent, params);
    if ok {
        info!("Applied {} to {}", intent, record.detail.summary.username);
    } else {
        warn!("Rejected {} for {}", intent, record.detail.summary.username);
    }
    ok
}

fn apply_to(record: &mut EntityRecord, intent: Intent, params: &Params) -> bool {
    let param = |key: &str| params.get(key).map(|v| v.trim()).unwrap_or("");
    let d = &mut record.detail;

    match intent {
        Intent::SetGameMode => match param("gamemode").parse::<GameMode>() {
            Ok(mode) => set_game_mode(d, mode),
            Err(_) => false,
        },
        Intent::ModeShortcut(mode) => set_game_mode(d, mode),
        Intent::Teleport => {
            let coords: Option<Vec<f64>> = ["x", "y", "z"]
                .iter()
                .map(|axis| param(axis).parse::<f64>().ok().filter(|v| v.is_finite()))
                .collect();
            match coords.as_deref() {
                Some([x, y, z]) => {
                    d.summary.x = *x;
                    d.summary.y = *y;
                    d.summary.z = *z;
                    true
                }
                _ => false,
            }
        }
        Intent::SetNote => {
            d.note = params.get("note").cloned().unwrap_or_default();
            true
        }
        Intent::Heal => {
            d.summary.health = d.summary.max_health;
            d.summary.food_level = MAX_FOOD_LEVEL;
            true
        }
        Intent::Feed => {
            d.summary.food_level = MAX_FOOD_LEVEL;
            true
        }
        Intent::Kill => {
            d.summary.health = 0.0;
            true
        }
        Intent::RemoveHunger => {
            d.summary.food_level = 0;
            true
        }
        Intent::ClearInventory => {
            d.slots_mut().for_each(|slot| slot.clear());
            true
        }
        Intent::Freeze => {
            d.frozen = toggled(d.frozen, params.get(intent.name()));
            true
        }
        Intent::GodMode => {
            d.god_mode = toggled(d.god_mode, params.get(intent.name()));
            true
        }
        Intent::Vanish => {
            d.vanished = toggled(d.vanished, params.get(intent.name()));
            true
        }
        Intent::Fly => {
            d.can_fly = toggled(d.can_fly, params.get(intent.name()));
            if !d.can_fly {
                d.is_flying = false;
            }
            true
        }
        Intent::Effect => apply_effect(d, params),
        Intent::ClearEffects => {
            d.effects.clear();
            true
        }
        Intent::Kick => disconnect(record),
        Intent::Ban => {
            record.detail.banned = true;
            disconnect(record);
            true
        }
        Intent::Unban => {
            d.banned = false;
            true
        }
        Intent::Broadcast => false,
    }
}

/// Explicit "true"/"false" wins; anything else flips the current value
fn toggled(current: bool, explicit: Option<&String>) -> bool {
    match explicit.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        Some("true") => true,
        Some("false") => false,
        _ => !current,
    }
}

fn apply_effect(d: &mut EntityDetail, params: &Params) -> bool {
    let effect = params
        .get("effect")
        .map(|e| e.trim().to_ascii_lowercase())
        .unwrap_or_else(|| "speed".to_string());
    if !KNOWN_EFFECTS.contains(&effect.as_str()) {
        return false;
    }

    let duration_seconds = params
        .get("duration")
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(DEFAULT_EFFECT_SECONDS as i64)
        .clamp(1, u32::MAX as i64) as u32;
    let amplifier = params
        .get("amplifier")
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(0)
        .clamp(0, u32::MAX as i64) as u32;

    d.effects.retain(|e| e.effect != effect);
    d.effects.push(ActiveEffect {
        effect,
        duration_seconds,
        amplifier,
    });
    true
}

/// Switch mode; flight follows the mode
fn set_game_mode(d: &mut EntityDetail, mode: GameMode) -> bool {
    if mode == GameMode::Unknown {
        return false;
    }
    d.summary.game_mode = mode;
    d.can_fly = mode.is_creative_like();
    if !d.can_fly {
        d.is_flying = false;
    }
    true
}

/// Move an online entity offline, closing its open session
fn disconnect(record: &mut EntityRecord) -> bool {
    if !record.detail.summary.online {
        return false;
    }
    let now = Utc::now().timestamp_millis();

    if let Some(session) = record.detail.open_session_mut() {
        session.end = Some(now);
        let elapsed = (now - session.start).max(0) as u64;
        record.play_time_ms += elapsed;
    }

    let d = &mut record.detail;
    d.summary.online = false;
    d.summary.last_seen = now;
    d.summary.total_play_time_formatted = format_play_time(record.play_time_ms);
    d.frozen = false;
    d.god_mode = false;
    d.vanished = false;
    d.is_flying = false;
    true
}
