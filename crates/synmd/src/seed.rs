//! Mock roster the store starts with.

use chrono::Utc;
use synm_common::model::{format_play_time, ARMOR_SLOTS, HOTBAR_SLOTS};
use synm_common::{EntityDetail, EntitySummary, GameMode, ItemSlot, SessionRecord};
use uuid::Uuid;

use crate::state::EntityRecord;

const HOUR_MS: i64 = 3_600_000;
const DAY_MS: i64 = 24 * HOUR_MS;

struct Seed {
    id: u128,
    name: &'static str,
    online: bool,
    health: f64,
    food: u32,
    mode: GameMode,
    pos: (f64, f64, f64),
    dimension: &'static str,
    play_time_ms: u64,
    level: u32,
    joined_days_ago: i64,
    seen_days_ago: i64,
}

const SEEDS: [Seed; 3] = [
    Seed {
        id: 1,
        name: "Steve",
        online: true,
        health: 18.0,
        food: 18,
        mode: GameMode::Survival,
        pos: (100.5, 64.0, -20.3),
        dimension: "minecraft:overworld",
        play_time_ms: 83 * 60_000,
        level: 8,
        joined_days_ago: 1,
        seen_days_ago: 0,
    },
    Seed {
        id: 2,
        name: "Alex",
        online: true,
        health: 20.0,
        food: 20,
        mode: GameMode::Creative,
        pos: (-12.1, 70.0, 45.9),
        dimension: "minecraft:overworld",
        play_time_ms: 190 * 60_000,
        level: 30,
        joined_days_ago: 7,
        seen_days_ago: 0,
    },
    Seed {
        id: 3,
        name: "Herobrine",
        online: false,
        health: 20.0,
        food: 20,
        mode: GameMode::Survival,
        pos: (0.0, 64.0, 0.0),
        dimension: "minecraft:the_nether",
        play_time_ms: 12 * 60 * 60_000,
        level: 50,
        joined_days_ago: 30,
        seen_days_ago: 2,
    },
];

/// The starting roster, stamped relative to now
pub fn mock_roster() -> Vec<EntityRecord> {
    let now = Utc::now().timestamp_millis();
    SEEDS.iter().map(|s| record(s, now)).collect()
}

fn record(seed: &Seed, now: i64) -> EntityRecord {
    let summary = EntitySummary {
        uuid: Uuid::from_u128(seed.id),
        username: seed.name.to_string(),
        online: seed.online,
        health: seed.health,
        max_health: 20.0,
        food_level: seed.food,
        game_mode: seed.mode,
        x: seed.pos.0,
        y: seed.pos.1,
        z: seed.pos.2,
        dimension: seed.dimension.to_string(),
        total_play_time_formatted: format_play_time(seed.play_time_ms),
        experience_level: seed.level,
        first_joined: now - seed.joined_days_ago * DAY_MS,
        last_seen: now - seed.seen_days_ago * DAY_MS,
    };

    let mut sessions = vec![SessionRecord {
        start: now - 6 * HOUR_MS,
        end: Some(now - 5 * HOUR_MS),
        ip: Some("192.168.1.15".to_string()),
    }];
    if seed.online {
        sessions.push(SessionRecord {
            start: now - HOUR_MS,
            end: None,
            ip: Some("192.168.1.15".to_string()),
        });
    }

    let mut hotbar = vec![
        ItemSlot::item("Stone", 64),
        ItemSlot::item("Torch", 32),
        ItemSlot::item("Bread", 6),
    ];
    hotbar.resize(HOTBAR_SLOTS, ItemSlot::empty());

    let armor: Vec<ItemSlot> = ["Iron Helmet", "Iron Chestplate", "Iron Leggings", "Iron Boots"]
        .iter()
        .take(ARMOR_SLOTS)
        .map(|name| ItemSlot::item(name, 1))
        .collect();

    EntityRecord {
        detail: EntityDetail {
            summary,
            note: String::new(),
            frozen: false,
            god_mode: false,
            vanished: false,
            can_fly: seed.mode.is_creative_like(),
            is_flying: false,
            banned: false,
            sessions,
            hotbar,
            armor,
            offhand: ItemSlot::item("Shield", 1),
            effects: Vec::new(),
        },
        play_time_ms: seed.play_time_ms,
    }
}
