//! In-memory store state.
//!
//! Nothing here survives a restart except the API key, and only when a
//! key file is configured.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use synm_common::{EntityDetail, EntitySummary, Roster, ServerSettings, StoreConfig};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::AuthState;
use crate::seed;

/// Sessions kept per entity
pub const MAX_SESSIONS: usize = 10;

/// One entity plus bookkeeping that never goes over the wire
#[derive(Debug, Clone)]
pub struct EntityRecord {
    pub detail: EntityDetail,
    pub play_time_ms: u64,
}

/// A server-wide announcement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Announcement {
    pub at: i64,
    pub message: String,
}

#[derive(Debug)]
pub struct StoreState {
    pub auth: AuthState,
    pub entities: BTreeMap<Uuid, EntityRecord>,
    pub settings: ServerSettings,
    pub announcements: Vec<Announcement>,
}

impl StoreState {
    /// Empty store with default settings
    pub fn new(auth: AuthState) -> Self {
        Self {
            auth,
            entities: BTreeMap::new(),
            settings: ServerSettings::default(),
            announcements: Vec::new(),
        }
    }

    /// Store seeded with the mock roster
    pub fn seeded(auth: AuthState) -> Self {
        let mut state = Self::new(auth);
        for record in seed::mock_roster() {
            state.insert(record);
        }
        state
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        let mut auth = AuthState::new(config.demo);
        if let Some(path) = &config.key_file {
            auth = auth.with_key_file(path.clone());
        }
        Self::seeded(auth)
    }

    pub fn insert(&mut self, record: EntityRecord) {
        self.entities.insert(record.detail.uuid(), record);
    }

    pub fn detail(&self, id: &Uuid) -> Option<&EntityDetail> {
        self.entities.get(id).map(|r| &r.detail)
    }

    pub fn record_mut(&mut self, id: &Uuid) -> Option<&mut EntityRecord> {
        self.entities.get_mut(id)
    }

    /// Snapshot of the roster split by online flag
    pub fn roster(&self) -> Roster {
        let (online, offline): (Vec<EntitySummary>, Vec<EntitySummary>) = self
            .entities
            .values()
            .map(|r| r.detail.summary.clone())
            .partition(|s| s.online);
        Roster { online, offline }
    }

    /// Record an announcement; blank messages are dropped
    pub fn announce(&mut self, message: &str) -> bool {
        let message = message.trim();
        if message.is_empty() {
            return false;
        }
        self.announcements.push(Announcement {
            at: Utc::now().timestamp_millis(),
            message: message.to_string(),
        });
        true
    }
}

/// Thread-safe shared state handle
pub type SharedStore = Arc<RwLock<StoreState>>;

pub fn create_shared_store(state: StoreState) -> SharedStore {
    Arc::new(RwLock::new(state))
}
