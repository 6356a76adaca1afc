//! Shared types for the SynM admin console and its state store.
//!
//! Both `synmd` (the store) and `synmctl` (the console) speak the wire
//! shapes defined here, so a change to a field name lands in one place.

pub mod config;
pub mod error;
pub mod intent;
pub mod model;
pub mod settings;
pub mod wire;

pub use config::{ConsoleConfig, StoreConfig};
pub use error::SynmError;
pub use intent::{ActionIntent, Intent};
pub use model::{
    ActiveEffect, EntityDetail, EntitySummary, GameMode, ItemSlot, Roster, SessionRecord,
};
pub use settings::ServerSettings;
pub use wire::{ActionResponse, AuthInitResponse, AuthStatus, ErrorBody, SettingsUpdateResponse};

/// Crate version, shared by both binaries
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Header carrying the shared credential on every non-bootstrap call
pub const AUTH_HEADER: &str = "X-Auth-Key";

/// Cookie name the credential is persisted under
pub const COOKIE_NAME: &str = "synm_key";

/// Fixed credential used in demo mode
pub const DEMO_KEY: &str = "demo";

/// Default store port
pub const DEFAULT_PORT: u16 = 4444;

/// Port tried once when the default is taken
pub const FALLBACK_PORT: u16 = 4445;

/// Mask a credential for logging (first 4 chars only)
pub fn mask_key(key: &str) -> String {
    if key.chars().count() > 4 {
        let head: String = key.chars().take(4).collect();
        format!("{}...", head)
    } else {
        "***".to_string()
    }
}
