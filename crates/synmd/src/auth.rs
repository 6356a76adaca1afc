//! Server-side credential: an initialization flag plus the shared key.
//!
//! The store starts uninitialized (or initialized from a key file) and
//! makes exactly one transition to initialized. After that, `init` hands
//! back the current key and never replaces it.

use std::fs;
use std::path::PathBuf;

use rand::RngCore;
use synm_common::{mask_key, DEMO_KEY};
use tracing::{error, info, warn};

/// Random bytes in a generated key (hex-encoded to twice this length)
pub const GENERATED_KEY_BYTES: usize = 32;

#[derive(Debug, Default)]
pub struct AuthState {
    key: Option<String>,
    demo: bool,
    key_file: Option<PathBuf>,
}

impl AuthState {
    pub fn new(demo: bool) -> Self {
        Self {
            key: None,
            demo,
            key_file: None,
        }
    }

    /// Back the credential with a file. An existing non-empty file makes
    /// the store start initialized.
    pub fn with_key_file(mut self, path: PathBuf) -> Self {
        match fs::read_to_string(&path) {
            Ok(content) => {
                let key = content.trim().to_string();
                if !key.is_empty() {
                    info!("Loaded API key {} from {}", mask_key(&key), path.display());
                    self.key = Some(key);
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => error!("Failed to read key file {}: {}", path.display(), e),
        }
        self.key_file = Some(path);
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Establish the credential, or return the one already established.
    ///
    /// When uninitialized, a non-empty `requested` value is adopted; without
    /// one a default is synthesized ("demo" in demo mode, random hex
    /// otherwise).
    pub fn init(&mut self, requested: Option<&str>) -> String {
        if let Some(existing) = self.key.as_ref().filter(|k| !k.is_empty()) {
            if requested.is_some_and(|r| !r.trim().is_empty() && r.trim() != existing.as_str()) {
                warn!("Ignoring init request: API key already established");
            }
            return existing.clone();
        }

        let key = match requested.map(str::trim).filter(|r| !r.is_empty()) {
            Some(r) => {
                info!("Adopting operator-supplied API key {}", mask_key(r));
                r.to_string()
            }
            None if self.demo => DEMO_KEY.to_string(),
            None => {
                let key = generate_key();
                info!("Generated API key {}", mask_key(&key));
                key
            }
        };

        self.store(&key);
        self.key = Some(key.clone());
        key
    }

    /// Whether a presented credential grants access. Everything is allowed
    /// until the store is initialized so a fresh console can bootstrap.
    pub fn verify(&self, presented: Option<&str>) -> bool {
        match self.key.as_deref().filter(|k| !k.is_empty()) {
            None => true,
            Some(key) => presented == Some(key),
        }
    }

    fn store(&self, key: &str) {
        let Some(path) = &self.key_file else {
            return;
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Failed to create {}: {}", parent.display(), e);
                return;
            }
        }
        match fs::write(path, key) {
            Ok(()) => info!("Stored API key at {}", path.display()),
            Err(e) => error!("Failed to write key file {}: {}", path.display(), e),
        }
    }
}

fn generate_key() -> String {
    let mut bytes = [0u8; GENERATED_KEY_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
