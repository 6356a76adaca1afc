//! Client-side credential storage.
//!
//! The console holds one shared key. `MemoryCredentialStore` keeps it for
//! the life of the process; `CookieJarStore` also persists it as a single
//! cookie line so the next session starts authenticated.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use synm_common::{mask_key, SynmError, COOKIE_NAME};
use tracing::{debug, warn};

/// Where the console keeps its credential
pub trait CredentialStore: Send + Sync {
    /// Current credential, if one is held
    fn read_local(&self) -> Option<String>;

    /// Replace the held credential
    fn write_local(&self, value: &str) -> Result<(), SynmError>;
}

/// In-process credential, gone when the process exits
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    value: RwLock<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: &str) -> Self {
        Self {
            value: RwLock::new(Some(value.to_string())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn read_local(&self) -> Option<String> {
        self.value
            .read()
            .ok()
            .and_then(|v| v.clone())
            .filter(|v| !v.is_empty())
    }

    fn write_local(&self, value: &str) -> Result<(), SynmError> {
        let mut slot = self
            .value
            .write()
            .map_err(|_| SynmError::Config("credential lock poisoned".to_string()))?;
        *slot = Some(value.to_string());
        Ok(())
    }
}

/// Credential persisted as `synm_key=<value>; Path=/; SameSite=Lax`
#[derive(Debug)]
pub struct CookieJarStore {
    path: PathBuf,
    cached: RwLock<Option<String>>,
}

impl CookieJarStore {
    /// Open the jar at `path`; a missing or unreadable file means no credential
    pub fn open(path: PathBuf) -> Self {
        let cached = match fs::read_to_string(&path) {
            Ok(content) => parse_cookie(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Failed to read cookie jar {}: {}", path.display(), e);
                None
            }
        };
        if let Some(key) = &cached {
            debug!("Loaded credential {} from {}", mask_key(key), path.display());
        }
        Self {
            path,
            cached: RwLock::new(cached),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for CookieJarStore {
    fn read_local(&self) -> Option<String> {
        self.cached.read().ok().and_then(|v| v.clone())
    }

    fn write_local(&self, value: &str) -> Result<(), SynmError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, format_cookie(value))?;

        let mut slot = self
            .cached
            .write()
            .map_err(|_| SynmError::Config("credential lock poisoned".to_string()))?;
        *slot = Some(value.to_string()).filter(|v| !v.is_empty());
        debug!("Stored credential {} at {}", mask_key(value), self.path.display());
        Ok(())
    }
}

/// Render the cookie line for a credential
pub fn format_cookie(value: &str) -> String {
    format!("{}={}; Path=/; SameSite=Lax\n", COOKIE_NAME, value)
}

/// Pull the credential out of a cookie line; attributes are ignored
pub fn parse_cookie(content: &str) -> Option<String> {
    content
        .lines()
        .flat_map(|line| line.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == COOKIE_NAME)
        .map(|(_, value)| value.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let store = MemoryCredentialStore::new();
        assert_eq!(store.read_local(), None);
        store.write_local("abc").unwrap();
        assert_eq!(store.read_local().as_deref(), Some("abc"));
    }

    #[test]
    fn test_cookie_format() {
        assert_eq!(format_cookie("k"), "synm_key=k; Path=/; SameSite=Lax\n");
        assert_eq!(
            parse_cookie("synm_key=abc123; Path=/; SameSite=Lax").as_deref(),
            Some("abc123")
        );
        assert_eq!(parse_cookie("other=1; Path=/"), None);
        assert_eq!(parse_cookie("synm_key=; Path=/"), None);
    }

    #[test]
    fn test_cookie_jar_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("synm").join("cookies.txt");

        let jar = CookieJarStore::open(path.clone());
        assert_eq!(jar.read_local(), None);
        jar.write_local("s3cret").unwrap();
        assert_eq!(jar.read_local().as_deref(), Some("s3cret"));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "synm_key=s3cret; Path=/; SameSite=Lax\n"
        );

        let reopened = CookieJarStore::open(path);
        assert_eq!(reopened.read_local().as_deref(), Some("s3cret"));
    }
}
