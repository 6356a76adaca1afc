//! Explicit session context handed to the gateway and bootstrap.

use std::sync::Arc;
use std::time::Duration;

use synm_common::{ConsoleConfig, DEMO_KEY};
use tracing::debug;

use crate::credential::{CookieJarStore, CredentialStore, MemoryCredentialStore};

/// Everything a call needs to reach the store: base URL, mode, credential
#[derive(Clone)]
pub struct SessionContext {
    pub api_base: String,
    pub demo: bool,
    pub credentials: Arc<dyn CredentialStore>,
    pub timeout: Duration,
}

impl SessionContext {
    pub fn new(api_base: &str, demo: bool, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            demo,
            credentials,
            timeout: Duration::from_secs(10),
        }
    }

    /// Context backed by the configured cookie jar
    pub fn from_config(config: &ConsoleConfig) -> Self {
        let jar = CookieJarStore::open(config.cookie_path());
        debug!("Credential jar at {}", jar.path().display());
        Self::new(&config.api_base, config.demo, Arc::new(jar)).with_timeout(config.request_timeout())
    }

    /// Context with an in-memory credential only
    pub fn in_memory(api_base: &str, demo: bool) -> Self {
        Self::new(api_base, demo, Arc::new(MemoryCredentialStore::new()))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Credential to present: the fixed demo key, else the held one
    pub fn credential(&self) -> Option<String> {
        if self.demo {
            Some(DEMO_KEY.to_string())
        } else {
            self.credentials.read_local()
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("api_base", &self.api_base)
            .field("demo", &self.demo)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_credential_is_fixed() {
        let ctx = SessionContext::in_memory("http://127.0.0.1:4444/", true);
        ctx.credentials.write_local("other").unwrap();
        assert_eq!(ctx.credential().as_deref(), Some(DEMO_KEY));
        assert_eq!(ctx.url("/api/players"), "http://127.0.0.1:4444/api/players");
    }

    #[test]
    fn test_credential_from_store() {
        let ctx = SessionContext::in_memory("http://x", false);
        assert_eq!(ctx.credential(), None);
        ctx.credentials.write_local("k").unwrap();
        assert_eq!(ctx.credential().as_deref(), Some("k"));
    }
}
