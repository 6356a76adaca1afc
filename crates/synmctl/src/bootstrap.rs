//! One-time credential bootstrap, run before anything else in a session.
//!
//! Never fails outright: every problem is logged and reported through the
//! outcome so the console can carry on and let the gateway's re-prompt
//! handle a missing credential later.

use synm_common::{mask_key, AuthInitResponse, AuthStatus, DEMO_KEY};
use tracing::{info, warn};

use crate::gateway::{ApiRequest, Gateway};
use crate::prompt::{CredentialPrompt, PromptReason};
use crate::session::SessionContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// Demo mode: fixed credential, nothing sent
    Demo,
    /// Store was initialized by this call; the stored key is attached
    Initialized(String),
    /// Operator entered the key of an already initialized store
    Prompted,
    /// A local credential was already held
    AlreadyHeld,
    /// Operator declined to enter a key
    Declined,
    /// Something went wrong; the session continues without a credential
    Failed(String),
}

pub async fn bootstrap(ctx: &SessionContext, prompt: &dyn CredentialPrompt) -> BootstrapOutcome {
    if ctx.demo {
        if let Err(e) = ctx.credentials.write_local(DEMO_KEY) {
            warn!("Failed to store demo credential: {}", e);
        }
        info!("Demo mode, using fixed credential");
        return BootstrapOutcome::Demo;
    }

    let gateway = match Gateway::new(ctx.clone()) {
        Ok(gateway) => gateway,
        Err(e) => {
            warn!("Bootstrap could not build a client: {}", e);
            return BootstrapOutcome::Failed(e.to_string());
        }
    };

    if query_initialized(&gateway).await {
        if ctx.credentials.read_local().is_some() {
            return BootstrapOutcome::AlreadyHeld;
        }
        return match prompt
            .request_credential(PromptReason::EnterExisting)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
        {
            Some(key) => match ctx.credentials.write_local(&key) {
                Ok(()) => BootstrapOutcome::Prompted,
                Err(e) => {
                    warn!("Failed to store credential: {}", e);
                    BootstrapOutcome::Failed(e.to_string())
                }
            },
            None => {
                info!("No API key entered");
                BootstrapOutcome::Declined
            }
        };
    }

    let chosen = prompt
        .request_credential(PromptReason::Initialize)
        .map(|k| k.trim().to_string())
        .unwrap_or_default();
    initialize(&gateway, &chosen).await
}

/// Transport and decode failures count as uninitialized
async fn query_initialized(gateway: &Gateway) -> bool {
    match gateway.call(ApiRequest::get("/api/auth/status")).await {
        Ok(outcome) => match outcome.into_response().into_json::<AuthStatus>("auth status") {
            Ok(status) => status.initialized,
            Err(e) => {
                warn!("Unreadable auth status, assuming uninitialized: {}", e);
                false
            }
        },
        Err(e) => {
            warn!("Auth status unavailable, assuming uninitialized: {}", e);
            false
        }
    }
}

async fn initialize(gateway: &Gateway, chosen: &str) -> BootstrapOutcome {
    let fields = if chosen.is_empty() {
        Vec::new()
    } else {
        vec![("key".to_string(), chosen.to_string())]
    };

    let response = match gateway
        .call(ApiRequest::post_form("/api/auth/init", fields))
        .await
    {
        Ok(outcome) => outcome.into_response(),
        Err(e) => {
            warn!("Auth init failed: {}", e);
            return BootstrapOutcome::Failed(e.to_string());
        }
    };
    if !response.is_success() {
        warn!("Auth init answered HTTP {}", response.status);
        return BootstrapOutcome::Failed(format!("auth init answered HTTP {}", response.status));
    }

    let returned = response
        .json::<AuthInitResponse>()
        .map(|r| r.key)
        .unwrap_or_default();
    let key = [returned.trim(), chosen]
        .into_iter()
        .find(|k| !k.is_empty())
        .unwrap_or("")
        .to_string();

    if key.is_empty() {
        warn!("Auth init returned no key");
        return BootstrapOutcome::Failed("no key returned".to_string());
    }
    if let Err(e) = gateway.context().credentials.write_local(&key) {
        warn!("Failed to store credential {}: {}", mask_key(&key), e);
        return BootstrapOutcome::Failed(e.to_string());
    }

    info!("Store initialized, key {}", mask_key(&key));
    BootstrapOutcome::Initialized(key)
}
