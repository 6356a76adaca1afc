//! Operator prompts for a credential.
//!
//! The core never reads input itself: it asks a `CredentialPrompt`, which
//! the UI layer supplies.

use std::sync::atomic::{AtomicUsize, Ordering};

use console::{style, Term};
use tracing::debug;

/// Why a credential is being requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptReason {
    /// Store is uninitialized; blank input means "generate one"
    Initialize,
    /// Store is initialized but nothing is held locally
    EnterExisting,
    /// The held credential was rejected
    Rejected,
}

impl PromptReason {
    pub fn message(&self) -> &'static str {
        match self {
            PromptReason::Initialize => {
                "Store is not initialized. Choose an API key (leave blank to generate one)"
            }
            PromptReason::EnterExisting => "Enter the API key (see synm_api_key.txt on the server)",
            PromptReason::Rejected => "API key rejected. Enter a new API key",
        }
    }
}

pub trait CredentialPrompt: Send + Sync {
    /// Ask for a credential. `None` means the operator declined.
    fn request_credential(&self, reason: PromptReason) -> Option<String>;
}

/// Interactive prompt on the controlling terminal
#[derive(Debug, Default)]
pub struct TermPrompt;

impl CredentialPrompt for TermPrompt {
    fn request_credential(&self, reason: PromptReason) -> Option<String> {
        let term = Term::stderr();
        if !term.is_term() {
            debug!("No terminal attached, declining credential prompt");
            return None;
        }

        term.write_line(&format!("{} {}", style("?").cyan().bold(), reason.message()))
            .ok()?;
        let input = match reason {
            PromptReason::Initialize => term.read_line(),
            _ => term.read_secure_line(),
        }
        .ok()?;

        let input = input.trim().to_string();
        match reason {
            PromptReason::Initialize => Some(input),
            _ if input.is_empty() => None,
            _ => Some(input),
        }
    }
}

/// Fixed answer, for `--key` on the command line and scripted sessions.
/// Counts how often it was asked.
#[derive(Debug, Default)]
pub struct StaticPrompt {
    answer: Option<String>,
    calls: AtomicUsize,
}

impl StaticPrompt {
    pub fn new(answer: Option<&str>) -> Self {
        Self {
            answer: answer.map(str::to_string),
            calls: AtomicUsize::new(0),
        }
    }

    /// A prompt that always declines
    pub fn declining() -> Self {
        Self::new(None)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CredentialPrompt for StaticPrompt {
    fn request_credential(&self, _reason: PromptReason) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_prompt_counts() {
        let prompt = StaticPrompt::new(Some("k"));
        assert_eq!(prompt.request_credential(PromptReason::Rejected).as_deref(), Some("k"));
        assert_eq!(prompt.request_credential(PromptReason::Initialize).as_deref(), Some("k"));
        assert_eq!(prompt.calls(), 2);
        assert_eq!(StaticPrompt::declining().request_credential(PromptReason::Rejected), None);
    }
}
