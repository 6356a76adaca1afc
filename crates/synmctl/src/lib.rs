//! synmctl - SynM admin console core
//!
//! Credential bootstrap, the authenticated gateway, roster/detail
//! synchronization and intent dispatch. The `synmctl` binary is a thin
//! terminal front end over these.

pub mod bootstrap;
pub mod credential;
pub mod dispatch;
pub mod gateway;
pub mod notice;
pub mod prompt;
pub mod render;
pub mod session;
pub mod settings;
pub mod sync;

pub use bootstrap::{bootstrap, BootstrapOutcome};
pub use credential::{CookieJarStore, CredentialStore, MemoryCredentialStore};
pub use dispatch::Dispatcher;
pub use gateway::{ApiRequest, ApiResponse, CallOutcome, Gateway, RetryRequest};
pub use notice::{Notice, NoticeLevel};
pub use prompt::{CredentialPrompt, PromptReason, StaticPrompt, TermPrompt};
pub use session::SessionContext;
pub use settings::SettingsClient;
pub use sync::{EditForm, PollHandle, Synchronizer, ViewState};
