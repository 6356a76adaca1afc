//! Polling synchronizer: pulls roster and detail snapshots from the store
//! into the local view state.
//!
//! Snapshots replace local copies wholesale. A failed pull keeps the
//! previous copy and queues a warning notice.

use std::sync::Arc;
use std::time::Duration;

use synm_common::{EntityDetail, Roster, SynmError};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::gateway::{ApiRequest, Gateway};
use crate::notice::Notice;
use crate::prompt::CredentialPrompt;

/// Editable fields seeded from the selected entity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditForm {
    pub note: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub mode: String,
}

impl EditForm {
    pub fn from_detail(detail: &EntityDetail) -> Self {
        Self {
            note: detail.note.clone(),
            x: round2(detail.summary.x),
            y: round2(detail.summary.y),
            z: round2(detail.summary.z),
            mode: detail.summary.game_mode.as_str().to_lowercase(),
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Notices kept before the oldest are dropped
pub const MAX_NOTICES: usize = 50;

#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub roster: Roster,
    pub selection: Option<Uuid>,
    pub detail: Option<EntityDetail>,
    pub form: EditForm,
    pub notices: Vec<Notice>,
}

impl ViewState {
    /// Queue a notice, dropping the oldest once `MAX_NOTICES` are pending
    pub fn notify(&mut self, notice: Notice) {
        if self.notices.len() >= MAX_NOTICES {
            let excess = self.notices.len() + 1 - MAX_NOTICES;
            self.notices.drain(..excess);
        }
        self.notices.push(notice);
    }
}

/// Owns the view state and keeps it in step with the store
#[derive(Clone)]
pub struct Synchronizer {
    gateway: Arc<Gateway>,
    prompt: Arc<dyn CredentialPrompt>,
    view: Arc<Mutex<ViewState>>,
}

impl Synchronizer {
    pub fn new(gateway: Arc<Gateway>, prompt: Arc<dyn CredentialPrompt>) -> Self {
        Self {
            gateway,
            prompt,
            view: Arc::new(Mutex::new(ViewState::default())),
        }
    }

    pub fn gateway(&self) -> &Arc<Gateway> {
        &self.gateway
    }

    pub fn prompt(&self) -> &Arc<dyn CredentialPrompt> {
        &self.prompt
    }

    /// Copy of the current view
    pub async fn snapshot(&self) -> ViewState {
        self.view.lock().await.clone()
    }

    pub async fn selection(&self) -> Option<Uuid> {
        self.view.lock().await.selection
    }

    /// Edit the form fields in place
    pub async fn update_form<F: FnOnce(&mut EditForm)>(&self, edit: F) {
        edit(&mut self.view.lock().await.form);
    }

    pub async fn push_notice(&self, notice: Notice) {
        self.view.lock().await.notify(notice);
    }

    /// Take all queued notices
    pub async fn drain_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut self.view.lock().await.notices)
    }

    /// Pull the roster. On failure the previous roster stays.
    pub async fn refresh_roster(&self) -> bool {
        let result: Result<Roster, SynmError> = self
            .gateway
            .fetch_json(ApiRequest::get("/api/players"), self.prompt.as_ref(), "roster")
            .await;

        let mut view = self.view.lock().await;
        match result {
            Ok(roster) => {
                debug!(
                    "Roster: {} online, {} offline",
                    roster.online.len(),
                    roster.offline.len()
                );
                view.roster = roster;
                true
            }
            Err(e) => {
                warn!("Roster refresh failed: {}", e);
                view.notify(Notice::warning("Roster unavailable", e.to_string()));
                false
            }
        }
    }

    /// Select an entity and pull its detail right away
    pub async fn select(&self, id: Uuid) -> bool {
        self.view.lock().await.selection = Some(id);
        self.refresh_detail().await
    }

    /// Pull the selected entity's detail and re-seed the form from it.
    /// On failure the previous detail and the selection stay.
    pub async fn refresh_detail(&self) -> bool {
        let Some(id) = self.selection().await else {
            return false;
        };

        let result: Result<EntityDetail, SynmError> = self
            .gateway
            .fetch_json(
                ApiRequest::get(&format!("/api/player/{}", id)),
                self.prompt.as_ref(),
                &id.to_string(),
            )
            .await;

        let mut view = self.view.lock().await;
        match result {
            Ok(detail) => {
                // selection may have moved on while the request was in flight
                if view.selection != Some(id) {
                    return false;
                }
                view.form = EditForm::from_detail(&detail);
                view.detail = Some(detail);
                true
            }
            Err(e) => {
                warn!("Detail refresh for {} failed: {}", id, e);
                view.notify(Notice::warning("Player details unavailable", e.to_string()));
                false
            }
        }
    }

    /// Start periodic roster refresh: one tick right away, then every
    /// `interval`. The task stops when the handle is stopped or dropped.
    pub fn spawn_roster_poll(&self, interval: Duration) -> PollHandle {
        let sync = self.clone();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                sync.refresh_roster().await;
            }
        });
        PollHandle { task: Some(task) }
    }
}

/// Running poll task; aborted on `stop()` or drop
#[derive(Debug)]
pub struct PollHandle {
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    pub fn stop(mut self) {
        self.abort();
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.abort();
    }
}
