//! Action dispatcher: one intent, one POST, then a resync.
//!
//! No local state is changed optimistically. After the store accepts an
//! intent the roster (and the selected detail) are pulled again.

use std::sync::Arc;

use synm_common::{ActionIntent, ActionResponse, Intent};
use tracing::{info, warn};
use uuid::Uuid;

use crate::gateway::{ApiRequest, ApiResponse, Gateway};
use crate::notice::Notice;
use crate::sync::Synchronizer;

pub struct Dispatcher {
    gateway: Arc<Gateway>,
    sync: Synchronizer,
}

impl Dispatcher {
    /// Dispatcher sharing the synchronizer's gateway and prompt
    pub fn new(sync: Synchronizer) -> Self {
        Self {
            gateway: Arc::clone(sync.gateway()),
            sync,
        }
    }

    pub fn synchronizer(&self) -> &Synchronizer {
        &self.sync
    }

    /// Send one intent. Returns whether the store applied it.
    pub async fn dispatch(&self, action: ActionIntent) -> bool {
        let label = action.intent.to_string();

        if let Err(e) = action.validate() {
            self.sync
                .push_notice(Notice::error(&format!("{} not sent", label), e.to_string()))
                .await;
            return false;
        }

        let request = ApiRequest::post_form(&action.path(), action.form_fields());
        let success = match self
            .gateway
            .call_with_prompt(request, self.sync.prompt().as_ref())
            .await
        {
            Ok(response) => interpret(&response),
            Err(e) => {
                warn!("{} failed: {}", label, e);
                false
            }
        };

        if !success {
            self.sync
                .push_notice(Notice::error("Action failed", format!("{} was not applied", label)))
                .await;
            return false;
        }

        info!("{} applied", label);
        self.sync
            .push_notice(Notice::success("Action applied", label))
            .await;

        self.sync.refresh_roster().await;
        if action.intent != Intent::Broadcast && self.sync.selection().await.is_some() {
            self.sync.refresh_detail().await;
        }
        true
    }

    /// `dispatch` from loose parts
    pub async fn act<I, K, V>(&self, intent: Intent, target: Option<Uuid>, params: I) -> bool
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.dispatch(ActionIntent::new(intent, target).with_params(params))
            .await
    }

    pub async fn broadcast(&self, message: &str) -> bool {
        self.dispatch(ActionIntent::broadcast(message)).await
    }

    /// Teleport the selected entity to the form's coordinates
    pub async fn teleport_from_form(&self) -> bool {
        let view = self.sync.snapshot().await;
        let action = ActionIntent::new(Intent::Teleport, view.selection)
            .param("x", view.form.x.to_string())
            .param("y", view.form.y.to_string())
            .param("z", view.form.z.to_string());
        self.dispatch(action).await
    }

    /// Save the form's note on the selected entity
    pub async fn save_note_from_form(&self) -> bool {
        let view = self.sync.snapshot().await;
        let action = ActionIntent::new(Intent::SetNote, view.selection).param("note", view.form.note);
        self.dispatch(action).await
    }

    /// Apply the form's game mode to the selected entity
    pub async fn apply_mode_from_form(&self) -> bool {
        let view = self.sync.snapshot().await;
        let action =
            ActionIntent::new(Intent::SetGameMode, view.selection).param("gamemode", view.form.mode);
        self.dispatch(action).await
    }
}

/// Non-2xx is failure; a 2xx body decides through `success`, and a 2xx
/// body that is not JSON counts as success
fn interpret(response: &ApiResponse) -> bool {
    if !response.is_success() {
        return false;
    }
    match response.json::<ActionResponse>() {
        Ok(body) => body.success,
        Err(_) => true,
    }
}
