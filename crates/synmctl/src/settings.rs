//! Server settings client.

use std::sync::Arc;

use serde_json::{Map, Value};
use synm_common::{ServerSettings, SettingsUpdateResponse, SynmError};
use tracing::info;

use crate::gateway::{ApiRequest, Gateway};
use crate::prompt::CredentialPrompt;

const SETTINGS_PATH: &str = "/api/server/settings";

pub struct SettingsClient {
    gateway: Arc<Gateway>,
    prompt: Arc<dyn CredentialPrompt>,
}

impl SettingsClient {
    pub fn new(gateway: Arc<Gateway>, prompt: Arc<dyn CredentialPrompt>) -> Self {
        Self { gateway, prompt }
    }

    pub async fn load(&self) -> Result<ServerSettings, SynmError> {
        self.gateway
            .fetch_json(ApiRequest::get(SETTINGS_PATH), self.prompt.as_ref(), "settings")
            .await
    }

    /// Send a partial update; keys not in `patch` are left alone
    pub async fn update(&self, patch: Map<String, Value>) -> Result<(), SynmError> {
        let keys: Vec<String> = patch.keys().cloned().collect();
        let response = self
            .gateway
            .call_with_prompt(
                ApiRequest::post_json(SETTINGS_PATH, Value::Object(patch)),
                self.prompt.as_ref(),
            )
            .await?;

        let status = response.status;
        let body = response.json::<SettingsUpdateResponse>().ok();
        match body {
            Some(SettingsUpdateResponse { success: true, .. }) if (200..300).contains(&status) => {
                info!("Updated settings: {}", keys.join(", "));
                Ok(())
            }
            Some(SettingsUpdateResponse {
                error: Some(error), ..
            }) => Err(SynmError::InvalidInput(error)),
            _ if (200..300).contains(&status) => {
                Err(SynmError::Decode("settings update not acknowledged".to_string()))
            }
            _ => Err(SynmError::from_status(status, "settings")),
        }
    }

    /// Append a custom rule; the whole list is sent back
    pub async fn add_rule(&self, rule: &str) -> Result<Vec<String>, SynmError> {
        let rule = rule.trim();
        if rule.is_empty() {
            return Err(SynmError::InvalidInput("empty rule".to_string()));
        }
        let mut rules = self.load().await?.custom_rules;
        rules.push(rule.to_string());
        self.replace_rules(rules).await
    }

    /// Remove the custom rule at `index` (zero-based)
    pub async fn remove_rule(&self, index: usize) -> Result<Vec<String>, SynmError> {
        let mut rules = self.load().await?.custom_rules;
        if index >= rules.len() {
            return Err(SynmError::InvalidInput(format!(
                "no rule #{} ({} rules)",
                index + 1,
                rules.len()
            )));
        }
        rules.remove(index);
        self.replace_rules(rules).await
    }

    async fn replace_rules(&self, rules: Vec<String>) -> Result<Vec<String>, SynmError> {
        let mut patch = Map::new();
        patch.insert("customRules".to_string(), Value::from(rules.clone()));
        self.update(patch).await?;
        Ok(rules)
    }
}
