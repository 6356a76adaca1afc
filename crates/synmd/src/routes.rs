//! API routes for synmd

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::Value;
use synm_common::intent::TARGET_FIELD;
use synm_common::wire::AuthInitForm;
use synm_common::{
    mask_key, ActionResponse, AuthInitResponse, AuthStatus, EntityDetail, ErrorBody, Intent,
    Roster, ServerSettings, SettingsUpdateResponse,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::actions;
use crate::state::{SharedStore, MAX_SESSIONS};

// ============================================================================
// Auth Routes
// ============================================================================

/// Bootstrap endpoints, reachable without a credential
pub fn auth_routes() -> Router<SharedStore> {
    Router::new()
        .route("/api/auth/status", get(auth_status))
        .route("/api/auth/init", post(auth_init))
}

async fn auth_status(State(store): State<SharedStore>) -> Json<AuthStatus> {
    let store = store.read().await;
    Json(AuthStatus {
        initialized: store.auth.is_initialized(),
    })
}

async fn auth_init(
    State(store): State<SharedStore>,
    form: Option<Form<AuthInitForm>>,
) -> Json<AuthInitResponse> {
    let requested = form.and_then(|Form(f)| f.key);
    let mut store = store.write().await;
    let key = store.auth.init(requested.as_deref());
    info!("Auth init answered with key {}", mask_key(&key));
    Json(AuthInitResponse { ok: true, key })
}

// ============================================================================
// Player Routes
// ============================================================================

pub fn player_routes() -> Router<SharedStore> {
    Router::new()
        .route("/api/players", get(list_players))
        .route("/api/player/:id", get(player_detail))
}

async fn list_players(State(store): State<SharedStore>) -> Json<Roster> {
    Json(store.read().await.roster())
}

async fn player_detail(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<Json<EntityDetail>, (StatusCode, Json<ErrorBody>)> {
    let id = Uuid::parse_str(id.trim()).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new("Invalid UUID")),
        )
    })?;

    let store = store.read().await;
    let mut detail = store
        .detail(&id)
        .cloned()
        .ok_or_else(|| (StatusCode::NOT_FOUND, Json(ErrorBody::new("Not found"))))?;

    let excess = detail.sessions.len().saturating_sub(MAX_SESSIONS);
    detail.sessions.drain(..excess);
    Ok(Json(detail))
}

// ============================================================================
// Action Routes
// ============================================================================

pub fn action_routes() -> Router<SharedStore> {
    Router::new().route("/api/action/:intent", post(run_action))
}

async fn run_action(
    State(store): State<SharedStore>,
    Path(intent): Path<String>,
    form: Option<Form<HashMap<String, String>>>,
) -> Response {
    let mut params = form.map(|Form(p)| p).unwrap_or_default();

    let intent = match intent.parse::<Intent>() {
        Ok(intent) => intent,
        Err(_) => {
            warn!("Unknown action intent: {}", intent);
            return Json(ActionResponse { success: false }).into_response();
        }
    };

    let raw_target = params.remove(TARGET_FIELD).filter(|v| !v.trim().is_empty());
    let target = match (intent.is_targeted(), raw_target) {
        (true, None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody::new("Missing uuid")),
            )
                .into_response();
        }
        (true, Some(raw)) => match Uuid::parse_str(raw.trim()) {
            Ok(id) => Some(id),
            Err(_) => {
                warn!("{} with malformed uuid '{}'", intent, raw);
                return Json(ActionResponse { success: false }).into_response();
            }
        },
        (false, _) => None,
    };

    let mut store = store.write().await;
    let success = actions::apply(&mut store, intent, target, &params);
    Json(ActionResponse { success }).into_response()
}

// ============================================================================
// Settings Routes
// ============================================================================

pub fn settings_routes() -> Router<SharedStore> {
    Router::new().route(
        "/api/server/settings",
        get(get_settings).post(update_settings),
    )
}

async fn get_settings(State(store): State<SharedStore>) -> Json<ServerSettings> {
    Json(store.read().await.settings.clone())
}

async fn update_settings(
    State(store): State<SharedStore>,
    body: Bytes,
) -> (StatusCode, Json<SettingsUpdateResponse>) {
    let mut store = store.write().await;
    let merged = serde_json::from_slice::<Value>(&body)
        .map_err(synm_common::SynmError::from)
        .and_then(ServerSettings::patch_from_value)
        .and_then(|patch| store.settings.merged(&patch));

    match merged {
        Ok(settings) => {
            store.settings = settings;
            info!("Server settings updated");
            (
                StatusCode::OK,
                Json(SettingsUpdateResponse {
                    success: true,
                    error: None,
                }),
            )
        }
        Err(e) => {
            warn!("Rejected settings update: {}", e);
            (
                StatusCode::BAD_REQUEST,
                Json(SettingsUpdateResponse {
                    success: false,
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}
