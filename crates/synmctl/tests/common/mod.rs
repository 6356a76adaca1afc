#![allow(dead_code)]

use std::sync::Arc;

use synmctl::{Gateway, SessionContext, StaticPrompt, Synchronizer};
use synmd::auth::AuthState;
use synmd::{create_shared_store, SharedStore, StoreState};
use uuid::Uuid;

pub const STEVE: Uuid = Uuid::from_u128(1);
pub const ALEX: Uuid = Uuid::from_u128(2);
pub const UNKNOWN: Uuid = Uuid::from_u128(0xff);

/// Serve a real store router on an ephemeral port
pub async fn spawn_store(state: StoreState) -> (String, SharedStore) {
    let store = create_shared_store(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = synmd::app(store.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), store)
}

pub async fn fresh_store() -> (String, SharedStore) {
    spawn_store(StoreState::seeded(AuthState::new(false))).await
}

pub async fn initialized_store(key: &str) -> (String, SharedStore) {
    let mut auth = AuthState::new(false);
    auth.init(Some(key));
    spawn_store(StoreState::seeded(auth)).await
}

pub fn session(base: &str, key: Option<&str>) -> SessionContext {
    let ctx = SessionContext::in_memory(base, false);
    if let Some(key) = key {
        ctx.credentials.write_local(key).unwrap();
    }
    ctx
}

pub fn synchronizer(ctx: SessionContext, prompt: Arc<StaticPrompt>) -> Synchronizer {
    let gateway = Arc::new(Gateway::new(ctx).unwrap());
    Synchronizer::new(gateway, prompt)
}
