//! Router-level tests for the store API

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use synmd::auth::AuthState;
use synmd::{app, create_shared_store, SharedStore, StoreState};
use tower::ServiceExt;

const STEVE: &str = "00000000-0000-0000-0000-000000000001";

fn store() -> SharedStore {
    create_shared_store(StoreState::seeded(AuthState::new(false)))
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str, key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(key) = key {
        builder = builder.header("X-Auth-Key", key);
    }
    builder.body(Body::empty()).unwrap()
}

fn form(uri: &str, key: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(key) = key {
        builder = builder.header("X-Auth-Key", key);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn json_post(uri: &str, key: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(key) = key {
        builder = builder.header("X-Auth-Key", key);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn init(store: &SharedStore, key: &str) -> String {
    let (status, body) = send(app(store.clone()), form("/api/auth/init", None, &format!("key={}", key))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], json!(true));
    body["key"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_status_and_init() {
    let store = store();
    let (_, body) = send(app(store.clone()), get("/api/auth/status", None)).await;
    assert_eq!(body, json!({ "initialized": false }));

    assert_eq!(init(&store, "s3cret").await, "s3cret");

    let (_, body) = send(app(store.clone()), get("/api/auth/status", None)).await;
    assert_eq!(body, json!({ "initialized": true }));
}

#[tokio::test]
async fn test_reinit_returns_existing_key() {
    let store = store();
    let first = init(&store, "first").await;
    assert_eq!(init(&store, "second").await, first);
}

#[tokio::test]
async fn test_init_without_body_generates_key() {
    let store = store();
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/init")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(store), request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["key"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_open_until_initialized() {
    let store = store();
    let (status, body) = send(app(store.clone()), get("/api/players", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["online"].as_array().unwrap().len(), 2);
    assert_eq!(body["offline"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unauthorized_after_init() {
    let store = store();
    init(&store, "k3y").await;

    let (status, body) = send(app(store.clone()), get("/api/players", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "unauthorized" }));

    let (status, _) = send(app(store.clone()), get("/api/players", Some("wrong"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(app(store.clone()), get("/api/players", Some("k3y"))).await;
    assert_eq!(status, StatusCode::OK);

    let request = Request::builder()
        .uri("/api/players")
        .header(header::COOKIE, "synm_key=k3y")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app(store), request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_player_detail() {
    let store = store();
    let (status, body) = send(app(store.clone()), get(&format!("/api/player/{}", STEVE), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], json!("Steve"));
    assert_eq!(body["hotbar"].as_array().unwrap().len(), 9);
    assert_eq!(body["armor"].as_array().unwrap().len(), 4);
    assert!(body["offhand"].is_object());

    let missing = "00000000-0000-0000-0000-0000000000ff";
    let (status, body) = send(app(store.clone()), get(&format!("/api/player/{}", missing), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("Not found"));

    let (status, _) = send(app(store), get("/api/player/not-a-uuid", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_heal_action() {
    let store = store();
    {
        let mut state = store.write().await;
        let id = uuid::Uuid::parse_str(STEVE).unwrap();
        state.record_mut(&id).unwrap().detail.summary.health = 5.0;
    }

    let (status, body) = send(app(store.clone()), form("/api/action/heal", None, &format!("uuid={}", STEVE))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (_, body) = send(app(store), get(&format!("/api/player/{}", STEVE), None)).await;
    assert_eq!(body["health"], json!(20.0));
    assert_eq!(body["foodLevel"], json!(20));
}

#[tokio::test]
async fn test_action_failures() {
    let store = store();

    let (status, body) = send(
        app(store.clone()),
        form("/api/action/heal", None, "uuid=00000000-0000-0000-0000-0000000000ff"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(false));

    let (status, _) = send(app(store.clone()), form("/api/action/heal", None, "")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(app(store.clone()), form("/api/action/explode", None, &format!("uuid={}", STEVE))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(false));

    let (_, body) = send(
        app(store),
        form("/api/action/teleport", None, &format!("uuid={}&x=1&y=abc&z=3", STEVE)),
    )
    .await;
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn test_broadcast_needs_no_target() {
    let store = store();
    let (status, body) = send(app(store.clone()), form("/api/action/broadcast", None, "message=Hello+all")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(store.read().await.announcements[0].message, "Hello all");
}

#[tokio::test]
async fn test_settings_partial_update() {
    let store = store();
    let (_, before) = send(app(store.clone()), get("/api/server/settings", None)).await;

    let (status, body) = send(app(store.clone()), json_post("/api/server/settings", None, r#"{"motd":"Hi"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));

    let (_, after) = send(app(store), get("/api/server/settings", None)).await;
    assert_eq!(after["motd"], json!("Hi"));
    for (key, value) in before.as_object().unwrap() {
        if key != "motd" {
            assert_eq!(&after[key], value, "{} changed", key);
        }
    }
}

#[tokio::test]
async fn test_settings_rejects_bad_body() {
    let store = store();
    let (status, body) = send(app(store.clone()), json_post("/api/server/settings", None, "[1,2]")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].is_string());

    let (status, _) = send(app(store.clone()), json_post("/api/server/settings", None, "not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(app(store), json_post("/api/server/settings", None, r#"{"maxPlayers":"lots"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let store = store();
    let big = "x".repeat(synmd::middleware::MAX_BODY_SIZE + 1);
    let request = Request::builder()
        .method("POST")
        .uri("/api/server/settings")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, big.len())
        .body(Body::from(big))
        .unwrap();
    let response = app(store).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_oversized_body_without_length_rejected() {
    let store = store();
    let motd = "x".repeat(2 * synmd::middleware::MAX_BODY_SIZE);
    let body = json!({ "motd": motd }).to_string();
    let request = json_post("/api/server/settings", None, &body);
    assert!(request.headers().get(header::CONTENT_LENGTH).is_none());

    let response = app(store.clone()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_ne!(store.read().await.settings.motd, motd);

    let message = format!("message={}", "y".repeat(synmd::middleware::MAX_BODY_SIZE));
    let response = app(store.clone())
        .oneshot(form("/api/action/broadcast", None, &message))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(store.read().await.announcements.is_empty());
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let request = Request::builder()
        .uri("/api/auth/status")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let response = app(store()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_game_mode_shortcut_intent() {
    let store = store();
    let (status, body) = send(app(store.clone()), form("/api/action/creative", None, &format!("uuid={}", STEVE))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (_, body) = send(app(store), get(&format!("/api/player/{}", STEVE), None)).await;
    assert_eq!(body["gameMode"], json!("creative"));
    assert_eq!(body["canFly"], json!(true));
}
