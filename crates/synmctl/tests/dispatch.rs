mod common;

use std::sync::Arc;

use common::*;
use serde_json::json;
use synm_common::{ActionIntent, GameMode, Intent};
use synmctl::{Dispatcher, NoticeLevel, StaticPrompt};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_heal_restores_vitals() {
    let (base, store) = fresh_store().await;
    {
        let mut state = store.write().await;
        let steve = state.record_mut(&STEVE).unwrap();
        steve.detail.summary.health = 5.0;
        steve.detail.summary.food_level = 3;
    }
    let sync = synchronizer(session(&base, None), Arc::new(StaticPrompt::declining()));
    sync.select(STEVE).await;
    let dispatcher = Dispatcher::new(sync.clone());

    assert!(dispatcher.dispatch(ActionIntent::targeted(Intent::Heal, STEVE)).await);

    let view = sync.snapshot().await;
    let detail = view.detail.unwrap();
    assert_eq!(detail.summary.health, 20.0);
    assert_eq!(detail.summary.max_health, 20.0);
    assert_eq!(detail.summary.food_level, 20);
    assert!(view.notices.iter().any(|n| n.level == NoticeLevel::Success));
}

#[tokio::test]
async fn test_latest_applied_intent_wins() {
    let (base, _store) = fresh_store().await;
    let sync = synchronizer(session(&base, None), Arc::new(StaticPrompt::declining()));
    sync.select(ALEX).await;
    let dispatcher = Dispatcher::new(sync.clone());

    assert!(dispatcher.act(Intent::Teleport, Some(ALEX), [("x", "1"), ("y", "2"), ("z", "3")]).await);
    assert!(dispatcher.act(Intent::Teleport, Some(ALEX), [("x", "-4.5"), ("y", "70"), ("z", "9.125")]).await);
    assert!(dispatcher.act(Intent::SetGameMode, Some(ALEX), [("gamemode", "ADVENTURE")]).await);
    assert!(dispatcher.act(Intent::SetNote, Some(ALEX), [("note", "builder")]).await);

    let view = sync.snapshot().await;
    let detail = view.detail.unwrap();
    assert_eq!((detail.summary.x, detail.summary.y, detail.summary.z), (-4.5, 70.0, 9.125));
    assert_eq!(detail.summary.game_mode, GameMode::Adventure);
    assert!(!detail.can_fly);
    assert_eq!(view.form.mode, "adventure");
    assert_eq!(view.form.z, 9.13);
    assert_eq!(view.form.note, "builder");
}

#[tokio::test]
async fn test_toggle_twice_restores_flag() {
    let (base, _store) = fresh_store().await;
    let sync = synchronizer(session(&base, None), Arc::new(StaticPrompt::declining()));
    sync.select(STEVE).await;
    let dispatcher = Dispatcher::new(sync.clone());

    for intent in [Intent::Freeze, Intent::GodMode, Intent::Vanish, Intent::Fly] {
        let before = sync.snapshot().await.detail.unwrap();
        assert!(dispatcher.dispatch(ActionIntent::targeted(intent, STEVE)).await);
        let flipped = sync.snapshot().await.detail.unwrap();
        assert_ne!(
            (before.frozen, before.god_mode, before.vanished, before.can_fly),
            (flipped.frozen, flipped.god_mode, flipped.vanished, flipped.can_fly)
        );
        assert!(dispatcher.dispatch(ActionIntent::targeted(intent, STEVE)).await);
        let after = sync.snapshot().await.detail.unwrap();
        assert_eq!(
            (before.frozen, before.god_mode, before.vanished, before.can_fly),
            (after.frozen, after.god_mode, after.vanished, after.can_fly)
        );
    }
}

#[tokio::test]
async fn test_form_driven_actions() {
    let (base, _store) = fresh_store().await;
    let sync = synchronizer(session(&base, None), Arc::new(StaticPrompt::declining()));
    sync.select(STEVE).await;
    let dispatcher = Dispatcher::new(sync.clone());

    sync.update_form(|f| {
        f.x = 10.0;
        f.y = 80.0;
        f.z = -3.25;
        f.note = "moved".to_string();
        f.mode = "spectator".to_string();
    })
    .await;
    assert!(dispatcher.teleport_from_form().await);
    assert!(dispatcher.save_note_from_form().await);
    assert!(dispatcher.apply_mode_from_form().await);

    let detail = sync.snapshot().await.detail.unwrap();
    assert_eq!(detail.summary.z, -3.25);
    assert_eq!(detail.note, "moved");
    assert!(detail.can_fly);
}

#[tokio::test]
async fn test_guards_block_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(0)
        .mount(&server)
        .await;
    let sync = synchronizer(session(&server.uri(), None), Arc::new(StaticPrompt::declining()));
    let dispatcher = Dispatcher::new(sync.clone());

    assert!(!dispatcher.dispatch(ActionIntent::new(Intent::Heal, None)).await);
    assert!(
        !dispatcher
            .act(Intent::Teleport, Some(STEVE), [("x", "1"), ("y", "up"), ("z", "3")])
            .await
    );
    assert!(!dispatcher.act(Intent::SetGameMode, Some(STEVE), [("gamemode", " ")]).await);
    assert!(!dispatcher.teleport_from_form().await);

    let notices = sync.drain_notices().await;
    assert_eq!(notices.len(), 4);
    assert!(notices.iter().all(|n| n.level == NoticeLevel::Error));
}

#[tokio::test]
async fn test_unknown_target_fails_without_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/action/heal"))
        .and(body_string_contains("uuid="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": false })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/players"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "online": [], "offline": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let sync = synchronizer(session(&server.uri(), None), Arc::new(StaticPrompt::declining()));
    let dispatcher = Dispatcher::new(sync.clone());

    assert!(!dispatcher.dispatch(ActionIntent::targeted(Intent::Heal, UNKNOWN)).await);
    let notices = sync.drain_notices().await;
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
}

#[tokio::test]
async fn test_non_json_success_body_counts_as_applied() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/action/kill"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/players"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "online": [], "offline": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let sync = synchronizer(session(&server.uri(), None), Arc::new(StaticPrompt::declining()));
    let dispatcher = Dispatcher::new(sync);
    assert!(dispatcher.dispatch(ActionIntent::targeted(Intent::Kill, STEVE)).await);
}

#[tokio::test]
async fn test_server_error_is_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;
    let sync = synchronizer(session(&server.uri(), None), Arc::new(StaticPrompt::declining()));
    let dispatcher = Dispatcher::new(sync);
    assert!(!dispatcher.dispatch(ActionIntent::targeted(Intent::Feed, STEVE)).await);
}

#[tokio::test]
async fn test_broadcast_skips_detail_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/action/broadcast"))
        .and(body_string_contains("message=Server+restart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/players"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "online": [], "offline": [] })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/api/player/{}", STEVE)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "Not found" })))
        .expect(1)
        .mount(&server)
        .await;

    let sync = synchronizer(session(&server.uri(), None), Arc::new(StaticPrompt::declining()));
    sync.select(STEVE).await;
    let dispatcher = Dispatcher::new(sync);
    assert!(dispatcher.broadcast("Server restart").await);
}

#[tokio::test]
async fn test_dispatch_recovers_from_rejected_key() {
    let (base, _store) = initialized_store("right").await;
    let prompt = Arc::new(StaticPrompt::new(Some("right")));
    let sync = synchronizer(session(&base, Some("stale")), prompt.clone());
    let dispatcher = Dispatcher::new(sync.clone());

    assert!(dispatcher.dispatch(ActionIntent::targeted(Intent::Feed, STEVE)).await);
    assert_eq!(prompt.calls(), 1);
    assert!(!sync.snapshot().await.roster.is_empty());
}

#[tokio::test]
async fn test_kick_moves_player_offline() {
    let (base, _store) = fresh_store().await;
    let sync = synchronizer(session(&base, None), Arc::new(StaticPrompt::declining()));
    let dispatcher = Dispatcher::new(sync.clone());

    assert!(dispatcher.act(Intent::Kick, Some(STEVE), [("reason", "afk")]).await);
    let roster = sync.snapshot().await.roster;
    assert!(roster.offline.iter().any(|s| s.uuid == STEVE));
    assert!(!roster.online.iter().any(|s| s.uuid == STEVE));
}
