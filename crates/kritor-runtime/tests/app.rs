mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::{eventually, friend_message};
use kritor_core::{Category, Friend, Group, MessageChain};
use kritor_protocol::EventType;
use kritor_protocol::model::{AuthCode, ElementData};
use kritor_runtime::{ConfigError, KritorApp, KritorConfig, Mode, RuntimeError};
use kritor_transport::{LoopbackAuth, LoopbackTransport};

fn config() -> KritorConfig {
    let mut config = KritorConfig {
        account: Some("10001".to_string()),
        ticket: Some("secret".to_string()),
        ..Default::default()
    };
    config.engine.join_timeout_ms = 500;
    config.engine.resubscribe_delay_ms = 20;
    config
}

fn app_with(config: KritorConfig, transport: &LoopbackTransport) -> KritorApp {
    KritorApp::builder()
        .config(config)
        .event_service(transport.events.clone())
        .push_server(transport.push.clone())
        .auth_service(transport.auth.clone())
        .message_service(transport.messages.clone())
        .without_logging()
        .build()
        .unwrap()
}

#[test]
fn test_build_requires_mode_collaborator() {
    let passive = KritorApp::builder()
        .config(config())
        .without_logging()
        .build();
    assert!(matches!(
        passive,
        Err(RuntimeError::MissingCollaborator("event service"))
    ));

    let mut active_config = config();
    active_config.mode = Mode::Active;
    let active = KritorApp::builder()
        .config(active_config)
        .event_service(LoopbackTransport::new().events)
        .without_logging()
        .build();
    assert!(matches!(
        active,
        Err(RuntimeError::MissingCollaborator("push server"))
    ));
}

#[test]
fn test_build_validates_given_config() {
    let mut bad = config();
    bad.server.max_workers = 0;
    let result = KritorApp::builder()
        .config(bad)
        .event_service(LoopbackTransport::new().events)
        .without_logging()
        .build();
    assert!(matches!(
        result,
        Err(RuntimeError::Config(ConfigError::ValidationError { .. }))
    ));
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_authenticate_skipped_when_not_required() {
    let transport = LoopbackTransport::new();
    let app = app_with(config(), &transport);
    assert!(!app.authenticate().await.unwrap());
}

#[tokio::test]
async fn test_authenticate_flow() {
    let transport = LoopbackTransport::new()
        .with_auth(LoopbackAuth::required().with_account("10001", "secret"));
    let app = app_with(config(), &transport);
    assert!(app.authenticate().await.unwrap());

    let mut wrong = config();
    wrong.ticket = Some("nope".to_string());
    let app = app_with(wrong, &transport);
    match app.authenticate().await {
        Err(RuntimeError::Auth { code, .. }) => assert_eq!(code, AuthCode::NoTicket as i32),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_authenticate_needs_account() {
    let transport = LoopbackTransport::new();
    let mut anonymous = config();
    anonymous.account = None;
    let app = app_with(anonymous, &transport);
    assert!(matches!(
        app.authenticate().await,
        Err(RuntimeError::Config(ConfigError::MissingField { .. }))
    ));
}

#[tokio::test]
async fn test_ticket_pass_through() {
    let transport = LoopbackTransport::new()
        .with_auth(LoopbackAuth::required().with_account("10001", "secret"));
    let app = app_with(config(), &transport);

    let added = app.add_ticket("spare").await.unwrap();
    assert_eq!(added.tickets, vec!["secret", "spare"]);

    let listed = app.get_ticket().await.unwrap();
    assert_eq!(listed.tickets.len(), 2);

    let deleted = app.delete_ticket("spare").await.unwrap();
    assert_eq!(deleted.tickets, vec!["secret"]);
}

// =============================================================================
// Messaging
// =============================================================================

#[tokio::test]
async fn test_send_message_to_friend_and_group() {
    let transport = LoopbackTransport::new();
    let app = app_with(config(), &transport);

    let friend = Friend {
        id: 42,
        ..Default::default()
    };
    let response = app.send_message(&friend, "hi", Some(3)).await.unwrap();
    assert_eq!(response.message_id, "loopback-1");

    let group = Group::shell(777);
    app.send_message(&group, MessageChain::new().at(42).text(" hello"), None)
        .await
        .unwrap();

    let sent = transport.messages.take_sent();
    assert_eq!(sent.len(), 2);

    assert_eq!(sent[0].contact.scene, 1);
    assert_eq!(sent[0].contact.peer, "42");
    assert_eq!(sent[0].retry_count, Some(3));
    assert!(matches!(
        &sent[0].elements[0].data,
        Some(ElementData::Text(text)) if text.text == "hi"
    ));

    assert_eq!(sent[1].contact.scene, 0);
    assert_eq!(sent[1].contact.peer, "777");
    assert_eq!(sent[1].elements.len(), 2);
    assert_eq!(sent[1].retry_count, None);
}

#[tokio::test]
async fn test_send_message_needs_service() {
    let transport = LoopbackTransport::new();
    let app = KritorApp::builder()
        .config(config())
        .event_service(transport.events.clone())
        .without_logging()
        .build()
        .unwrap();
    assert!(matches!(
        app.send_message(&Friend::default(), "hi", None).await,
        Err(RuntimeError::MissingCollaborator("message service"))
    ));
}

// =============================================================================
// Running
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_echo_until_shutdown() {
    let transport = LoopbackTransport::new();
    let app = Arc::new(app_with(config(), &transport));
    let echoed = Arc::new(AtomicUsize::new(0));

    let (a, e) = (app.clone(), echoed.clone());
    app.on_message(move |event| {
        let (a, e) = (a.clone(), e.clone());
        async move {
            if let (Some(contact), Some(chain)) = (event.reply_contact(), event.chain()) {
                a.send_message(contact, chain.clone(), None).await?;
                e.fetch_add(1, Ordering::SeqCst);
            }
            Ok::<_, anyhow::Error>(())
        }
    });
    let notices = app.on_notice_blocking(|_| Ok(()));
    assert!(app.remove_handler(notices));
    assert_eq!(app.registry().len(Category::Notice), 0);

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let runner = {
        let app = app.clone();
        tokio::spawn(async move {
            app.run_until(async {
                let _ = stop_rx.await;
            })
            .await
        })
    };

    let events = transport.events.clone();
    assert!(eventually(|| events.subscriber_count(EventType::Message) == 1).await);
    events.publish(friend_message(42, "ping")).await;
    assert!(eventually(|| echoed.load(Ordering::SeqCst) == 1).await);

    stop_tx.send(()).unwrap();
    let report = runner.await.unwrap().unwrap();
    assert!(report.is_clean());

    let sent = transport.messages.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].contact.peer, "42");
}

#[tokio::test]
async fn test_run_until_rejects_second_start() {
    let transport = LoopbackTransport::new();
    let app = app_with(config(), &transport);
    app.start().await.unwrap();

    let result = app.run_until(async {}).await;
    assert!(matches!(result, Err(RuntimeError::AlreadyRunning)));

    app.stop().await;
}
