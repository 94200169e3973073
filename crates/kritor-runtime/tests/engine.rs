mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use common::{core, eventually, friend_message, message_in_scene, notice, options, request};
use kritor_core::{Category, MessageElement};
use kritor_framework::HandlerRegistry;
use kritor_protocol::{EventType, PushServer};
use kritor_runtime::{Engine, EngineState, RuntimeError, Topology};
use kritor_transport::{LoopbackEvents, LoopbackPushServer};
use parking_lot::Mutex;
use tokio::sync::Notify;

fn passive(events: &Arc<LoopbackEvents>) -> Topology {
    Topology::Passive {
        events: events.clone(),
        endpoint: "loopback".to_string(),
    }
}

async fn all_subscribed(events: &LoopbackEvents) -> bool {
    eventually(|| {
        Category::ALL
            .iter()
            .all(|&c| events.subscriber_count(EventType::from(c)) == 1)
    })
    .await
}

fn counter(registry: &HandlerRegistry, category: Category) -> Arc<AtomicUsize> {
    let count = Arc::new(AtomicUsize::new(0));
    let c = count.clone();
    registry.register_blocking(category, move |_| {
        c.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    count
}

// =============================================================================
// Passive topology
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_passive_dispatches_every_category() {
    let events = Arc::new(LoopbackEvents::default());
    let registry = Arc::new(HandlerRegistry::new());
    let counts: Vec<_> = Category::ALL
        .iter()
        .map(|&c| (c, counter(&registry, c)))
        .collect();

    let engine = Engine::new(passive(&events), registry, options(500));
    engine.start().await.unwrap();
    assert_eq!(engine.state(), EngineState::Running);
    assert!(all_subscribed(&events).await);

    events.publish(core()).await;
    events.publish(friend_message(42, "hi")).await;
    events.publish(notice()).await;
    events.publish(request()).await;

    for (category, count) in &counts {
        assert!(
            eventually(|| count.load(Ordering::SeqCst) == 1).await,
            "{category} handler was not invoked"
        );
    }

    let report = engine.stop().await;
    assert!(report.is_clean());
    assert_eq!(report.stopped.len(), 4);
    assert_eq!(engine.state(), EngineState::Stopped);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_decode_failure_does_not_stop_unit() {
    let events = Arc::new(LoopbackEvents::default());
    let registry = Arc::new(HandlerRegistry::new());
    let seen = Arc::new(Mutex::new(Vec::new()));

    let s = seen.clone();
    registry.register_blocking(Category::Message, move |event| {
        if let Some(chain) = event.chain() {
            s.lock().push(chain.plain_text());
        }
        Ok(())
    });

    let engine = Engine::new(passive(&events), registry, options(500));
    engine.start().await.unwrap();
    assert!(all_subscribed(&events).await);

    events.publish(message_in_scene(42, 1, "unsupported")).await;
    events.publish(friend_message(1, "after")).await;

    assert!(eventually(|| seen.lock().len() == 1).await);
    assert_eq!(*seen.lock(), vec!["after".to_string()]);

    assert!(engine.stop().await.is_clean());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_passive_resubscribes_after_stream_end() {
    let events = Arc::new(LoopbackEvents::default());
    let registry = Arc::new(HandlerRegistry::new());
    let count = counter(&registry, Category::Notice);

    let engine = Engine::new(passive(&events), registry, options(500));
    engine.start().await.unwrap();
    assert!(all_subscribed(&events).await);

    events.close(EventType::Notice);
    assert!(eventually(|| events.subscriptions_opened(EventType::Notice) == 2).await);

    events
        .fail(
            EventType::Notice,
            kritor_core::TransportError::disconnected("reset"),
        )
        .await;
    assert!(eventually(|| events.subscriptions_opened(EventType::Notice) == 3).await);

    events.publish(notice()).await;
    assert!(eventually(|| count.load(Ordering::SeqCst) == 1).await);

    assert!(engine.stop().await.is_clean());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_slow_message_handler_does_not_block_notices() {
    let events = Arc::new(LoopbackEvents::default());
    let registry = Arc::new(HandlerRegistry::new());
    let entered = Arc::new(AtomicUsize::new(0));
    let release = Arc::new(Notify::new());

    let (e, r) = (entered.clone(), release.clone());
    registry.register_suspending(Category::Message, move |_| {
        let (e, r) = (e.clone(), r.clone());
        async move {
            e.fetch_add(1, Ordering::SeqCst);
            r.notified().await;
            Ok(())
        }
    });
    let notices = counter(&registry, Category::Notice);

    let engine = Engine::new(passive(&events), registry, options(1000));
    engine.start().await.unwrap();
    assert!(all_subscribed(&events).await);

    events.publish(friend_message(1, "slow")).await;
    assert!(eventually(|| entered.load(Ordering::SeqCst) == 1).await);

    events.publish(notice()).await;
    events.publish(notice()).await;
    assert!(eventually(|| notices.load(Ordering::SeqCst) == 2).await);

    release.notify_one();
    assert!(engine.stop().await.is_clean());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_handlers_for_one_event_run_in_order() {
    let events = Arc::new(LoopbackEvents::default());
    let registry = Arc::new(HandlerRegistry::new());
    let log = Arc::new(Mutex::new(Vec::new()));

    let l = log.clone();
    registry.register_suspending(Category::Message, move |_| {
        let l = l.clone();
        async move {
            l.lock().push("first:start");
            tokio::time::sleep(Duration::from_millis(30)).await;
            l.lock().push("first:end");
            Ok(())
        }
    });
    let l = log.clone();
    registry.register_blocking(Category::Message, move |event| {
        assert!(matches!(
            event.chain().and_then(|c| c.iter().next()),
            Some(MessageElement::Plain(_))
        ));
        l.lock().push("second");
        Ok(())
    });

    let engine = Engine::new(passive(&events), registry, options(500));
    engine.start().await.unwrap();
    assert!(all_subscribed(&events).await);

    events.publish(friend_message(1, "ordered")).await;
    assert!(eventually(|| log.lock().len() == 3).await);
    assert_eq!(*log.lock(), vec!["first:start", "first:end", "second"]);

    engine.stop().await;
}

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_stop_reports_stuck_unit() {
    let events = Arc::new(LoopbackEvents::default());
    let registry = Arc::new(HandlerRegistry::new());
    let entered = Arc::new(AtomicUsize::new(0));

    let e = entered.clone();
    registry.register_suspending(Category::Message, move |_| {
        let e = e.clone();
        async move {
            e.fetch_add(1, Ordering::SeqCst);
            futures::future::pending::<()>().await;
            Ok(())
        }
    });

    let engine = Engine::new(passive(&events), registry, options(100));
    engine.start().await.unwrap();
    assert!(all_subscribed(&events).await);

    events.publish(friend_message(1, "stuck")).await;
    assert!(eventually(|| entered.load(Ordering::SeqCst) == 1).await);

    let started = Instant::now();
    let report = engine.stop().await;
    assert!(started.elapsed() < Duration::from_secs(2));

    assert_eq!(report.timed_out, vec!["subscription:message".to_string()]);
    assert_eq!(report.stopped.len(), 3);
    assert_eq!(engine.state(), EngineState::Stopped);
}

#[tokio::test]
async fn test_start_is_not_reentrant() {
    let events = Arc::new(LoopbackEvents::default());
    let engine = Engine::new(
        passive(&events),
        Arc::new(HandlerRegistry::new()),
        options(500),
    );

    engine.start().await.unwrap();
    assert!(matches!(
        engine.start().await,
        Err(RuntimeError::AlreadyRunning)
    ));
    assert!(engine.is_running());

    engine.stop().await;
}

#[tokio::test]
async fn test_stop_when_stopped_is_noop() {
    let events = Arc::new(LoopbackEvents::default());
    let engine = Engine::new(
        passive(&events),
        Arc::new(HandlerRegistry::new()),
        options(500),
    );

    let report = engine.stop().await;
    assert!(report.stopped.is_empty() && report.timed_out.is_empty());
    assert_eq!(engine.state(), EngineState::Stopped);

    engine.start().await.unwrap();
    assert_eq!(engine.stop().await.stopped.len(), 4);
    assert!(engine.stop().await.stopped.is_empty());
}

#[tokio::test]
async fn test_engine_restarts_after_stop() {
    let events = Arc::new(LoopbackEvents::default());
    let registry = Arc::new(HandlerRegistry::new());
    let count = counter(&registry, Category::Request);
    let engine = Engine::new(passive(&events), registry, options(500));

    engine.start().await.unwrap();
    engine.stop().await;

    engine.start().await.unwrap();
    assert!(all_subscribed(&events).await);
    events.publish(request()).await;
    assert!(eventually(|| count.load(Ordering::SeqCst) == 1).await);
    engine.stop().await;
}

// =============================================================================
// Active topology
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_active_push_end_to_end() {
    let server = Arc::new(LoopbackPushServer::new());
    let registry = Arc::new(HandlerRegistry::new());
    let messages = counter(&registry, Category::Message);
    let notices = counter(&registry, Category::Notice);

    let engine = Engine::new(
        Topology::Active {
            server: server.clone() as Arc<dyn PushServer>,
            addr: "localhost:5090".to_string(),
            max_workers: 2,
        },
        registry,
        options(500),
    );
    engine.start().await.unwrap();
    assert_eq!(server.wait_serving().await, "localhost:5090");

    let ack = server
        .push([
            friend_message(1, "one"),
            notice(),
            message_in_scene(42, 1, "undecodable"),
            friend_message(2, "two"),
        ])
        .await
        .unwrap();

    assert_eq!(ack.received, 3);
    assert_eq!(messages.load(Ordering::SeqCst), 2);
    assert_eq!(notices.load(Ordering::SeqCst), 1);

    let report = engine.stop().await;
    assert_eq!(report.stopped, vec!["push-server".to_string()]);
    assert_eq!(server.serving_addr(), None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_active_stop_ends_open_push_stream() {
    let server = Arc::new(LoopbackPushServer::new());
    let registry = Arc::new(HandlerRegistry::new());
    let notices = counter(&registry, Category::Notice);

    let engine = Engine::new(
        Topology::Active {
            server: server.clone(),
            addr: "localhost:5091".to_string(),
            max_workers: 1,
        },
        registry,
        options(500),
    );
    engine.start().await.unwrap();
    server.wait_serving().await;

    let stream = server.open().await.unwrap();
    stream.send(notice()).await.unwrap();
    assert!(eventually(|| notices.load(Ordering::SeqCst) == 1).await);

    let report = engine.stop().await;
    assert!(report.is_clean());

    let ack = stream.finish().await.unwrap();
    assert_eq!(ack.received, 1);
}
