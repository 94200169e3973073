//! Sequential event dispatcher.
//!
//! For an event of category `c` the dispatcher takes a snapshot of
//! `registry[c]` and invokes each handler in registration order. A handler
//! is always finished, whatever its mode, before the next one starts.
//!
//! A failing handler does not stop the dispatch. Its error is logged and
//! collected in the returned [`DispatchOutcome`], and the remaining handlers
//! still run.

use std::sync::Arc;

use kritor_core::DomainEvent;
use tracing::{Instrument, debug_span, error, trace};

use crate::error::HandlerError;
use crate::handler::SharedEvent;
use crate::registry::HandlerRegistry;

/// Result of dispatching one event.
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    /// Number of handlers that were invoked.
    pub invoked: usize,
    /// Errors from handlers that failed.
    pub failures: Vec<HandlerError>,
}

impl DispatchOutcome {
    /// Returns `true` if every invoked handler succeeded.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Invokes registry handlers for events.
///
/// Cheap to clone; clones share the same registry.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<HandlerRegistry>,
}

impl Dispatcher {
    /// Creates a dispatcher over `registry`.
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self { registry }
    }

    /// Returns the registry this dispatcher reads from.
    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    /// Dispatches an owned event.
    pub async fn dispatch(&self, event: DomainEvent) -> DispatchOutcome {
        self.dispatch_shared(Arc::new(event)).await
    }

    /// Dispatches a shared event to every handler of its category.
    pub async fn dispatch_shared(&self, event: SharedEvent) -> DispatchOutcome {
        let category = event.category();
        let handlers = self.registry.handlers(category);
        let span = debug_span!(
            "dispatch",
            event = event.event_name(),
            category = %category,
            handlers = handlers.len()
        );

        async move {
            let mut outcome = DispatchOutcome::default();

            for handler in handlers {
                outcome.invoked += 1;
                match handler.invoke(&event).await {
                    Ok(()) => trace!(handler_id = %handler.id(), "Handler completed"),
                    Err(err) => {
                        error!(handler_id = %handler.id(), error = %err, "Handler failed");
                        outcome.failures.push(err);
                    }
                }
            }

            outcome
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use kritor_core::{Category, CorePayload, NoticePayload};
    use parking_lot::Mutex;

    fn notice() -> DomainEvent {
        DomainEvent::NoticeEvent(NoticePayload::default())
    }

    #[tokio::test]
    async fn test_dispatch_no_handlers() {
        let dispatcher = Dispatcher::new(Arc::new(HandlerRegistry::new()));
        let outcome = dispatcher.dispatch(notice()).await;
        assert_eq!(outcome.invoked, 0);
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn test_dispatch_only_matching_category() {
        let registry = Arc::new(HandlerRegistry::new());
        let counter = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&counter);
        registry.register_blocking(Category::Notice, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let c = Arc::clone(&counter);
        registry.register_blocking(Category::Core, move |_| {
            c.fetch_add(10, Ordering::SeqCst);
            Ok(())
        });

        let dispatcher = Dispatcher::new(registry);
        dispatcher.dispatch(notice()).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        dispatcher
            .dispatch(DomainEvent::CoreEvent(CorePayload::default()))
            .await;
        assert_eq!(counter.load(Ordering::SeqCst), 11);
    }

    #[tokio::test]
    async fn test_handlers_run_strictly_in_order() {
        let registry = Arc::new(HandlerRegistry::new());
        let log = Arc::new(Mutex::new(Vec::new()));

        let l = Arc::clone(&log);
        registry.register_suspending(Category::Notice, move |_| {
            let l = Arc::clone(&l);
            async move {
                l.lock().push("a:start");
                tokio::time::sleep(Duration::from_millis(30)).await;
                l.lock().push("a:end");
                Ok(())
            }
        });
        let l = Arc::clone(&log);
        registry.register_blocking(Category::Notice, move |_| {
            l.lock().push("b:start");
            std::thread::sleep(Duration::from_millis(30));
            l.lock().push("b:end");
            Ok(())
        });
        let l = Arc::clone(&log);
        registry.register_suspending(Category::Notice, move |_| {
            let l = Arc::clone(&l);
            async move {
                l.lock().push("c:start");
                Ok(())
            }
        });

        Dispatcher::new(registry).dispatch(notice()).await;
        assert_eq!(
            *log.lock(),
            ["a:start", "a:end", "b:start", "b:end", "c:start"]
        );
    }

    #[tokio::test]
    async fn test_removed_handler_is_not_invoked() {
        let registry = Arc::new(HandlerRegistry::new());
        let counter = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&counter);
        let id = registry.register_blocking(Category::Notice, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let dispatcher = Dispatcher::new(Arc::clone(&registry));
        dispatcher.dispatch(notice()).await;
        assert!(registry.remove(id));
        dispatcher.dispatch(notice()).await;
        dispatcher.dispatch(notice()).await;

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failures_are_isolated() {
        let registry = Arc::new(HandlerRegistry::new());
        let counter = Arc::new(AtomicUsize::new(0));

        let failing = registry.register_suspending(Category::Notice, |_| async {
            Err(anyhow::anyhow!("handler error"))
        });
        let panicking = registry.register_blocking(Category::Notice, |_| panic!("handler panic"));
        let c = Arc::clone(&counter);
        registry.register_blocking(Category::Notice, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let outcome = Dispatcher::new(registry).dispatch(notice()).await;

        assert_eq!(outcome.invoked, 3);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        let failed: Vec<_> = outcome.failures.iter().map(HandlerError::handler_id).collect();
        assert_eq!(failed, [failing, panicking]);
    }

    #[test]
    fn test_dispatch_outside_async_test() {
        let registry = Arc::new(HandlerRegistry::new());
        registry.register_suspending(Category::Notice, |_| async { Ok(()) });

        let outcome = tokio_test::block_on(Dispatcher::new(registry).dispatch(notice()));
        assert_eq!(outcome.invoked, 1);
    }
}
