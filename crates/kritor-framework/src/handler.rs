//! Handlers and their execution modes.
//!
//! Every handler is registered with an explicit [`ExecutionMode`]. Both modes
//! are invoked through the same [`Handler::invoke`] call and both complete
//! before `invoke` returns, so the caller can run handlers strictly one after
//! another.
//!
//! | Mode | Target signature | Runs on |
//! |------|------------------|---------|
//! | [`ExecutionMode::Blocking`] | `Fn(&DomainEvent) -> anyhow::Result<()>` | blocking thread pool, awaited in place |
//! | [`ExecutionMode::Suspending`] | `Fn(Arc<DomainEvent>) -> impl Future<Output = anyhow::Result<()>>` | the calling task |
//!
//! # Example
//!
//! ```rust,ignore
//! use kritor_framework::HandlerTarget;
//!
//! let log = HandlerTarget::blocking(|event| {
//!     println!("{}", event.event_name());
//!     Ok(())
//! });
//!
//! let reply = HandlerTarget::suspending(|event| async move {
//!     do_something_async(&event).await?;
//!     Ok(())
//! });
//! ```

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use kritor_core::{Category, DomainEvent};
use uuid::Uuid;

use crate::error::HandlerError;

/// Events are shared between the handlers of one dispatch.
pub type SharedEvent = Arc<DomainEvent>;

/// What a handler returns.
pub type HandlerResult = anyhow::Result<()>;

type BlockingFn = dyn Fn(&DomainEvent) -> HandlerResult + Send + Sync;
type SuspendingFn = dyn Fn(SharedEvent) -> BoxFuture<'static, HandlerResult> + Send + Sync;

// ============================================================================
// HandlerId
// ============================================================================

/// Opaque, globally unique handler id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(Uuid);

impl HandlerId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

// ============================================================================
// ExecutionMode / HandlerTarget
// ============================================================================

/// How a handler is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionMode {
    Blocking,
    Suspending,
}

/// An invocable handler target tagged with its execution mode.
#[derive(Clone)]
pub enum HandlerTarget {
    Blocking(Arc<BlockingFn>),
    Suspending(Arc<SuspendingFn>),
}

impl HandlerTarget {
    /// Wraps a synchronous function.
    pub fn blocking<F>(f: F) -> Self
    where
        F: Fn(&DomainEvent) -> HandlerResult + Send + Sync + 'static,
    {
        Self::Blocking(Arc::new(f))
    }

    /// Wraps an async function.
    pub fn suspending<F, Fut>(f: F) -> Self
    where
        F: Fn(SharedEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self::Suspending(Arc::new(move |event| f(event).boxed()))
    }

    /// Returns the execution mode.
    pub fn mode(&self) -> ExecutionMode {
        match self {
            Self::Blocking(_) => ExecutionMode::Blocking,
            Self::Suspending(_) => ExecutionMode::Suspending,
        }
    }
}

impl fmt::Debug for HandlerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HandlerTarget").field(&self.mode()).finish()
    }
}

// ============================================================================
// Handler
// ============================================================================

/// A registered handler.
#[derive(Debug)]
pub struct Handler {
    id: HandlerId,
    category: Category,
    target: HandlerTarget,
}

impl Handler {
    pub(crate) fn new(category: Category, target: HandlerTarget) -> Self {
        Self {
            id: HandlerId::generate(),
            category,
            target,
        }
    }

    pub fn id(&self) -> HandlerId {
        self.id
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn mode(&self) -> ExecutionMode {
        self.target.mode()
    }

    /// Runs the handler to completion.
    ///
    /// Errors and panics are caught and returned as [`HandlerError`].
    pub async fn invoke(&self, event: &SharedEvent) -> Result<(), HandlerError> {
        let outcome = match &self.target {
            HandlerTarget::Blocking(f) => {
                let f = Arc::clone(f);
                let event = Arc::clone(event);
                tokio::task::spawn_blocking(move || f(&event))
                    .await
                    .map_err(|err| match err.try_into_panic() {
                        Ok(payload) => panic_message(payload.as_ref()),
                        Err(err) => err.to_string(),
                    })
            }
            HandlerTarget::Suspending(f) => AssertUnwindSafe(f(Arc::clone(event)))
                .catch_unwind()
                .await
                .map_err(|payload| panic_message(payload.as_ref())),
        };

        match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => Err(HandlerError::Failed {
                id: self.id,
                source,
            }),
            Err(message) => Err(HandlerError::Panicked {
                id: self.id,
                message,
            }),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kritor_core::CorePayload;

    async fn panicking(_: SharedEvent) -> HandlerResult {
        panic!("suspending boom")
    }

    fn event() -> SharedEvent {
        Arc::new(DomainEvent::CoreEvent(CorePayload::default()))
    }

    #[test]
    fn test_mode_tag() {
        assert_eq!(
            HandlerTarget::blocking(|_| Ok(())).mode(),
            ExecutionMode::Blocking
        );
        assert_eq!(
            HandlerTarget::suspending(|_| async { Ok(()) }).mode(),
            ExecutionMode::Suspending
        );
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Handler::new(Category::Core, HandlerTarget::blocking(|_| Ok(())));
        let b = Handler::new(Category::Core, HandlerTarget::blocking(|_| Ok(())));
        assert_ne!(a.id(), b.id());
        assert_eq!(a.id().to_string().len(), 32);
    }

    #[tokio::test]
    async fn test_invoke_reports_error() {
        let handler = Handler::new(
            Category::Core,
            HandlerTarget::suspending(|_| async { Err(anyhow::anyhow!("boom")) }),
        );
        let err = handler.invoke(&event()).await.unwrap_err();
        assert!(matches!(err, HandlerError::Failed { .. }));
        assert_eq!(err.handler_id(), handler.id());
    }

    #[tokio::test]
    async fn test_invoke_catches_panics() {
        let blocking = Handler::new(
            Category::Core,
            HandlerTarget::blocking(|_| panic!("blocking boom")),
        );
        let err = blocking.invoke(&event()).await.unwrap_err();
        assert!(matches!(err, HandlerError::Panicked { ref message, .. } if message == "blocking boom"));

        let suspending = Handler::new(Category::Core, HandlerTarget::suspending(panicking));
        let err = suspending.invoke(&event()).await.unwrap_err();
        assert!(matches!(err, HandlerError::Panicked { .. }));
    }
}
