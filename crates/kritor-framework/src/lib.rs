//! # Kritor Framework
//!
//! Handler registration and dispatch.
//!
//! - [`HandlerRegistry`]: ordered handler lists per category
//! - [`HandlerTarget`]: a handler body tagged with its [`ExecutionMode`]
//! - [`Dispatcher`]: runs the handlers of one event strictly in order
//!
//! ```text
//! DomainEvent ──▶ Dispatcher ──registry[category]──▶ h1 ─▶ h2 ─▶ h3
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use kritor_core::Category;
//! use kritor_framework::{Dispatcher, HandlerRegistry};
//!
//! let registry = Arc::new(HandlerRegistry::new());
//! registry.register_suspending(Category::Message, |event| async move {
//!     println!("{:?}", event.chain());
//!     Ok(())
//! });
//!
//! let dispatcher = Dispatcher::new(registry);
//! dispatcher.dispatch(event).await;
//! ```

pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod registry;

pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use error::HandlerError;
pub use handler::{ExecutionMode, Handler, HandlerId, HandlerResult, HandlerTarget, SharedEvent};
pub use registry::HandlerRegistry;
