//! # Kritor
//!
//! An event bridge and dispatch engine for Kritor protocol endpoints.
//!
//! Wire events arrive from an RPC collaborator, are decoded into canonical
//! domain events, and are dispatched to handlers registered per category
//! (core, message, notice, request).
//!
//! ```text
//! ┌────────────────┐   ┌──────────┐   ┌──────────────┐   ┌─────────────────┐
//! │ RPC transport  │──▶│  Engine  │──▶│   Decoder    │──▶│   Dispatcher    │
//! │ (subscribe or  │   │ (units)  │   │  (protocol)  │   │ registry[c] in  │
//! │  push)         │   └──────────┘   └──────────────┘   │ order, one at a │
//! └────────────────┘                                     │ time            │
//!                                                        └─────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use kritor::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let transport = LoopbackTransport::new();
//!     let app = KritorApp::builder()
//!         .event_service(transport.events.clone())
//!         .message_service(transport.messages.clone())
//!         .build()?;
//!
//!     app.on_message(|event| async move {
//!         info!(text = %event.chain().map(|c| c.plain_text()).unwrap_or_default());
//!         Ok(())
//!     });
//!
//!     app.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` *(default)*: `kritor.toml` configuration files
//! - `yaml-config`: `kritor.yaml` configuration files
//! - `json-log`: JSON log output
//! - `loopback`: the in-process transport from `kritor-transport`

pub use kritor_core as core;
pub use kritor_framework as framework;
pub use kritor_protocol as protocol;
pub use kritor_runtime as runtime;
#[cfg(feature = "loopback")]
pub use kritor_transport as transport;

/// Common imports for building an application.
pub mod prelude {
    pub use kritor_runtime::{KritorApp, KritorConfig, Mode, RuntimeError, ShutdownReport};

    pub use kritor_framework::{HandlerId, HandlerResult, HandlerTarget, SharedEvent};

    pub use kritor_core::prelude::*;
    pub use kritor_core::{MediaKind, MediaPayload};

    pub use kritor_runtime::prelude::*;

    #[cfg(feature = "loopback")]
    pub use kritor_transport::LoopbackTransport;
}
