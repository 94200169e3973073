//! # Kritor Transport
//!
//! In-process implementations of the service contracts in
//! `kritor-protocol`. They let the engine run end-to-end without a network:
//! tests and demos publish wire events into them and observe what the
//! application sends back.
//!
//! | Type | Contract |
//! |------|----------|
//! | [`LoopbackEvents`] | `EventService` |
//! | [`LoopbackPushServer`] | `PushServer` |
//! | [`LoopbackAuth`] | `AuthService` |
//! | [`LoopbackMessages`] | `MessageService` |

mod auth;
mod events;
mod message;
mod push;

use std::sync::Arc;

pub use auth::LoopbackAuth;
pub use events::LoopbackEvents;
pub use message::LoopbackMessages;
pub use push::{LoopbackPushServer, PushStream};

/// One of each loopback service, shared behind `Arc`s.
#[derive(Clone, Default)]
pub struct LoopbackTransport {
    pub events: Arc<LoopbackEvents>,
    pub push: Arc<LoopbackPushServer>,
    pub auth: Arc<LoopbackAuth>,
    pub messages: Arc<LoopbackMessages>,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the auth store.
    pub fn with_auth(mut self, auth: LoopbackAuth) -> Self {
        self.auth = Arc::new(auth);
        self
    }
}
