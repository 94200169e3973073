//! Service contracts consumed from the RPC collaborator.
//!
//! The engine never talks to the network itself. It is handed
//! implementations of these traits; `kritor-transport` provides an
//! in-process one.
//!
//! | Contract | Used by | Calls |
//! |----------|---------|-------|
//! | [`EventService`] | passive engine | `subscribe` once per category |
//! | [`PushServer`] + [`PushHandler`] | active engine | remote pushes streams in |
//! | [`AuthService`] | application | state, authenticate, tickets |
//! | [`MessageService`] | application | `send_message` |

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use kritor_core::TransportResult;
use tokio_util::sync::CancellationToken;

use crate::model::{
    AddTicketRequest, AuthenticateRequest, AuthenticateResponse, AuthenticationStateRequest,
    AuthenticationStateResponse, DeleteTicketRequest, EventStructure, EventType,
    GetTicketRequest, PushAck, SendMessageRequest, SendMessageResponse, TicketResponse,
};

/// A stream of wire events. Ends when the remote side closes it.
pub type EventStream = BoxStream<'static, TransportResult<EventStructure>>;

// =============================================================================
// Event Service
// =============================================================================

/// Outbound event subscriptions (passive mode).
#[async_trait]
pub trait EventService: Send + Sync {
    /// Opens a long-lived subscription for one event type.
    async fn subscribe(&self, event_type: EventType) -> TransportResult<EventStream>;
}

/// Receiver side of a push stream (active mode).
///
/// The engine implements this; the push server calls it once per inbound
/// stream.
#[async_trait]
pub trait PushHandler: Send + Sync {
    /// Consumes one pushed stream to its end and acknowledges it.
    async fn on_push(&self, events: EventStream) -> TransportResult<PushAck>;
}

/// Streaming endpoint that remote peers push events into (active mode).
#[async_trait]
pub trait PushServer: Send + Sync {
    /// Serves until `shutdown` is cancelled.
    ///
    /// At most `max_workers` streams are handled concurrently.
    async fn serve(
        &self,
        addr: &str,
        max_workers: usize,
        handler: Arc<dyn PushHandler>,
        shutdown: CancellationToken,
    ) -> TransportResult<()>;
}

// =============================================================================
// Auth Service
// =============================================================================

/// Authentication and ticket management. A thin pass-through.
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn get_authentication_state(
        &self,
        request: AuthenticationStateRequest,
    ) -> TransportResult<AuthenticationStateResponse>;

    async fn authenticate(
        &self,
        request: AuthenticateRequest,
    ) -> TransportResult<AuthenticateResponse>;

    async fn get_ticket(&self, request: GetTicketRequest) -> TransportResult<TicketResponse>;

    async fn add_ticket(&self, request: AddTicketRequest) -> TransportResult<TicketResponse>;

    async fn delete_ticket(&self, request: DeleteTicketRequest)
    -> TransportResult<TicketResponse>;
}

// =============================================================================
// Message Service
// =============================================================================

/// Outbound message sending.
#[async_trait]
pub trait MessageService: Send + Sync {
    async fn send_message(&self, request: SendMessageRequest)
    -> TransportResult<SendMessageResponse>;
}
