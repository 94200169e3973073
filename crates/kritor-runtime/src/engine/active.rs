//! Active topology: a push endpoint served by the RPC collaborator.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use kritor_core::TransportResult;
use kritor_framework::Dispatcher;
use kritor_protocol::{EventStream, PushAck, PushHandler, PushServer};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info_span, warn};

use super::pipeline::process;

/// Receives pushed streams and dispatches each item in place.
pub(crate) struct PushEndpoint {
    dispatcher: Dispatcher,
    token: CancellationToken,
}

impl PushEndpoint {
    pub(crate) fn new(dispatcher: Dispatcher, token: CancellationToken) -> Self {
        Self { dispatcher, token }
    }
}

#[async_trait]
impl PushHandler for PushEndpoint {
    async fn on_push(&self, mut events: EventStream) -> TransportResult<PushAck> {
        let mut received = 0;

        loop {
            let next = tokio::select! {
                biased;
                _ = self.token.cancelled() => break,
                next = events.next() => next,
            };

            match next {
                Some(Ok(wire)) => {
                    if process(&self.dispatcher, &wire).await {
                        received += 1;
                    }
                }
                Some(Err(e)) => {
                    warn!(error = %e, "Push stream failed");
                    break;
                }
                None => break,
            }
        }

        debug!(received, "Push stream finished");
        Ok(PushAck { received })
    }
}

/// Serves the push endpoint until `token` is cancelled.
pub(crate) async fn run_server(
    server: Arc<dyn PushServer>,
    addr: String,
    max_workers: usize,
    dispatcher: Dispatcher,
    token: CancellationToken,
) {
    let endpoint = Arc::new(PushEndpoint::new(dispatcher, token.clone()));
    let span = info_span!("push_server", addr = %addr);

    async move {
        if let Err(e) = server.serve(&addr, max_workers, endpoint, token).await {
            error!(error = %e, "Push server failed");
        }
    }
    .instrument(span)
    .await
}
