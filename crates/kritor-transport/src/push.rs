//! Loopback push endpoint.
//!
//! [`LoopbackPushServer`] stands in for the streaming server the remote
//! peer pushes events into. The client half ([`LoopbackPushServer::open`])
//! plays the remote peer.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use kritor_core::{TransportError, TransportResult};
use kritor_protocol::{EventStructure, PushAck, PushHandler, PushServer};
use parking_lot::Mutex;
use tokio::sync::{Semaphore, mpsc, oneshot, watch};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::events::receiver_stream;

const STREAM_CAPACITY: usize = 64;

/// An inbound stream waiting for a worker.
struct PendingPush {
    events: mpsc::Receiver<TransportResult<EventStructure>>,
    ack: oneshot::Sender<TransportResult<PushAck>>,
}

/// In-process [`PushServer`].
pub struct LoopbackPushServer {
    inbox: Mutex<Option<mpsc::Sender<PendingPush>>>,
    serving: watch::Sender<Option<String>>,
    active: Arc<AtomicUsize>,
}

impl LoopbackPushServer {
    /// Creates a server that is not yet serving.
    pub fn new() -> Self {
        let (serving, _) = watch::channel(None);
        Self {
            inbox: Mutex::new(None),
            serving,
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Returns the address being served, if any.
    pub fn serving_addr(&self) -> Option<String> {
        self.serving.borrow().clone()
    }

    /// Waits until `serve` is accepting streams and returns its address.
    pub async fn wait_serving(&self) -> String {
        let mut rx = self.serving.subscribe();
        match rx.wait_for(Option::is_some).await {
            Ok(addr) => addr.clone().unwrap_or_default(),
            Err(_) => String::new(),
        }
    }

    /// Returns the number of streams currently being handled.
    pub fn active_streams(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Opens a push stream, as the remote peer would.
    pub async fn open(&self) -> TransportResult<PushStream> {
        let inbox = self
            .inbox
            .lock()
            .clone()
            .ok_or(TransportError::Unavailable { service: "push" })?;

        let (tx, events) = mpsc::channel(STREAM_CAPACITY);
        let (ack_tx, ack) = oneshot::channel();
        inbox
            .send(PendingPush {
                events,
                ack: ack_tx,
            })
            .await
            .map_err(|_| TransportError::Unavailable { service: "push" })?;

        Ok(PushStream { tx, ack })
    }

    /// Pushes a finite batch of events as one stream and waits for the ack.
    pub async fn push(
        &self,
        events: impl IntoIterator<Item = EventStructure>,
    ) -> TransportResult<PushAck> {
        let stream = self.open().await?;
        for event in events {
            stream.send(event).await?;
        }
        stream.finish().await
    }

    fn stop_accepting(&self) {
        *self.inbox.lock() = None;
        self.serving.send_replace(None);
    }
}

impl Default for LoopbackPushServer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PushServer for LoopbackPushServer {
    async fn serve(
        &self,
        addr: &str,
        max_workers: usize,
        handler: Arc<dyn PushHandler>,
        shutdown: CancellationToken,
    ) -> TransportResult<()> {
        let max_workers = max_workers.max(1);
        let (tx, mut rx) = mpsc::channel(max_workers);
        {
            let mut inbox = self.inbox.lock();
            if inbox.as_ref().is_some_and(|tx| !tx.is_closed()) {
                return Err(TransportError::Io(format!("address {addr} already in use")));
            }
            *inbox = Some(tx);
        }
        self.serving.send_replace(Some(addr.to_string()));
        info!(addr, max_workers, "Push server listening");

        let permits = Arc::new(Semaphore::new(max_workers));
        let mut workers = JoinSet::new();

        loop {
            let pending = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                pending = rx.recv() => match pending {
                    Some(pending) => pending,
                    None => break,
                },
            };

            let permit = tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    let _ = pending.ack.send(Err(TransportError::Unavailable { service: "push" }));
                    break;
                }
                permit = permits.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let handler = handler.clone();
            let active = self.active.clone();
            workers.spawn(async move {
                active.fetch_add(1, Ordering::SeqCst);
                let result = handler.on_push(receiver_stream(pending.events)).await;
                active.fetch_sub(1, Ordering::SeqCst);
                drop(permit);
                if pending.ack.send(result).is_err() {
                    debug!("Push client went away before the ack");
                }
            });

            while workers.try_join_next().is_some() {}
        }

        self.stop_accepting();
        rx.close();
        while let Ok(pending) = rx.try_recv() {
            let _ = pending
                .ack
                .send(Err(TransportError::Unavailable { service: "push" }));
        }

        let in_flight = workers.len();
        if in_flight > 0 {
            debug!(in_flight, "Waiting for push workers");
        }
        while let Some(result) = workers.join_next().await {
            if let Err(e) = result {
                warn!(error = %e, "Push worker failed");
            }
        }

        info!(addr, "Push server stopped");
        Ok(())
    }
}

/// Client half of one push stream.
pub struct PushStream {
    tx: mpsc::Sender<TransportResult<EventStructure>>,
    ack: oneshot::Receiver<TransportResult<PushAck>>,
}

impl PushStream {
    /// Sends one event down the stream.
    pub async fn send(&self, event: EventStructure) -> TransportResult<()> {
        self.tx
            .send(Ok(event))
            .await
            .map_err(|_| TransportError::StreamClosed)
    }

    /// Sends a transport error down the stream.
    pub async fn fail(&self, error: TransportError) -> TransportResult<()> {
        self.tx
            .send(Err(error))
            .await
            .map_err(|_| TransportError::StreamClosed)
    }

    /// Closes the stream and waits for the server's ack.
    pub async fn finish(self) -> TransportResult<PushAck> {
        drop(self.tx);
        self.ack.await.map_err(|_| TransportError::StreamClosed)?
    }
}
