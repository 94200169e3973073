//! Loopback event subscriptions.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::StreamExt;
use kritor_core::{TransportError, TransportResult};
use kritor_protocol::{EventService, EventStream, EventStructure, EventType};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, trace};

type Subscriber = mpsc::Sender<TransportResult<EventStructure>>;

/// In-process [`EventService`].
///
/// Every call to `subscribe` opens a new stream. Events handed to
/// [`publish`](Self::publish) are fanned out to the live streams of the
/// matching type.
pub struct LoopbackEvents {
    capacity: usize,
    subscribers: Mutex<HashMap<EventType, Vec<Subscriber>>>,
    opened: Mutex<HashMap<EventType, usize>>,
}

impl LoopbackEvents {
    /// Creates a service whose streams buffer up to `capacity` events.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            subscribers: Mutex::new(HashMap::new()),
            opened: Mutex::new(HashMap::new()),
        }
    }

    /// Delivers an event to every live subscriber of its type.
    ///
    /// Returns the number of subscribers that received it. Events whose
    /// category cannot be determined are delivered to nobody.
    pub async fn publish(&self, event: EventStructure) -> usize {
        let Some(category) = event.category() else {
            debug!(event_type = event.event_type, "Dropping event with unknown type");
            return 0;
        };
        self.send_to(EventType::from(category), Ok(event)).await
    }

    /// Delivers a transport error to every live subscriber of `event_type`.
    pub async fn fail(&self, event_type: EventType, error: TransportError) -> usize {
        self.send_to(event_type, Err(error)).await
    }

    /// Ends every open stream of `event_type`.
    pub fn close(&self, event_type: EventType) {
        if let Some(subscribers) = self.subscribers.lock().remove(&event_type) {
            debug!(?event_type, closed = subscribers.len(), "Closed subscriptions");
        }
    }

    /// Returns the number of live streams for `event_type`.
    pub fn subscriber_count(&self, event_type: EventType) -> usize {
        self.subscribers
            .lock()
            .get(&event_type)
            .map_or(0, |subs| subs.iter().filter(|s| !s.is_closed()).count())
    }

    /// Returns how many times `event_type` has been subscribed to.
    pub fn subscriptions_opened(&self, event_type: EventType) -> usize {
        self.opened.lock().get(&event_type).copied().unwrap_or(0)
    }

    async fn send_to(&self, event_type: EventType, item: TransportResult<EventStructure>) -> usize {
        let targets: Vec<Subscriber> = {
            let mut subscribers = self.subscribers.lock();
            let list = subscribers.entry(event_type).or_default();
            list.retain(|s| !s.is_closed());
            list.clone()
        };

        let mut delivered = 0;
        for target in targets {
            if target.send(item.clone()).await.is_ok() {
                delivered += 1;
            }
        }
        trace!(?event_type, delivered, "Published event");
        delivered
    }
}

impl Default for LoopbackEvents {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl EventService for LoopbackEvents {
    async fn subscribe(&self, event_type: EventType) -> TransportResult<EventStream> {
        let (tx, rx) = mpsc::channel(self.capacity);
        self.subscribers
            .lock()
            .entry(event_type)
            .or_default()
            .push(tx);
        *self.opened.lock().entry(event_type).or_default() += 1;
        debug!(?event_type, "Opened subscription");

        Ok(receiver_stream(rx))
    }
}

pub(crate) fn receiver_stream(
    rx: mpsc::Receiver<TransportResult<EventStructure>>,
) -> EventStream {
    futures::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|item| (item, rx))
    })
    .boxed()
}
