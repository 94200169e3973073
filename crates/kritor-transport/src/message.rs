//! Loopback message service.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use kritor_core::TransportResult;
use kritor_protocol::MessageService;
use kritor_protocol::model::{SendMessageRequest, SendMessageResponse};
use parking_lot::Mutex;
use tracing::debug;

/// In-process [`MessageService`] that records every request.
#[derive(Default)]
pub struct LoopbackMessages {
    next_id: AtomicU64,
    sent: Mutex<Vec<SendMessageRequest>>,
}

impl LoopbackMessages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every request received so far.
    pub fn sent(&self) -> Vec<SendMessageRequest> {
        self.sent.lock().clone()
    }

    /// Removes and returns every request received so far.
    pub fn take_sent(&self) -> Vec<SendMessageRequest> {
        std::mem::take(&mut *self.sent.lock())
    }
}

#[async_trait]
impl MessageService for LoopbackMessages {
    async fn send_message(
        &self,
        request: SendMessageRequest,
    ) -> TransportResult<SendMessageResponse> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let message_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        debug!(
            peer = %request.contact.peer,
            elements = request.elements.len(),
            "Message sent"
        );
        self.sent.lock().push(request);

        Ok(SendMessageResponse {
            message_id: format!("loopback-{id}"),
            message_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kritor_protocol::model::{ContactEnvelope, Element, ElementData};
    use kritor_protocol::model::element::TextElement;

    #[tokio::test]
    async fn test_send_records_and_numbers() {
        let messages = LoopbackMessages::new();
        let request = SendMessageRequest {
            contact: ContactEnvelope {
                scene: 1,
                peer: "42".into(),
                sub_peer: None,
            },
            elements: vec![Element::new(ElementData::Text(TextElement {
                text: "hi".into(),
            }))],
            retry_count: Some(2),
        };

        let first = messages.send_message(request.clone()).await.unwrap();
        let second = messages.send_message(request.clone()).await.unwrap();
        assert_eq!(first.message_id, "loopback-1");
        assert_eq!(second.message_id, "loopback-2");

        let sent = messages.take_sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], request);
        assert!(messages.sent().is_empty());
    }
}
