//! Outbound message request/response pair.

use serde::{Deserialize, Serialize};

use super::element::Element;
use super::envelope::ContactEnvelope;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub contact: ContactEnvelope,
    pub elements: Vec<Element>,
    /// Forwarded to the collaborator without interpretation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub message_id: String,
    pub message_time: u64,
}
