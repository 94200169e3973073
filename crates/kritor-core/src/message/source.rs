//! Message provenance.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Where a message sits in its conversation.
///
/// Built once while decoding and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Source {
    /// Sequence number of the message within the conversation.
    pub id: u64,
    /// Opaque message id assigned by the remote service.
    #[serde(default)]
    pub message_id: String,
    /// Send time as unix seconds.
    pub time: u64,
}

impl Source {
    /// Creates a source record.
    pub fn new(id: u64, message_id: impl Into<String>, time: u64) -> Self {
        Self {
            id,
            message_id: message_id.into(),
            time,
        }
    }

    /// Returns the send time as a [`SystemTime`].
    pub fn timestamp(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(self.time)
    }
}
