//! Contact and sender envelopes attached to every wire message.

use serde::{Deserialize, Serialize};

/// Conversation a message belongs to.
///
/// `scene` is kept as the raw wire integer so that unknown values survive
/// transport and can be rejected by the decoder.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactEnvelope {
    pub scene: i32,
    pub peer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_peer: Option<String>,
}

/// Who sent a message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SenderEnvelope {
    #[serde(default)]
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uin: Option<u64>,
    #[serde(default)]
    pub nick: String,
}

impl SenderEnvelope {
    /// Returns the numeric account id, falling back to a numeric `uid`.
    pub fn account_id(&self) -> Option<u64> {
        self.uin.or_else(|| self.uid.parse().ok())
    }
}
