//! Wire event structures.
//!
//! An [`EventStructure`] is what both the subscription streams (passive
//! mode) and the push stream (active mode) carry.

use kritor_core::Category;
use serde::{Deserialize, Serialize};

use super::element::Element;
use super::envelope::{ContactEnvelope, SenderEnvelope};

/// Event type filter used when subscribing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i32)]
pub enum EventType {
    CoreEvent = 0,
    Message = 1,
    Notice = 2,
    Request = 3,
}

impl EventType {
    /// Returns the event type for a wire value, if it is known.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::CoreEvent),
            1 => Some(Self::Message),
            2 => Some(Self::Notice),
            3 => Some(Self::Request),
            _ => None,
        }
    }

    /// Returns the category events of this type are dispatched under.
    pub fn category(self) -> Category {
        match self {
            Self::CoreEvent => Category::Core,
            Self::Message => Category::Message,
            Self::Notice => Category::Notice,
            Self::Request => Category::Request,
        }
    }
}

impl From<Category> for EventType {
    fn from(category: Category) -> Self {
        match category {
            Category::Core => Self::CoreEvent,
            Category::Message => Self::Message,
            Category::Notice => Self::Notice,
            Category::Request => Self::Request,
        }
    }
}

/// A wire event.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventStructure {
    #[serde(rename = "type", default)]
    pub event_type: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<EventBody>,
}

impl EventStructure {
    /// Wraps a message body.
    pub fn message(body: PushMessageBody) -> Self {
        Self {
            event_type: EventType::Message as i32,
            event: Some(EventBody::Message(body)),
        }
    }

    /// Wraps a notice body.
    pub fn notice(body: NoticeBody) -> Self {
        Self {
            event_type: EventType::Notice as i32,
            event: Some(EventBody::Notice(body)),
        }
    }

    /// Wraps a request body.
    pub fn request(body: RequestBody) -> Self {
        Self {
            event_type: EventType::Request as i32,
            event: Some(EventBody::Request(body)),
        }
    }

    /// Wraps a core body.
    pub fn core(body: CoreBody) -> Self {
        Self {
            event_type: EventType::CoreEvent as i32,
            event: Some(EventBody::Core(body)),
        }
    }

    /// Returns the category of the populated body, falling back to the type tag.
    pub fn category(&self) -> Option<Category> {
        match &self.event {
            Some(EventBody::Message(_)) => Some(Category::Message),
            Some(EventBody::Notice(_)) => Some(Category::Notice),
            Some(EventBody::Request(_)) => Some(Category::Request),
            Some(EventBody::Core(_)) => Some(Category::Core),
            None => EventType::from_code(self.event_type).map(EventType::category),
        }
    }
}

/// Populated body of an [`EventStructure`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventBody {
    Message(PushMessageBody),
    Notice(NoticeBody),
    Request(RequestBody),
    Core(CoreBody),
}

/// A pushed chat message.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PushMessageBody {
    pub time: u64,
    #[serde(default)]
    pub message_id: String,
    pub message_seq: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactEnvelope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<SenderEnvelope>,
    #[serde(default)]
    pub elements: Vec<Element>,
}

/// A pushed notice. The detail is passed through untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NoticeBody {
    #[serde(rename = "type", default)]
    pub notice_type: i32,
    pub time: u64,
    #[serde(default)]
    pub notice_id: String,
    #[serde(default)]
    pub detail: serde_json::Value,
}

/// A pushed request. The detail is passed through untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(rename = "type", default)]
    pub request_type: i32,
    pub time: u64,
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub detail: serde_json::Value,
}

/// A pushed core (lifecycle) event.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CoreBody {
    #[serde(default)]
    pub time: u64,
    #[serde(default)]
    pub detail: serde_json::Value,
}

/// Terminal acknowledgement for a push stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PushAck {
    /// Number of events decoded and dispatched.
    pub received: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_round_trip() {
        for category in Category::ALL {
            assert_eq!(EventType::from(category).category(), category);
        }
        assert_eq!(EventType::from_code(7), None);
    }

    #[test]
    fn test_category_prefers_body() {
        let event = EventStructure {
            event_type: EventType::Request as i32,
            event: Some(EventBody::Notice(NoticeBody::default())),
        };
        assert_eq!(event.category(), Some(Category::Notice));

        let empty = EventStructure {
            event_type: EventType::CoreEvent as i32,
            event: None,
        };
        assert_eq!(empty.category(), Some(Category::Core));
    }

    #[test]
    fn test_push_message_deserialize() {
        let json = r#"{
            "type": 1,
            "event": {"message": {
                "time": 1700000000,
                "message_id": "abc",
                "message_seq": 42,
                "contact": {"scene": 0, "peer": "123456"},
                "sender": {"uid": "u_1", "uin": 10001, "nick": "alice"},
                "elements": [{"type": 0, "data": {"text": {"text": "hi"}}}]
            }}
        }"#;
        let event: EventStructure = serde_json::from_str(json).unwrap();
        let Some(EventBody::Message(body)) = event.event else {
            panic!("expected a message body");
        };
        assert_eq!(body.message_seq, 42);
        assert_eq!(body.contact.map(|c| c.peer).as_deref(), Some("123456"));
        assert_eq!(body.elements.len(), 1);
    }
}
