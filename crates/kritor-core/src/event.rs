//! Domain event model.
//!
//! Every wire event is turned into exactly one [`DomainEvent`]. Events are
//! immutable once built, handed to handlers, and then dropped.
//!
//! ```text
//! DomainEvent
//! ├── FriendMessage      (Category::Message)
//! ├── GroupMessage       (Category::Message)
//! ├── StrangerMessage    (Category::Message)
//! ├── OtherClientMessage (Category::Message)
//! ├── NoticeEvent        (Category::Notice)
//! ├── RequestEvent       (Category::Request)
//! └── CoreEvent          (Category::Core)
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::contact::{Client, Contact, Friend, Member, Sender, Stranger};
use crate::message::{MessageChain, Source};

// ============================================================================
// Category
// ============================================================================

/// Partition used for both subscriptions and handler registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Core,
    Message,
    Notice,
    Request,
}

impl Category {
    /// All categories, in subscription order.
    pub const ALL: [Category; 4] = [
        Category::Core,
        Category::Message,
        Category::Notice,
        Category::Request,
    ];

    /// Returns the category name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Message => "message",
            Self::Notice => "notice",
            Self::Request => "request",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "core" => Ok(Self::Core),
            "message" => Ok(Self::Message),
            "notice" => Ok(Self::Notice),
            "request" => Ok(Self::Request),
            other => Err(format!("unknown event category: {other}")),
        }
    }
}

// ============================================================================
// Payloads
// ============================================================================

/// A decoded chat message together with who sent it and where it sits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEvent<S> {
    pub chain: MessageChain,
    pub sender: S,
    pub source: Source,
}

pub type FriendMessage = MessageEvent<Friend>;
pub type GroupMessage = MessageEvent<Member>;
pub type StrangerMessage = MessageEvent<Stranger>;
pub type OtherClientMessage = MessageEvent<Client>;

/// Notice payload, passed through from the wire untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NoticePayload {
    pub notice_type: i32,
    pub time: u64,
    pub notice_id: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Request payload, passed through from the wire untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequestPayload {
    pub request_type: i32,
    pub time: u64,
    pub request_id: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Core (lifecycle) payload, passed through from the wire untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CorePayload {
    pub time: u64,
    #[serde(default)]
    pub data: serde_json::Value,
}

// ============================================================================
// DomainEvent
// ============================================================================

/// A normalized event ready for dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    FriendMessage(FriendMessage),
    GroupMessage(GroupMessage),
    StrangerMessage(StrangerMessage),
    OtherClientMessage(OtherClientMessage),
    NoticeEvent(NoticePayload),
    RequestEvent(RequestPayload),
    CoreEvent(CorePayload),
}

impl DomainEvent {
    /// Builds the message event matching the sender variant.
    pub fn from_message(chain: MessageChain, source: Source, sender: Sender) -> Self {
        match sender {
            Sender::Friend(sender) => Self::FriendMessage(MessageEvent {
                chain,
                sender,
                source,
            }),
            Sender::Member(sender) => Self::GroupMessage(MessageEvent {
                chain,
                sender,
                source,
            }),
            Sender::Stranger(sender) => Self::StrangerMessage(MessageEvent {
                chain,
                sender,
                source,
            }),
            Sender::Client(sender) => Self::OtherClientMessage(MessageEvent {
                chain,
                sender,
                source,
            }),
        }
    }

    /// Returns the category this event is dispatched under.
    pub fn category(&self) -> Category {
        match self {
            Self::FriendMessage(_)
            | Self::GroupMessage(_)
            | Self::StrangerMessage(_)
            | Self::OtherClientMessage(_) => Category::Message,
            Self::NoticeEvent(_) => Category::Notice,
            Self::RequestEvent(_) => Category::Request,
            Self::CoreEvent(_) => Category::Core,
        }
    }

    /// Returns a dotted event name, e.g. `message.group`.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::FriendMessage(_) => "message.friend",
            Self::GroupMessage(_) => "message.group",
            Self::StrangerMessage(_) => "message.stranger",
            Self::OtherClientMessage(_) => "message.other_client",
            Self::NoticeEvent(_) => "notice",
            Self::RequestEvent(_) => "request",
            Self::CoreEvent(_) => "core",
        }
    }

    /// Returns the message chain for message events.
    pub fn chain(&self) -> Option<&MessageChain> {
        match self {
            Self::FriendMessage(e) => Some(&e.chain),
            Self::GroupMessage(e) => Some(&e.chain),
            Self::StrangerMessage(e) => Some(&e.chain),
            Self::OtherClientMessage(e) => Some(&e.chain),
            Self::NoticeEvent(_) | Self::RequestEvent(_) | Self::CoreEvent(_) => None,
        }
    }

    /// Returns the message source for message events.
    pub fn source(&self) -> Option<&Source> {
        match self {
            Self::FriendMessage(e) => Some(&e.source),
            Self::GroupMessage(e) => Some(&e.source),
            Self::StrangerMessage(e) => Some(&e.source),
            Self::OtherClientMessage(e) => Some(&e.source),
            Self::NoticeEvent(_) | Self::RequestEvent(_) | Self::CoreEvent(_) => None,
        }
    }

    /// Returns the sender id for message events.
    pub fn sender_id(&self) -> Option<u64> {
        match self {
            Self::FriendMessage(e) => Some(e.sender.id),
            Self::GroupMessage(e) => Some(e.sender.id),
            Self::StrangerMessage(e) => Some(e.sender.id),
            Self::OtherClientMessage(e) => Some(e.sender.id),
            Self::NoticeEvent(_) | Self::RequestEvent(_) | Self::CoreEvent(_) => None,
        }
    }

    /// Returns where a reply to this event should be routed.
    pub fn reply_contact(&self) -> Option<Contact> {
        match self {
            Self::FriendMessage(e) => Some(Contact::from(&e.sender)),
            Self::GroupMessage(e) => Some(Contact::from(&e.sender.group)),
            Self::StrangerMessage(e) => Sender::Stranger(e.sender.clone()).reply_contact(),
            Self::OtherClientMessage(_)
            | Self::NoticeEvent(_)
            | Self::RequestEvent(_)
            | Self::CoreEvent(_) => None,
        }
    }
}
