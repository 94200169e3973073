//! Canonical message elements.
//!
//! Each [`MessageElement`] is one unit of rendered content inside a
//! [`MessageChain`](super::MessageChain). The set of variants is closed: wire
//! shapes that have no canonical counterpart are dropped by the decoder
//! instead of being carried as placeholders.
//!
//! # Example
//!
//! ```rust,ignore
//! use kritor_core::message::{MessageElement, MediaPayload};
//!
//! let text = MessageElement::plain("Hello, ");
//! let at = MessageElement::at(10001000);
//! let image = MessageElement::image(MediaPayload::Url("https://example.com/a.png".into()));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// MessageElement
// ============================================================================

/// A single canonical message element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageElement {
    /// Plain text.
    Plain(Plain),
    /// Mention of one user.
    At(At),
    /// Mention of everyone in the conversation.
    AtAll,
    /// Built-in face/emoji.
    Face(Face),
    /// Bubble face repeated `count` times.
    BubbleFace(BubbleFace),
    /// Reference to an earlier message.
    Quote(Quote),
    /// Image, voice or video content.
    Multimedia(Multimedia),
    /// Dice roll with its rolled value.
    Dice(Dice),
}

impl MessageElement {
    /// Creates a plain text element.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Plain(Plain { text: text.into() })
    }

    /// Creates a mention of `target`.
    pub fn at(target: impl ToString) -> Self {
        Self::At(At {
            target: target.to_string(),
        })
    }

    /// Creates a mention of everyone.
    pub fn at_all() -> Self {
        Self::AtAll
    }

    /// Creates a face element.
    pub fn face(id: u32) -> Self {
        Self::Face(Face {
            id,
            name: None,
            is_big: false,
        })
    }

    /// Creates a bubble face element.
    pub fn bubble_face(id: u32, count: u32) -> Self {
        Self::BubbleFace(BubbleFace { id, count })
    }

    /// Creates a quote of the message identified by `message_id`.
    pub fn quote(message_id: impl Into<String>) -> Self {
        Self::Quote(Quote {
            message_id: message_id.into(),
        })
    }

    /// Creates an image element.
    pub fn image(payload: MediaPayload) -> Self {
        Self::Multimedia(Multimedia::new(MediaKind::Image, payload))
    }

    /// Creates a voice element.
    pub fn voice(payload: MediaPayload) -> Self {
        Self::Multimedia(Multimedia::new(MediaKind::Voice, payload))
    }

    /// Creates a video element.
    pub fn video(payload: MediaPayload) -> Self {
        Self::Multimedia(Multimedia::new(MediaKind::Video, payload))
    }

    /// Creates a dice element.
    pub fn dice(value: u32) -> Self {
        Self::Dice(Dice { value })
    }

    /// Returns the element type name.
    pub fn element_type(&self) -> &'static str {
        match self {
            Self::Plain(_) => "plain",
            Self::At(_) => "at",
            Self::AtAll => "at_all",
            Self::Face(_) => "face",
            Self::BubbleFace(_) => "bubble_face",
            Self::Quote(_) => "quote",
            Self::Multimedia(media) => media.kind.as_str(),
            Self::Dice(_) => "dice",
        }
    }

    /// Returns the text if this is a plain element.
    pub fn as_plain(&self) -> Option<&str> {
        match self {
            Self::Plain(plain) => Some(&plain.text),
            _ => None,
        }
    }
}

impl fmt::Display for MessageElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(plain) => write!(f, "{}", plain.text),
            Self::At(at) => write!(f, "@{}", at.target),
            Self::AtAll => write!(f, "@all"),
            Self::Face(face) => match &face.name {
                Some(name) => write!(f, "[face:{name}]"),
                None => write!(f, "[face:{}]", face.id),
            },
            Self::BubbleFace(face) => write!(f, "[bubble_face:{}x{}]", face.id, face.count),
            Self::Quote(quote) => write!(f, "[quote:{}]", quote.message_id),
            Self::Multimedia(media) => write!(f, "[{}]", media.kind.as_str()),
            Self::Dice(dice) => write!(f, "[dice:{}]", dice.value),
        }
    }
}

impl From<&str> for MessageElement {
    fn from(text: &str) -> Self {
        Self::plain(text)
    }
}

impl From<String> for MessageElement {
    fn from(text: String) -> Self {
        Self::plain(text)
    }
}

// ============================================================================
// Element Data Types
// ============================================================================

/// Plain text element data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plain {
    /// Text content.
    pub text: String,
}

/// Mention element data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct At {
    /// Mentioned user id.
    pub target: String,
}

/// Face element data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Face {
    /// Face id.
    pub id: u32,
    /// Display name, when the source provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Whether the face is rendered large.
    #[serde(default)]
    pub is_big: bool,
}

/// Bubble face element data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BubbleFace {
    /// Face id.
    pub id: u32,
    /// Number of repetitions.
    pub count: u32,
}

/// Quote element data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Id of the quoted message.
    pub message_id: String,
}

/// Dice element data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dice {
    /// Rolled value.
    pub value: u32,
}

// ============================================================================
// Multimedia
// ============================================================================

/// Kind of multimedia content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Voice,
    Video,
}

impl MediaKind {
    /// Returns the kind name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Voice => "voice",
            Self::Video => "video",
        }
    }
}

/// Where multimedia content lives. Exactly one form is carried.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaPayload {
    /// Raw bytes carried inline.
    Inline(Vec<u8>),
    /// Path on the local machine.
    LocalPath(String),
    /// File name known to the remote service.
    RemotePath(String),
    /// Downloadable URL.
    Url(String),
}

impl fmt::Debug for MediaPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline(bytes) => write!(f, "Inline({} bytes)", bytes.len()),
            Self::LocalPath(path) => f.debug_tuple("LocalPath").field(path).finish(),
            Self::RemotePath(path) => f.debug_tuple("RemotePath").field(path).finish(),
            Self::Url(url) => f.debug_tuple("Url").field(url).finish(),
        }
    }
}

/// Multimedia element data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Multimedia {
    /// Content kind.
    pub kind: MediaKind,
    /// Content location.
    pub payload: MediaPayload,
    /// Content-identifying hash (md5 hex on the wire).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl Multimedia {
    /// Creates multimedia data without a hash.
    pub fn new(kind: MediaKind, payload: MediaPayload) -> Self {
        Self {
            kind,
            payload,
            hash: None,
        }
    }

    /// Sets the content hash.
    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }
}
