//! Wire element union.
//!
//! An [`Element`] carries a redundant numeric `type` field next to the
//! populated variant slot. The slot is authoritative: the numeric field is
//! unreliable in the wild and decoding never reads it.
//!
//! ```text
//! Element { type, data }
//! └── ElementData
//!     ├── text / at / face / bubble_face / reply / dice      (mapped)
//!     ├── image / voice / video ── MediaData                 (mapped)
//!     │   └── file | file_name | file_path | file_url
//!     └── basketball / rps / poke / music / weather / ...    (unmapped)
//! ```

use serde::{Deserialize, Serialize};

// ============================================================================
// Element
// ============================================================================

/// One element of a wire message.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Element {
    /// Redundant type tag. See [`ElementType`].
    #[serde(rename = "type", default)]
    pub element_type: i32,
    /// The populated variant slot, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ElementData>,
}

impl Element {
    /// Creates an element with its type tag derived from the data.
    pub fn new(data: ElementData) -> Self {
        Self {
            element_type: data.element_type() as i32,
            data: Some(data),
        }
    }
}

impl From<ElementData> for Element {
    fn from(data: ElementData) -> Self {
        Self::new(data)
    }
}

/// Numeric element type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ElementType {
    Text = 0,
    At = 1,
    Face = 2,
    BubbleFace = 3,
    Reply = 4,
    Image = 5,
    Voice = 6,
    Video = 7,
    Basketball = 8,
    Dice = 9,
    Rps = 10,
    Poke = 11,
    Music = 12,
    Weather = 13,
    Location = 14,
    Share = 15,
    Gift = 16,
    MarketFace = 17,
    Forward = 18,
    Contact = 19,
    Json = 20,
    Xml = 21,
    File = 22,
    Markdown = 23,
    Keyboard = 24,
}

/// The variant slots of an [`Element`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementData {
    Text(TextElement),
    At(AtElement),
    Face(FaceElement),
    BubbleFace(BubbleFaceElement),
    Reply(ReplyElement),
    Image(ImageElement),
    Voice(VoiceElement),
    Video(VideoElement),
    Basketball(BasketballElement),
    Dice(DiceElement),
    Rps(RpsElement),
    Poke(PokeElement),
    Music(MusicElement),
    Weather(WeatherElement),
    Location(LocationElement),
    Share(ShareElement),
    Gift(GiftElement),
    MarketFace(MarketFaceElement),
    Forward(ForwardElement),
    Contact(ContactElement),
    Json(JsonElement),
    Xml(XmlElement),
    File(FileElement),
    Markdown(MarkdownElement),
    Keyboard(KeyboardElement),
}

impl ElementData {
    /// Returns the type tag matching this slot.
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Text(_) => ElementType::Text,
            Self::At(_) => ElementType::At,
            Self::Face(_) => ElementType::Face,
            Self::BubbleFace(_) => ElementType::BubbleFace,
            Self::Reply(_) => ElementType::Reply,
            Self::Image(_) => ElementType::Image,
            Self::Voice(_) => ElementType::Voice,
            Self::Video(_) => ElementType::Video,
            Self::Basketball(_) => ElementType::Basketball,
            Self::Dice(_) => ElementType::Dice,
            Self::Rps(_) => ElementType::Rps,
            Self::Poke(_) => ElementType::Poke,
            Self::Music(_) => ElementType::Music,
            Self::Weather(_) => ElementType::Weather,
            Self::Location(_) => ElementType::Location,
            Self::Share(_) => ElementType::Share,
            Self::Gift(_) => ElementType::Gift,
            Self::MarketFace(_) => ElementType::MarketFace,
            Self::Forward(_) => ElementType::Forward,
            Self::Contact(_) => ElementType::Contact,
            Self::Json(_) => ElementType::Json,
            Self::Xml(_) => ElementType::Xml,
            Self::File(_) => ElementType::File,
            Self::Markdown(_) => ElementType::Markdown,
            Self::Keyboard(_) => ElementType::Keyboard,
        }
    }

    /// Returns the slot name as it appears on the wire.
    pub fn slot_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::At(_) => "at",
            Self::Face(_) => "face",
            Self::BubbleFace(_) => "bubble_face",
            Self::Reply(_) => "reply",
            Self::Image(_) => "image",
            Self::Voice(_) => "voice",
            Self::Video(_) => "video",
            Self::Basketball(_) => "basketball",
            Self::Dice(_) => "dice",
            Self::Rps(_) => "rps",
            Self::Poke(_) => "poke",
            Self::Music(_) => "music",
            Self::Weather(_) => "weather",
            Self::Location(_) => "location",
            Self::Share(_) => "share",
            Self::Gift(_) => "gift",
            Self::MarketFace(_) => "market_face",
            Self::Forward(_) => "forward",
            Self::Contact(_) => "contact",
            Self::Json(_) => "json",
            Self::Xml(_) => "xml",
            Self::File(_) => "file",
            Self::Markdown(_) => "markdown",
            Self::Keyboard(_) => "keyboard",
        }
    }
}

// ============================================================================
// Mapped Slots
// ============================================================================

/// Text slot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextElement {
    pub text: String,
}

/// Mention slot. `uid` is `"all"` for a mention of everyone.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AtElement {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uin: Option<u64>,
}

/// Face slot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FaceElement {
    pub id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_big: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<u32>,
}

/// Bubble face slot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BubbleFaceElement {
    pub id: u32,
    pub count: u32,
}

/// Reply slot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReplyElement {
    pub message_id: String,
}

/// Payload one-of shared by the multimedia slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaData {
    /// Inline bytes.
    File(Vec<u8>),
    /// Name of a file already stored by the remote service.
    FileName(String),
    /// Local filesystem path.
    FilePath(String),
    /// Downloadable URL.
    FileUrl(String),
}

/// Image slot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageElement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<MediaData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_md5: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<u32>,
}

/// Voice slot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VoiceElement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<MediaData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_md5: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magic: Option<bool>,
}

/// Video slot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VideoElement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<MediaData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_md5: Option<String>,
}

/// Dice slot. `id` is the rolled value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DiceElement {
    pub id: u32,
}

// ============================================================================
// Unmapped Slots
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BasketballElement {
    pub id: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RpsElement {
    pub id: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PokeElement {
    pub id: u32,
    pub poke_type: u32,
    pub strength: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MusicElement {
    pub platform: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WeatherElement {
    pub city: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LocationElement {
    pub lat: f32,
    pub lon: f32,
    pub title: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShareElement {
    pub url: String,
    pub title: String,
    pub content: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GiftElement {
    pub qq: u64,
    pub id: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarketFaceElement {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForwardElement {
    pub res_id: String,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContactElement {
    pub scene: i32,
    pub peer: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JsonElement {
    pub json: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct XmlElement {
    pub xml: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FileElement {
    pub id: String,
    pub name: String,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarkdownElement {
    pub markdown: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KeyboardElement {
    pub bot_appid: u64,
    #[serde(default)]
    pub rows: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_deserialize() {
        let json = r#"{"type": 0, "data": {"text": {"text": "hello"}}}"#;
        let element: Element = serde_json::from_str(json).unwrap();
        assert_eq!(
            element.data,
            Some(ElementData::Text(TextElement {
                text: "hello".into()
            }))
        );
    }

    #[test]
    fn test_element_without_slot() {
        let element: Element = serde_json::from_str(r#"{"type": 11}"#).unwrap();
        assert_eq!(element.element_type, 11);
        assert!(element.data.is_none());
    }

    #[test]
    fn test_new_sets_type_tag() {
        let element = Element::new(ElementData::Dice(DiceElement { id: 6 }));
        assert_eq!(element.element_type, ElementType::Dice as i32);
    }

    #[test]
    fn test_media_deserialize() {
        let json = r#"{"data": {"file_url": "https://example.com/a.png"}, "file_md5": "abc"}"#;
        let image: ImageElement = serde_json::from_str(json).unwrap();
        assert_eq!(
            image.data,
            Some(MediaData::FileUrl("https://example.com/a.png".into()))
        );
        assert_eq!(image.file_md5.as_deref(), Some("abc"));
    }
}
