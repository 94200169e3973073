//! # Kritor Protocol
//!
//! The wire side of the bridge:
//!
//! - [`model`]: wire shapes (element union, envelopes, event structure,
//!   auth and message request/response pairs)
//! - [`bridge`]: pure decoding into `kritor-core` types and encoding back
//! - [`service`]: traits for the RPC collaborator the engine consumes
//!
//! ```text
//! ┌──────────────┐  EventStream  ┌────────────┐  DomainEvent  ┌────────────┐
//! │ EventService │──────────────▶│   bridge   │──────────────▶│ dispatcher │
//! │  PushServer  │               │  (decode)  │               │            │
//! └──────────────┘               └────────────┘               └────────────┘
//! ```

pub mod bridge;
pub mod model;
pub mod service;

pub use bridge::{
    decode_element, decode_elements, decode_event, decode_message, decode_push_message,
    decode_sender, decode_source, encode_chain, encode_contact, encode_element,
};
pub use model::{
    ContactEnvelope, Element, ElementData, EventBody, EventStructure, EventType, PushAck,
    PushMessageBody, SenderEnvelope,
};
pub use service::{
    AuthService, EventService, EventStream, MessageService, PushHandler, PushServer,
};
