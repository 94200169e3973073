//! # Kritor Core
//!
//! Foundation types for the Kritor event bridge.
//!
//! This crate has no I/O. It defines what a decoded event looks like:
//!
//! - **Message model**: [`MessageChain`], [`MessageElement`], [`Source`]
//! - **Relationship model**: [`Sender`], [`Contact`], [`Friend`], [`Group`], [`Member`]
//! - **Event model**: [`DomainEvent`] and its [`Category`]
//! - **Errors**: [`DecodeError`], [`TransportError`]
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │ Wire event  │────▶│ Wire decoder │────▶│ DomainEvent │
//! │ (protocol)  │     │  (protocol)  │     │   (core)    │
//! └─────────────┘     └──────────────┘     └─────────────┘
//! ```

pub mod contact;
pub mod error;
pub mod event;
pub mod message;

pub use contact::{
    Client, Contact, Friend, Group, Member, MemberPerm, Scene, Sender, Stranger, to_contact,
};
pub use error::{DecodeError, DecodeResult, TransportError, TransportResult};
pub use event::{
    Category, CorePayload, DomainEvent, FriendMessage, GroupMessage, MessageEvent, NoticePayload,
    OtherClientMessage, RequestPayload, StrangerMessage,
};
pub use message::{MediaKind, MediaPayload, MessageChain, MessageElement, Multimedia, Source};

/// Prelude for common imports.
pub mod prelude {
    pub use super::contact::*;
    pub use super::event::{Category, DomainEvent};
    pub use super::message::{MessageChain, MessageElement, Source};
}
