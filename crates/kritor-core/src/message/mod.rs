//! Canonical message model.
//!
//! ```text
//! MessageChain
//! └── Vec<MessageElement>
//!     ├── Plain / At / AtAll / Face / BubbleFace
//!     ├── Quote
//!     ├── Multimedia { kind, payload, hash }
//!     └── Dice
//! ```

pub mod chain;
pub mod element;
pub mod source;

pub use chain::MessageChain;
pub use element::{
    At, BubbleFace, Dice, Face, MediaKind, MediaPayload, MessageElement, Multimedia, Plain, Quote,
};
pub use source::Source;
