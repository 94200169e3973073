//! Conversion between the wire model and the canonical model.
//!
//! ```text
//! EventStructure ──decode_event──▶ DomainEvent
//! Vec<Element>   ──decode_elements──▶ MessageChain
//! MessageChain   ──encode_chain──▶ Vec<Element>
//! Contact        ──encode_contact──▶ ContactEnvelope
//! ```

pub mod decode;
pub mod encode;

pub use decode::{
    decode_element, decode_elements, decode_event, decode_message, decode_push_message,
    decode_sender, decode_source,
};
pub use encode::{encode_chain, encode_contact, encode_element};
