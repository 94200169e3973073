//! The [`MessageChain`] type.
//!
//! A chain is the ordered sequence of elements that make up one message.
//! Element order is wire order and is also rendering order.
//!
//! # Example
//!
//! ```rust,ignore
//! use kritor_core::MessageChain;
//!
//! let chain = MessageChain::new()
//!     .text("Hello, ")
//!     .at(10001000)
//!     .text("!");
//!
//! assert_eq!(chain.plain_text(), "Hello, !");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::element::{MediaPayload, MessageElement};

// ============================================================================
// MessageChain
// ============================================================================

/// An ordered sequence of [`MessageElement`]s.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageChain {
    elements: Vec<MessageElement>,
}

impl MessageChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
        }
    }

    /// Creates a chain with room for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            elements: Vec::with_capacity(capacity),
        }
    }

    // --------------------------------
    // Builder methods
    // --------------------------------

    /// Appends a plain text element.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.elements.push(MessageElement::plain(text));
        self
    }

    /// Appends a mention.
    pub fn at(mut self, target: impl ToString) -> Self {
        self.elements.push(MessageElement::at(target));
        self
    }

    /// Appends a mention of everyone.
    pub fn at_all(mut self) -> Self {
        self.elements.push(MessageElement::at_all());
        self
    }

    /// Appends a face.
    pub fn face(mut self, id: u32) -> Self {
        self.elements.push(MessageElement::face(id));
        self
    }

    /// Appends a quote of an earlier message.
    pub fn quote(mut self, message_id: impl Into<String>) -> Self {
        self.elements.push(MessageElement::quote(message_id));
        self
    }

    /// Appends an image.
    pub fn image(mut self, payload: MediaPayload) -> Self {
        self.elements.push(MessageElement::image(payload));
        self
    }

    /// Appends a dice roll.
    pub fn dice(mut self, value: u32) -> Self {
        self.elements.push(MessageElement::dice(value));
        self
    }

    /// Appends any element.
    pub fn element(mut self, element: MessageElement) -> Self {
        self.elements.push(element);
        self
    }

    // --------------------------------
    // Mutation and access
    // --------------------------------

    /// Pushes an element onto the end of the chain.
    pub fn push(&mut self, element: impl Into<MessageElement>) {
        self.elements.push(element.into());
    }

    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the chain has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterates over the elements in order.
    pub fn iter(&self) -> std::slice::Iter<'_, MessageElement> {
        self.elements.iter()
    }

    /// Returns the elements as a slice.
    pub fn as_slice(&self) -> &[MessageElement] {
        &self.elements
    }

    /// Consumes the chain and returns its elements.
    pub fn into_elements(self) -> Vec<MessageElement> {
        self.elements
    }

    /// Concatenates the text of every plain element.
    pub fn plain_text(&self) -> String {
        self.elements
            .iter()
            .filter_map(MessageElement::as_plain)
            .collect()
    }
}

impl fmt::Display for MessageChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for element in &self.elements {
            write!(f, "{element}")?;
        }
        Ok(())
    }
}

impl Extend<MessageElement> for MessageChain {
    fn extend<I: IntoIterator<Item = MessageElement>>(&mut self, iter: I) {
        self.elements.extend(iter);
    }
}

impl FromIterator<MessageElement> for MessageChain {
    fn from_iter<I: IntoIterator<Item = MessageElement>>(iter: I) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for MessageChain {
    type Item = MessageElement;
    type IntoIter = std::vec::IntoIter<MessageElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<'a> IntoIterator for &'a MessageChain {
    type Item = &'a MessageElement;
    type IntoIter = std::slice::Iter<'a, MessageElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl From<Vec<MessageElement>> for MessageChain {
    fn from(elements: Vec<MessageElement>) -> Self {
        Self { elements }
    }
}

impl From<&str> for MessageChain {
    fn from(text: &str) -> Self {
        Self::new().text(text)
    }
}

impl From<String> for MessageChain {
    fn from(text: String) -> Self {
        Self::new().text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_order() {
        let chain = MessageChain::new().text("a").at(1).text("b").at_all();
        let kinds: Vec<_> = chain.iter().map(MessageElement::element_type).collect();
        assert_eq!(kinds, ["plain", "at", "plain", "at_all"]);
    }

    #[test]
    fn test_plain_text() {
        let chain = MessageChain::new().text("Hello, ").at(7).text("world");
        assert_eq!(chain.plain_text(), "Hello, world");
        assert_eq!(chain.to_string(), "Hello, @7world");
    }

    #[test]
    fn test_from_str() {
        let chain = MessageChain::from("ping");
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.as_slice()[0].as_plain(), Some("ping"));
    }

    #[test]
    fn test_serialize_as_array() {
        let chain = MessageChain::new().text("hi").dice(3);
        let json = serde_json::to_value(&chain).unwrap();
        assert!(json.is_array());
        assert_eq!(json[1]["value"], 3);
    }
}
