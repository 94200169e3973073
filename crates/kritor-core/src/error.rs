//! Error types shared across the Kritor crates.
//!
//! Framework-level errors (such as `HandlerError`) live in `kritor-framework`.

use thiserror::Error;

// =============================================================================
// Decode Errors
// =============================================================================

/// Errors raised while turning a wire event into a domain event.
///
/// A decode error is fatal for the single event that caused it only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Contact scene that cannot be resolved into a sender.
    #[error("unsupported contact scene: {0}")]
    UnsupportedScene(i32),

    /// A required envelope was absent from the wire event.
    #[error("wire event is missing its {0} envelope")]
    MissingEnvelope(&'static str),
}

// =============================================================================
// Transport Errors
// =============================================================================

/// Errors reported by the RPC collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The remote end went away.
    #[error("disconnected: {reason}")]
    Disconnected {
        /// Reason for the disconnect.
        reason: String,
    },

    /// A stream ended.
    #[error("stream closed")]
    StreamClosed,

    /// The remote returned a non-OK status.
    #[error("remote status {code}: {message}")]
    Status {
        /// Status code.
        code: i32,
        /// Status message.
        message: String,
    },

    /// The requested service is not available.
    #[error("service '{service}' not available")]
    Unavailable {
        /// Service name.
        service: &'static str,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl TransportError {
    /// Creates a disconnect error.
    pub fn disconnected(reason: impl Into<String>) -> Self {
        Self::Disconnected {
            reason: reason.into(),
        }
    }

    /// Creates a status error.
    pub fn status(code: i32, message: impl Into<String>) -> Self {
        Self::Status {
            code,
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for decoding.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;
