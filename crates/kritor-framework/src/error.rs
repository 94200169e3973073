//! Error types for the Kritor framework.

use thiserror::Error;

use crate::handler::HandlerId;

/// A registered handler failed while processing an event.
///
/// Failures are isolated per handler: the dispatcher records them and moves
/// on to the next handler for the same event.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The handler returned an error.
    #[error("handler {id} failed: {source:#}")]
    Failed {
        /// Id of the failing handler.
        id: HandlerId,
        /// The error the handler returned.
        source: anyhow::Error,
    },

    /// The handler panicked.
    #[error("handler {id} panicked: {message}")]
    Panicked {
        /// Id of the failing handler.
        id: HandlerId,
        /// The panic payload, if it was a string.
        message: String,
    },
}

impl HandlerError {
    /// Returns the id of the handler that failed.
    pub fn handler_id(&self) -> HandlerId {
        match self {
            Self::Failed { id, .. } | Self::Panicked { id, .. } => *id,
        }
    }
}
