//! Runtime error types.

use kritor_core::TransportError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur during runtime operations.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// `start` was called while the engine was not stopped.
    #[error("Engine is already running")]
    AlreadyRunning,

    /// A service the configured mode needs was not provided.
    #[error("Missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Error reported by the RPC collaborator.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication was rejected.
    #[error("Authentication failed with code {code}: {message}")]
    Auth { code: i32, message: String },
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
