//! # Kritor Runtime
//!
//! Orchestration for the Kritor bridge:
//!
//! - [`config`]: figment-based configuration (`kritor.toml`, `KRITOR_*`)
//! - [`logging`]: tracing subscriber setup
//! - [`engine`]: the dispatch engine, its topologies and its lifecycle
//! - [`KritorApp`]: the application handle tying them together
//!
//! # Topologies
//!
//! ```text
//! passive:  EventService ──subscribe(c)──▶ unit(c) ──decode──▶ Dispatcher
//!           (one unit per category: core, message, notice, request)
//!
//! active:   remote peer ──push──▶ PushServer ──▶ PushEndpoint ──decode──▶ Dispatcher
//!           (bounded worker pool owned by the server)
//! ```
//!
//! # Shutdown
//!
//! `stop` cancels a shared token and joins each execution unit with its own
//! timeout. A unit that does not exit in time is reported in the
//! [`ShutdownReport`] and left running; `stop` itself always returns.

pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod signal;

pub use app::{KritorApp, KritorAppBuilder};
pub use config::{ConfigError, ConfigLoader, ConfigResult, KritorConfig, Mode};
pub use engine::{Engine, EngineOptions, EngineState, ShutdownReport, Topology};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::LoggingBuilder;
pub use signal::wait_for_shutdown_signal;

pub use tracing;

/// Logging macros for handler code.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
