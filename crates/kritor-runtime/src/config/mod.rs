//! Configuration for the Kritor runtime.
//!
//! Values are layered with figment: built-in defaults, then `kritor.toml`
//! (or `kritor.yaml`), then `KRITOR_*` environment variables, then
//! programmatic overrides.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    ClientConfig, EngineConfig, KritorConfig, LogFormat, LogLevel, LogOutput, LoggingConfig, Mode,
    ServerConfig, SpanEventConfig,
};
pub use validation::validate_config;
