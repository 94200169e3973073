//! Configuration schema definitions.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KritorConfig {
    /// Account id used for authentication.
    #[serde(default, deserialize_with = "string_or_number")]
    pub account: Option<String>,

    /// Ticket used for authentication.
    #[serde(default, deserialize_with = "string_or_number")]
    pub ticket: Option<String>,

    /// Engine topology.
    #[serde(default)]
    pub mode: Mode,

    /// Remote endpoint subscribed to in passive mode.
    #[serde(default)]
    pub client: ClientConfig,

    /// Local endpoint served in active mode.
    #[serde(default)]
    pub server: ServerConfig,

    /// Engine timing.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl KritorConfig {
    /// Returns the endpoint of the configured mode as `host:port`.
    pub fn endpoint(&self) -> String {
        match self.mode {
            Mode::Active => self.server.addr(),
            Mode::Passive => self.client.addr(),
        }
    }
}

/// Accepts both `"10001"` and `10001`, since environment values are typed
/// by figment before they reach us.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(i64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Str(s) => s,
        Raw::Int(n) => n.to_string(),
    }))
}

/// Which side opens the event streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// The remote peer connects to us and pushes events.
    Active,
    /// We subscribe to the remote peer, one stream per category.
    #[default]
    Passive,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "active",
            Self::Passive => "passive",
        })
    }
}

/// Remote endpoint (passive mode).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_client_port")]
    pub port: u16,
}

impl ClientConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_client_port(),
        }
    }
}

/// Listen endpoint (active mode).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Upper bound on concurrently handled push streams.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_server_port(),
            max_workers: default_max_workers(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_client_port() -> u16 {
    5700
}

fn default_server_port() -> u16 {
    5090
}

fn default_max_workers() -> usize {
    10
}

/// Engine timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How long `stop` waits for each execution unit, in milliseconds.
    #[serde(default = "default_join_timeout_ms")]
    pub join_timeout_ms: u64,

    /// Pause before re-opening a terminated subscription, in milliseconds.
    #[serde(default = "default_resubscribe_delay_ms")]
    pub resubscribe_delay_ms: u64,
}

impl EngineConfig {
    pub fn join_timeout(&self) -> Duration {
        Duration::from_millis(self.join_timeout_ms)
    }

    pub fn resubscribe_delay(&self) -> Duration {
        Duration::from_millis(self.resubscribe_delay_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            join_timeout_ms: default_join_timeout_ms(),
            resubscribe_delay_ms: default_resubscribe_delay_ms(),
        }
    }
}

fn default_join_timeout_ms() -> u64 {
    3000
}

fn default_resubscribe_delay_ms() -> u64 {
    1000
}

// =============================================================================
// Logging
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Global log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Output destination.
    #[serde(default)]
    pub output: LogOutput,

    /// Log file path, used when `output` is `file`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// Span lifecycle events to log.
    #[serde(default)]
    pub span_events: SpanEventConfig,

    /// Include thread ids.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include file and line.
    #[serde(default)]
    pub file_location: bool,

    /// Per-module levels, e.g. `kritor_protocol = "debug"`.
    #[serde(default)]
    pub filters: HashMap<String, LogLevel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Needs the `json-log` feature; falls back to compact without it.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Span lifecycle events to log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpanEventConfig {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = KritorConfig::default();
        assert_eq!(config.mode, Mode::Passive);
        assert_eq!(config.client.addr(), "localhost:5700");
        assert_eq!(config.server.addr(), "localhost:5090");
        assert_eq!(config.server.max_workers, 10);
        assert_eq!(config.engine.join_timeout(), Duration::from_secs(3));
        assert_eq!(config.endpoint(), "localhost:5700");
    }

    #[test]
    fn test_numeric_account_is_accepted() {
        let config: KritorConfig =
            serde_json::from_str(r#"{"account": 10001, "ticket": "abc", "mode": "active"}"#)
                .unwrap();
        assert_eq!(config.account.as_deref(), Some("10001"));
        assert_eq!(config.ticket.as_deref(), Some("abc"));
        assert_eq!(config.endpoint(), "localhost:5090");
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config: KritorConfig =
            serde_json::from_str(r#"{"server": {"port": 6000}, "logging": {"level": "debug"}}"#)
                .unwrap();
        assert_eq!(config.server.port, 6000);
        assert_eq!(config.server.max_workers, 10);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Compact);
    }
}
