//! Logging setup over `tracing-subscriber`.
//!
//! Everything is driven by [`LoggingConfig`]; the builder only adds extra
//! filter directives on top.
//!
//! ```rust,ignore
//! use kritor_runtime::logging::LoggingBuilder;
//!
//! LoggingBuilder::from_config(&config.logging)
//!     .directive("kritor_protocol=debug")
//!     .init();
//! ```

use std::ffi::OsStr;
use std::path::Path;

use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::config::{LogFormat, LogLevel, LogOutput, LoggingConfig, SpanEventConfig};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Installs a global subscriber built from `config`.
///
/// Does nothing if a subscriber is already installed.
pub fn init_from_config(config: &LoggingConfig) {
    LoggingBuilder::from_config(config).init();
}

/// Maps the configured span lifecycle events onto `fmt` span flags.
///
/// The engine opens a span per execution unit and per dispatched event, so
/// `new` plus `close` shows each event's handlers start and finish.
fn fmt_span(events: &SpanEventConfig) -> FmtSpan {
    [
        (events.new, FmtSpan::NEW),
        (events.enter, FmtSpan::ENTER),
        (events.exit, FmtSpan::EXIT),
        (events.close, FmtSpan::CLOSE),
    ]
    .into_iter()
    .filter(|(enabled, _)| *enabled)
    .fold(FmtSpan::NONE, |acc, (_, flag)| acc | flag)
}

/// Builder for the global tracing subscriber.
#[derive(Debug, Default)]
pub struct LoggingBuilder {
    config: LoggingConfig,
    directives: Vec<String>,
}

impl LoggingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &LoggingConfig) -> Self {
        Self {
            config: config.clone(),
            directives: Vec::new(),
        }
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    /// Adds a filter directive such as `kritor_runtime=trace`.
    pub fn directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    /// Per-module filters from the config first, then explicit directives.
    fn directives(&self) -> impl Iterator<Item = String> + '_ {
        self.config
            .filters
            .iter()
            .map(|(module, level)| format!("{module}={level}"))
            .chain(self.directives.iter().cloned())
    }

    /// `RUST_LOG` wins over the configured level. Unparsable directives are skipped.
    fn build_filter(&self) -> EnvFilter {
        self.directives().filter_map(|d| d.parse::<Directive>().ok()).fold(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(self.config.level.as_str())),
            EnvFilter::add_directive,
        )
    }

    fn make_writer(&self) -> BoxMakeWriter {
        match (self.config.output, &self.config.file_path) {
            (LogOutput::Stderr, _) => BoxMakeWriter::new(std::io::stderr),
            (LogOutput::File, Some(path)) => {
                let dir = path
                    .parent()
                    .filter(|dir| !dir.as_os_str().is_empty())
                    .unwrap_or_else(|| Path::new("."));
                let file = path.file_name().unwrap_or_else(|| OsStr::new("kritor.log"));
                BoxMakeWriter::new(tracing_appender::rolling::never(dir, file))
            }
            // validate_config rejects file output without a path
            (LogOutput::Stdout, _) | (LogOutput::File, None) => BoxMakeWriter::new(std::io::stdout),
        }
    }

    fn build_layer(&self) -> BoxedLayer {
        let writer = self.make_writer();
        let spans = fmt_span(&self.config.span_events);
        let threads = self.config.thread_ids;
        let location = self.config.file_location;

        match self.config.format {
            #[cfg(feature = "json-log")]
            LogFormat::Json => fmt::layer()
                .json()
                .with_span_events(spans)
                .with_writer(writer)
                .boxed(),
            LogFormat::Full => fmt::layer()
                .with_span_events(spans)
                .with_thread_ids(threads)
                .with_file(location)
                .with_line_number(location)
                .with_writer(writer)
                .boxed(),
            LogFormat::Pretty => fmt::layer()
                .pretty()
                .with_span_events(spans)
                .with_thread_ids(threads)
                .with_file(location)
                .with_line_number(location)
                .with_writer(writer)
                .boxed(),
            // Json lands here without the json-log feature.
            _ => fmt::layer()
                .compact()
                .with_span_events(spans)
                .with_thread_ids(threads)
                .with_file(location)
                .with_line_number(location)
                .with_writer(writer)
                .boxed(),
        }
    }

    pub fn init(self) {
        let _ = self.try_init();
    }

    pub fn try_init(self) -> Result<(), TryInitError> {
        let filter = self.build_filter();
        tracing_subscriber::registry()
            .with(self.build_layer())
            .with(filter)
            .try_init()
    }
}
