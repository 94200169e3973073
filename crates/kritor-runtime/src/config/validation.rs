//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{EngineConfig, KritorConfig, LogOutput, LoggingConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &KritorConfig) -> ConfigResult<()> {
    validate_endpoint("client", &config.client.host, config.client.port)?;
    validate_endpoint("server", &config.server.host, config.server.port)?;

    if config.server.max_workers == 0 {
        return Err(ConfigError::validation(
            "server.max_workers must be greater than 0",
        ));
    }

    validate_engine_config(&config.engine)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

fn validate_endpoint(section: &str, host: &str, port: u16) -> ConfigResult<()> {
    if host.trim().is_empty() {
        return Err(ConfigError::missing_field(format!("{section}.host")));
    }
    if port == 0 {
        return Err(ConfigError::InvalidPort(port));
    }
    Ok(())
}

fn validate_engine_config(engine: &EngineConfig) -> ConfigResult<()> {
    if engine.join_timeout_ms == 0 {
        return Err(ConfigError::validation(
            "engine.join_timeout_ms must be greater than 0",
        ));
    }
    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }
    Ok(())
}
