//! Configuration validation logic.

use std::net::SocketAddr;

use crate::Config;
use crate::loader::ConfigError;

const STORE_BACKENDS: [&str; 2] = ["memory", "sql"];
const LOG_FORMATS: [&str; 3] = ["json", "pretty", "compact"];

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.listen.parse::<SocketAddr>().is_err() {
        return Err(ConfigError::Validation(format!(
            "server.listen is not a socket address: {:?}",
            config.server.listen
        )));
    }
    let header = config.server.identity_header.trim();
    if header.is_empty() {
        return Err(ConfigError::Validation(
            "server.identity_header is empty".into(),
        ));
    }
    if !header
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    {
        return Err(ConfigError::Validation(
            "server.identity_header must be a plain header name".into(),
        ));
    }
    if config.server.max_body_bytes < 1024 {
        return Err(ConfigError::Validation(
            "server.max_body_bytes must be >= 1024".into(),
        ));
    }
    if !STORE_BACKENDS.contains(&config.store.backend.as_str()) {
        return Err(ConfigError::Validation(format!(
            "store.backend must be one of: {:?}",
            STORE_BACKENDS
        )));
    }
    if config.store.backend == "sql"
        && config
            .store
            .database_url
            .as_deref()
            .unwrap_or("")
            .trim()
            .is_empty()
    {
        return Err(ConfigError::Validation(
            "store.database_url is required for the sql backend".into(),
        ));
    }
    if config.store.max_connections == 0 {
        return Err(ConfigError::Validation(
            "store.max_connections must be > 0".into(),
        ));
    }
    if config.store.min_connections > config.store.max_connections {
        return Err(ConfigError::Validation(
            "store.min_connections cannot exceed store.max_connections".into(),
        ));
    }
    if config.quota.daily_ceiling == 0 {
        return Err(ConfigError::Validation(
            "quota.daily_ceiling must be > 0".into(),
        ));
    }
    if config.quota.max_update_attempts == 0 {
        return Err(ConfigError::Validation(
            "quota.max_update_attempts must be > 0".into(),
        ));
    }
    if config.billing.webhook_tolerance_secs == 0 {
        return Err(ConfigError::Validation(
            "billing.webhook_tolerance_secs must be > 0".into(),
        ));
    }
    if config.billing.api_base.trim().is_empty() {
        return Err(ConfigError::Validation("billing.api_base is empty".into()));
    }
    if config.generation.prompt_template.trim().is_empty() {
        return Err(ConfigError::Validation(
            "generation.prompt_template is empty".into(),
        ));
    }
    if config.generation.timeout_secs == 0 || config.billing.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "outbound timeouts must be > 0".into(),
        ));
    }
    if let Some(format) = config.logging.format.as_deref()
        && !LOG_FORMATS.contains(&format)
    {
        return Err(ConfigError::Validation(format!(
            "logging.format must be one of: {:?}",
            LOG_FORMATS
        )));
    }
    Ok(())
}
