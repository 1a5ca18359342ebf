//! Server error types.

use quotagate_account::GateError;
use quotagate_config::ConfigError;
use quotagate_metrics::ERROR_CONFIG;

/// Server startup and lifecycle errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("config: {0}")]
    Config(String),
    #[error("config: {0}")]
    ConfigLoad(#[from] ConfigError),
    #[error("store: {0}")]
    Store(#[from] GateError),
    #[error("http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl ServerError {
    /// Get the error type string for metrics.
    pub fn error_type(&self) -> &'static str {
        match self {
            ServerError::Io(_) | ServerError::HttpClient(_) => "io",
            ServerError::Config(_) | ServerError::ConfigLoad(_) => ERROR_CONFIG,
            ServerError::Store(e) => e.kind(),
        }
    }
}
