//! Configuration type definitions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::defaults::*;

/// Top-level service configuration.
///
/// Every section has defaults, so an empty file yields a runnable
/// development setup (memory store, unsigned webhooks).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub quota: QuotaConfig,
    #[serde(default)]
    pub billing: BillingConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Turn empty or whitespace-only optional settings into `None`.
    ///
    /// An empty webhook secret would otherwise become an HMAC key anyone can
    /// sign with.
    pub fn clear_blank_settings(&mut self) {
        for slot in [
            &mut self.store.database_url,
            &mut self.billing.secret_key,
            &mut self.billing.webhook_secret,
            &mut self.billing.price_id,
            &mut self.generation.endpoint,
            &mut self.generation.api_key,
            &mut self.metrics.listen,
        ] {
            if slot.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *slot = None;
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen address, e.g. `0.0.0.0:8080`.
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Request header carrying the external identity, set by the session
    /// layer in front of this service.
    #[serde(default = "default_identity_header")]
    pub identity_header: String,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Grace period for in-flight requests on shutdown.
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            identity_header: default_identity_header(),
            max_body_bytes: default_max_body_bytes(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

/// User record store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend: `memory` or `sql`.
    #[serde(default = "default_store_backend")]
    pub backend: String,
    /// Database URL for the `sql` backend
    /// (`postgres://…`, `mysql://…`, `sqlite:path` or `sqlite::memory:`).
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_sql_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_sql_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_sql_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Create the accounts table on startup if it does not exist.
    #[serde(default = "default_store_auto_migrate")]
    pub auto_migrate: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            database_url: None,
            max_connections: default_sql_max_connections(),
            min_connections: default_sql_min_connections(),
            connect_timeout_secs: default_sql_connect_timeout_secs(),
            auto_migrate: default_store_auto_migrate(),
        }
    }
}

/// Usage quota configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Maximum successful consumptions per UTC calendar day.
    #[serde(default = "default_daily_ceiling")]
    pub daily_ceiling: u32,
    /// Upper bound on compare-and-swap attempts for one consume call.
    #[serde(default = "default_max_update_attempts")]
    pub max_update_attempts: u32,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            daily_ceiling: default_daily_ceiling(),
            max_update_attempts: default_max_update_attempts(),
        }
    }
}

/// Payment provider configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct BillingConfig {
    /// API secret key for outbound customer/subscription calls.
    #[serde(default)]
    pub secret_key: Option<String>,
    /// Webhook signing secret. When unset, webhooks are accepted unverified.
    #[serde(default)]
    pub webhook_secret: Option<String>,
    /// Default price for new subscriptions.
    #[serde(default)]
    pub price_id: Option<String>,
    #[serde(default = "default_billing_api_base")]
    pub api_base: String,
    /// Maximum age of a signed webhook timestamp.
    #[serde(default = "default_webhook_tolerance_secs")]
    pub webhook_tolerance_secs: u64,
    #[serde(default = "default_billing_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            webhook_secret: None,
            price_id: None,
            api_base: default_billing_api_base(),
            webhook_tolerance_secs: default_webhook_tolerance_secs(),
            timeout_secs: default_billing_timeout_secs(),
        }
    }
}

// Secrets stay out of logs.
impl std::fmt::Debug for BillingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BillingConfig")
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field(
                "webhook_secret",
                &self.webhook_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("price_id", &self.price_id)
            .field("api_base", &self.api_base)
            .field("webhook_tolerance_secs", &self.webhook_tolerance_secs)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Generation backend configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Backend endpoint receiving `{"prompt": …}`.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Bearer token for the backend.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_prompt_template")]
    pub prompt_template: String,
    #[serde(default = "default_generation_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            prompt_template: default_prompt_template(),
            timeout_secs: default_generation_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("prompt_template", &self.prompt_template)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MetricsConfig {
    /// Prometheus exporter listen address (disabled when unset).
    pub listen: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: Option<String>,
    /// Log format: json, pretty, or compact. Default: pretty.
    pub format: Option<String>,
    /// Output target: stdout or stderr. Default: stderr.
    pub output: Option<String>,
    /// Per-module log level filters (e.g., {"quotagate_account": "debug", "sqlx": "warn"}).
    #[serde(default)]
    pub filters: HashMap<String, String>,
}
