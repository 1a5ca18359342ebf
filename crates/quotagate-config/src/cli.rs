//! CLI override definitions and application logic.

use clap::Parser;

use crate::Config;

#[derive(Debug, Clone, Parser, Default)]
pub struct CliOverrides {
    /// Override HTTP listen address, e.g. 0.0.0.0:8080
    #[arg(long)]
    pub listen: Option<String>,
    /// Override the identity header name
    #[arg(long)]
    pub identity_header: Option<String>,
    /// Use the SQL store at this URL
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
    /// Create the accounts table on startup
    #[arg(long)]
    pub auto_migrate: Option<bool>,
    /// Override the per-day consumption ceiling
    #[arg(long)]
    pub daily_ceiling: Option<u32>,
    /// Payment provider API secret key
    #[arg(long, env = "STRIPE_SECRET_KEY", hide_env_values = true)]
    pub stripe_secret_key: Option<String>,
    /// Payment provider webhook signing secret
    #[arg(long, env = "STRIPE_WEBHOOK_SECRET", hide_env_values = true)]
    pub webhook_secret: Option<String>,
    /// Default subscription price id
    #[arg(long, env = "PRICE_ID")]
    pub price_id: Option<String>,
    /// Generation backend endpoint
    #[arg(long, env = "GENERATION_ENDPOINT")]
    pub generation_endpoint: Option<String>,
    /// Generation backend API key
    #[arg(long, env = "GENERATION_API_KEY", hide_env_values = true)]
    pub generation_api_key: Option<String>,
    /// Override metrics listen address
    #[arg(long)]
    pub metrics_listen: Option<String>,
    /// Override log level (trace/debug/info/warn/error)
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn apply_overrides(config: &mut Config, overrides: &CliOverrides) {
    if let Some(v) = &overrides.listen {
        config.server.listen = v.clone();
    }
    if let Some(v) = &overrides.identity_header {
        config.server.identity_header = v.clone();
    }
    if let Some(v) = &overrides.database_url {
        config.store.backend = "sql".to_string();
        config.store.database_url = Some(v.clone());
    }
    if let Some(v) = overrides.auto_migrate {
        config.store.auto_migrate = v;
    }
    if let Some(v) = overrides.daily_ceiling {
        config.quota.daily_ceiling = v;
    }
    if let Some(v) = &overrides.stripe_secret_key {
        config.billing.secret_key = Some(v.clone());
    }
    if let Some(v) = &overrides.webhook_secret {
        config.billing.webhook_secret = Some(v.clone());
    }
    if let Some(v) = &overrides.price_id {
        config.billing.price_id = Some(v.clone());
    }
    if let Some(v) = &overrides.generation_endpoint {
        config.generation.endpoint = Some(v.clone());
    }
    if let Some(v) = &overrides.generation_api_key {
        config.generation.api_key = Some(v.clone());
    }
    if let Some(v) = &overrides.metrics_listen {
        config.metrics.listen = Some(v.clone());
    }
    if let Some(v) = &overrides.log_level {
        config.logging.level = Some(v.clone());
    }
    // `STRIPE_WEBHOOK_SECRET=` in the environment means unset.
    config.clear_blank_settings();
}
