//! # quotagate
//!
//! Entitlement and daily usage quota gate for a metered generation
//! capability.
//!
//! ## Crates
//!
//! - [`quotagate_core`] - Shared defaults and error kind labels
//! - [`quotagate_config`] - Configuration loading and validation
//! - [`quotagate_account`] - Accounts, usage gate, entitlement ledger, webhooks
//! - [`quotagate_metrics`] - Prometheus-compatible metrics
//! - [`quotagate_server`] - HTTP surface

pub use quotagate_account as account;
pub use quotagate_config as config;
pub use quotagate_core as core;
pub use quotagate_metrics as metrics;
pub use quotagate_server as server;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use quotagate_account::{
        AccountLedger, AccountStore, GateError, MemoryStore, UsageGate, WebhookIngestor,
    };
    pub use quotagate_config::{Config, load_config, validate_config};
    pub use quotagate_server::{CancellationToken, ServerError, run, run_with_shutdown};
}
