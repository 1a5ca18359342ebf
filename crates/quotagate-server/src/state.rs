//! State shared across request handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderName;
use quotagate_account::{
    AccountLedger, AccountStore, QuotaPolicy, SignatureVerifier, UsageGate, WebhookIngestor,
};
use quotagate_config::Config;
use tracing::info;

use crate::backend::{
    GenerationBackend, HttpGenerationBackend, PaymentProvider, StripeClient,
    UnconfiguredGeneration, UnconfiguredPayments,
};
use crate::error::ServerError;

/// Everything a handler needs. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub gate: UsageGate,
    pub ledger: AccountLedger,
    pub webhooks: WebhookIngestor,
    pub generation: Arc<dyn GenerationBackend>,
    pub payments: Arc<dyn PaymentProvider>,
    pub identity_header: HeaderName,
    pub prompt: Arc<str>,
    pub default_price_id: Option<Arc<str>>,
    pub max_body_bytes: usize,
}

impl AppState {
    /// Assemble state from explicit collaborators.
    pub fn new(
        config: &Config,
        store: Arc<dyn AccountStore>,
        generation: Arc<dyn GenerationBackend>,
        payments: Arc<dyn PaymentProvider>,
    ) -> Result<Self, ServerError> {
        let policy = QuotaPolicy {
            daily_ceiling: config.quota.daily_ceiling,
            max_update_attempts: config.quota.max_update_attempts,
        };
        let ledger = AccountLedger::new(store.clone());
        let gate = UsageGate::new(store, policy);

        let verifier = config
            .billing
            .webhook_secret
            .as_deref()
            .filter(|secret| !secret.trim().is_empty())
            .map(|secret| {
                SignatureVerifier::new(
                    secret.as_bytes(),
                    Duration::from_secs(config.billing.webhook_tolerance_secs),
                )
                .map_err(|e| ServerError::Config(format!("webhook secret: {e}")))
            })
            .transpose()?;
        let webhooks = WebhookIngestor::new(ledger.clone(), verifier);

        let identity_header = HeaderName::try_from(config.server.identity_header.as_str())
            .map_err(|e| ServerError::Config(format!("identity header: {e}")))?;

        Ok(Self {
            gate,
            ledger,
            webhooks,
            generation,
            payments,
            identity_header,
            prompt: Arc::from(config.generation.prompt_template.as_str()),
            default_price_id: config.billing.price_id.as_deref().map(Arc::from),
            max_body_bytes: config.server.max_body_bytes,
        })
    }

    /// Assemble state with the HTTP backends described by `config`.
    pub fn from_config(config: &Config, store: Arc<dyn AccountStore>) -> Result<Self, ServerError> {
        let generation: Arc<dyn GenerationBackend> = match &config.generation.endpoint {
            Some(endpoint) => {
                info!(%endpoint, "generation backend configured");
                Arc::new(HttpGenerationBackend::new(
                    endpoint.clone(),
                    config.generation.api_key.clone(),
                    Duration::from_secs(config.generation.timeout_secs),
                )?)
            }
            None => Arc::new(UnconfiguredGeneration),
        };

        let payments: Arc<dyn PaymentProvider> = match &config.billing.secret_key {
            Some(key) => Arc::new(StripeClient::new(
                config.billing.api_base.clone(),
                key.clone(),
                Duration::from_secs(config.billing.timeout_secs),
            )?),
            None => Arc::new(UnconfiguredPayments),
        };

        Self::new(config, store, generation, payments)
    }
}
