//! Outbound collaborators: the generation backend and the payment provider.
//!
//! Both sit behind traits so the HTTP layer can be exercised with
//! in-process fakes.

mod generation;
mod payment;

use async_trait::async_trait;
use serde_json::Value;

pub use generation::HttpGenerationBackend;
pub use payment::StripeClient;

/// Outbound call failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// No endpoint or credentials configured.
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
    /// Transport failure (connect, timeout, TLS).
    #[error("request failed: {0}")]
    Transport(String),
    /// Non-success HTTP status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    /// Response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl BackendError {
    #[inline]
    pub fn transport<E: std::fmt::Display>(err: E) -> Self {
        Self::Transport(err.to_string())
    }

    #[inline]
    pub fn decode<E: std::fmt::Display>(err: E) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Produces the metered content.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, BackendError>;
}

/// Customer and subscription creation at the payment provider.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a customer with a default payment method. Returns the
    /// provider's customer id.
    async fn create_customer(
        &self,
        email: &str,
        payment_method: &str,
    ) -> Result<String, BackendError>;

    /// Create a subscription and return the provider's JSON representation.
    async fn create_subscription(
        &self,
        customer_id: &str,
        price_id: &str,
    ) -> Result<Value, BackendError>;
}

/// Placeholder used when no generation endpoint is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredGeneration;

#[async_trait]
impl GenerationBackend for UnconfiguredGeneration {
    async fn generate(&self, _prompt: &str) -> Result<String, BackendError> {
        Err(BackendError::NotConfigured("generation backend"))
    }
}

/// Placeholder used when no payment secret key is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredPayments;

#[async_trait]
impl PaymentProvider for UnconfiguredPayments {
    async fn create_customer(&self, _: &str, _: &str) -> Result<String, BackendError> {
        Err(BackendError::NotConfigured("payment provider"))
    }

    async fn create_subscription(&self, _: &str, _: &str) -> Result<Value, BackendError> {
        Err(BackendError::NotConfigured("payment provider"))
    }
}
