//! Stripe-compatible payment provider client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::Value;

use super::{BackendError, PaymentProvider};

#[derive(Deserialize)]
struct Customer {
    id: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Form-encoded client for `/v1/customers` and `/v1/subscriptions`.
#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    api_base: String,
    secret_key: String,
}

impl std::fmt::Debug for StripeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeClient")
            .field("api_base", &self.api_base)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

impl StripeClient {
    pub fn new(
        api_base: impl Into<String>,
        secret_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, api_base, secret_key))
    }

    /// Create with a custom reqwest [`Client`].
    pub fn with_client(
        client: Client,
        api_base: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        let base = api_base.into();
        Self {
            client,
            api_base: base.trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
        }
    }

    async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<Response, BackendError> {
        let resp = self
            .client
            .post(format!("{}{path}", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(form)
            .send()
            .await
            .map_err(BackendError::transport)?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = match resp.json::<ErrorEnvelope>().await {
            Ok(env) => env.error.message.unwrap_or_default(),
            Err(_) => String::new(),
        };
        Err(BackendError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn create_customer(
        &self,
        email: &str,
        payment_method: &str,
    ) -> Result<String, BackendError> {
        let resp = self
            .post_form(
                "/v1/customers",
                &[
                    ("email", email),
                    ("payment_method", payment_method),
                    ("invoice_settings[default_payment_method]", payment_method),
                ],
            )
            .await?;
        let customer: Customer = resp.json().await.map_err(BackendError::decode)?;
        Ok(customer.id)
    }

    async fn create_subscription(
        &self,
        customer_id: &str,
        price_id: &str,
    ) -> Result<Value, BackendError> {
        let resp = self
            .post_form(
                "/v1/subscriptions",
                &[
                    ("customer", customer_id),
                    ("items[0][price]", price_id),
                    ("expand[]", "latest_invoice.payment_intent"),
                ],
            )
            .await?;
        resp.json().await.map_err(BackendError::decode)
    }
}
