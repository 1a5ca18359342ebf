//! HTTP generation backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{BackendError, GenerationBackend};

#[derive(Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    quote: Option<String>,
    text: Option<String>,
}

/// Calls a JSON generation endpoint: POST `{"prompt": …}`, reads `quote`
/// (or `text`) from the response.
#[derive(Debug, Clone)]
pub struct HttpGenerationBackend {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpGenerationBackend {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, endpoint, api_key))
    }

    /// Create with a custom reqwest [`Client`].
    pub fn with_client(client: Client, endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        }
    }
}

#[async_trait]
impl GenerationBackend for HttpGenerationBackend {
    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let mut req = self
            .client
            .post(&self.endpoint)
            .json(&GenerateRequest { prompt });
        if let Some(ref key) = self.api_key {
            req = req.header("Authorization", format!("Bearer {key}"));
        }
        let resp = req.send().await.map_err(BackendError::transport)?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateResponse = resp.json().await.map_err(BackendError::decode)?;
        body.quote
            .or(body.text)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| BackendError::Decode("response carries no quote".into()))
    }
}
