use crate::config::ClientConfig;
use crate::core::CartCount;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Where the loop gets the authoritative count from.
#[async_trait]
pub trait CountSource: Send + Sync + 'static {
    async fn fetch_count(&self) -> Result<CartCount, FetchError>;
}

/// Count query against the action endpoint, using the page configuration.
#[derive(Debug, Clone)]
pub struct HttpCountSource {
    client: Client,
    config: ClientConfig,
}

impl HttpCountSource {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: ClientConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait]
impl CountSource for HttpCountSource {
    async fn fetch_count(&self) -> Result<CartCount, FetchError> {
        let response = self
            .client
            .post(&self.config.ajax_url)
            .form(&[
                ("action", self.config.action.as_str()),
                ("nonce", self.config.nonce.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        interpret_count_response(&body).map_err(|err| match err {
            FetchError::Malformed(msg) if !status.is_success() => {
                FetchError::Rejected(format!("HTTP {status}: {msg}"))
            }
            other => other,
        })
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    data: JsonValue,
}

/// Reads a `{success, data}` envelope into a count.
pub fn interpret_count_response(body: &[u8]) -> Result<CartCount, FetchError> {
    let envelope: Envelope =
        serde_json::from_slice(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

    if !envelope.success {
        let reason = envelope
            .data
            .get("reason")
            .and_then(JsonValue::as_str)
            .unwrap_or("not available");
        return Err(FetchError::Rejected(reason.to_string()));
    }

    envelope
        .data
        .as_u64()
        .map(CartCount::new)
        .ok_or_else(|| FetchError::Malformed(format!("count is not a non-negative integer: {}", envelope.data)))
}
