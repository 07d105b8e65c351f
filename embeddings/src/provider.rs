//! Embedding model runtimes.
//!
//! The model itself is a black box: given text, it asynchronously returns a
//! [`RawModelOutput`] in one of the recognized layouts.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{EmbeddingError, Result};
use crate::output::RawModelOutput;

/// Trait for embedding model runtimes.
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    /// Get the name of this model.
    fn name(&self) -> &str;

    /// Run the model over a single text.
    async fn embed(&self, text: &str) -> Result<RawModelOutput>;
}

/// Client for a feature-extraction HTTP runtime.
///
/// Sends `{"inputs": text}` and accepts any body that parses as a
/// [`RawModelOutput`], so it works with runtimes returning nested token
/// arrays as well as ones returning `{ "data": [...], "dims": [...] }`.
pub struct HttpModel {
    /// Endpoint receiving the POST.
    endpoint: String,

    /// Model name forwarded to the runtime, if any.
    model: Option<String>,

    /// Bearer token.
    api_key: Option<String>,

    /// HTTP client.
    client: reqwest::Client,
}

impl HttpModel {
    /// Create a new client for the given endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: None,
            api_key: None,
            client: reqwest::Client::new(),
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Apply a per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    /// Endpoint this client posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EmbeddingModel for HttpModel {
    fn name(&self) -> &str {
        self.model.as_deref().unwrap_or("http")
    }

    async fn embed(&self, text: &str) -> Result<RawModelOutput> {
        let mut body = serde_json::json!({ "inputs": text });
        if let Some(model) = &self.model {
            body["model"] = serde_json::json!(model);
        }

        debug!("Requesting embedding from {}", self.endpoint);

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);

            return Err(EmbeddingError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::ApiRequest(format!(
                "{status}: {error_text}"
            )));
        }

        let bytes = response.bytes().await?;
        let output = RawModelOutput::from_slice(&bytes)?;

        debug!("Received {} output", output.shape_label());

        Ok(output)
    }
}
