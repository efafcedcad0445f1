//! Generator backed by a JSON-over-HTTP endpoint.

use async_trait::async_trait;
use reqwest::Client;
use rowsmith_batch::Generator;
use rowsmith_error::{GenerationError, GenerationErrorKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

#[derive(Debug, Serialize)]
struct GenerateBody<'a> {
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateReply {
    #[serde(alias = "output", alias = "content")]
    text: String,
}

/// Calls an HTTP endpoint that accepts `{"prompt": "..."}` and answers `{"text": "..."}`.
///
/// `output` and `content` are accepted as aliases for the `text` field.
/// Non-2xx statuses become `GenerationErrorKind::Http`, so 408, 429 and 5xx are
/// retried; connection failures become `Network` and client-side timeouts
/// become `Timeout`.
#[derive(Debug, Clone)]
pub struct HttpGenerator {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpGenerator {
    /// Create a generator for `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key: None,
        }
    }

    /// Send `Authorization: Bearer <key>` with every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Use a preconfigured client.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// The endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Generator for HttpGenerator {
    #[instrument(skip(self, prompt), fields(endpoint = %self.endpoint, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let mut request = self.client.post(&self.endpoint).json(&GenerateBody { prompt });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            let kind = if e.is_timeout() {
                GenerationErrorKind::Timeout(e.to_string())
            } else {
                GenerationErrorKind::Network(e.to_string())
            };
            GenerationError::new(kind)
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), "Generation endpoint returned an error");
            return Err(GenerationError::http(status.as_u16(), message));
        }

        let reply: GenerateReply = response.json().await.map_err(|e| {
            GenerationError::other(format!("Failed to parse response: {}", e))
        })?;
        Ok(reply.text)
    }
}
