use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::config::AiConfig;
use crate::error::{GitStoryError, Result};
use crate::http::{ApiRequest, HttpTransport};

/// A text-generation service that answers a system + user prompt
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Model identifier recorded in the draft's provenance
    fn model(&self) -> &str;

    /// Return the raw completion text.
    ///
    /// Any failure is a [GitStoryError::Generation].
    async fn generate(&self, system: &str, prompt: &str) -> Result<String>;
}

/// OpenAI-compatible chat completions client
pub struct OpenAiGenerator {
    transport: Arc<dyn HttpTransport>,
    api_key: String,
    model: String,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl OpenAiGenerator {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        OpenAiGenerator {
            transport,
            api_key: api_key.into(),
            model: model.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Build a generator from config; `None` when no API key is available
    pub fn from_config(config: &AiConfig, transport: Arc<dyn HttpTransport>) -> Option<Self> {
        config
            .api_key()
            .map(|key| Self::new(transport, key, &config.model, &config.endpoint))
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, system: &str, prompt: &str) -> Result<String> {
        let request = ApiRequest::post(self.completions_url())
            .bearer(&self.api_key)
            .json(json!({
                "model": self.model,
                "messages": [
                    { "role": "system", "content": system },
                    { "role": "user", "content": prompt },
                ],
                "response_format": { "type": "json_object" },
                "temperature": 0.3,
            }));

        let response = self
            .transport
            .execute(request)
            .await
            .map_err(|e| GitStoryError::generation(format!("request failed: {}", e)))?;

        if !response.is_success() {
            return Err(GitStoryError::generation(format!(
                "service returned {}: {}",
                response.status, response.body
            )));
        }

        let parsed: ChatResponse = serde_json::from_str(&response.body)
            .map_err(|e| GitStoryError::generation(format!("unexpected response shape: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| GitStoryError::generation("response contained no content"))
    }
}
