//! Text generation backend for the consultation endpoint.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::config::ServerConfig;
use crate::error::GenerationError;

pub const OPENAI_RESPONSES_URL: &str = "https://api.openai.com/v1/responses";

/// Produces the reflection text from a system and a user prompt.
#[async_trait]
pub trait ReflectionGenerator: Send + Sync {
    async fn generate(&self, system: &str, user: &str) -> Result<String, GenerationError>;
}

/// OpenAI Responses API over plain reqwest.
pub struct OpenAiGenerator {
    client: reqwest::Client,
    url: String,
    model: String,
    api_key: Option<SecretString>,
}

impl OpenAiGenerator {
    pub fn new(model: impl Into<String>, api_key: Option<SecretString>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: OPENAI_RESPONSES_URL.to_string(),
            model: model.into(),
            api_key,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.model.clone(), config.api_key.clone())
    }

    /// Point at a different Responses-compatible endpoint.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn failed(reason: impl ToString) -> GenerationError {
        GenerationError::RequestFailed {
            provider: "openai".to_string(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl ReflectionGenerator for OpenAiGenerator {
    async fn generate(&self, system: &str, user: &str) -> Result<String, GenerationError> {
        let Some(api_key) = &self.api_key else {
            return Err(GenerationError::NotConfigured);
        };

        let body = serde_json::json!({
            "model": self.model,
            "input": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
        });

        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(Self::failed)?;

        let status = resp.status();
        if !status.is_success() {
            let err = resp.text().await.unwrap_or_default();
            return Err(Self::failed(format!("HTTP {status}: {err}")));
        }

        let data: serde_json::Value = resp.json().await.map_err(Self::failed)?;
        let text = extract_text(&data).ok_or(GenerationError::EmptyResponse)?;
        tracing::debug!(model = %self.model, chars = text.chars().count(), "Reflection generated");
        Ok(text)
    }
}

/// Pull the generated text out of a Responses API body.
///
/// Prefers the `output_text` convenience field; otherwise joins every
/// `output[].content[].text` fragment.
pub fn extract_text(data: &serde_json::Value) -> Option<String> {
    if let Some(text) = data.get("output_text").and_then(|v| v.as_str()) {
        let text = text.trim();
        if !text.is_empty() {
            return Some(text.to_string());
        }
    }

    let fragments: Vec<&str> = data
        .get("output")
        .and_then(|v| v.as_array())
        .into_iter()
        .flatten()
        .filter_map(|item| item.get("content").and_then(|c| c.as_array()))
        .flatten()
        .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
        .collect();

    let joined = fragments.join("\n");
    let joined = joined.trim();
    if joined.is_empty() {
        None
    } else {
        Some(joined.to_string())
    }
}
