//! Text-generation collaborator.
//!
//! The pipeline only needs "prompt in, text out". [`TextGenerator`] is the
//! seam; [`OpenAiCompatClient`] speaks the OpenAI chat completions API, which
//! also covers most hosted and local gateways.

use async_trait::async_trait;
use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::{Result, ScoutError};

/// Produces a completion for a single user prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send `prompt` and return the model's text reply.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Non-streaming client for any server exposing `/chat/completions`.
pub struct OpenAiCompatClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiCompatClient {
    /// Create a client.
    ///
    /// - `base_url`: the base URL including `/v1` (e.g. `https://api.openai.com/v1`).
    /// - `api_key`: bearer token; an empty key sends no `Authorization` header.
    /// - `model`: the model identifier to send in requests.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Llm`] if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScoutError::Llm(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            temperature: 0.2,
        })
    }

    /// Build a client from config, reading the key from `api_key_env`.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Llm`] if the HTTP client cannot be built.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).unwrap_or_default();
        if api_key.is_empty() {
            tracing::warn!(
                env = %config.api_key_env,
                "no LLM API key set, sending unauthenticated requests"
            );
        }
        let mut client = Self::new(
            config.base_url.clone(),
            api_key,
            config.model.clone(),
            Duration::from_secs(config.timeout_seconds),
        )?;
        client.temperature = config.temperature;
        Ok(client)
    }

    fn build_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": self.temperature,
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAiCompatClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let base = self.base_url.trim_end_matches('/');
        let url = format!("{base}/chat/completions");

        let mut request = self.client.post(&url).json(&self.build_body(prompt));
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ScoutError::Llm(format!("request to {url} failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScoutError::Llm(format!("HTTP {status}: {body}")));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ScoutError::Llm(format!("invalid JSON response: {e}")))?;
        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| ScoutError::Llm("response has no choices[0].message.content".into()))?;

        tracing::trace!(model = %self.model, chars = content.len(), "completion received");
        Ok(content.to_owned())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    fn client() -> OpenAiCompatClient {
        OpenAiCompatClient::new(
            "https://api.openai.com/v1",
            "sk-test",
            "gpt-4o-mini",
            Duration::from_secs(5),
        )
        .expect("client")
    }

    #[test]
    fn constructor_stores_fields() {
        let c = client();
        assert_eq!(c.base_url, "https://api.openai.com/v1");
        assert_eq!(c.api_key, "sk-test");
        assert_eq!(c.model, "gpt-4o-mini");
    }

    #[test]
    fn body_has_single_user_message() {
        let body = client().build_body("hello there");
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "hello there");
        assert!(body["messages"][1].is_null());
        let temp = body["temperature"].as_f64().unwrap();
        assert!((temp - 0.2).abs() < 0.001);
    }

    #[test]
    fn from_config_uses_configured_temperature() {
        let config = LlmConfig {
            temperature: 0.7,
            api_key_env: "SIGNAL_SCOUT_TEST_UNSET_KEY".into(),
            ..LlmConfig::default()
        };
        let c = OpenAiCompatClient::from_config(&config).expect("client");
        assert!(c.api_key.is_empty());
        assert!((c.temperature - 0.7).abs() < f32::EPSILON);
    }
}
