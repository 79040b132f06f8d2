//! Text-generation provider boundary.
//!
//! The engine only sees the `TextGenerator` trait; the OpenAI binding
//! lives here with a request timeout and a single retry on transient
//! failures. Provider failures are a distinct error kind, never empty
//! text.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde_json::{json, Value};
use tracing::{debug, warn};

use shared_config::AppConfig;

use crate::error::ConsultationError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MODEL: &str = "gpt-4o";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    /// Conversational reply within the flow.
    Chat,
    /// Closing analysis / structured summary; lower temperature.
    Analysis,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        mode: GenerationMode,
    ) -> Result<String, ConsultationError>;
}

struct CallFailure {
    message: String,
    transient: bool,
}

#[derive(Debug)]
pub struct OpenAiProvider {
    api_key: String,
    base_url: String,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(config: &AppConfig) -> Result<Self, ConsultationError> {
        if config.openai_api_key.is_empty() {
            return Err(ConsultationError::Provider(
                "OPENAI_API_KEY is not configured".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ConsultationError::Provider(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            api_key: config.openai_api_key.clone(),
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn temperature(mode: GenerationMode) -> f64 {
        match mode {
            GenerationMode::Chat => 0.7,
            GenerationMode::Analysis => 0.2,
        }
    }

    async fn call_once(&self, prompt: &str, mode: GenerationMode) -> Result<String, CallFailure> {
        let body = json!({
            "model": MODEL,
            "messages": [
                { "role": "user", "content": prompt }
            ],
            "temperature": Self::temperature(mode)
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| CallFailure {
                // Connect errors and timeouts are worth one retry.
                message: format!("Request failed: {}", e),
                transient: true,
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CallFailure {
                message: format!("OpenAI API error ({}): {}", status, error_text),
                transient: status.as_u16() == 429 || status.is_server_error(),
            });
        }

        let payload: Value = response.json().await.map_err(|e| CallFailure {
            message: format!("Invalid OpenAI response body: {}", e),
            transient: false,
        })?;

        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .trim()
            .to_string();

        if content.is_empty() {
            return Err(CallFailure {
                message: "OpenAI returned an empty completion".to_string(),
                transient: false,
            });
        }

        Ok(content)
    }
}

#[async_trait]
impl TextGenerator for OpenAiProvider {
    async fn generate(
        &self,
        prompt: &str,
        mode: GenerationMode,
    ) -> Result<String, ConsultationError> {
        debug!("Calling text generation provider, prompt length {}", prompt.len());

        match self.call_once(prompt, mode).await {
            Ok(text) => Ok(text),
            Err(failure) if failure.transient => {
                warn!("Transient provider failure, retrying once: {}", failure.message);
                self.call_once(prompt, mode)
                    .await
                    .map_err(|f| ConsultationError::Provider(f.message))
            }
            Err(failure) => Err(ConsultationError::Provider(failure.message)),
        }
    }
}
