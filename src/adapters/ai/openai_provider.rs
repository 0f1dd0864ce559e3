//! OpenAI-compatible Provider - AIProvider over a chat completions API.
//!
//! Works against OpenAI itself and against OpenRouter, which is the default
//! endpoint. OpenRouter attribution headers are sent when configured.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAIConfig::new(api_key)
//!     .with_model("google/gemini-3-flash-preview")
//!     .with_base_url("https://openrouter.ai/api/v1");
//!
//! let provider = OpenAIProvider::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::config::{AiConfig, OPENROUTER_BASE_URL};
use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, MessageRole,
    ProviderInfo, TokenUsage,
};

/// Configuration for the OpenAI-compatible provider.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    api_key: Secret<String>,
    /// Model identifier.
    pub model: String,
    /// Base URL for the API, without the `/chat/completions` suffix.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retries on transient failures.
    pub max_retries: u32,
    /// `HTTP-Referer` header value.
    pub referer: Option<String>,
    /// `X-Title` header value.
    pub title: Option<String>,
}

impl OpenAIConfig {
    /// Creates a configuration pointing at OpenRouter.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "google/gemini-3-flash-preview".to_string(),
            base_url: OPENROUTER_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
            max_retries: 2,
            referer: None,
            title: None,
        }
    }

    /// Builds a configuration from the `ai` config section.
    pub fn from_app_config(config: &AiConfig) -> Result<Self, AIError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(AIError::AuthenticationFailed)?;

        Ok(Self::new(api_key)
            .with_model(config.model.clone())
            .with_base_url(config.base_url.clone())
            .with_timeout(config.timeout())
            .with_max_retries(config.max_retries)
            .with_attribution(config.site_url.clone(), Some(config.app_title.clone())))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets OpenRouter attribution headers.
    pub fn with_attribution(mut self, referer: Option<String>, title: Option<String>) -> Self {
        self.referer = referer;
        self.title = title;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// OpenAI-compatible API provider implementation.
pub struct OpenAIProvider {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIProvider {
    /// Creates a provider with the given configuration.
    pub fn new(config: OpenAIConfig) -> Result<Self, AIError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AIError::InvalidRequest(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    fn to_openai_request(&self, request: &CompletionRequest) -> OpenAIRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);

        if let Some(ref prompt) = request.system_prompt {
            messages.push(OpenAIMessage {
                role: "system".to_string(),
                content: prompt.clone(),
            });
        }

        for msg in &request.messages {
            messages.push(OpenAIMessage {
                role: match msg.role {
                    MessageRole::System => "system",
                    MessageRole::User => "user",
                    MessageRole::Assistant => "assistant",
                }
                .to_string(),
                content: msg.content.clone(),
            });
        }

        OpenAIRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }

    async fn send_request(&self, request: &CompletionRequest) -> Result<Response, AIError> {
        let body = self.to_openai_request(request);

        let mut builder = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.config.api_key())
            .json(&body);
        if let Some(ref referer) = self.config.referer {
            builder = builder.header("HTTP-Referer", referer);
        }
        if let Some(ref title) = self.config.title {
            builder = builder.header("X-Title", title);
        }

        builder.send().await.map_err(|e| {
            if e.is_timeout() {
                AIError::Timeout {
                    timeout_secs: self.config.timeout.as_secs() as u32,
                }
            } else if e.is_connect() {
                AIError::network(format!("Connection failed: {}", e))
            } else {
                AIError::network(e.to_string())
            }
        })
    }

    async fn handle_response_status(&self, response: Response) -> Result<Response, AIError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        Err(status_to_error(status.as_u16(), error_body))
    }

    async fn parse_response(&self, response: Response) -> Result<CompletionResponse, AIError> {
        let response = self.handle_response_status(response).await?;

        let openai_response: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| AIError::parse(format!("Failed to parse response: {}", e)))?;

        into_completion(openai_response, &self.config.model)
    }
}

#[async_trait]
impl AIProvider for OpenAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let mut attempt = 0;

        loop {
            let result = match self.send_request(&request).await {
                Ok(response) => self.parse_response(response).await,
                Err(err) => Err(err),
            };

            match result {
                Ok(completion) => return Ok(completion),
                Err(err) if err.is_retryable() && attempt < self.config.max_retries => {
                    tracing::warn!(
                        session_id = %request.metadata.session_id,
                        trace_id = %request.metadata.trace_id,
                        attempt,
                        error = %err,
                        "Completion failed, retrying"
                    );
                    // 1s, 2s, 4s, ...
                    sleep(Duration::from_secs(1 << attempt)).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        let name = if self.config.base_url.contains("openrouter.ai") {
            "openrouter"
        } else {
            "openai"
        };
        ProviderInfo::new(name, &self.config.model)
    }
}

fn status_to_error(status: u16, error_body: String) -> AIError {
    match status {
        401 | 403 => AIError::AuthenticationFailed,
        429 => AIError::rate_limited(parse_retry_after(&error_body)),
        400 | 413
            if error_body.contains("maximum context length")
                || error_body.contains("context_length_exceeded") =>
        {
            AIError::ContextTooLong(error_body)
        }
        400 => AIError::InvalidRequest(error_body),
        500..=599 => AIError::unavailable(format!("Server error {}: {}", status, error_body)),
        _ => AIError::network(format!("Unexpected status {}: {}", status, error_body)),
    }
}

/// Extracts "try again in Ns" from an error body; 30 seconds otherwise.
fn parse_retry_after(error_body: &str) -> u32 {
    let message = serde_json::from_str::<serde_json::Value>(error_body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(String::from)
        });

    message
        .as_deref()
        .and_then(|s| s.find("try again in ").map(|idx| &s[idx + 13..]))
        .and_then(|rest| {
            let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse::<u32>().ok()
        })
        .unwrap_or(30)
}

fn into_completion(response: OpenAIResponse, fallback_model: &str) -> Result<CompletionResponse, AIError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AIError::parse("No choices in response"))?;

    let finish_reason = match choice.finish_reason.as_deref() {
        Some("length") => FinishReason::Length,
        Some("content_filter") => FinishReason::ContentFilter,
        Some("error") => FinishReason::Error,
        _ => FinishReason::Stop,
    };

    let usage = response
        .usage
        .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
        .unwrap_or_default();

    Ok(CompletionResponse {
        content: choice.message.content.unwrap_or_default(),
        usage,
        model: response.model.unwrap_or_else(|| fallback_model.to_string()),
        finish_reason,
    })
}

// ----- OpenAI API Types -----

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    model: Option<String>,
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
