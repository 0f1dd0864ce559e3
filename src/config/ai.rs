//! Language-generation service configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// OpenRouter chat completions endpoint.
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// AI configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Which backend serves completions
    #[serde(default)]
    pub backend: AiBackend,

    /// API key for the OpenAI-compatible endpoint
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Token cap for analysis text
    #[serde(default = "default_analysis_max_tokens")]
    pub analysis_max_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Retries on transient failures
    #[serde(default = "default_retries")]
    pub max_retries: u32,

    /// Sent as HTTP-Referer to OpenRouter
    pub site_url: Option<String>,

    /// Sent as X-Title to OpenRouter
    #[serde(default = "default_app_title")]
    pub app_title: String,
}

/// Completion backend
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiBackend {
    /// Any OpenAI-compatible chat completions API (OpenRouter by default)
    #[default]
    OpenAI,
    /// Canned offline responses for development
    Mock,
}

impl AiConfig {
    /// Timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if an API key is set
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_ref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.backend == AiBackend::Mock {
            return Ok(());
        }
        if !self.has_api_key() {
            return Err(ValidationError::MissingRequired("AI__API_KEY"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidBaseUrl);
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ValidationError::InvalidTemperature);
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            backend: AiBackend::default(),
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            analysis_max_tokens: default_analysis_max_tokens(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            site_url: None,
            app_title: default_app_title(),
        }
    }
}

fn default_base_url() -> String {
    OPENROUTER_BASE_URL.to_string()
}

fn default_model() -> String {
    "google/gemini-3-flash-preview".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_analysis_max_tokens() -> u32 {
    1000
}

fn default_timeout() -> u64 {
    120
}

fn default_retries() -> u32 {
    2
}

fn default_app_title() -> String {
    "Sonar Reflection System".to_string()
}
