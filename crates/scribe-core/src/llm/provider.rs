//! LLM provider trait and request/response types.
//!
//! Defines the interface that all LLM providers implement, plus the
//! factory that creates the right provider from configuration.

use crate::config::LlmConfig;
use crate::error::{ConfigError, LlmError};
use async_trait::async_trait;
use std::time::Duration;

/// A plain-text generation request.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// Full prompt (instruction plus delimited document content)
    pub prompt: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

/// The response from an LLM generation call.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Generated text
    pub text: String,
    /// Model identifier used
    pub model: String,
    /// Number of tokens used (input + output), if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Options shared by every guarded LLM call: per-attempt timeout and the
/// retry policy applied around it.
#[derive(Debug, Clone)]
pub struct CallOptions {
    /// Per-attempt timeout in milliseconds
    pub timeout_ms: u64,
    /// Retry policy for transient failures
    pub retry: super::retry::RetryPolicy,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 60_000,
            retry: super::retry::RetryPolicy::default(),
        }
    }
}

/// Trait that all LLM providers implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Arc<dyn LlmProvider>` for dynamic dispatch).
#[async_trait]
pub trait LlmProvider: Send + Sync + std::fmt::Debug {
    /// Provider name for logging (e.g., "gemini", "ollama").
    fn name(&self) -> &str;

    /// Check whether the provider is configured and reachable.
    async fn is_available(&self) -> bool;

    /// Generate a completion for the given request.
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Per-request timeout for this provider.
    fn timeout(&self) -> Duration;
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok()
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Factory that creates the appropriate provider from configuration.
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Create an LLM provider based on the `[llm]` config section.
    ///
    /// Fails when the selected provider needs an API key that is neither
    /// inlined in the config nor present in the environment.
    pub fn create(config: &LlmConfig) -> Result<Box<dyn LlmProvider>, ConfigError> {
        match config.provider.as_str() {
            "gemini" => {
                let cfg = config.gemini.clone().unwrap_or_default();
                let api_key = resolve_env_var(&cfg.api_key).ok_or_else(|| {
                    ConfigError::ValidationError(
                        "Gemini API key not set. Set GEMINI_API_KEY env var.".to_string(),
                    )
                })?;
                Ok(Box::new(super::gemini::GeminiProvider::new(
                    &cfg.endpoint,
                    &api_key,
                    &cfg.model,
                )))
            }
            "openai" => {
                let cfg = config.openai.clone().unwrap_or_default();
                let api_key = resolve_env_var(&cfg.api_key).ok_or_else(|| {
                    ConfigError::ValidationError(
                        "OpenAI API key not set. Set OPENAI_API_KEY env var.".to_string(),
                    )
                })?;
                Ok(Box::new(super::openai::OpenAiProvider::new(
                    &api_key, &cfg.model,
                )))
            }
            "ollama" => {
                let cfg = config.ollama.clone().unwrap_or_default();
                Ok(Box::new(super::ollama::OllamaProvider::new(
                    &cfg.endpoint,
                    &cfg.model,
                )))
            }
            other => Err(ConfigError::ValidationError(format!(
                "Unknown LLM provider: {other}"
            ))),
        }
    }
}
