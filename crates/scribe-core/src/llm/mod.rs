//! LLM integration for the validation/summarization chain.
//!
//! Provides a provider abstraction over multiple LLM backends (Gemini,
//! OpenAI, Ollama), a retry controller for transient failures, and the two
//! chained call sites: the guardrail validator and the summarizer.

pub(crate) mod gemini;
pub mod guardrail;
pub(crate) mod ollama;
pub(crate) mod openai;
pub(crate) mod provider;
pub mod retry;
pub mod summarizer;

pub use guardrail::GuardrailValidator;
pub use provider::{
    resolve_env_var, CallOptions, LlmProvider, LlmProviderFactory, LlmRequest, LlmResponse,
};
pub use retry::RetryPolicy;
pub use summarizer::Summarizer;

/// A configurable scripted LLM provider shared by the unit tests.
///
/// Each call to `generate()` invokes the response factory with the current
/// call index, allowing callers to return different results per attempt.
#[cfg(test)]
pub(crate) mod testing {
    use super::provider::{LlmProvider, LlmRequest, LlmResponse};
    use crate::error::LlmError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    type ResponseFn = Box<dyn Fn(u32) -> Result<LlmResponse, LlmError> + Send + Sync>;

    pub(crate) struct ScriptedProvider {
        /// Factory that produces a response for each call index.
        response_fn: ResponseFn,
        /// Tracks how many times `generate` was called.
        call_count: Arc<AtomicU32>,
        /// Optional delay before returning.
        delay: Option<Duration>,
    }

    pub(crate) fn response(text: &str) -> LlmResponse {
        LlmResponse {
            text: text.to_string(),
            model: "scripted-v1".to_string(),
            tokens_used: Some(42),
            latency_ms: 10,
        }
    }

    impl ScriptedProvider {
        /// Always succeed with the given text.
        pub(crate) fn returning(text: &str) -> Self {
            let text = text.to_string();
            Self::with_script(move |_| Ok(response(&text)))
        }

        /// Always fail with the given HTTP status.
        pub(crate) fn always_failing(status: u16, message: &str) -> Self {
            let message = message.to_string();
            Self::with_script(move |_| {
                Err(LlmError::Http {
                    status,
                    message: message.clone(),
                })
            })
        }

        /// First call fails with the given status, subsequent calls succeed.
        pub(crate) fn fail_then_succeed(status: u16, message: &str, success_text: &str) -> Self {
            let message = message.to_string();
            let success_text = success_text.to_string();
            Self::with_script(move |idx| {
                if idx == 0 {
                    Err(LlmError::Http {
                        status,
                        message: message.clone(),
                    })
                } else {
                    Ok(response(&success_text))
                }
            })
        }

        pub(crate) fn with_script(
            f: impl Fn(u32) -> Result<LlmResponse, LlmError> + Send + Sync + 'static,
        ) -> Self {
            Self {
                response_fn: Box::new(f),
                call_count: Arc::new(AtomicU32::new(0)),
                delay: None,
            }
        }

        pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        /// Get a shared handle to the call counter (clone before moving provider).
        pub(crate) fn call_count_handle(&self) -> Arc<AtomicU32> {
            self.call_count.clone()
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn generate(&self, _request: &LlmRequest) -> Result<LlmResponse, LlmError> {
            let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            (self.response_fn)(idx)
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(60)
        }
    }
}
