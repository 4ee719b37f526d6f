//! Application state management.

use std::sync::Arc;

use scribe_core::config::Config;
use scribe_core::error::ConfigError;
use scribe_core::llm::{
    CallOptions, GuardrailValidator, LlmProvider, LlmProviderFactory, RetryPolicy, Summarizer,
};
use scribe_core::ocr::OcrEngineCache;
use scribe_core::{DocumentWorkflow, TextExtractor};

/// Shared application state.
///
/// Cheap to clone; the workflow (and the OCR engine cache inside it) is
/// shared by every request.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    workflow: DocumentWorkflow,
}

impl AppState {
    /// Assemble the workflow from configuration.
    ///
    /// Fails when the configured LLM provider cannot be constructed
    /// (unknown provider name or missing API key). The OCR engine is not
    /// loaded here: it stays untouched until the first image request.
    pub async fn new(config: Config) -> Result<Self, ConfigError> {
        let provider: Arc<dyn LlmProvider> = Arc::from(LlmProviderFactory::create(&config.llm)?);
        if !provider.is_available().await {
            tracing::warn!(
                provider = provider.name(),
                "LLM provider is not reachable or not fully configured"
            );
        }
        let options = CallOptions {
            timeout_ms: config.limits.llm_timeout_ms,
            retry: RetryPolicy {
                max_attempts: config.workflow.retry_attempts,
                base_delay_ms: config.workflow.retry_delay_ms,
            },
        };

        let ocr = Arc::new(OcrEngineCache::new(config.ocr.clone()));
        let workflow = DocumentWorkflow::new(
            TextExtractor::new(ocr, config.limits.max_image_dimension),
            GuardrailValidator::new(
                provider.clone(),
                options.clone(),
                config.workflow.max_validation_chars,
            ),
            Summarizer::new(provider, options, config.workflow.summary_points),
        );

        Ok(Self::with_workflow(config, workflow))
    }

    /// Build state around an already-assembled workflow.
    pub fn with_workflow(config: Config, workflow: DocumentWorkflow) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, workflow }),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the document workflow.
    pub fn workflow(&self) -> &DocumentWorkflow {
        &self.inner.workflow
    }
}
