//! Guardrail validation: the first stage of the LLM chain.
//!
//! Classifies extracted document text as professional-and-safe or not
//! before any summarization happens. The model is asked for a rigid
//! `PASS` / `FAIL: <reason>` verdict; anything else is a schema violation
//! and fails the call rather than the document.

use std::sync::Arc;
use std::time::Duration;

use crate::error::LlmError;
use crate::types::ValidationVerdict;

use super::provider::{CallOptions, LlmProvider, LlmRequest};
use super::retry;

/// Instruction prefixed to every classification request.
const CLASSIFY_INSTRUCTION: &str = "You are a document content classifier. Check whether the \
text between the content markers is a professional, academic, or work-related document \
(e.g., contract, report, academic paper), and whether it is free of explicit, harmful, or \
inappropriate language. Respond with a single line: 'PASS' if the content is professional \
AND safe, otherwise 'FAIL: <short reason>' (e.g., 'FAIL: harmful language').";

/// Token budget for the verdict line.
const VERDICT_MAX_TOKENS: u32 = 128;

/// Validates document content through an LLM classification call.
pub struct GuardrailValidator {
    provider: Arc<dyn LlmProvider>,
    options: CallOptions,
    max_input_chars: usize,
}

impl GuardrailValidator {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        options: CallOptions,
        max_input_chars: usize,
    ) -> Self {
        Self {
            provider,
            options,
            max_input_chars,
        }
    }

    /// Classify the document text, retrying transient provider failures.
    pub async fn validate(&self, text: &str) -> Result<ValidationVerdict, LlmError> {
        let request = self.build_request(text);
        let timeout = Duration::from_millis(self.options.timeout_ms);

        let response = retry::with_retry(&self.options.retry, "validate", || async {
            match tokio::time::timeout(timeout, self.provider.generate(&request)).await {
                Ok(result) => result,
                Err(_) => Err(LlmError::Timeout {
                    stage: "validate".to_string(),
                    timeout_ms: self.options.timeout_ms,
                }),
            }
        })
        .await?;

        let verdict = parse_verdict(&response.text)?;
        tracing::debug!(
            provider = self.provider.name(),
            is_valid = verdict.is_valid,
            latency_ms = response.latency_ms,
            "guardrail verdict"
        );
        Ok(verdict)
    }

    fn build_request(&self, text: &str) -> LlmRequest {
        let excerpt = truncate_chars(text, self.max_input_chars);
        LlmRequest {
            prompt: format!(
                "{CLASSIFY_INSTRUCTION}\n\n[DOCUMENT CONTENT START]\n{excerpt}\n[DOCUMENT CONTENT END]"
            ),
            max_tokens: VERDICT_MAX_TOKENS,
            temperature: 0.0,
        }
    }
}

/// Parse the model's verdict line into a [`ValidationVerdict`].
///
/// Accepts `PASS` or `FAIL`, case-insensitively, with optional surrounding
/// punctuation and an optional rationale after the verdict word. Any other
/// first token is a schema violation, not a rejection.
fn parse_verdict(raw: &str) -> Result<ValidationVerdict, LlmError> {
    let trimmed = raw.trim();
    let mut parts = trimmed.splitn(2, |c: char| c == ':' || c.is_whitespace());
    let head = parts.next().unwrap_or("");
    let rest = parts.next().unwrap_or("");

    let head = head.trim_matches(|c: char| c.is_ascii_punctuation());
    let rationale = rest.trim_start_matches(':').trim();

    match head.to_ascii_uppercase().as_str() {
        "PASS" => Ok(ValidationVerdict {
            is_valid: true,
            rationale: if rationale.is_empty() {
                "Content approved".to_string()
            } else {
                rationale.to_string()
            },
        }),
        "FAIL" => Ok(ValidationVerdict {
            is_valid: false,
            rationale: if rationale.is_empty() {
                "Content rejected by guardrail".to_string()
            } else {
                rationale.to_string()
            },
        }),
        _ => Err(LlmError::Schema {
            message: format!(
                "Expected PASS or FAIL verdict, got: {}",
                truncate_chars(trimmed, 80)
            ),
        }),
    }
}

/// Truncate at a char boundary without allocating.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
