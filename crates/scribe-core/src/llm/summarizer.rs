//! Summarization: the second stage of the LLM chain.
//!
//! Only runs on documents the guardrail approved. Asks the model for a
//! fixed number of numbered points and parses them back in order; the
//! parser strips list markers but never reorders, deduplicates, or
//! truncates what the model returned.

use std::sync::Arc;
use std::time::Duration;

use crate::error::LlmError;

use super::provider::{CallOptions, LlmProvider, LlmRequest};
use super::retry;

/// Token budget for the summary.
const SUMMARY_MAX_TOKENS: u32 = 512;

/// Produces a fixed-count bulleted summary of validated document text.
pub struct Summarizer {
    provider: Arc<dyn LlmProvider>,
    options: CallOptions,
    points: usize,
}

impl Summarizer {
    pub fn new(provider: Arc<dyn LlmProvider>, options: CallOptions, points: usize) -> Self {
        Self {
            provider,
            options,
            points,
        }
    }

    /// Summarize the document text, retrying transient provider failures.
    ///
    /// Returns the summary points in the order the model produced them.
    pub async fn summarize(&self, text: &str) -> Result<Vec<String>, LlmError> {
        let request = self.build_request(text);
        let timeout = Duration::from_millis(self.options.timeout_ms);

        let response = retry::with_retry(&self.options.retry, "summarize", || async {
            match tokio::time::timeout(timeout, self.provider.generate(&request)).await {
                Ok(result) => result,
                Err(_) => Err(LlmError::Timeout {
                    stage: "summarize".to_string(),
                    timeout_ms: self.options.timeout_ms,
                }),
            }
        })
        .await?;

        let points = parse_points(&response.text);
        if points.is_empty() {
            return Err(LlmError::Schema {
                message: "Summarizer returned no summary points".to_string(),
            });
        }

        tracing::debug!(
            provider = self.provider.name(),
            points = points.len(),
            latency_ms = response.latency_ms,
            "summary generated"
        );
        Ok(points)
    }

    fn build_request(&self, text: &str) -> LlmRequest {
        LlmRequest {
            prompt: format!(
                "You are an expert summarization bot. Summarize the document content between \
                 the markers in exactly {n} concise, professional bullet points. Return each \
                 point on its own line, numbered '1.' through '{n}.'. The content has already \
                 been vetted for safety.\n\n\
                 [DOCUMENT CONTENT START]\n{text}\n[DOCUMENT CONTENT END]",
                n = self.points
            ),
            max_tokens: SUMMARY_MAX_TOKENS,
            temperature: 0.0,
        }
    }
}

/// Split the model output into summary points, preserving order.
fn parse_points(raw: &str) -> Vec<String> {
    raw.lines()
        .map(strip_marker)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Strip a leading list marker: `1.`, `2)`, `-`, `*`, or `•`.
fn strip_marker(line: &str) -> &str {
    let line = line.trim();
    let line = line.trim_start_matches(&['-', '*', '•'][..]).trim_start();

    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return rest.trim_start();
        }
    }
    line
}
