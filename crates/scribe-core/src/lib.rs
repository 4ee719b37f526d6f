//! Scribe Core - document intake, guardrail, and summarization workflow.
//!
//! Scribe processes a single document per request: plain text passes
//! straight through, images go through a cached OCR engine, and the
//! extracted text is then chained through two LLM calls: a guardrail
//! classification, and (only if it passes) a fixed-count summarization.
//!
//! # Architecture
//!
//! ```text
//! Input → Extract (OCR if image) → Validate (LLM) → Summarize (LLM) → Result
//!                                                 ↘ Rejected ────────↗
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use scribe_core::{Config, DocumentInput, DocumentWorkflow};
//!
//! let config = Config::load()?;
//! let workflow = /* assemble from config, see scribe-server */;
//! let result = workflow.run(DocumentInput::Text("report text".into())).await?;
//! println!("Summary: {:?}", result.summary_points);
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod extract;
pub mod llm;
pub mod ocr;
pub mod types;
pub mod workflow;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, LlmError, OcrError, WorkflowError, WorkflowResult};
pub use extract::TextExtractor;
pub use types::{DocumentInput, ProcessingResult, ValidationVerdict};
pub use workflow::DocumentWorkflow;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
