//! Error types for the Scribe document processing workflow.
//!
//! Errors are layered: provider-level LLM errors and engine-level OCR errors
//! are wrapped into the three user-visible workflow codes (`MISSING_INPUT`,
//! `OCR_FAILED`, `LLM_CALL_FAILED`) that the HTTP surface reports verbatim.

use thiserror::Error;

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors from a single outbound LLM call.
///
/// The retry controller classifies these into transient and permanent
/// failures; see [`crate::llm::retry::is_retryable`].
#[derive(Error, Debug)]
pub enum LlmError {
    /// The provider returned a non-success HTTP status.
    #[error("LLM HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The request never produced an HTTP response (DNS, connect, TLS, ...).
    #[error("LLM request failed: {message}")]
    Transport { message: String },

    /// The call exceeded the per-attempt deadline.
    #[error("LLM call timed out in {stage} stage after {timeout_ms}ms")]
    Timeout { stage: String, timeout_ms: u64 },

    /// The provider answered, but the response did not match the expected
    /// shape. Distinct from a semantic rejection: an unparseable guardrail
    /// verdict is a failed call, not a failed document.
    #[error("Unexpected LLM response: {message}")]
    Schema { message: String },
}

/// Errors from the OCR engine.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Engine construction failed (missing or unloadable model files).
    #[error("OCR engine initialization failed: {message}")]
    Init { message: String },

    /// The uploaded payload could not be decoded as an image.
    #[error("Image decode failed: {message}")]
    Decode { message: String },

    /// Text detection/recognition failed at inference time.
    #[error("OCR inference failed: {message}")]
    Inference { message: String },
}

/// The user-visible error taxonomy of the document workflow.
///
/// Every failure path of a request maps to exactly one of these variants;
/// the HTTP layer translates them into status codes and JSON bodies.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// Neither input was usable: no text, no file, both at once, or empty.
    #[error("{0}")]
    MissingInput(String),

    /// An image was supplied but no text could be extracted from it.
    #[error("{0}")]
    OcrFailed(String),

    /// An outbound LLM call exhausted its retries or returned an
    /// unparseable response.
    #[error(transparent)]
    LlmCallFailed(#[from] LlmError),
}

impl WorkflowError {
    /// Machine-readable error code reported in API responses.
    pub fn code(&self) -> &'static str {
        match self {
            WorkflowError::MissingInput(_) => "MISSING_INPUT",
            WorkflowError::OcrFailed(_) => "OCR_FAILED",
            WorkflowError::LlmCallFailed(_) => "LLM_CALL_FAILED",
        }
    }
}

/// Convenience type alias for workflow results.
pub type WorkflowResult<T> = std::result::Result<T, WorkflowError>;
