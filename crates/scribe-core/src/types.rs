//! Core data types for the document processing workflow.
//!
//! These types flow through a single request: the parsed input, the
//! guardrail verdict, and the assembled response entity. None of them are
//! shared across requests.

use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;

/// A single document submitted for processing: either raw text or an
/// image payload destined for OCR.
#[derive(Debug, Clone)]
pub enum DocumentInput {
    /// Direct text input.
    Text(String),
    /// Encoded image bytes (PNG, JPEG, ...).
    Image(Vec<u8>),
}

impl DocumentInput {
    /// Build a `DocumentInput` from the two optional form fields.
    ///
    /// Exactly one of `text` and `image` must be present and non-empty.
    /// Empty values (blank text, zero-length upload) count as absent, so a
    /// form that submits an empty `text_input` alongside a file is still a
    /// file upload. Supplying both real inputs, or neither, is rejected.
    pub fn from_parts(
        text: Option<String>,
        image: Option<Vec<u8>>,
    ) -> Result<Self, WorkflowError> {
        let text = text.filter(|t| !t.trim().is_empty());
        let image = image.filter(|b| !b.is_empty());

        match (text, image) {
            (Some(_), Some(_)) => Err(WorkflowError::MissingInput(
                "Provide either 'text_input' or 'file', not both".to_string(),
            )),
            (None, None) => Err(WorkflowError::MissingInput(
                "Must provide either 'text_input' (form field) or 'file' (upload)".to_string(),
            )),
            (Some(text), None) => Ok(DocumentInput::Text(text)),
            (None, Some(image)) => Ok(DocumentInput::Image(image)),
        }
    }
}

/// The guardrail's decision about a document.
///
/// Produced once per request and never mutated afterward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationVerdict {
    /// Whether the content passed the guardrail check.
    pub is_valid: bool,
    /// Short model-supplied reason for the decision.
    pub rationale: String,
}

/// The response entity assembled at the end of a successful workflow run.
///
/// `summary_points` is empty (never null) when the guardrail rejected the
/// document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingResult {
    /// Guardrail outcome.
    pub is_valid: bool,
    /// Human-readable summary of what happened.
    pub status_message: String,
    /// The text the workflow operated on (raw or OCR-extracted).
    pub extracted_text: String,
    /// Ordered summary points, exactly as returned by the model.
    pub summary_points: Vec<String>,
}
