//! Workflow orchestration: extract, validate, then summarize.
//!
//! The per-request lifecycle is an explicit state machine:
//!
//! ```text
//! Start → Extracting → Validating → Summarizing → Done
//!                                 ↘ Rejected   ↗
//! ```
//!
//! Any stage error aborts the run with one of the three workflow error
//! codes; Rejected is a terminal outcome, not an error. Stages run
//! strictly sequentially within a request.

use crate::error::WorkflowResult;
use crate::extract::TextExtractor;
use crate::llm::{GuardrailValidator, Summarizer};
use crate::types::{DocumentInput, ProcessingResult, ValidationVerdict};

/// Status message for a fully processed document.
const SUCCESS_MESSAGE: &str = "Processing successful. Content validated and summarized.";

/// States of a single document run. Each state owns the data the next
/// transition needs.
enum WorkflowState {
    Start(DocumentInput),
    Extracting(DocumentInput),
    Validating(String),
    Summarizing(String),
    Rejected {
        text: String,
        verdict: ValidationVerdict,
    },
    Done(ProcessingResult),
}

impl WorkflowState {
    fn name(&self) -> &'static str {
        match self {
            WorkflowState::Start(_) => "start",
            WorkflowState::Extracting(_) => "extracting",
            WorkflowState::Validating(_) => "validating",
            WorkflowState::Summarizing(_) => "summarizing",
            WorkflowState::Rejected { .. } => "rejected",
            WorkflowState::Done(_) => "done",
        }
    }
}

/// Drives one document through extraction, validation, and summarization.
pub struct DocumentWorkflow {
    extractor: TextExtractor,
    validator: GuardrailValidator,
    summarizer: Summarizer,
}

impl DocumentWorkflow {
    pub fn new(
        extractor: TextExtractor,
        validator: GuardrailValidator,
        summarizer: Summarizer,
    ) -> Self {
        Self {
            extractor,
            validator,
            summarizer,
        }
    }

    /// Run the workflow for one document.
    ///
    /// Returns the assembled [`ProcessingResult`] for both the summarized
    /// and the rejected outcome; an `Err` always carries one of the
    /// workflow error codes.
    pub async fn run(&self, input: DocumentInput) -> WorkflowResult<ProcessingResult> {
        let mut state = WorkflowState::Start(input);

        loop {
            state = match state {
                WorkflowState::Start(input) => WorkflowState::Extracting(input),

                WorkflowState::Extracting(input) => {
                    let text = self.extractor.extract(&input).await?;
                    tracing::debug!(chars = text.len(), "document text extracted");
                    WorkflowState::Validating(text)
                }

                WorkflowState::Validating(text) => {
                    let verdict = self.validator.validate(&text).await?;
                    if verdict.is_valid {
                        WorkflowState::Summarizing(text)
                    } else {
                        WorkflowState::Rejected { text, verdict }
                    }
                }

                WorkflowState::Summarizing(text) => {
                    let summary_points = self.summarizer.summarize(&text).await?;
                    WorkflowState::Done(ProcessingResult {
                        is_valid: true,
                        status_message: SUCCESS_MESSAGE.to_string(),
                        extracted_text: text,
                        summary_points,
                    })
                }

                WorkflowState::Rejected { text, verdict } => {
                    WorkflowState::Done(ProcessingResult {
                        is_valid: false,
                        status_message: format!(
                            "Guardrail failed. Content blocked because: {}.",
                            verdict.rationale
                        ),
                        extracted_text: text,
                        summary_points: Vec::new(),
                    })
                }

                WorkflowState::Done(result) => {
                    tracing::info!(is_valid = result.is_valid, "workflow complete");
                    return Ok(result);
                }
            };
            tracing::trace!(state = state.name(), "workflow transition");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedProvider;
    use crate::llm::{CallOptions, GuardrailValidator, RetryPolicy, Summarizer};
    use crate::ocr::{EngineFactory, OcrEngine, OcrEngineCache};
    use crate::error::OcrError;
    use image::RgbImage;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    struct FixedEngine {
        fragments: Vec<String>,
    }

    impl OcrEngine for FixedEngine {
        fn name(&self) -> &str {
            "fixed"
        }

        fn recognize(&self, _image: RgbImage) -> Result<Vec<String>, OcrError> {
            Ok(self.fragments.clone())
        }
    }

    fn fast_options() -> CallOptions {
        CallOptions {
            timeout_ms: 5000,
            retry: RetryPolicy {
                max_attempts: 3,
                base_delay_ms: 10,
            },
        }
    }

    fn workflow_with(
        validator_provider: ScriptedProvider,
        summarizer_provider: ScriptedProvider,
        ocr_fragments: Vec<String>,
    ) -> (DocumentWorkflow, Arc<AtomicU32>, Arc<AtomicU32>) {
        let validator_calls = validator_provider.call_count_handle();
        let summarizer_calls = summarizer_provider.call_count_handle();

        let factory: EngineFactory = Box::new(move || {
            let engine = Arc::new(FixedEngine {
                fragments: ocr_fragments.clone(),
            }) as Arc<dyn OcrEngine>;
            Box::pin(async move { Ok(engine) })
        });
        let cache = Arc::new(OcrEngineCache::with_factory(factory));

        let workflow = DocumentWorkflow::new(
            TextExtractor::new(cache, 10000),
            GuardrailValidator::new(Arc::new(validator_provider), fast_options(), 4000),
            Summarizer::new(Arc::new(summarizer_provider), fast_options(), 3),
        );
        (workflow, validator_calls, summarizer_calls)
    }

    fn png_bytes() -> Vec<u8> {
        let image = image::RgbImage::from_pixel(8, 8, image::Rgb([255, 255, 255]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[tokio::test]
    async fn test_valid_text_is_summarized() {
        let (workflow, validator_calls, summarizer_calls) = workflow_with(
            ScriptedProvider::returning("PASS"),
            ScriptedProvider::returning("1. one\n2. two\n3. three"),
            vec![],
        );

        let result = workflow
            .run(DocumentInput::Text("This report is safe and clear.".into()))
            .await
            .unwrap();

        assert!(result.is_valid);
        assert_eq!(result.status_message, SUCCESS_MESSAGE);
        assert_eq!(result.extracted_text, "This report is safe and clear.");
        assert_eq!(result.summary_points, vec!["one", "two", "three"]);
        assert_eq!(validator_calls.load(Ordering::SeqCst), 1);
        assert_eq!(summarizer_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rejected_document_skips_summarizer() {
        let (workflow, _, summarizer_calls) = workflow_with(
            ScriptedProvider::returning("FAIL: harmful language"),
            ScriptedProvider::returning("1. never used"),
            vec![],
        );

        let result = workflow
            .run(DocumentInput::Text("questionable content".into()))
            .await
            .unwrap();

        assert!(!result.is_valid);
        assert!(result
            .status_message
            .contains("Content blocked because: harmful language"));
        assert!(result.summary_points.is_empty());
        // The summarizer must never be invoked for rejected documents
        assert_eq!(summarizer_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_validator_failure_aborts_run() {
        let (workflow, validator_calls, summarizer_calls) = workflow_with(
            ScriptedProvider::always_failing(503, "unavailable"),
            ScriptedProvider::returning("1. never used"),
            vec![],
        );

        let err = workflow
            .run(DocumentInput::Text("some text".into()))
            .await
            .unwrap_err();

        assert_eq!(err.code(), "LLM_CALL_FAILED");
        // Retries exhausted, then the run failed before summarization
        assert_eq!(validator_calls.load(Ordering::SeqCst), 3);
        assert_eq!(summarizer_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_summarizer_failure_aborts_run() {
        let (workflow, _, _) = workflow_with(
            ScriptedProvider::returning("PASS"),
            ScriptedProvider::always_failing(401, "unauthorized"),
            vec![],
        );

        let err = workflow
            .run(DocumentInput::Text("some text".into()))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "LLM_CALL_FAILED");
    }

    #[tokio::test]
    async fn test_blank_text_never_reaches_llm() {
        let (workflow, validator_calls, _) = workflow_with(
            ScriptedProvider::returning("PASS"),
            ScriptedProvider::returning("1. never used"),
            vec![],
        );

        let err = workflow
            .run(DocumentInput::Text("   ".into()))
            .await
            .unwrap_err();

        assert_eq!(err.code(), "MISSING_INPUT");
        assert_eq!(validator_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_image_input_runs_full_chain() {
        let (workflow, _, _) = workflow_with(
            ScriptedProvider::returning("PASS"),
            ScriptedProvider::returning("1. scanned summary"),
            vec!["INVOICE".to_string(), "Total: 42".to_string()],
        );

        let result = workflow
            .run(DocumentInput::Image(png_bytes()))
            .await
            .unwrap();

        assert!(result.is_valid);
        assert_eq!(result.extracted_text, "INVOICE\nTotal: 42");
        assert_eq!(result.summary_points, vec!["scanned summary"]);
    }

    #[tokio::test]
    async fn test_blank_image_fails_with_ocr_code() {
        let (workflow, validator_calls, _) = workflow_with(
            ScriptedProvider::returning("PASS"),
            ScriptedProvider::returning("1. never used"),
            vec![],
        );

        let err = workflow
            .run(DocumentInput::Image(png_bytes()))
            .await
            .unwrap_err();

        assert_eq!(err.code(), "OCR_FAILED");
        assert_eq!(validator_calls.load(Ordering::SeqCst), 0);
    }
}
