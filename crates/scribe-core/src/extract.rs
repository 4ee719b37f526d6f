//! Text extraction from document inputs.
//!
//! Raw text passes through after trimming. Images are decoded with format
//! detection and run through the cached OCR engine; both the decode and
//! the inference are CPU-bound and run inside `spawn_blocking`.

use std::io::Cursor;
use std::sync::Arc;

use image::RgbImage;

use crate::error::{OcrError, WorkflowError, WorkflowResult};
use crate::ocr::OcrEngineCache;
use crate::types::DocumentInput;

/// Extracts plain text from a [`DocumentInput`].
pub struct TextExtractor {
    ocr: Arc<OcrEngineCache>,
    max_image_dimension: u32,
}

impl TextExtractor {
    /// Create an extractor backed by the given engine cache.
    pub fn new(ocr: Arc<OcrEngineCache>, max_image_dimension: u32) -> Self {
        Self {
            ocr,
            max_image_dimension,
        }
    }

    /// Extract the document text.
    ///
    /// Text inputs that are empty after trimming fail with MISSING_INPUT.
    /// Image inputs that cannot be decoded, fail inference, or yield no
    /// recognized fragments fail with OCR_FAILED.
    pub async fn extract(&self, input: &DocumentInput) -> WorkflowResult<String> {
        match input {
            DocumentInput::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Err(WorkflowError::MissingInput(
                        "Text input is empty".to_string(),
                    ));
                }
                Ok(trimmed.to_string())
            }
            DocumentInput::Image(bytes) => self.extract_from_image(bytes).await,
        }
    }

    async fn extract_from_image(&self, bytes: &[u8]) -> WorkflowResult<String> {
        // First image request in the process triggers the engine load.
        let engine = self
            .ocr
            .get()
            .await
            .map_err(|e| WorkflowError::OcrFailed(e.to_string()))?;

        let bytes = bytes.to_vec();
        let max_dimension = self.max_image_dimension;
        let fragments = tokio::task::spawn_blocking(move || -> Result<Vec<String>, OcrError> {
            let image = decode_rgb(&bytes, max_dimension)?;
            engine.recognize(image)
        })
        .await
        .map_err(|e| WorkflowError::OcrFailed(format!("OCR task failed: {e}")))?
        .map_err(|e| WorkflowError::OcrFailed(e.to_string()))?;

        if fragments.is_empty() {
            return Err(WorkflowError::OcrFailed(
                "The image contains no readable text".to_string(),
            ));
        }

        Ok(fragments.join("\n"))
    }
}

/// Decode image bytes into RGB with content-based format detection.
fn decode_rgb(bytes: &[u8], max_dimension: u32) -> Result<RgbImage, OcrError> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| OcrError::Decode {
            message: format!("Cannot detect image format: {e}"),
        })?;
    let image = reader.decode().map_err(|e| OcrError::Decode {
        message: e.to_string(),
    })?;

    let rgb = image.into_rgb8();
    if rgb.width() > max_dimension || rgb.height() > max_dimension {
        return Err(OcrError::Decode {
            message: format!(
                "Image too large: {}x{} exceeds {max_dimension}px limit",
                rgb.width(),
                rgb.height()
            ),
        });
    }
    Ok(rgb)
}
