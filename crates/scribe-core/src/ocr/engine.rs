//! OCR engine trait and the oar-ocr backed implementation.
//!
//! The engine interface is deliberately small: it takes a decoded RGB
//! image and returns the recognized text fragments in detection order.
//! Inference is synchronous and CPU-bound; callers dispatch it via
//! `spawn_blocking`.

use image::RgbImage;

use oar_ocr::oarocr::{OAROCR, OAROCRBuilder};

use crate::config::OcrConfig;
use crate::error::OcrError;

/// Trait implemented by OCR backends.
pub trait OcrEngine: Send + Sync + std::fmt::Debug {
    /// Engine name for logging (e.g., "paddle").
    fn name(&self) -> &str;

    /// Recognize text in an image.
    ///
    /// Returns the recognized fragments in detection order. An empty vec
    /// means the engine ran but found no readable text.
    fn recognize(&self, image: RgbImage) -> Result<Vec<String>, OcrError>;
}

/// OCR engine backed by the oar-ocr pipeline (PaddleOCR-style ONNX
/// detection + recognition models).
///
/// Construction loads both models into memory and is expensive; the
/// engine is built once per process and shared via
/// [`super::OcrEngineCache`].
pub struct PaddleOcrEngine {
    pipeline: OAROCR,
}

impl PaddleOcrEngine {
    /// Load detection and recognition models from the configured model
    /// directory and assemble the pipeline.
    pub fn load(config: &OcrConfig) -> Result<Self, OcrError> {
        let model_dir = config.resolved_model_dir();
        let detection = model_dir.join(&config.detection_model);
        let recognition = model_dir.join(&config.recognition_model);
        let char_dict = model_dir.join(&config.character_dict);

        for path in [&detection, &recognition, &char_dict] {
            if !path.exists() {
                return Err(OcrError::Init {
                    message: format!(
                        "Model file not found: {}. Place OCR models under {}.",
                        path.display(),
                        model_dir.display()
                    ),
                });
            }
        }

        tracing::info!("Loading OCR models from {:?}", model_dir);
        let pipeline = OAROCRBuilder::new(detection, recognition, char_dict)
            // Keep recognition memory bounded on CPU-only hosts
            .region_batch_size(16)
            .build()
            .map_err(|e| OcrError::Init {
                message: format!("Failed to build OCR pipeline: {e}"),
            })?;
        tracing::info!("OCR models loaded successfully");

        Ok(Self { pipeline })
    }
}

impl OcrEngine for PaddleOcrEngine {
    fn name(&self) -> &str {
        "paddle"
    }

    fn recognize(&self, image: RgbImage) -> Result<Vec<String>, OcrError> {
        let mut results = self
            .pipeline
            .predict(vec![image])
            .map_err(|e| OcrError::Inference {
                message: e.to_string(),
            })?;

        let result = results.pop().ok_or_else(|| OcrError::Inference {
            message: "OCR pipeline returned no result".to_string(),
        })?;

        let fragments: Vec<String> = result
            .text_regions
            .iter()
            .filter_map(|region| region.text.as_deref())
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .collect();

        tracing::debug!(regions = result.text_regions.len(), fragments = fragments.len(), "OCR inference complete");
        Ok(fragments)
    }
}
